//! Manifest-to-disk tree materialization
//!
//! Writes a manifest under a root directory, replacing any previous tree at
//! that root wholesale. Every path is validated before the first filesystem
//! mutation, so a hostile manifest can neither write outside the root nor
//! leave a partial tree behind.

use std::fs;
use std::path::Path;

use crate::manifest::{validate_entry_path, PathViolation, ProjectManifest};

/// Error type for materialization
#[derive(Debug)]
pub enum MaterializeError {
    /// A manifest path failed validation; nothing was written.
    UnsafePath {
        path: String,
        violation: PathViolation,
    },
    /// Filesystem failure while replacing or writing the tree.
    Io(String),
}

impl std::fmt::Display for MaterializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterializeError::UnsafePath { path, violation } => {
                write!(f, "unsafe path '{}': {}", path, violation)
            }
            MaterializeError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for MaterializeError {}

impl From<std::io::Error> for MaterializeError {
    fn from(err: std::io::Error) -> Self {
        MaterializeError::Io(err.to_string())
    }
}

/// Materialize a manifest under `root`, replacing any existing tree.
///
/// All paths are validated up front; the first invalid one aborts the whole
/// operation before any filesystem change. An existing `root` is removed
/// wholesale, so the resulting tree contains exactly the manifest entries
/// and nothing from a previous generation.
pub fn materialize_project(
    root: &Path,
    manifest: &ProjectManifest,
) -> Result<(), MaterializeError> {
    for path in manifest.files().keys() {
        validate_entry_path(path).map_err(|violation| MaterializeError::UnsafePath {
            path: path.clone(),
            violation,
        })?;
    }

    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root)?;

    for (path, content) in manifest.files() {
        let target = root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
    }

    Ok(())
}
