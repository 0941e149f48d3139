//! Request-scoped workspace naming, listing, and retention
//!
//! Every generation materializes into its own root directory under a
//! workspace parent, named `{slug}-{id}` from the instruction and a request
//! identifier. Roots never collide across requests; the retention sweep
//! keeps the newest N roots and removes older ones together with their
//! archives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Error type for workspace operations
#[derive(Debug)]
pub enum WorkspaceError {
    IoError(String),
}

impl std::fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for WorkspaceError {}

impl From<io::Error> for WorkspaceError {
    fn from(err: io::Error) -> Self {
        WorkspaceError::IoError(err.to_string())
    }
}

/// Maximum length of the slug portion of a workspace name.
const SLUG_MAX_LEN: usize = 40;

/// Derive a filesystem-friendly slug from a free-text instruction.
///
/// Lowercases the text, collapses every non-alphanumeric run into a single
/// hyphen, trims boundary hyphens, and truncates. Falls back to `project`
/// when nothing usable remains.
pub fn slugify(instruction: &str) -> String {
    let lowered = instruction.to_lowercase();
    let re = Regex::new(r"[^a-z0-9]+").unwrap();
    let collapsed = re.replace_all(&lowered, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        return "project".to_string();
    }

    // The collapsed slug is pure ASCII, so byte truncation is safe.
    let mut slug = slug.to_string();
    if slug.len() > SLUG_MAX_LEN {
        slug.truncate(SLUG_MAX_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }

    slug
}

/// Compose the workspace directory name for a slug and request identifier.
pub fn workspace_dir_name(slug: &str, request_id: &str) -> String {
    format!("{slug}-{request_id}")
}

/// A materialized workspace root under the parent directory.
#[derive(Debug, Clone)]
pub struct WorkspaceEntry {
    /// Directory name (`{slug}-{id}`).
    pub name: String,
    /// Full path to the root directory.
    pub path: PathBuf,
    /// Last modification time of the root.
    pub modified: SystemTime,
    /// Number of files in the tree.
    pub file_count: usize,
    /// Whether the matching `<name>.zip` artifact exists beside the root.
    pub has_archive: bool,
}

/// List workspace roots under `parent`, newest first.
///
/// Plain files in the parent (the archives) are not entries themselves; a
/// missing parent directory lists as empty.
pub fn list_workspaces(parent: &Path) -> Result<Vec<WorkspaceEntry>, WorkspaceError> {
    if !parent.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let modified = entry.metadata()?.modified()?;
        let file_count = count_files(&path)?;
        let has_archive = parent.join(crate::archive::archive_name(&name)).is_file();

        entries.push(WorkspaceEntry {
            name,
            path,
            modified,
            file_count,
            has_archive,
        });
    }

    entries.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.name.cmp(&a.name))
    });

    Ok(entries)
}

/// Remove workspace roots beyond the newest `keep`, along with their
/// archives. Returns the names of the removed workspaces.
pub fn prune_workspaces(parent: &Path, keep: usize) -> Result<Vec<String>, WorkspaceError> {
    let entries = list_workspaces(parent)?;
    let mut removed = Vec::new();

    for entry in entries.into_iter().skip(keep) {
        fs::remove_dir_all(&entry.path)?;

        let zip_path = parent.join(crate::archive::archive_name(&entry.name));
        if zip_path.is_file() {
            fs::remove_file(&zip_path)?;
        }

        removed.push(entry.name);
    }

    Ok(removed)
}

/// Convert a modification time to a formatted string
pub fn format_timestamp(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Recursively count the files in a tree.
fn count_files(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            count += count_files(&path)?;
        } else {
            count += 1;
        }
    }
    Ok(count)
}
