//! Project manifest model and file path validation
//!
//! A manifest maps project-relative file paths to their text content. Every
//! path is treated as adversarial input: [`validate_entry_path`] rejects
//! anything that could address the filesystem outside a materialization
//! root, and the materializer applies it to the whole manifest before any
//! write happens.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Why a manifest path was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum PathViolation {
    /// The path is the empty string.
    Empty,
    /// The path starts with `/`.
    Absolute,
    /// The path contains a backslash separator.
    Backslash,
    /// The path contains a `:` (drive or NTFS stream form).
    Colon,
    /// The path contains a `..` segment.
    ParentTraversal,
    /// The path contains a `.` segment.
    CurrentDirSegment,
    /// The path contains an empty segment (`a//b` or a trailing `/`).
    EmptySegment,
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathViolation::Empty => write!(f, "path is empty"),
            PathViolation::Absolute => write!(f, "absolute paths are not allowed"),
            PathViolation::Backslash => write!(f, "backslash separators are not allowed"),
            PathViolation::Colon => write!(f, "':' is not allowed in paths"),
            PathViolation::ParentTraversal => {
                write!(f, "path traverses outside the project root")
            }
            PathViolation::CurrentDirSegment => write!(f, "path contains a '.' segment"),
            PathViolation::EmptySegment => write!(f, "path contains an empty segment"),
        }
    }
}

impl std::error::Error for PathViolation {}

/// Error type for manifest construction
#[derive(Debug)]
pub enum ManifestError {
    /// A `files` value was not a JSON string.
    InvalidContent(String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::InvalidContent(path) => {
                write!(f, "file content for '{}' is not a string", path)
            }
        }
    }
}

impl std::error::Error for ManifestError {}

/// Mapping of project-relative file paths to text content.
///
/// Keys are unique by construction; iteration order is the sorted path
/// order, which keeps materialization and archiving deterministic.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProjectManifest {
    files: BTreeMap<String, String>,
}

impl ProjectManifest {
    /// Build a manifest from the raw `files` object of a generation output.
    ///
    /// Every value must be a JSON string; the first non-string value fails
    /// the whole manifest. Paths are NOT validated here, only at
    /// materialization time.
    pub fn from_model_files(files: &Map<String, Value>) -> Result<Self, ManifestError> {
        let mut manifest = BTreeMap::new();

        for (path, content) in files {
            let content = content
                .as_str()
                .ok_or_else(|| ManifestError::InvalidContent(path.clone()))?;
            manifest.insert(path.clone(), content.to_string());
        }

        Ok(Self { files: manifest })
    }

    /// Build a manifest from already-validated (path, content) pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            files: entries.into_iter().collect(),
        }
    }

    /// The underlying path → content map.
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Validate a single manifest path against the sandbox rules.
///
/// Accepted paths are non-empty, relative, forward-slash separated, and
/// contain no `:`, `.`, `..`, or empty segments. Anything else is rejected
/// with the specific violation. Joining an accepted path onto a root
/// directory always resolves inside that root, on any host filesystem.
pub fn validate_entry_path(path: &str) -> Result<(), PathViolation> {
    if path.is_empty() {
        return Err(PathViolation::Empty);
    }

    if path.contains('\\') {
        return Err(PathViolation::Backslash);
    }

    // Rejects drive-rooted forms like `C:/` that count as absolute on
    // Windows hosts even though they have no leading slash.
    if path.contains(':') {
        return Err(PathViolation::Colon);
    }

    if path.starts_with('/') {
        return Err(PathViolation::Absolute);
    }

    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(PathViolation::EmptySegment);
        }
        if segment == ".." {
            return Err(PathViolation::ParentTraversal);
        }
        if segment == "." {
            return Err(PathViolation::CurrentDirSegment);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_model_files_valid() {
        let mut files = Map::new();
        files.insert("index.html".to_string(), Value::String("<html>".to_string()));
        files.insert(
            "src/app.js".to_string(),
            Value::String("console.log(1);".to_string()),
        );

        let manifest = ProjectManifest::from_model_files(&files).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.files()["index.html"], "<html>");
        assert_eq!(manifest.files()["src/app.js"], "console.log(1);");
    }

    #[test]
    fn test_from_model_files_rejects_non_string_value() {
        let mut files = Map::new();
        files.insert("a.txt".to_string(), Value::String("ok".to_string()));
        files.insert("b.txt".to_string(), serde_json::json!({"nested": true}));

        let err = ProjectManifest::from_model_files(&files).unwrap_err();

        assert!(matches!(err, ManifestError::InvalidContent(ref path) if path == "b.txt"));
        assert!(err.to_string().contains("b.txt"));
    }

    #[test]
    fn test_from_model_files_rejects_numeric_value() {
        let mut files = Map::new();
        files.insert("a.txt".to_string(), serde_json::json!(42));

        let result = ProjectManifest::from_model_files(&files);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_entries_collects() {
        let manifest = ProjectManifest::from_entries(vec![
            ("a.txt".to_string(), "1".to_string()),
            ("b/c.txt".to_string(), "2".to_string()),
        ]);

        assert_eq!(manifest.len(), 2);
        assert!(!manifest.is_empty());
    }

    #[test]
    fn test_manifest_serializes_transparently() {
        let manifest = ProjectManifest::from_entries(vec![(
            "index.html".to_string(),
            "<html>".to_string(),
        )]);

        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(json, r#"{"index.html":"<html>"}"#);

        let back: ProjectManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_validate_accepts_bare_filename() {
        assert!(validate_entry_path("index.html").is_ok());
    }

    #[test]
    fn test_validate_accepts_nested_path() {
        assert!(validate_entry_path("src/components/App.jsx").is_ok());
        assert!(validate_entry_path("static/css/styles.css").is_ok());
    }

    #[test]
    fn test_validate_accepts_dotfiles() {
        assert!(validate_entry_path(".gitignore").is_ok());
        assert!(validate_entry_path("config/.env.example").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate_entry_path(""), Err(PathViolation::Empty));
    }

    #[test]
    fn test_validate_rejects_absolute() {
        assert_eq!(
            validate_entry_path("/etc/passwd"),
            Err(PathViolation::Absolute)
        );
    }

    #[test]
    fn test_validate_rejects_parent_traversal() {
        assert_eq!(
            validate_entry_path("../escape.txt"),
            Err(PathViolation::ParentTraversal)
        );
        assert_eq!(
            validate_entry_path("src/../../escape.txt"),
            Err(PathViolation::ParentTraversal)
        );
        assert_eq!(
            validate_entry_path("src/.."),
            Err(PathViolation::ParentTraversal)
        );
    }

    #[test]
    fn test_validate_rejects_backslash() {
        assert_eq!(
            validate_entry_path("src\\app.js"),
            Err(PathViolation::Backslash)
        );
        assert_eq!(
            validate_entry_path("..\\escape.txt"),
            Err(PathViolation::Backslash)
        );
    }

    #[test]
    fn test_validate_rejects_drive_and_stream_forms() {
        assert_eq!(
            validate_entry_path("C:/windows/evil.txt"),
            Err(PathViolation::Colon)
        );
        assert_eq!(
            validate_entry_path("file.txt:stream"),
            Err(PathViolation::Colon)
        );
    }

    #[test]
    fn test_validate_rejects_current_dir_segment() {
        assert_eq!(
            validate_entry_path("./index.html"),
            Err(PathViolation::CurrentDirSegment)
        );
        assert_eq!(
            validate_entry_path("src/./app.js"),
            Err(PathViolation::CurrentDirSegment)
        );
    }

    #[test]
    fn test_validate_rejects_empty_segment() {
        assert_eq!(
            validate_entry_path("src//app.js"),
            Err(PathViolation::EmptySegment)
        );
        assert_eq!(
            validate_entry_path("src/"),
            Err(PathViolation::EmptySegment)
        );
    }

    #[test]
    fn test_validate_accepts_dotdot_in_filename() {
        // ".." must be a whole segment to traverse; "a..b" is just a name.
        assert!(validate_entry_path("notes..txt").is_ok());
        assert!(validate_entry_path("src/a..b.js").is_ok());
    }
}
