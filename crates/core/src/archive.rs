//! Zip packaging of materialized project trees
//!
//! Builds the downloadable artifact for a project root. The archive is
//! staged in a temporary file beside the target and renamed into place on
//! success, so the canonical artifact name never holds a half-written zip.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Error type for archiving
#[derive(Debug)]
pub enum ArchiveError {
    /// The source directory does not exist.
    MissingSource(String),
    /// Filesystem failure while walking the tree or staging the artifact.
    Io(String),
    /// Zip encoding failure.
    Zip(String),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::MissingSource(path) => {
                write!(f, "source directory not found: {}", path)
            }
            ArchiveError::Io(msg) => write!(f, "IO error: {}", msg),
            ArchiveError::Zip(msg) => write!(f, "zip error: {}", msg),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

/// Deterministic archive file name for a project root directory name.
pub fn archive_name(root_name: &str) -> String {
    format!("{root_name}.zip")
}

/// Zip the tree under `root` into `<root name>.zip` in the same parent
/// directory, replacing any prior artifact of that name.
///
/// Member paths are root-relative with forward slashes, files only
/// (directories are implied). Returns the archive file name. The zip is
/// written to a temp file first and atomically renamed, so failures leave
/// nothing at the canonical name.
pub fn archive_project(root: &Path) -> Result<String, ArchiveError> {
    if !root.is_dir() {
        return Err(ArchiveError::MissingSource(root.display().to_string()));
    }

    let root_name = root
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ArchiveError::MissingSource(root.display().to_string()))?;
    let zip_name = archive_name(root_name);

    let parent = root.parent().unwrap_or_else(|| Path::new("."));
    let staging = tempfile::NamedTempFile::new_in(parent)?;

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(staging);

    for path in &files {
        let entry_name = member_name(root, path)?;
        writer.start_file(entry_name, options)?;
        let bytes = fs::read(path)?;
        writer.write_all(&bytes)?;
    }

    let staging = writer.finish()?;
    staging
        .persist(parent.join(&zip_name))
        .map_err(|e| ArchiveError::Io(e.to_string()))?;

    Ok(zip_name)
}

/// Recursively collect every file under `dir`.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Root-relative, forward-slash member name for a file inside the tree.
fn member_name(root: &Path, path: &Path) -> Result<String, ArchiveError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| ArchiveError::Io(e.to_string()))?;

    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_tree(root: &Path, entries: &[(&str, &str)]) {
        fs::create_dir_all(root).unwrap();
        for (path, content) in entries {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(target, content).unwrap();
        }
    }

    fn read_member(zip_path: &Path, name: &str) -> String {
        let file = fs::File::open(zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut member = archive.by_name(name).unwrap();
        let mut content = String::new();
        member.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_archive_name_is_deterministic() {
        assert_eq!(archive_name("todo-app-3fa4b2c1"), "todo-app-3fa4b2c1.zip");
    }

    #[test]
    fn test_archive_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        write_tree(
            &root,
            &[
                ("index.html", "<!DOCTYPE html>"),
                ("src/app.js", "console.log('hi');"),
                ("static/css/styles.css", "body {}"),
            ],
        );

        let zip_name = archive_project(&root).unwrap();
        assert_eq!(zip_name, "project.zip");

        let zip_path = temp_dir.path().join(&zip_name);
        assert!(zip_path.is_file());
        assert_eq!(read_member(&zip_path, "index.html"), "<!DOCTYPE html>");
        assert_eq!(read_member(&zip_path, "src/app.js"), "console.log('hi');");
        assert_eq!(read_member(&zip_path, "static/css/styles.css"), "body {}");
    }

    #[test]
    fn test_archive_member_count() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        write_tree(&root, &[("a.txt", "1"), ("b/c.txt", "2")]);

        archive_project(&root).unwrap();

        let file = fs::File::open(temp_dir.path().join("project.zip")).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_archive_replaces_existing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        write_tree(&root, &[("a.txt", "first")]);
        archive_project(&root).unwrap();

        fs::write(root.join("a.txt"), "second").unwrap();
        archive_project(&root).unwrap();

        let zip_path = temp_dir.path().join("project.zip");
        assert_eq!(read_member(&zip_path, "a.txt"), "second");
    }

    #[test]
    fn test_missing_source_fails_without_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("does-not-exist");

        let err = archive_project(&root).unwrap_err();

        assert!(matches!(err, ArchiveError::MissingSource(_)));
        assert!(!temp_dir.path().join("does-not-exist.zip").exists());
    }

    #[test]
    fn test_no_stray_staging_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        write_tree(&root, &[("a.txt", "1")]);

        archive_project(&root).unwrap();

        // Only the root directory and the canonical artifact remain.
        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"project".to_string()));
        assert!(names.contains(&"project.zip".to_string()));
    }

    #[test]
    fn test_empty_directory_archives_to_empty_zip() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root).unwrap();

        let zip_name = archive_project(&root).unwrap();

        let file = fs::File::open(temp_dir.path().join(zip_name)).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
