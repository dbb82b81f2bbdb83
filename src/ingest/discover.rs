//! Dataset file discovery and payload reading

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::error::IngestError;

/// Default pattern matching every payload below the snapshot root
pub const DEFAULT_PATTERN: &str = "**/*.json";

/// Discover files matching a pattern below `root`
///
/// Results are sorted by path so batches are always filled in the same
/// order. Entries that cannot be accessed are logged and skipped.
pub fn discover_dataset_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, IngestError> {
    let full_pattern = if pattern.starts_with('/') || pattern.starts_with('.') {
        pattern.to_string()
    } else {
        format!("{}/{}", root.display(), pattern)
    };

    let entries = glob::glob(&full_pattern)
        .map_err(|e| IngestError::InvalidPattern(format!("{}: {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("Error accessing path: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

/// Read and parse one payload file
pub fn read_payload(path: &Path) -> Result<Value, IngestError> {
    let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| IngestError::PayloadFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_sorted_json_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top/user/country/india/2021/2.json", "{}");
        touch(dir.path(), "aggregated/user/country/india/2021/1.json", "{}");
        touch(dir.path(), "aggregated/user/country/india/README.md", "");

        let files = discover_dataset_files(dir.path(), DEFAULT_PATTERN).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("aggregated/user/country/india/2021/1.json"));
        assert!(files[1].ends_with("top/user/country/india/2021/2.json"));
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let err = discover_dataset_files(dir.path(), "***[").unwrap_err();
        assert!(matches!(err, IngestError::InvalidPattern(_)));
    }

    #[test]
    fn test_read_payload() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ok.json", r#"{"data": {"hoverData": {}}}"#);
        touch(dir.path(), "broken.json", r#"{"data": "#);

        let value = read_payload(&dir.path().join("ok.json")).unwrap();
        assert!(value["data"]["hoverData"].is_object());

        let err = read_payload(&dir.path().join("broken.json")).unwrap_err();
        assert_eq!(err.kind(), "payload-format");

        let err = read_payload(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
