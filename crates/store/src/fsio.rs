//! Strict JSON reads and atomic writes.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Read a JSON object from disk. Strict by design: callers must not
/// proceed with empty defaults when persisted state is missing or
/// corrupted.
pub fn read_json_object(path: &Path) -> Result<Value, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| StoreError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
            found: json_type_name(&value),
        });
    }
    Ok(value)
}

/// Read and deserialize a schema-tagged document.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let value = read_json_object(path)?;
    serde_json::from_value(value).map_err(|e| StoreError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize `value` as pretty JSON and write it via temp-file-then-rename
/// so readers never observe a partial document. Parent directories are
/// created as needed.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| StoreError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_text_atomic(path, &text)
}

/// Atomic text write with the same temp-then-rename discipline.
pub fn write_text_atomic(path: &Path, text: &str) -> Result<(), StoreError> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, text).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}

/// Append a markdown block to a human-owned document, preserving existing
/// content and normalizing trailing whitespace. The rewrite itself is
/// atomic.
pub fn append_block(path: &Path, block: &str) -> Result<(), StoreError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let mut combined = existing.trim_end().to_string();
    if !combined.is_empty() {
        combined.push('\n');
    }
    combined.push_str(block.trim_end());
    combined.push('\n');
    write_text_atomic(path, &combined)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn malformed_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{bad json").unwrap();
        assert!(matches!(
            read_json_object(&path),
            Err(StoreError::InvalidJson { .. })
        ));
    }

    #[test]
    fn array_root_is_an_error_not_an_empty_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("arr.json");
        std::fs::write(&path, "[]").unwrap();
        match read_json_object(&path) {
            Err(StoreError::NotAnObject { found, .. }) => assert_eq!(found, "array"),
            other => panic!("expected NotAnObject, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_json_object(&tmp.path().join("missing.json")),
            Err(StoreError::Read { .. })
        ));
    }

    #[test]
    fn atomic_write_round_trips_and_leaves_no_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/doc.json");
        write_json_atomic(&path, &serde_json::json!({"a": 1})).unwrap();
        let value = read_json_object(&path).unwrap();
        assert_eq!(value["a"], 1);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn append_block_preserves_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.md");
        append_block(&path, "# Heading\n\nfirst").unwrap();
        append_block(&path, "second").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Heading"));
        assert!(text.contains("first"));
        assert!(text.trim_end().ends_with("second"));
    }
}
