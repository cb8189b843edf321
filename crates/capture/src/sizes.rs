//! Disk footprint collection.

use std::path::Path;

/// Byte size of a path: 0 for nonexistent, file length for files, and the
/// recursive sum of file lengths for directories. Unreadable entries are
/// skipped and contribute 0; the walk never aborts. Symlinks are not
/// followed.
pub fn path_size_bytes(path: &Path) -> u64 {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => return 0,
    };
    if meta.is_file() {
        return meta.len();
    }
    if !meta.is_dir() {
        return 0;
    }

    let mut total = 0u64;
    let mut stack = vec![path.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let child = entry.path();
            match std::fs::symlink_metadata(&child) {
                Ok(m) if m.is_file() => total = total.saturating_add(m.len()),
                Ok(m) if m.is_dir() => stack.push(child),
                _ => {}
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn nonexistent_path_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(path_size_bytes(&tmp.path().join("missing")), 0);
    }

    #[test]
    fn file_size_is_its_length() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, b"12345").unwrap();
        assert_eq!(path_size_bytes(&file), 5);
    }

    #[test]
    fn directory_size_sums_recursively() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a"), b"123").unwrap();
        let sub = tmp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("b"), b"4567").unwrap();
        assert_eq!(path_size_bytes(tmp.path()), 7);
    }

    #[test]
    fn empty_directory_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(path_size_bytes(tmp.path()), 0);
    }
}
