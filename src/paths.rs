//! Path normalization — resolves the Windows/POSIX Open Question from
//! spec.md §9: every path stored in the graph is an absolute, `/`-separated
//! string, normalized exactly once at ingestion.

use std::path::{Path, PathBuf};

/// Canonicalize `path` and render it as an absolute POSIX-style string.
///
/// Falls back to a lexical join with the current directory when
/// `std::fs::canonicalize` fails (e.g. the path doesn't exist yet, as can
/// happen for generated headers referenced only by a compile command).
pub fn normalize(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path)
        .unwrap_or_else(|_| lexical_absolute(path));
    to_posix_string(&absolute)
}

fn lexical_absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(windows)]
fn to_posix_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(not(windows))]
fn to_posix_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn normalizes_existing_file_to_absolute_posix() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "").unwrap();

        let normalized = normalize(&file);
        assert!(normalized.starts_with('/') || normalized.contains(':'));
        assert!(!normalized.contains('\\'));
        assert!(normalized.ends_with("a.c"));
    }

    #[test]
    fn falls_back_for_nonexistent_path() {
        let normalized = normalize(Path::new("does/not/exist.c"));
        assert!(normalized.ends_with("does/not/exist.c"));
    }
}
