//! Input path resolution.
//!
//! Both inputs must exist before any work starts; nothing is created on the
//! caller's behalf.

use std::path::{Path, PathBuf};

use crate::error::{ImportError, Result};

/// Which input a path refers to, for error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Database,
}

impl InputKind {
    fn label(self) -> &'static str {
        match self {
            InputKind::Csv => "CSV",
            InputKind::Database => "DB",
        }
    }
}

/// Expand a leading `~/` using `$HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Resolve `path` to an absolute, canonical path that exists.
///
/// # Returns
/// * `Ok(path)` with symlinks and `..` resolved
/// * `Err(ImportError::InputNotFound)` if nothing exists at `path`
pub fn resolve_existing(path: &Path, kind: InputKind) -> Result<PathBuf> {
    let expanded = expand_home(path);
    std::fs::canonicalize(&expanded).map_err(|_| ImportError::InputNotFound {
        kind: kind.label(),
        path: expanded,
    })
}

/// Resolve both inputs, refusing a CSV and database that are the same file.
pub fn resolve_inputs(csv: &Path, db: &Path) -> Result<(PathBuf, PathBuf)> {
    let csv = resolve_existing(csv, InputKind::Csv)?;
    let db = resolve_existing(db, InputKind::Database)?;
    if csv == db {
        return Err(ImportError::SamePath(csv));
    }
    Ok((csv, db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        fs::write(&path, "book_title\n").unwrap();

        let resolved = resolve_existing(&dir.path().join("./records.csv"), InputKind::Csv).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(&path).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let err = resolve_existing(&path, InputKind::Database).unwrap_err();
        assert!(matches!(err, ImportError::InputNotFound { kind: "DB", .. }));
        assert!(err.to_string().starts_with("DB not found:"));
    }

    #[test]
    fn test_same_path_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.db");
        fs::write(&path, "").unwrap();
        let err = resolve_inputs(&path, &path).unwrap_err();
        assert!(matches!(err, ImportError::SamePath(_)));
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("data/books.db");
        assert_eq!(expand_home(plain), plain.to_path_buf());
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_home(Path::new("~/books.db")), PathBuf::from(home).join("books.db"));
        }
    }
}
