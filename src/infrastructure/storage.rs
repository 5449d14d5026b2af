use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the persisted history list.
pub const HISTORY_FILE_NAME: &str = "dogtor.history.v1.json";

/// Per-user data directory, falling back to the working directory.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var_os("DOGTOR_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("XDG_DATA_HOME").map(|dir| PathBuf::from(dir).join("dogtor"))
        })
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share/dogtor"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn history_file(data_dir: &Path) -> io::Result<PathBuf> {
    ensure_dir(data_dir)?;
    Ok(data_dir.join(HISTORY_FILE_NAME))
}

/// Writes through a sibling temp file so readers never see a torn file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let file = history_file(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(file.file_name().unwrap(), HISTORY_FILE_NAME);
    }

    #[test]
    fn atomic_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        write_atomic(&path, b"[]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        remove_if_exists(&path).unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
