//! Local filesystem accessor

use crate::core::config::config;
use crate::core::error::{Result, ShellError};
use crate::services::FileAccess;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of a directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryItem {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub is_file: bool,
    /// Zero for directories
    pub size_bytes: u64,
    pub size_human: String,
    pub modified: Option<DateTime<Local>>,
    /// Last three octal digits of the mode, e.g. "644"
    pub permissions: Option<String>,
    pub owner: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingSummary {
    pub total_items: usize,
    pub file_count: usize,
    pub directory_count: usize,
    pub total_size_bytes: u64,
    pub total_size_human: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub items: Vec<DirectoryItem>,
    pub summary: ListingSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
    pub encoding: String,
}

/// Filesystem accessor rooted at a working directory
#[derive(Debug, Clone)]
pub struct LocalFileManager {
    current_path: PathBuf,
    history: Vec<PathBuf>,
    max_read_bytes: u64,
}

impl LocalFileManager {
    /// Start in the process working directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(std::env::current_dir()?))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            current_path: root.into(),
            history: Vec::new(),
            max_read_bytes: config().max_read_bytes,
        }
    }

    pub fn with_max_read_bytes(mut self, limit: u64) -> Self {
        self.max_read_bytes = limit;
        self
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Directories visited before the current one, oldest first
    pub fn navigation_history(&self) -> &[PathBuf] {
        &self.history
    }

    /// List `path`, or the current directory when `None`
    ///
    /// Entries that cannot be stat'ed are skipped. Directories sort before
    /// files, then by case-folded name.
    pub fn list(&self, path: Option<&Path>) -> Result<DirectoryListing> {
        let target = path.unwrap_or(&self.current_path);
        if !target.exists() {
            return Err(ShellError::PathNotFound(target.to_path_buf()));
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(target)? {
            let Ok(entry) = entry else { continue };
            let item_path = entry.path();
            let Ok(metadata) = fs::metadata(&item_path) else {
                continue;
            };

            let is_directory = metadata.is_dir();
            let size_bytes = if is_directory { 0 } else { metadata.len() };

            items.push(DirectoryItem {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: item_path,
                is_directory,
                is_file: !is_directory,
                size_bytes,
                size_human: bytes_to_human(size_bytes),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
                permissions: permission_bits(&metadata),
                owner: owner_uid(&metadata),
            });
        }

        items.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        let directory_count = items.iter().filter(|i| i.is_directory).count();
        let total_size_bytes: u64 = items.iter().map(|i| i.size_bytes).sum();
        let summary = ListingSummary {
            total_items: items.len(),
            file_count: items.len() - directory_count,
            directory_count,
            total_size_bytes,
            total_size_human: bytes_to_human(total_size_bytes),
        };

        Ok(DirectoryListing {
            path: target.to_path_buf(),
            items,
            summary,
        })
    }

    /// Read a text file, decoding invalid UTF-8 lossily
    pub fn read_file(&self, path: &Path) -> Result<FileContent> {
        if !path.exists() {
            return Err(ShellError::PathNotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            return Err(ShellError::IsADirectory(path.to_path_buf()));
        }

        let size = fs::metadata(path)?.len();
        if size > self.max_read_bytes {
            return Err(ShellError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_read_bytes,
            });
        }

        let bytes = fs::read(path)?;
        Ok(FileContent {
            path: path.to_path_buf(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            size,
            encoding: "utf-8".into(),
        })
    }

    /// Create a new file, making parent directories as needed
    pub fn create_file(&self, path: &Path, content: &str) -> Result<String> {
        if path.exists() {
            return Err(ShellError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(format!("File created: {}", path.display()))
    }

    /// Remove a file or a whole directory tree
    pub fn delete_path(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ShellError::PathNotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            fs::remove_dir_all(path)?;
            Ok(format!("Directory deleted: {}", path.display()))
        } else {
            fs::remove_file(path)?;
            Ok(format!("File deleted: {}", path.display()))
        }
    }

    pub fn change_directory(&mut self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ShellError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(ShellError::NotADirectory(path.to_path_buf()));
        }

        let previous = std::mem::replace(&mut self.current_path, path.to_path_buf());
        self.history.push(previous);
        Ok(format!("Changed to: {}", path.display()))
    }
}

impl FileAccess for LocalFileManager {
    fn list_directory(&self, path: Option<&Path>) -> Result<DirectoryListing> {
        self.list(path)
    }
}

/// Human-readable byte count: "0B", "512.00 B", "1.50 KB", ...
pub fn bytes_to_human(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0B".into();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:03o}", metadata.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> Option<String> {
    Some(if metadata.permissions().readonly() { "444" } else { "666" }.into())
}

#[cfg(unix)]
fn owner_uid(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.uid())
}

#[cfg(not(unix))]
fn owner_uid(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bytes_to_human() {
        assert_eq!(bytes_to_human(0), "0B");
        assert_eq!(bytes_to_human(512), "512.00 B");
        assert_eq!(bytes_to_human(1536), "1.50 KB");
        assert_eq!(bytes_to_human(1024 * 1024), "1.00 MB");
        assert_eq!(bytes_to_human(5 * 1024u64.pow(5)), "5120.00 TB");
    }

    #[test]
    fn test_list_sorts_directories_first() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "hello").unwrap();
        fs::write(dir.path().join("A.txt"), "").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();

        let fm = LocalFileManager::with_root(dir.path());
        let listing = fm.list(None).unwrap();

        let names: Vec<_> = listing.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "A.txt", "b.txt"]);
        assert_eq!(listing.summary.directory_count, 1);
        assert_eq!(listing.summary.file_count, 2);
        assert_eq!(listing.summary.total_size_bytes, 5);
        assert_eq!(listing.items[0].size_bytes, 0);
    }

    #[test]
    fn test_list_missing_path() {
        let fm = LocalFileManager::with_root("/definitely/not/here");
        let err = fm.list(None).unwrap_err();
        assert_eq!(err.to_string(), "Path does not exist");
    }

    #[test]
    fn test_read_file_limits() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("big.txt");
        fs::write(&file, "0123456789").unwrap();

        let fm = LocalFileManager::with_root(dir.path()).with_max_read_bytes(4);
        assert!(matches!(
            fm.read_file(&file),
            Err(ShellError::FileTooLarge { size: 10, .. })
        ));
        assert!(matches!(
            fm.read_file(dir.path()),
            Err(ShellError::IsADirectory(_))
        ));

        let fm = fm.with_max_read_bytes(1024);
        let content = fm.read_file(&file).unwrap();
        assert_eq!(content.content, "0123456789");
        assert_eq!(content.size, 10);
    }

    #[test]
    fn test_create_and_delete() {
        let dir = tempdir().unwrap();
        let fm = LocalFileManager::with_root(dir.path());
        let nested = dir.path().join("a/b/c.txt");

        fm.create_file(&nested, "x").unwrap();
        assert!(nested.exists());
        assert!(matches!(
            fm.create_file(&nested, "y"),
            Err(ShellError::AlreadyExists(_))
        ));

        let msg = fm.delete_path(&dir.path().join("a")).unwrap();
        assert!(msg.starts_with("Directory deleted"));
        assert!(!nested.exists());
        assert!(fm.delete_path(&nested).is_err());
    }

    #[test]
    fn test_change_directory_tracks_history() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("f"), "").unwrap();

        let mut fm = LocalFileManager::with_root(dir.path());
        fm.change_directory(&sub).unwrap();
        assert_eq!(fm.current_path(), sub.as_path());
        assert_eq!(fm.navigation_history(), &[dir.path().to_path_buf()]);

        assert!(matches!(
            fm.change_directory(&dir.path().join("f")),
            Err(ShellError::NotADirectory(_))
        ));
    }
}
