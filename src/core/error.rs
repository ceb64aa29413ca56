use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Path does not exist")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory")]
    NotADirectory(PathBuf),

    #[error("Path is a directory")]
    IsADirectory(PathBuf),

    #[error("File already exists")]
    AlreadyExists(PathBuf),

    #[error("File too large to read")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("System error: {0}")]
    System(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
