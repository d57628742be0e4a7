use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChangelogError>;

#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Malformed changelog document: {0}")]
    MalformedDocument(String),
    #[error("SCM backend failure: {message}")]
    Backend { message: String },
    #[error("{0}")]
    InvalidConfig(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChangelogError {
    pub fn malformed(position: usize, message: impl std::fmt::Display) -> Self {
        ChangelogError::MalformedDocument(format!("at byte {position}: {message}"))
    }
}
