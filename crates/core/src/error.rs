use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no input found under prefix {0}")]
    NoInputFound(String),

    #[error("malformed input in {file}: {reason}")]
    MalformedInput { file: String, reason: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DigestError {
    pub fn malformed(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Self::Config(_) => ErrorKind::Config,
            Self::NoInputFound(_) => ErrorKind::NoInputFound,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    Config,
    NoInputFound,
    MalformedInput,
    StorageUnavailable,
    Internal,
}

pub type Result<T> = std::result::Result<T, DigestError>;
