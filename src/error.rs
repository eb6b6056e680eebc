use thiserror::Error;

/// Fall tracker error types
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("No input file selected")]
    MissingFile,

    #[error("A file is already being processed")]
    LoadInProgress,

    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    #[error("No emergency contact phone configured")]
    MissingContact,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Dial failed: {0}")]
    Dial(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}
