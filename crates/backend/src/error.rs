use thiserror::Error;

/// Errors raised while talking to the backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The bin channel has no message (or no media) under this id
    #[error("file not found for message {message_id}")]
    NotFound { message_id: i32 },

    /// Telegram Bot API error
    #[error("telegram error: {0}")]
    Request(#[from] teloxide::RequestError),

    /// Transport error while downloading file bytes
    #[error("download error: {0}")]
    Http(#[from] reqwest::Error),

    /// The file endpoint answered with an unexpected status
    #[error("unexpected download status {status}")]
    Status { status: u16 },

    /// Fewer bytes came back than were requested
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// The backend call did not finish in time
    #[error("backend call timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl BackendError {
    /// Whether this error means the requested file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
