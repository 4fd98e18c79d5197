use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status} from {url}")]
    StatusError { url: String, status: u16 },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ViewerError {
    /// True for failures of a single poll that the next tick may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ViewerError::NetworkError(_) | ViewerError::StatusError { .. } | ViewerError::DecodeError(_)
        )
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ViewerError::DecodeError(err.to_string())
        } else {
            ViewerError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::DecodeError(err.to_string())
    }
}
