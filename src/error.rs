use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a listing fetch, recursive or not.
///
/// This is the only error the selection core produces. Every variant is
/// per-operation: re-issuing the user action retries it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The requested path does not exist in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend could not read the path.
    #[error("cannot list {path}: {reason}")]
    Io { path: String, reason: String },

    /// A listing payload could not be decoded.
    #[error("malformed listing: {0}")]
    Malformed(String),

    /// The fetch task ended without producing a listing.
    #[error("listing failed: {0}")]
    Failed(String),
}

impl ListingError {
    /// Build an `Io` variant from a std error, keeping only its message so the
    /// error stays `Clone`.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return ListingError::NotFound(path.into());
        }
        ListingError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from terminal or file access.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration or snapshot could not be used.
    #[error("Config error: {0}")]
    Config(String),

    /// The log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// The confirmed selection could not be written out as JSON.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A listing fetch failed outside of an interactive action.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),
}
