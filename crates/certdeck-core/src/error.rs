use thiserror::Error;

/// Result type alias for core conversions.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when converting strings into core types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Folder action is not one of read/write/delete
    #[error("unknown folder action: {0}")]
    UnknownAction(String),

    /// Status string is not VALID/EXPIRING_SOON/EXPIRED
    #[error("unknown certificate status: {0}")]
    UnknownStatus(String),

    /// Folder type is not system/custom
    #[error("unknown folder type: {0}")]
    UnknownFolderType(String),
}
