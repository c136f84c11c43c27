//! Error types for drive operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    /// IO error reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No valid token could be obtained
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Item does not exist on the drive
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Folder or file name that cannot be stored
    #[error("Invalid drive path: {0}")]
    InvalidPath(String),

    /// Writing the local copy of a document failed
    #[error("Local copy failed: {0}")]
    LocalCopy(String),

    /// PDF conversion failed
    #[error("Conversion failed: {0}")]
    Conversion(String),
}

/// Result type for drive operations
pub type Result<T> = std::result::Result<T, DriveError>;
