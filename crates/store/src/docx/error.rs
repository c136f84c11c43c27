//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while loading or saving a DOCX package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error in {part}: {message}")]
    XmlParse { part: String, message: String },

    /// Invalid DOCX structure
    #[error("Invalid DOCX structure: {0}")]
    InvalidStructure(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Relationship error
    #[error("Relationship error: {0}")]
    RelationshipError(String),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error in {0}")]
    Utf8(String),
}

impl DocxError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        DocxError::XmlParse {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::xml("<unknown>", err)
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::xml("<unknown>", format!("attribute error: {}", err))
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
