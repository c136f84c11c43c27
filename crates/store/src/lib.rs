//! Store - template packages and settings
//!
//! This crate loads `.docx` templates into the document model and writes
//! them back without disturbing anything the merge did not touch, and
//! persists the JSON settings that describe each document kind.

mod error;
mod settings;
pub mod docx;

pub use error::*;
pub use settings::*;

pub use docx::{DocxError, DocxResult, DocxTemplate};
