//! PDF conversion

use crate::error::{DriveError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Turns a `.docx` document into PDF bytes
pub trait PdfConverter {
    fn convert_to_pdf(&mut self, file_name: &str, docx: &[u8]) -> Result<Vec<u8>>;
}

/// `Comunicado_2025_900.docx` -> `Comunicado_2025_900.pdf`
pub fn pdf_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    format!("{}.pdf", stem)
}

/// Converts through an office suite running headless
/// (`soffice --headless --convert-to pdf`)
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: PathBuf,
}

impl SofficeConverter {
    pub fn new() -> Self {
        Self::with_program("soffice")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter for SofficeConverter {
    fn convert_to_pdf(&mut self, file_name: &str, docx: &[u8]) -> Result<Vec<u8>> {
        crate::client::check_file_name(file_name)?;
        let work = tempfile::tempdir()?;
        let input = work.path().join(file_name);
        std::fs::write(&input, docx)?;

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(work.path())
            .arg(&input)
            .output()
            .map_err(|e| {
                DriveError::Conversion(format!("cannot run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            return Err(DriveError::Conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pdf = work.path().join(pdf_name(file_name));
        debug!(file = %pdf.display(), "converted to pdf");
        std::fs::read(&pdf).map_err(|e| {
            DriveError::Conversion(format!("no pdf produced for {}: {}", file_name, e))
        })
    }
}
