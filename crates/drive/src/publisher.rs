//! Output sink that publishes generated documents to a drive

use crate::client::{join_folder, DriveClient, DriveItem};
use crate::convert::{pdf_name, PdfConverter};
use crate::error::{DriveError, Result};
use crate::session::{NoAuth, Session, TokenSource};
use mail_merge::{DirectorySink, GeneratedDocument, MailMergeError, OutputLocation, OutputSink};
use std::path::PathBuf;
use tracing::{info, warn};

/// Folder on the drive that per-kind folders are created under
pub const DEFAULT_ROOT_FOLDER: &str = "Documentos_Generados";

/// Publishes every generated document to a drive.
///
/// A document lands in `<root folder>/<kind folder>/<client id>/` on the
/// drive. With a local copy configured it is written there first. With a
/// converter configured a PDF copy is uploaded next to it; a failed
/// conversion is logged and leaves the PDF link empty.
pub struct DrivePublisher<C: DriveClient, S: TokenSource = NoAuth> {
    client: C,
    session: Session<S>,
    root_folder: String,
    local_copy: Option<DirectorySink>,
    converter: Option<Box<dyn PdfConverter>>,
}

impl<C: DriveClient> DrivePublisher<C, NoAuth> {
    pub fn new(client: C) -> Self {
        Self::with_session(client, Session::new(NoAuth))
    }
}

impl<C: DriveClient, S: TokenSource> DrivePublisher<C, S> {
    pub fn with_session(client: C, session: Session<S>) -> Self {
        Self {
            client,
            session,
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            local_copy: None,
            converter: None,
        }
    }

    pub fn with_root_folder(mut self, folder: impl Into<String>) -> Self {
        self.root_folder = folder.into();
        self
    }

    /// Also write each document under a local directory
    pub fn with_local_copy(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_copy = Some(DirectorySink::new(root));
        self
    }

    pub fn with_converter(mut self, converter: impl PdfConverter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Publish one document and return where it went
    pub fn publish(&mut self, document: &GeneratedDocument) -> Result<OutputLocation> {
        let local_path = match self.local_copy.as_mut() {
            Some(sink) => Some(
                sink.deliver(document)
                    .map_err(|e| DriveError::LocalCopy(e.to_string()))?
                    .path,
            ),
            None => None,
        };

        let folder = join_folder(&self.root_folder, &document.folder)?;
        self.authorized(|client, token| client.ensure_folder(token, &folder))?;
        let item = self.authorized(|client, token| {
            client.upload(token, &folder, &document.file_name, &document.bytes)
        })?;
        let url = self.authorized(|client, token| client.share_link(token, &item))?;
        info!(client_id = %document.client_id, path = %item.path, "published document");

        let pdf_url = if self.converter.is_some() {
            match self.publish_pdf(document, &folder) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(client_id = %document.client_id, "PDF copy failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(OutputLocation {
            path: local_path.unwrap_or_else(|| PathBuf::from(&item.path)),
            url: Some(url),
            pdf_url,
        })
    }

    fn publish_pdf(&mut self, document: &GeneratedDocument, folder: &str) -> Result<String> {
        let Some(converter) = self.converter.as_mut() else {
            return Err(DriveError::Conversion("no converter configured".to_string()));
        };
        let pdf = converter.convert_to_pdf(&document.file_name, &document.bytes)?;
        let name = pdf_name(&document.file_name);
        let item: DriveItem = self.authorized(|client, token| client.upload(token, folder, &name, &pdf))?;
        self.authorized(|client, token| client.share_link(token, &item))
    }

    /// Run a drive call with the session's token, retrying once with a
    /// fresh token when the drive rejects it
    fn authorized<T>(&mut self, mut call: impl FnMut(&mut C, &str) -> Result<T>) -> Result<T> {
        let token = self.session.bearer()?.to_string();
        match call(&mut self.client, &token) {
            Err(DriveError::Auth(reason)) => {
                warn!("drive rejected token, refreshing: {}", reason);
                self.session.invalidate();
                let token = self.session.bearer()?.to_string();
                call(&mut self.client, &token)
            }
            other => other,
        }
    }
}

impl<C: DriveClient, S: TokenSource> OutputSink for DrivePublisher<C, S> {
    fn deliver(&mut self, document: &GeneratedDocument) -> mail_merge::Result<OutputLocation> {
        self.publish(document)
            .map_err(|e| MailMergeError::Output(format!("{}: {}", document.file_name, e)))
    }
}
