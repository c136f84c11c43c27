//! Drive backed by a local directory

use crate::client::{check_file_name, DriveClient, DriveItem};
use crate::error::{DriveError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A drive rooted at a local folder, usually one kept in sync by a desktop
/// drive client. Share links are `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalDrive {
    root: PathBuf,
}

impl LocalDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path of a drive path
    pub fn local_path(&self, drive_path: &str) -> PathBuf {
        drive_path
            .split('/')
            .filter(|p| !p.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl DriveClient for LocalDrive {
    fn ensure_folder(&mut self, _token: &str, folder: &str) -> Result<()> {
        let dir = self.local_path(folder);
        std::fs::create_dir_all(&dir)?;
        Ok(())
    }

    fn upload(&mut self, _token: &str, folder: &str, name: &str, bytes: &[u8]) -> Result<DriveItem> {
        check_file_name(name)?;
        let dir = self.local_path(folder);
        if !dir.is_dir() {
            return Err(DriveError::NotFound(folder.to_string()));
        }
        std::fs::write(dir.join(name), bytes)?;
        debug!(folder, name, size = bytes.len(), "stored file on local drive");

        let path = if folder.trim_matches('/').is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", folder.trim_matches('/'), name)
        };
        Ok(DriveItem {
            path,
            name: name.to_string(),
            size: bytes.len() as u64,
        })
    }

    fn share_link(&mut self, _token: &str, item: &DriveItem) -> Result<String> {
        let path = self.local_path(&item.path);
        if !path.is_file() {
            return Err(DriveError::NotFound(item.path.clone()));
        }
        let absolute = std::fs::canonicalize(&path)?;
        Ok(file_url(&absolute))
    }
}

/// `file://` URL of an absolute path, each segment percent-encoded
fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let encoded: Vec<String> = text
        .split('/')
        .map(|segment| {
            // Keep drive letters like `C:` readable
            if segment.len() == 2 && segment.ends_with(':') {
                segment.to_string()
            } else {
                urlencoding::encode(segment).into_owned()
            }
        })
        .collect();
    let joined = encoded.join("/");
    if joined.starts_with('/') {
        format!("file://{}", joined)
    } else {
        format!("file:///{}", joined)
    }
}
