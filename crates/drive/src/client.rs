//! Drive client interface

use crate::error::{DriveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// A file stored on a drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveItem {
    /// Drive path, `/`-separated, relative to the drive root
    pub path: String,
    pub name: String,
    pub size: u64,
}

/// Folder and file operations against a drive.
///
/// Every call carries the bearer token of the caller's session; drives that
/// need no authorisation ignore it.
pub trait DriveClient {
    /// Create `folder` and any missing parents
    fn ensure_folder(&mut self, token: &str, folder: &str) -> Result<()>;

    /// Store `bytes` as `folder/name`, replacing an existing file
    fn upload(&mut self, token: &str, folder: &str, name: &str, bytes: &[u8]) -> Result<DriveItem>;

    /// Shareable link to an uploaded item
    fn share_link(&mut self, token: &str, item: &DriveItem) -> Result<String>;
}

/// Join a drive folder and a local relative path into one `/`-separated
/// drive path. Absolute paths and `..` components are rejected.
pub fn join_folder(base: &str, relative: &Path) -> Result<String> {
    let mut parts: Vec<String> = base
        .split(['/', '\\'])
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                parts.extend(part.split('\\').filter(|p| !p.is_empty()).map(str::to_string));
            }
            Component::CurDir => {}
            _ => {
                return Err(DriveError::InvalidPath(relative.display().to_string()));
            }
        }
    }

    if parts.iter().any(|p| p == "..") {
        return Err(DriveError::InvalidPath(format!("{}/{}", base, relative.display())));
    }
    Ok(parts.join("/"))
}

/// Reject names that would escape their folder
pub(crate) fn check_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DriveError::InvalidPath(name.to_string()));
    }
    Ok(())
}
