//! Drive - where generated documents are published
//!
//! A [`DriveClient`] stores files in folders and hands out shareable links.
//! [`LocalDrive`] implements it over a local directory, typically one kept
//! in sync by a desktop drive client. [`DrivePublisher`] plugs a client into
//! a merge run as its output sink, optionally adding a PDF copy of every
//! document through a [`PdfConverter`].
//!
//! Requests are authorised with a bearer token held by a [`Session`], which
//! refreshes it through its [`TokenSource`] shortly before it expires.

mod client;
mod convert;
mod error;
mod local;
mod publisher;
mod session;

pub use client::{join_folder, DriveClient, DriveItem};
pub use convert::{pdf_name, PdfConverter, SofficeConverter};
pub use error::{DriveError, Result};
pub use local::LocalDrive;
pub use publisher::{DrivePublisher, DEFAULT_ROOT_FOLDER};
pub use session::{AccessToken, NoAuth, Session, TokenSource, DEFAULT_REFRESH_MARGIN_SECS};
