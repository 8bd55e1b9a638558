//! Maintenance response resolution.
//!
//! The body served while maintenance mode is on is resolved exactly once, at
//! startup, from one of three sources:
//! - the bundled HTML document ([`DEFAULT_DOCUMENT`])
//! - an explicit in-memory [`MaintenanceResponse`]
//! - a file, resolved against the [`HostingEnvironment`]
//!
//! The resolved response is immutable and shared for the lifetime of the
//! process; no request ever touches the disk.

mod encoding;
mod error;
mod resolver;


use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use encoding::TextEncoding;
pub use error::ResponseError;
pub use resolver::{DEFAULT_DOCUMENT, resolve};

/// Media type of the maintenance body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// `text/html`
    #[default]
    Html,
    /// `text/plain`
    Text,
    /// `application/json`
    Json,
}

impl ContentType {
    /// Value of the `Content-Type` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Text => "text/plain",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed maintenance body.
///
/// `bytes` are already encoded in `encoding` and never carry a byte-order mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    /// Media type of the body.
    pub content_type: ContentType,
    /// Encoding of `bytes`.
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Encoded body.
    pub bytes: Vec<u8>,
}

impl MaintenanceResponse {
    /// Creates a response from already encoded bytes.
    #[must_use]
    pub const fn new(content_type: ContentType, encoding: TextEncoding, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            encoding,
            bytes,
        }
    }

    /// Creates a response by encoding `text` with `encoding`.
    #[must_use]
    pub fn from_text(content_type: ContentType, encoding: TextEncoding, text: &str) -> Self {
        Self::new(content_type, encoding, encoding.encode(text))
    }

    /// Creates a UTF-8 HTML response.
    #[must_use]
    pub fn html(text: &str) -> Self {
        Self::from_text(ContentType::Html, TextEncoding::Utf8, text)
    }

    /// Creates a UTF-8 plain-text response.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::from_text(ContentType::Text, TextEncoding::Utf8, text)
    }

    /// Creates a UTF-8 JSON response.
    #[must_use]
    pub fn json(text: &str) -> Self {
        Self::from_text(ContentType::Json, TextEncoding::Utf8, text)
    }

    /// Decodes the body back into text.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.encoding.decode(&self.bytes)
    }
}

/// Paths exposed by the hosting environment.
///
/// Only used to resolve a relative response file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingEnvironment {
    /// Root of static web assets.
    pub web_root: PathBuf,
    /// Root of the application content.
    pub content_root: PathBuf,
}

impl HostingEnvironment {
    /// Creates a hosting environment.
    #[must_use]
    pub fn new(web_root: impl Into<PathBuf>, content_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
            content_root: content_root.into(),
        }
    }

    /// Returns the web root path.
    #[must_use]
    pub fn web_root_path(&self) -> &Path {
        &self.web_root
    }

    /// Returns the content root path.
    #[must_use]
    pub fn content_root_path(&self) -> &Path {
        &self.content_root
    }
}
