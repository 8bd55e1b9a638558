//! Error types for response resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::OptionError;

/// Error type for resolving the maintenance response.
///
/// All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The options do not select a response.
    #[error(transparent)]
    Options(#[from] OptionError),

    /// The configured response file does not exist.
    #[error(
        "Maintenance response file '{}' does not exist (resolved to '{}')",
        configured.display(),
        resolved.display()
    )]
    FileNotFound {
        /// Path as configured
        configured: PathBuf,
        /// Absolute path after joining the base directory
        resolved: PathBuf,
    },

    /// The response file exists but could not be read.
    #[error("Failed to read maintenance response file '{}': {source}", path.display())]
    FileRead {
        /// Absolute path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The response file starts with a byte-order mark for an unsupported encoding.
    #[error("Maintenance response file '{}' is {encoding}, which is not supported", path.display())]
    UnsupportedEncoding {
        /// Absolute path of the file
        path: PathBuf,
        /// Encoding named by the byte-order mark
        encoding: &'static str,
    },

    /// The bundled default document is missing from the build.
    #[error("Bundled default maintenance document is missing or empty")]
    MissingBundledDocument,
}
