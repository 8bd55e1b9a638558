//! Selects and loads the maintenance response.

use std::path::{Path, PathBuf};

use crate::options::{BaseDir, OptionCollection, OptionError, OptionValue};

use super::{ContentType, HostingEnvironment, MaintenanceResponse, ResponseError, TextEncoding};

/// Bundled HTML document served when `use-default-response` is selected.
pub const DEFAULT_DOCUMENT: &str = include_str!("default.html");

/// Resolves the maintenance response selected by `options`.
///
/// Reads the response file, if one is configured; call this once at startup
/// and share the result.
///
/// # Errors
///
/// Returns an error if:
/// - No response source is selected
/// - The response file does not exist or cannot be read
/// - The bundled document is empty
pub fn resolve(
    options: &OptionCollection,
    env: &HostingEnvironment,
) -> Result<MaintenanceResponse, ResponseError> {
    match options.response_source() {
        Some(OptionValue::UseDefaultResponse { .. }) => default_response(),
        Some(OptionValue::Response { response }) => {
            tracing::debug!(
                content_type = %response.content_type,
                "Using explicit maintenance response"
            );
            Ok(response.clone())
        }
        Some(OptionValue::ResponseFile { path, base_dir }) => read_response_file(path, *base_dir, env),
        _ => Err(OptionError::NoResponseSource.into()),
    }
}

fn default_response() -> Result<MaintenanceResponse, ResponseError> {
    if DEFAULT_DOCUMENT.trim().is_empty() {
        return Err(ResponseError::MissingBundledDocument);
    }

    tracing::debug!("Using bundled default maintenance document");
    Ok(MaintenanceResponse::html(DEFAULT_DOCUMENT))
}

fn read_response_file(
    configured: &Path,
    base_dir: BaseDir,
    env: &HostingEnvironment,
) -> Result<MaintenanceResponse, ResponseError> {
    let resolved = resolve_path(configured, base_dir, env);

    if !resolved.is_file() {
        return Err(ResponseError::FileNotFound {
            configured: configured.to_path_buf(),
            resolved,
        });
    }

    let raw = std::fs::read(&resolved).map_err(|e| ResponseError::FileRead {
        path: resolved.clone(),
        source: e,
    })?;

    if let Some(encoding) = TextEncoding::unsupported_bom(&raw) {
        return Err(ResponseError::UnsupportedEncoding {
            path: resolved,
            encoding,
        });
    }

    let (encoding, content) = TextEncoding::detect(&raw);
    let content_type = content_type_for(&resolved);

    tracing::debug!(
        path = %resolved.display(),
        %encoding,
        %content_type,
        "Loaded maintenance response file"
    );

    Ok(MaintenanceResponse::new(content_type, encoding, content.to_vec()))
}

/// Joins `configured` onto the base directory and makes it absolute.
///
/// Falls back to the joined path if the current directory is unavailable.
pub(super) fn resolve_path(configured: &Path, base_dir: BaseDir, env: &HostingEnvironment) -> PathBuf {
    let joined = match base_dir {
        BaseDir::WebRoot => env.web_root_path().join(configured),
        BaseDir::ContentRoot => env.content_root_path().join(configured),
        BaseDir::None => configured.to_path_buf(),
    };

    std::path::absolute(&joined).unwrap_or(joined)
}

fn content_type_for(path: &Path) -> ContentType {
    let is_txt = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    if is_txt {
        ContentType::Text
    } else {
        ContentType::Html
    }
}
