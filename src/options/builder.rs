//! Two-phase option builder.
//!
//! Phase one accumulates explicit directives in the order they are given.
//! Phase two fills unset singleton kinds with defaults unless
//! `use-no-defaults` is set. The result is then validated into an
//! [`OptionCollection`].

use std::path::PathBuf;

use crate::response::MaintenanceResponse;

use super::{
    BaseDir, MaintenanceOption, OptionCollection, OptionError, OptionKind, OptionValue,
    PathMatchMode,
};

/// Builder accumulating option directives.
///
/// # Example
///
/// ```
/// use maintenance_gate::options::{OptionsBuilder, PathMatchMode};
///
/// let options = OptionsBuilder::new()
///     .use_default_response()
///     .retry_interval(120)
///     .bypass_path_prefix("/health", PathMatchMode::IgnoreCase)
///     .bypass_extension("css")
///     .bypass_role("Admin")
///     .build()
///     .unwrap();
///
/// assert_eq!(options.retry_interval(), 120);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    directives: Vec<OptionValue>,
}

impl OptionsBuilder {
    /// Retry interval filled in by the defaulting pass, in seconds.
    pub const DEFAULT_RETRY_INTERVAL_SECS: u32 = 5300;

    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-populated with option values, e.g. deserialized
    /// from a persisted collection.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = OptionValue>) -> Self {
        Self {
            directives: values.into_iter().collect(),
        }
    }

    /// Parses a JSON array of options, as written by
    /// [`OptionCollection::to_json`], into a builder.
    ///
    /// Entries that were defaulted are dropped so the defaulting pass can
    /// recompute them.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let options: Vec<MaintenanceOption> = serde_json::from_str(json)?;
        Ok(Self::from_values(
            options
                .into_iter()
                .filter(|o| !o.is_default)
                .map(|o| o.value),
        ))
    }

    /// Adds a raw directive.
    #[must_use]
    pub fn with(mut self, value: OptionValue) -> Self {
        self.directives.push(value);
        self
    }

    /// Serves the bundled HTML document.
    #[must_use]
    pub fn use_default_response(self) -> Self {
        self.with(OptionValue::UseDefaultResponse { enabled: true })
    }

    /// Serves the given in-memory response.
    #[must_use]
    pub fn use_response(self, response: MaintenanceResponse) -> Self {
        self.with(OptionValue::Response { response })
    }

    /// Serves the contents of a file, resolved against `base_dir`.
    #[must_use]
    pub fn use_response_file(self, path: impl Into<PathBuf>, base_dir: BaseDir) -> Self {
        self.with(OptionValue::ResponseFile {
            path: path.into(),
            base_dir,
        })
    }

    /// Sets the `Retry-After` interval in seconds.
    #[must_use]
    pub fn retry_interval(self, seconds: u32) -> Self {
        self.with(OptionValue::RetryInterval { seconds })
    }

    /// Bypasses requests under a path prefix.
    #[must_use]
    pub fn bypass_path_prefix(self, prefix: impl Into<String>, mode: PathMatchMode) -> Self {
        self.with(OptionValue::BypassPathPrefix {
            prefix: prefix.into(),
            mode,
        })
    }

    /// Bypasses requests for files with the given extension.
    #[must_use]
    pub fn bypass_extension(self, extension: impl Into<String>) -> Self {
        self.with(OptionValue::BypassExtension {
            extension: extension.into(),
        })
    }

    /// Bypasses every authenticated user.
    #[must_use]
    pub fn bypass_all_authenticated(self) -> Self {
        self.with(OptionValue::BypassAllAuthenticated { enabled: true })
    }

    /// Bypasses a user by exact name.
    #[must_use]
    pub fn bypass_username(self, username: impl Into<String>) -> Self {
        self.with(OptionValue::BypassUsername {
            username: username.into(),
        })
    }

    /// Bypasses users holding a role.
    #[must_use]
    pub fn bypass_role(self, role: impl Into<String>) -> Self {
        self.with(OptionValue::BypassRole { role: role.into() })
    }

    /// Disables the defaulting pass.
    #[must_use]
    pub fn use_no_defaults(self) -> Self {
        self.with(OptionValue::UseNoDefaults { enabled: true })
    }

    /// Number of directives collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Returns `true` if no directives were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Applies defaults and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No response source, or more than one, is configured
    /// - The retry interval is missing or zero
    /// - A singleton kind is configured more than once
    /// - A bypass rule has an empty or malformed value
    pub fn build(&self) -> Result<OptionCollection, OptionError> {
        let explicit: Vec<MaintenanceOption> = self
            .directives
            .iter()
            .cloned()
            .map(MaintenanceOption::explicit)
            .collect();

        validate(with_defaults(explicit))
    }
}

/// Appends defaults for unset singleton kinds, unless disabled.
fn with_defaults(options: Vec<MaintenanceOption>) -> Vec<MaintenanceOption> {
    let no_defaults = options
        .iter()
        .any(|o| matches!(o.value, OptionValue::UseNoDefaults { enabled: true }));
    if no_defaults {
        return options;
    }

    let has_kind = |kind: OptionKind| options.iter().any(|o| o.kind() == kind);

    let mut defaults = Vec::new();
    if !OptionKind::RESPONSE_SOURCES.into_iter().any(has_kind) {
        defaults.push(MaintenanceOption::defaulted(
            OptionValue::UseDefaultResponse { enabled: true },
        ));
    }
    if !has_kind(OptionKind::RetryInterval) {
        defaults.push(MaintenanceOption::defaulted(OptionValue::RetryInterval {
            seconds: OptionsBuilder::DEFAULT_RETRY_INTERVAL_SECS,
        }));
    }

    options.into_iter().chain(defaults).collect()
}

fn validate(options: Vec<MaintenanceOption>) -> Result<OptionCollection, OptionError> {
    for kind in OptionKind::ALL.into_iter().filter(|k| k.is_singleton()) {
        let count = options.iter().filter(|o| o.kind() == kind).count();
        if count > 1 {
            return Err(OptionError::DuplicateSingleton { kind, count });
        }
    }

    let sources: Vec<OptionKind> = options
        .iter()
        .filter(|o| o.value.is_response_source())
        .map(MaintenanceOption::kind)
        .collect();
    match sources.len() {
        0 => return Err(OptionError::NoResponseSource),
        1 => {}
        _ => return Err(OptionError::AmbiguousResponseSource { kinds: sources }),
    }

    for option in &options {
        validate_value(&option.value)?;
    }

    let retry_interval = options
        .iter()
        .find_map(|o| match o.value {
            OptionValue::RetryInterval { seconds } => Some(seconds),
            _ => None,
        })
        .ok_or(OptionError::MissingOption {
            kind: OptionKind::RetryInterval,
        })?;

    Ok(OptionCollection::from_validated(options, retry_interval))
}

fn validate_value(value: &OptionValue) -> Result<(), OptionError> {
    let invalid = |reason: &str| {
        Err(OptionError::InvalidValue {
            kind: value.kind(),
            reason: reason.to_string(),
        })
    };

    match value {
        OptionValue::RetryInterval { seconds: 0 } => invalid("must be greater than 0"),
        OptionValue::ResponseFile { path, .. } if path.as_os_str().is_empty() => {
            invalid("path must not be empty")
        }
        OptionValue::BypassPathPrefix { prefix, .. } if !prefix.starts_with('/') => {
            invalid("prefix must start with '/'")
        }
        OptionValue::BypassExtension { extension }
            if extension.trim_start_matches('.').is_empty() =>
        {
            invalid("extension must not be empty")
        }
        OptionValue::BypassUsername { username } if username.is_empty() => {
            invalid("username must not be empty")
        }
        OptionValue::BypassRole { role } if role.is_empty() => invalid("role must not be empty"),
        _ => Ok(()),
    }
}
