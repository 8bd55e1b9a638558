//! Option kinds and their typed values.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::response::MaintenanceResponse;

/// Discriminator for every configurable option.
///
/// The declaration order is the order used when options are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    /// Serve the bundled HTML document.
    UseDefaultResponse,
    /// Serve an in-memory response.
    Response,
    /// Serve a response loaded from a file.
    ResponseFile,
    /// Value of the `Retry-After` header, in seconds.
    RetryInterval,
    /// Bypass requests whose path starts with a prefix.
    BypassPathPrefix,
    /// Bypass requests whose path ends with a file extension.
    BypassExtension,
    /// Bypass every authenticated user.
    BypassAllAuthenticated,
    /// Bypass a specific user.
    BypassUsername,
    /// Bypass users holding a role.
    BypassRole,
    /// Disable the defaulting pass.
    UseNoDefaults,
}

impl OptionKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::UseDefaultResponse,
        Self::Response,
        Self::ResponseFile,
        Self::RetryInterval,
        Self::BypassPathPrefix,
        Self::BypassExtension,
        Self::BypassAllAuthenticated,
        Self::BypassUsername,
        Self::BypassRole,
        Self::UseNoDefaults,
    ];

    /// Kinds that select where the maintenance body comes from.
    pub const RESPONSE_SOURCES: [Self; 3] =
        [Self::UseDefaultResponse, Self::Response, Self::ResponseFile];

    /// Returns `true` if at most one option of this kind may be configured.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        !matches!(
            self,
            Self::BypassPathPrefix | Self::BypassExtension | Self::BypassUsername | Self::BypassRole
        )
    }

    /// Stable configuration name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UseDefaultResponse => "use-default-response",
            Self::Response => "response",
            Self::ResponseFile => "response-file",
            Self::RetryInterval => "retry-interval",
            Self::BypassPathPrefix => "bypass-path-prefix",
            Self::BypassExtension => "bypass-extension",
            Self::BypassAllAuthenticated => "bypass-all-authenticated",
            Self::BypassUsername => "bypass-username",
            Self::BypassRole => "bypass-role",
            Self::UseNoDefaults => "use-no-defaults",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a path prefix is compared against the request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMatchMode {
    /// Byte-exact comparison.
    CaseSensitive,
    /// ASCII case-insensitive comparison.
    #[default]
    IgnoreCase,
}

/// Directory a relative response file path is joined onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseDir {
    /// The hosting environment's web root.
    WebRoot,
    /// The hosting environment's content root.
    ContentRoot,
    /// Use the configured path as-is.
    #[default]
    None,
}

impl fmt::Display for BaseDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebRoot => write!(f, "web-root"),
            Self::ContentRoot => write!(f, "content-root"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Typed value of an option, one arm per [`OptionKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptionValue {
    /// See [`OptionKind::UseDefaultResponse`].
    UseDefaultResponse {
        /// Whether the bundled document is selected.
        enabled: bool,
    },
    /// See [`OptionKind::Response`].
    Response {
        /// The fully formed response.
        response: MaintenanceResponse,
    },
    /// See [`OptionKind::ResponseFile`].
    ResponseFile {
        /// Configured (possibly relative) path.
        path: PathBuf,
        /// Directory the path is relative to.
        #[serde(default)]
        base_dir: BaseDir,
    },
    /// See [`OptionKind::RetryInterval`].
    RetryInterval {
        /// Seconds.
        seconds: u32,
    },
    /// See [`OptionKind::BypassPathPrefix`].
    BypassPathPrefix {
        /// Path prefix, e.g. `/admin`.
        prefix: String,
        /// Comparison mode.
        #[serde(default)]
        mode: PathMatchMode,
    },
    /// See [`OptionKind::BypassExtension`].
    BypassExtension {
        /// Extension with or without the leading dot.
        extension: String,
    },
    /// See [`OptionKind::BypassAllAuthenticated`].
    BypassAllAuthenticated {
        /// Whether authenticated users bypass.
        enabled: bool,
    },
    /// See [`OptionKind::BypassUsername`].
    BypassUsername {
        /// Exact user name.
        username: String,
    },
    /// See [`OptionKind::BypassRole`].
    BypassRole {
        /// Role name.
        role: String,
    },
    /// See [`OptionKind::UseNoDefaults`].
    UseNoDefaults {
        /// Whether the defaulting pass is skipped.
        enabled: bool,
    },
}

impl OptionValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        match self {
            Self::UseDefaultResponse { .. } => OptionKind::UseDefaultResponse,
            Self::Response { .. } => OptionKind::Response,
            Self::ResponseFile { .. } => OptionKind::ResponseFile,
            Self::RetryInterval { .. } => OptionKind::RetryInterval,
            Self::BypassPathPrefix { .. } => OptionKind::BypassPathPrefix,
            Self::BypassExtension { .. } => OptionKind::BypassExtension,
            Self::BypassAllAuthenticated { .. } => OptionKind::BypassAllAuthenticated,
            Self::BypassUsername { .. } => OptionKind::BypassUsername,
            Self::BypassRole { .. } => OptionKind::BypassRole,
            Self::UseNoDefaults { .. } => OptionKind::UseNoDefaults,
        }
    }

    /// Returns `true` if this value selects a maintenance response body.
    ///
    /// `UseDefaultResponse { enabled: false }` selects nothing.
    #[must_use]
    pub const fn is_response_source(&self) -> bool {
        match self {
            Self::UseDefaultResponse { enabled } => *enabled,
            Self::Response { .. } | Self::ResponseFile { .. } => true,
            _ => false,
        }
    }
}

/// A stored option: its value plus whether it was filled in by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceOption {
    /// The typed value.
    #[serde(flatten)]
    pub value: OptionValue,

    /// `true` if the defaulting pass inserted this option.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

impl MaintenanceOption {
    /// Creates an explicitly configured option.
    #[must_use]
    pub const fn explicit(value: OptionValue) -> Self {
        Self {
            value,
            is_default: false,
        }
    }

    /// Creates an option inserted by the defaulting pass.
    #[must_use]
    pub const fn defaulted(value: OptionValue) -> Self {
        Self {
            value,
            is_default: true,
        }
    }

    /// Returns the kind of this option.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.value.kind()
    }
}
