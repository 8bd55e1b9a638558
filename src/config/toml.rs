//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Maintenance switch and retry settings
    #[serde(default)]
    pub maintenance: MaintenanceSection,

    /// Maintenance response source
    #[serde(default)]
    pub response: ResponseSection,

    /// Hosting environment paths
    #[serde(default)]
    pub hosting: HostingSection,

    /// Bypass rules
    #[serde(default)]
    pub bypass: BypassSection,

    /// Demo server settings
    #[serde(default)]
    pub server: ServerSection,
}

/// Maintenance configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaintenanceSection {
    /// Start with maintenance mode on
    #[serde(default)]
    pub enabled: bool,

    /// `Retry-After` value in seconds
    pub retry_interval: Option<u32>,

    /// Disable filling unset options with defaults
    #[serde(default)]
    pub use_no_defaults: bool,
}

/// Response configuration section.
///
/// At most one of `use_default`, `file`, and `body` should be set.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseSection {
    /// Serve the bundled default document
    pub use_default: Option<bool>,

    /// Path to a response file
    pub file: Option<PathBuf>,

    /// Directory `file` is relative to: "web-root", "content-root", or "none"
    pub base_dir: Option<String>,

    /// Inline response body
    pub body: Option<String>,

    /// Content type of `body`: "html", "text", or "json"
    pub content_type: Option<String>,
}

/// Hosting environment section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostingSection {
    /// Web root directory
    pub web_root: Option<PathBuf>,

    /// Content root directory
    pub content_root: Option<PathBuf>,
}

/// A path prefix rule, either a bare prefix or a table with a case mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathRule {
    /// Bare prefix, compared case-insensitively.
    Prefix(String),
    /// Prefix with an explicit case mode.
    Detailed {
        /// Path prefix
        prefix: String,
        /// Compare case-sensitively
        #[serde(default)]
        case_sensitive: bool,
    },
}

/// Bypass rules section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BypassSection {
    /// Path prefixes
    #[serde(default)]
    pub paths: Vec<PathRule>,

    /// File extensions
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Exact user names
    #[serde(default)]
    pub usernames: Vec<String>,

    /// Roles
    #[serde(default)]
    pub roles: Vec<String>,

    /// Let every authenticated user through
    #[serde(default)]
    pub all_authenticated: bool,
}

/// Demo server section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Socket address to listen on
    pub listen: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# maintenance-gate configuration file

[maintenance]
# Start with maintenance mode on
enabled = true

# Retry-After header value in seconds (default: 5300)
retry_interval = 300

# Do not fill unset options with defaults
# use_no_defaults = false

[response]
# Pick exactly one source. Without any, the bundled page is served.

# Serve the bundled maintenance page
use_default = true

# Serve a file; ".txt" files are sent as text/plain, others as text/html.
# A UTF-8 or UTF-16 byte-order mark selects the encoding.
# file = "maintenance.html"
# base_dir = "web-root"        # "web-root", "content-root", or "none"

# Serve an inline body
# body = '{"status": "maintenance"}'
# content_type = "json"        # "html", "text", or "json"

[hosting]
# web_root = "wwwroot"
# content_root = "."

[bypass]
# Path prefixes; plain strings compare case-insensitively
# Note: CLI values REPLACE these lists entirely (not merged)
paths = ["/health"]
# paths = ["/health", { prefix = "/Admin", case_sensitive = true }]

# File extensions (with or without the leading dot)
extensions = ["css", "js"]

# Exact user names and roles, as provided by your authentication layer
# usernames = ["admin"]
# roles = ["Admin"]

# Let every authenticated user through
# all_authenticated = false

[server]
# listen = "127.0.0.1:8080"
"#
    .to_string()
}
