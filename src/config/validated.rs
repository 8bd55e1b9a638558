//! Validated configuration after merging CLI and TOML sources.
//!
//! This module turns the raw configuration into the inputs of the gate: an
//! [`OptionsBuilder`] holding every directive, and a [`HostingEnvironment`].
//! Semantic validation of the options (response source, retry interval)
//! happens when the builder is built, so library users and the CLI share it.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::options::{BaseDir, OptionValue, OptionsBuilder, PathMatchMode};
use crate::response::{ContentType, HostingEnvironment, MaintenanceResponse, TextEncoding};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::{PathRule, TomlConfig};

/// Fully merged configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Option directives for the gate
    pub options: OptionsBuilder,

    /// Paths used to resolve a relative response file
    pub hosting: HostingEnvironment,

    /// Whether maintenance mode starts on
    pub enabled: bool,

    /// Address of the demo server
    pub listen: SocketAddr,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ enabled: {}, directives: {}, web_root: {}, content_root: {}, listen: {} }}",
            self.enabled,
            self.options.len(),
            self.hosting.web_root.display(),
            self.hosting.content_root.display(),
            self.listen,
        )
    }
}

impl ValidatedConfig {
    /// Creates a configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base directory or content type is unknown
    /// - An inline content type is given without a body
    /// - The listen address is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let mut options = OptionsBuilder::new();

        // Flags only enable, never disable
        if cli.no_defaults || toml.is_some_and(|t| t.maintenance.use_no_defaults) {
            options = options.use_no_defaults();
        }

        options = Self::add_response_source(options, cli, toml)?;

        // Priority: CLI explicit > TOML; the builder supplies the default
        if let Some(seconds) = cli
            .retry_interval
            .or_else(|| toml.and_then(|t| t.maintenance.retry_interval))
        {
            options = options.retry_interval(seconds);
        }

        options = Self::add_bypass_rules(options, cli, toml);

        let hosting = Self::resolve_hosting(cli, toml);
        let listen = Self::resolve_listen(cli, toml)?;

        Ok(Self {
            options,
            hosting,
            enabled: cli.enabled || toml.is_some_and(|t| t.maintenance.enabled),
            listen,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Adds the response source.
    ///
    /// A source given on the CLI replaces every TOML source. TOML sources are
    /// passed through as-is so that ambiguity is reported by the builder.
    fn add_response_source(
        mut options: OptionsBuilder,
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<OptionsBuilder, ConfigError> {
        let toml_base_dir = toml
            .and_then(|t| t.response.base_dir.as_deref())
            .map(parse_base_dir)
            .transpose()?;
        let base_dir = cli
            .base_dir
            .map(BaseDir::from)
            .or(toml_base_dir)
            .unwrap_or_default();

        if cli.default_response || cli.response_file.is_some() {
            if cli.default_response {
                options = options.use_default_response();
            }
            if let Some(ref path) = cli.response_file {
                options = options.use_response_file(path, base_dir);
            }
            return Ok(options);
        }

        let Some(section) = toml.map(|t| &t.response) else {
            return Ok(options);
        };

        if let Some(use_default) = section.use_default {
            options = options.with(OptionValue::UseDefaultResponse {
                enabled: use_default,
            });
        }
        if let Some(ref path) = section.file {
            options = options.use_response_file(path, base_dir);
        }
        match (&section.body, &section.content_type) {
            (Some(body), content_type) => {
                let content_type = content_type
                    .as_deref()
                    .map_or(Ok(ContentType::Html), parse_content_type)?;
                options = options.use_response(MaintenanceResponse::from_text(
                    content_type,
                    TextEncoding::Utf8,
                    body,
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidResponse(
                    "content_type is set but body is missing".to_string(),
                ));
            }
            (None, None) => {}
        }

        Ok(options)
    }

    /// Adds bypass rules. Each CLI list replaces the matching TOML list.
    fn add_bypass_rules(
        mut options: OptionsBuilder,
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> OptionsBuilder {
        let bypass = toml.map(|t| &t.bypass);

        if cli.bypass_paths.is_empty() {
            for rule in bypass.map(|b| b.paths.as_slice()).unwrap_or_default() {
                let (prefix, mode) = match rule {
                    PathRule::Prefix(prefix) => (prefix, PathMatchMode::IgnoreCase),
                    PathRule::Detailed {
                        prefix,
                        case_sensitive,
                    } => (
                        prefix,
                        if *case_sensitive {
                            PathMatchMode::CaseSensitive
                        } else {
                            PathMatchMode::IgnoreCase
                        },
                    ),
                };
                options = options.bypass_path_prefix(prefix.as_str(), mode);
            }
        } else {
            for prefix in &cli.bypass_paths {
                options = options.bypass_path_prefix(prefix.as_str(), PathMatchMode::IgnoreCase);
            }
        }

        let extensions = pick_list(&cli.bypass_extensions, bypass.map(|b| b.extensions.as_slice()));
        for extension in extensions {
            options = options.bypass_extension(extension.as_str());
        }

        if cli.bypass_authenticated || bypass.is_some_and(|b| b.all_authenticated) {
            options = options.bypass_all_authenticated();
        }

        let usernames = pick_list(&cli.bypass_users, bypass.map(|b| b.usernames.as_slice()));
        for username in usernames {
            options = options.bypass_username(username.as_str());
        }

        let roles = pick_list(&cli.bypass_roles, bypass.map(|b| b.roles.as_slice()));
        for role in roles {
            options = options.bypass_role(role.as_str());
        }

        options
    }

    fn resolve_hosting(cli: &Cli, toml: Option<&TomlConfig>) -> HostingEnvironment {
        let web_root = resolve_dir(
            cli.web_root.as_deref(),
            toml.and_then(|t| t.hosting.web_root.as_deref()),
            defaults::WEB_ROOT,
        );
        let content_root = resolve_dir(
            cli.content_root.as_deref(),
            toml.and_then(|t| t.hosting.content_root.as_deref()),
            defaults::CONTENT_ROOT,
        );

        HostingEnvironment::new(web_root, content_root)
    }

    fn resolve_listen(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SocketAddr, ConfigError> {
        let Some(addr) = cli
            .listen
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.listen.as_deref()))
        else {
            return Ok(defaults::listen());
        };

        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListenAddress {
                value: addr.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

/// CLI list if non-empty, otherwise the TOML list.
fn pick_list<'a>(cli: &'a [String], toml: Option<&'a [String]>) -> &'a [String] {
    if cli.is_empty() {
        toml.unwrap_or_default()
    } else {
        cli
    }
}

fn resolve_dir(cli: Option<&Path>, toml: Option<&Path>, default: &str) -> PathBuf {
    cli.or(toml)
        .map_or_else(|| PathBuf::from(default), Path::to_path_buf)
}

fn parse_base_dir(s: &str) -> Result<BaseDir, ConfigError> {
    match s.to_lowercase().as_str() {
        "web-root" | "webroot" | "web_root" => Ok(BaseDir::WebRoot),
        "content-root" | "contentroot" | "content_root" => Ok(BaseDir::ContentRoot),
        "none" | "" => Ok(BaseDir::None),
        _ => Err(ConfigError::InvalidBaseDir {
            value: s.to_string(),
        }),
    }
}

fn parse_content_type(s: &str) -> Result<ContentType, ConfigError> {
    match s.to_lowercase().as_str() {
        "html" | "text/html" => Ok(ContentType::Html),
        "text" | "txt" | "text/plain" => Ok(ContentType::Text),
        "json" | "application/json" => Ok(ContentType::Json),
        _ => Err(ConfigError::InvalidContentType {
            value: s.to_string(),
        }),
    }
}
