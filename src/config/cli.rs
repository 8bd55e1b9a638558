//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::options::BaseDir;

/// maintenance-gate: serve a 503 maintenance page in front of an HTTP service
///
/// Without a subcommand, runs the demo server.
#[derive(Debug, Parser)]
#[command(name = "maintenance-gate")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Start with maintenance mode on
    #[arg(long, global = true)]
    pub enabled: bool,

    /// Retry-After value in seconds
    #[arg(long = "retry-interval", global = true)]
    pub retry_interval: Option<u32>,

    /// Serve the bundled maintenance page
    #[arg(long = "default-response", global = true)]
    pub default_response: bool,

    /// Serve this file as the maintenance page
    #[arg(long = "response-file", value_name = "PATH", global = true)]
    pub response_file: Option<PathBuf>,

    /// Directory the response file path is relative to
    #[arg(long = "base-dir", value_enum, global = true)]
    pub base_dir: Option<BaseDirArg>,

    /// Web root directory
    #[arg(long = "web-root", value_name = "DIR", global = true)]
    pub web_root: Option<PathBuf>,

    /// Content root directory
    #[arg(long = "content-root", value_name = "DIR", global = true)]
    pub content_root: Option<PathBuf>,

    /// Path prefix that bypasses maintenance (can be specified multiple times)
    #[arg(long = "bypass-path", value_name = "PREFIX", global = true)]
    pub bypass_paths: Vec<String>,

    /// File extension that bypasses maintenance (can be specified multiple times)
    #[arg(long = "bypass-extension", value_name = "EXT", global = true)]
    pub bypass_extensions: Vec<String>,

    /// User name that bypasses maintenance (can be specified multiple times)
    #[arg(long = "bypass-user", value_name = "NAME", global = true)]
    pub bypass_users: Vec<String>,

    /// Role that bypasses maintenance (can be specified multiple times)
    #[arg(long = "bypass-role", value_name = "ROLE", global = true)]
    pub bypass_roles: Vec<String>,

    /// Let every authenticated user through
    #[arg(long = "bypass-authenticated", global = true)]
    pub bypass_authenticated: bool,

    /// Do not fill unset options with defaults
    #[arg(long = "no-defaults", global = true)]
    pub no_defaults: bool,

    /// Address of the demo server
    #[arg(long, value_name = "ADDR", global = true)]
    pub listen: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for maintenance-gate
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Validate the configuration and print the resolved options
    Check,

    /// Run the demo server behind the maintenance gate
    Serve,
}

/// Base directory argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BaseDirArg {
    /// Relative to the web root
    #[value(name = "web-root")]
    WebRoot,
    /// Relative to the content root
    #[value(name = "content-root")]
    ContentRoot,
    /// Use the path as given
    #[value(name = "none")]
    None,
}

impl From<BaseDirArg> for BaseDir {
    fn from(arg: BaseDirArg) -> Self {
        match arg {
            BaseDirArg::WebRoot => Self::WebRoot,
            BaseDirArg::ContentRoot => Self::ContentRoot,
            BaseDirArg::None => Self::None,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
