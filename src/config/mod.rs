//! Configuration layer for maintenance-gate.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Merged configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The response source is treated as one value: `--default-response` or
//! `--response-file` on the CLI replaces every source from the TOML file.
//!
//! Bypass lists (`paths`, `extensions`, `usernames`, `roles`) use "replace"
//! semantics: a non-empty CLI list replaces the TOML list of the same kind
//! entirely. Lists of different kinds are handled independently.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--enabled`, `--bypass-authenticated`, `--no-defaults`) use OR
//! semantics: if set `true` in either CLI or TOML, the result is `true`.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;

pub use cli::{BaseDirArg, Cli, Command};
pub use error::ConfigError;
pub use toml::{PathRule, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
