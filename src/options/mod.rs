//! Option store for the maintenance gate.
//!
//! This module provides:
//! - Typed option values, one per configurable kind ([`OptionValue`], [`OptionKind`])
//! - The two-phase builder ([`OptionsBuilder`])
//! - The immutable, validated collection ([`OptionCollection`])
//!
//! # Singleton and multi-valued kinds
//!
//! Bypass path prefixes, extensions, usernames and roles may be configured
//! any number of times. Every other kind is a singleton; configuring one twice
//! fails validation.
//!
//! # Defaults
//!
//! Unless `use-no-defaults` is set, the builder fills in the bundled default
//! response when no response source is configured, and a retry interval of
//! [`OptionsBuilder::DEFAULT_RETRY_INTERVAL_SECS`] when none is configured.

mod builder;
mod collection;
mod error;
mod value;


pub use builder::OptionsBuilder;
pub use collection::OptionCollection;
pub use error::OptionError;
pub use value::{BaseDir, MaintenanceOption, OptionKind, OptionValue, PathMatchMode};
