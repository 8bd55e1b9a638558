//! Error types for option building and validation.

use thiserror::Error;

use super::OptionKind;

/// Error type for option validation.
///
/// Every variant is a startup configuration error; none of them can occur
/// while serving requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// No response source was configured and defaults are disabled.
    #[error(
        "No maintenance response specified: configure one of use-default-response, response, or response-file"
    )]
    NoResponseSource,

    /// More than one response source was configured.
    #[error("Ambiguous maintenance response: {} are all configured, expected exactly one", join_kinds(kinds))]
    AmbiguousResponseSource {
        /// The response-source kinds present.
        kinds: Vec<OptionKind>,
    },

    /// A required singleton option is absent.
    #[error("Missing required option: {kind}")]
    MissingOption {
        /// The missing kind
        kind: OptionKind,
    },

    /// A singleton option was configured more than once.
    #[error("Option {kind} may be configured at most once, found {count}")]
    DuplicateSingleton {
        /// The duplicated kind
        kind: OptionKind,
        /// Number of instances found
        count: usize,
    },

    /// An option carries an unusable value.
    #[error("Invalid value for {kind}: {reason}")]
    InvalidValue {
        /// The offending kind
        kind: OptionKind,
        /// Reason for invalidity
        reason: String,
    },
}

fn join_kinds(kinds: &[OptionKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}
