//! Immutable, validated option collection.

use super::{MaintenanceOption, OptionError, OptionKind, OptionValue};

/// Ordered collection of validated options.
///
/// Produced by [`OptionsBuilder::build`](super::OptionsBuilder::build) and
/// never mutated afterwards. Iteration follows insertion order, with
/// defaulted options after the explicit ones.
///
/// # Guarantees
///
/// - Exactly one response source is present.
/// - Exactly one retry interval is present, and it is non-zero.
/// - No singleton kind appears more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCollection {
    entries: Vec<MaintenanceOption>,
    retry_interval: u32,
}

impl OptionCollection {
    /// Wraps entries that already passed validation.
    pub(super) const fn from_validated(entries: Vec<MaintenanceOption>, retry_interval: u32) -> Self {
        Self {
            entries,
            retry_interval,
        }
    }

    /// Returns the single option of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::MissingOption`] if no option of that kind exists,
    /// or [`OptionError::DuplicateSingleton`] if more than one does.
    pub fn get_single(&self, kind: OptionKind) -> Result<&MaintenanceOption, OptionError> {
        let mut matching = self.get_all(kind);
        let first = matching
            .next()
            .ok_or(OptionError::MissingOption { kind })?;

        let rest = matching.count();
        if rest > 0 {
            return Err(OptionError::DuplicateSingleton {
                kind,
                count: rest + 1,
            });
        }

        Ok(first)
    }

    /// Returns every option of `kind`, in insertion order.
    pub fn get_all(&self, kind: OptionKind) -> impl Iterator<Item = &MaintenanceOption> {
        self.entries.iter().filter(move |o| o.kind() == kind)
    }

    /// Returns the values of every option of `kind`, in insertion order.
    pub fn values(&self, kind: OptionKind) -> impl Iterator<Item = &OptionValue> {
        self.get_all(kind).map(|o| &o.value)
    }

    /// Returns `true` if at least one option of `kind` exists.
    #[must_use]
    pub fn any(&self, kind: OptionKind) -> bool {
        self.entries.iter().any(|o| o.kind() == kind)
    }

    /// Returns the `Retry-After` interval in seconds.
    #[must_use]
    pub const fn retry_interval(&self) -> u32 {
        self.retry_interval
    }

    /// Returns the option that selects the maintenance body.
    ///
    /// Validation guarantees exactly one such option, so this returns `None`
    /// only for collections built outside the builder, which is impossible.
    #[must_use]
    pub fn response_source(&self) -> Option<&OptionValue> {
        self.entries
            .iter()
            .map(|o| &o.value)
            .find(|v| v.is_response_source())
    }

    /// Iterates over all options in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MaintenanceOption> {
        self.entries.iter()
    }

    /// Number of stored options, defaults included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the collection holds no options.
    ///
    /// Always `false` for a validated collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the options as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

impl<'a> IntoIterator for &'a OptionCollection {
    type Item = &'a MaintenanceOption;
    type IntoIter = std::slice::Iter<'a, MaintenanceOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
