//! Maintenance-control collaborator.
//!
//! The gate never decides on its own whether maintenance mode is on; it asks
//! a [`MaintenanceControl`] at the top of every request. Optional capabilities
//! (per-request option overrides, restoring persisted state) are advertised by
//! the implementation and read once when the gate is constructed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::options::OptionCollection;

/// Source of truth for whether maintenance mode is active.
///
/// Implementations own any synchronization of their state. The gate treats
/// each call as an independent point-in-time read.
pub trait MaintenanceControl: Send + Sync {
    /// Returns `true` while maintenance mode is on.
    fn is_maintenance_mode_on(&self) -> bool;

    /// Returns `true` if [`options_to_override`](Self::options_to_override)
    /// should be consulted on every maintenance-mode request.
    fn can_override_options(&self) -> bool {
        false
    }

    /// Options to use for this request instead of the startup options.
    ///
    /// `None` lets the request through as if maintenance mode were off.
    /// Only called when [`can_override_options`](Self::can_override_options)
    /// returned `true` at construction.
    fn options_to_override(&self) -> Option<Arc<OptionCollection>> {
        None
    }

    /// Returns `true` if [`restore_state`](Self::restore_state) should be
    /// called once during gate construction.
    fn can_restore_state(&self) -> bool {
        false
    }

    /// Restores previously persisted state. Called once, after the options
    /// and the response have been resolved.
    fn restore_state(&self) {}
}

impl<T: MaintenanceControl + ?Sized> MaintenanceControl for Arc<T> {
    fn is_maintenance_mode_on(&self) -> bool {
        (**self).is_maintenance_mode_on()
    }

    fn can_override_options(&self) -> bool {
        (**self).can_override_options()
    }

    fn options_to_override(&self) -> Option<Arc<OptionCollection>> {
        (**self).options_to_override()
    }

    fn can_restore_state(&self) -> bool {
        (**self).can_restore_state()
    }

    fn restore_state(&self) {
        (**self).restore_state();
    }
}

/// In-memory on/off switch.
///
/// Has neither the override nor the restore capability.
#[derive(Debug, Default)]
pub struct MaintenanceSwitch {
    on: AtomicBool,
}

impl MaintenanceSwitch {
    /// Creates a switch in the given state.
    #[must_use]
    pub const fn new(on: bool) -> Self {
        Self {
            on: AtomicBool::new(on),
        }
    }

    /// Turns maintenance mode on.
    pub fn enter(&self) {
        self.set(true);
    }

    /// Turns maintenance mode off.
    pub fn leave(&self) {
        self.set(false);
    }

    /// Sets maintenance mode.
    pub fn set(&self, on: bool) {
        let was = self.on.swap(on, Ordering::SeqCst);
        if was != on {
            tracing::info!(on, "Maintenance mode switched");
        }
    }
}

impl MaintenanceControl for MaintenanceSwitch {
    fn is_maintenance_mode_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }
}
