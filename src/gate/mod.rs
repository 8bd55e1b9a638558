//! Maintenance gate: the per-request decision and the 503 response.
//!
//! Construction runs the whole startup sequence once:
//! 1. Build and validate the options
//! 2. Resolve and cache the maintenance response
//! 3. Restore persisted state, if the control service supports it
//!
//! Any failure is fatal. After construction the gate is read-only and can be
//! shared across tasks without locking.

mod layer;

#[cfg(test)]
mod gate_tests;
#[cfg(test)]
mod layer_tests;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, RETRY_AFTER};
use http::{HeaderValue, Request, Response, StatusCode};
use http_body_util::Full;
use thiserror::Error;

use crate::bypass::{self, RequestInfo};
use crate::control::MaintenanceControl;
use crate::options::{OptionCollection, OptionError, OptionsBuilder};
use crate::response::{self, HostingEnvironment, MaintenanceResponse, ResponseError};

pub use layer::{MaintenanceLayer, MaintenanceService};

/// Error type for gate construction.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The options failed validation.
    #[error("Invalid maintenance options: {0}")]
    Options(#[from] OptionError),

    /// The maintenance response could not be resolved.
    #[error("Failed to resolve maintenance response: {0}")]
    Response(#[from] ResponseError),
}

/// Why a request was forwarded to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassReason {
    /// Maintenance mode is off.
    MaintenanceOff,
    /// The control service suppressed maintenance mode for this request.
    Suppressed,
    /// A bypass rule matched; holds its description.
    Bypass(String),
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaintenanceOff => write!(f, "maintenance mode off"),
            Self::Suppressed => write!(f, "maintenance suppressed by override"),
            Self::Bypass(rule) => write!(f, "bypass by {rule}"),
        }
    }
}

/// Outcome of [`MaintenanceGate::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request unchanged.
    PassThrough(PassReason),
    /// Answer with the maintenance response.
    Maintenance {
        /// `Retry-After` value in seconds.
        retry_after: u32,
    },
}

impl Decision {
    /// Returns `true` for [`Decision::Maintenance`].
    #[must_use]
    pub const fn is_maintenance(&self) -> bool {
        matches!(self, Self::Maintenance { .. })
    }
}

/// The maintenance decision engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use maintenance_gate::control::MaintenanceSwitch;
/// use maintenance_gate::gate::MaintenanceGate;
/// use maintenance_gate::options::OptionsBuilder;
/// use maintenance_gate::response::HostingEnvironment;
///
/// let switch = Arc::new(MaintenanceSwitch::new(true));
/// let env = HostingEnvironment::new("wwwroot", ".");
/// let options = OptionsBuilder::new().use_default_response().retry_interval(120);
///
/// let gate = MaintenanceGate::new(switch, &env, &options).unwrap();
/// let request = http::Request::get("/anything").body(()).unwrap();
///
/// assert!(gate.decide(&request).is_maintenance());
/// ```
pub struct MaintenanceGate {
    control: Arc<dyn MaintenanceControl>,
    overrides_options: bool,
    options: Arc<OptionCollection>,
    response: MaintenanceResponse,
    body: Bytes,
    content_type: HeaderValue,
}

impl MaintenanceGate {
    /// Builds the options, resolves the response and restores state.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the response cannot be
    /// resolved (e.g. the response file does not exist).
    pub fn new<C>(
        control: C,
        env: &HostingEnvironment,
        options: &OptionsBuilder,
    ) -> Result<Self, StartupError>
    where
        C: MaintenanceControl + 'static,
    {
        let options = options.build()?;
        let response = response::resolve(&options, env)?;

        tracing::info!(
            options = options.len(),
            retry_interval = options.retry_interval(),
            content_type = %response.content_type,
            encoding = %response.encoding,
            bytes = response.bytes.len(),
            "Maintenance response resolved"
        );

        let overrides_options = control.can_override_options();
        if control.can_restore_state() {
            tracing::debug!("Restoring maintenance state");
            control.restore_state();
        }

        Ok(Self {
            control: Arc::new(control),
            overrides_options,
            options: Arc::new(options),
            body: Bytes::from(response.bytes.clone()),
            content_type: HeaderValue::from_static(response.content_type.as_str()),
            response,
        })
    }

    /// Options built at startup.
    #[must_use]
    pub fn options(&self) -> &OptionCollection {
        &self.options
    }

    /// The cached maintenance response.
    #[must_use]
    pub const fn response(&self) -> &MaintenanceResponse {
        &self.response
    }

    /// Decides whether `request` reaches the application.
    pub fn decide<B>(&self, request: &Request<B>) -> Decision {
        if !self.control.is_maintenance_mode_on() {
            return Decision::PassThrough(PassReason::MaintenanceOff);
        }

        let options = if self.overrides_options {
            match self.control.options_to_override() {
                Some(options) => options,
                None => return Decision::PassThrough(PassReason::Suppressed),
            }
        } else {
            Arc::clone(&self.options)
        };

        let info = RequestInfo::from_request(request);
        if let Some(rule) = bypass::first_match(&info, &options) {
            return Decision::PassThrough(PassReason::Bypass(rule.to_string()));
        }

        Decision::Maintenance {
            retry_after: options.retry_interval(),
        }
    }

    /// Builds the 503 response served while in maintenance.
    #[must_use]
    pub fn maintenance_response(&self, retry_after: u32) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.clone()));
        *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;

        let headers = response.headers_mut();
        headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
        headers.insert(CONTENT_TYPE, self.content_type.clone());

        response
    }

    /// Wraps the gate in a tower layer.
    #[must_use]
    pub fn into_layer(self) -> MaintenanceLayer {
        MaintenanceLayer::new(Arc::new(self))
    }
}

impl fmt::Debug for MaintenanceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaintenanceGate")
            .field("overrides_options", &self.overrides_options)
            .field("options", &self.options.len())
            .field("content_type", &self.response.content_type)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}
