//! maintenance-gate: maintenance-mode middleware for HTTP services
//!
//! While maintenance mode is on, requests are answered with a cached 503
//! response carrying a `Retry-After` header, unless a bypass rule lets them
//! through to the application.

pub mod bypass;
pub mod config;
pub mod control;
pub mod gate;
pub mod options;
pub mod response;
