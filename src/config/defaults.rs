//! Default values for configuration options.
//!
//! Centralized constants to avoid magic values scattered across the codebase.
//! Option defaults (response source, retry interval) live in
//! [`OptionsBuilder`](crate::options::OptionsBuilder) so library users get
//! them too.

use std::net::{Ipv4Addr, SocketAddr};

/// Default web root, relative to the working directory.
pub const WEB_ROOT: &str = "wwwroot";

/// Default content root, relative to the working directory.
pub const CONTENT_ROOT: &str = ".";

/// Default port of the demo server.
pub const LISTEN_PORT: u16 = 8080;

/// Default configuration file name written by `init`.
pub const CONFIG_FILE: &str = "maintenance-gate.toml";

/// Default listen address of the demo server.
#[must_use]
pub const fn listen() -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), LISTEN_PORT)
}
