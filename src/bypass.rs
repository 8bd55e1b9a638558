//! Bypass rule evaluation.
//!
//! Rules are checked in a fixed order, cheapest first, and evaluation stops at
//! the first match:
//!
//! 1. Path prefixes (each with its own case mode)
//! 2. File extensions (case-insensitive)
//! 3. "All authenticated users"
//! 4. Exact usernames
//! 5. Role membership
//!
//! All rules are disjunctive, so the order only affects how much work is done,
//! never the outcome.

use std::borrow::Cow;
use std::fmt;

use crate::options::{OptionCollection, OptionKind, OptionValue, PathMatchMode};

/// Identity of the caller, as established by an upstream authentication layer.
///
/// The gate reads it from the request extensions; a request without one is
/// treated as anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// User name, if known.
    pub name: Option<String>,
    /// Whether the caller is authenticated.
    pub authenticated: bool,
    /// Roles held by the caller.
    pub roles: Vec<String>,
}

impl Identity {
    /// An unauthenticated caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated caller with the given name and no roles.
    #[must_use]
    pub fn authenticated(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            authenticated: true,
            roles: Vec::new(),
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Returns `true` if the caller holds `role`.
    #[must_use]
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// The request attributes bypass rules look at.
///
/// The path is held percent-decoded, so rules are written in plain text
/// (`/my docs`, `/café`).
#[derive(Debug, Clone)]
pub struct RequestInfo<'a> {
    path: Cow<'a, str>,
    identity: Option<&'a Identity>,
}

impl<'a> RequestInfo<'a> {
    /// Creates a view over an already decoded path and optional identity.
    #[must_use]
    pub const fn new(path: &'a str, identity: Option<&'a Identity>) -> Self {
        Self {
            path: Cow::Borrowed(path),
            identity,
        }
    }

    /// Extracts path and identity from an HTTP request.
    ///
    /// The URI path is percent-decoded once. A path that does not decode to
    /// valid UTF-8 is used as sent.
    #[must_use]
    pub fn from_request<B>(request: &'a http::Request<B>) -> Self {
        let raw = request.uri().path();
        let path = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));

        Self {
            path,
            identity: request.extensions().get::<Identity>(),
        }
    }

    /// Decoded request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the path is `prefix` or lies below it, segment-wise.
    ///
    /// `/admin` matches `/admin`, `/admin/` and `/admin/users`, but not
    /// `/administrator`. A trailing slash on `prefix` is ignored.
    #[must_use]
    pub fn starts_with_segments(&self, prefix: &str, mode: PathMatchMode) -> bool {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }

        let path = self.path();
        let Some(head) = path.get(..prefix.len()) else {
            return false;
        };

        let head_matches = match mode {
            PathMatchMode::CaseSensitive => head == prefix,
            PathMatchMode::IgnoreCase => head.eq_ignore_ascii_case(prefix),
        };

        head_matches && matches!(path.as_bytes().get(prefix.len()), None | Some(b'/'))
    }

    /// Returns `true` if the path ends with `.extension`, ignoring ASCII case.
    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        let path = self.path();
        let extension = extension.trim_start_matches('.');
        let suffix_len = extension.len() + 1;
        if extension.is_empty() || path.len() < suffix_len {
            return false;
        }

        path.get(path.len() - suffix_len..)
            .is_some_and(|tail| tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(extension))
    }

    /// Returns `true` if the caller is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some_and(|i| i.authenticated)
    }

    /// Caller's user name, if known.
    #[must_use]
    pub fn user_name(&self) -> Option<&'a str> {
        self.identity.and_then(|i| i.name.as_deref())
    }

    /// Returns `true` if the caller holds `role`.
    #[must_use]
    pub fn is_in_role(&self, role: &str) -> bool {
        self.identity.is_some_and(|i| i.is_in_role(role))
    }
}

/// The rule that let a request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassMatch<'a> {
    /// A path prefix matched.
    PathPrefix(&'a str),
    /// A file extension matched.
    Extension(&'a str),
    /// The caller is authenticated and all authenticated users bypass.
    Authenticated,
    /// The caller's name matched.
    Username(&'a str),
    /// The caller holds a bypass role.
    Role(&'a str),
}

impl fmt::Display for BypassMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathPrefix(prefix) => write!(f, "path prefix '{prefix}'"),
            Self::Extension(ext) => write!(f, "extension '{ext}'"),
            Self::Authenticated => write!(f, "authenticated user"),
            Self::Username(name) => write!(f, "username '{name}'"),
            Self::Role(role) => write!(f, "role '{role}'"),
        }
    }
}

/// Returns `true` if any bypass rule in `options` matches `request`.
#[must_use]
pub fn should_bypass(request: &RequestInfo<'_>, options: &OptionCollection) -> bool {
    first_match(request, options).is_some()
}

/// Returns the first bypass rule that matches `request`, in evaluation order.
#[must_use]
pub fn first_match<'o>(request: &RequestInfo<'_>, options: &'o OptionCollection) -> Option<BypassMatch<'o>> {
    path_prefix_match(request, options)
        .or_else(|| extension_match(request, options))
        .or_else(|| authenticated_match(request, options))
        .or_else(|| username_match(request, options))
        .or_else(|| role_match(request, options))
}

fn path_prefix_match<'o>(request: &RequestInfo<'_>, options: &'o OptionCollection) -> Option<BypassMatch<'o>> {
    options
        .values(OptionKind::BypassPathPrefix)
        .find_map(|v| match v {
            OptionValue::BypassPathPrefix { prefix, mode }
                if request.starts_with_segments(prefix, *mode) =>
            {
                Some(BypassMatch::PathPrefix(prefix.as_str()))
            }
            _ => None,
        })
}

fn extension_match<'o>(request: &RequestInfo<'_>, options: &'o OptionCollection) -> Option<BypassMatch<'o>> {
    options
        .values(OptionKind::BypassExtension)
        .find_map(|v| match v {
            OptionValue::BypassExtension { extension } if request.has_extension(extension) => {
                Some(BypassMatch::Extension(extension.as_str()))
            }
            _ => None,
        })
}

fn authenticated_match<'o>(
    request: &RequestInfo<'_>,
    options: &'o OptionCollection,
) -> Option<BypassMatch<'o>> {
    let enabled = options
        .values(OptionKind::BypassAllAuthenticated)
        .any(|v| matches!(v, OptionValue::BypassAllAuthenticated { enabled: true }));

    (enabled && request.is_authenticated()).then_some(BypassMatch::Authenticated)
}

fn username_match<'o>(request: &RequestInfo<'_>, options: &'o OptionCollection) -> Option<BypassMatch<'o>> {
    let name = request.user_name()?;
    options
        .values(OptionKind::BypassUsername)
        .find_map(|v| match v {
            OptionValue::BypassUsername { username } if username == name => {
                Some(BypassMatch::Username(username.as_str()))
            }
            _ => None,
        })
}

fn role_match<'o>(request: &RequestInfo<'_>, options: &'o OptionCollection) -> Option<BypassMatch<'o>> {
    options.values(OptionKind::BypassRole).find_map(|v| match v {
        OptionValue::BypassRole { role } if request.is_in_role(role) => {
            Some(BypassMatch::Role(role.as_str()))
        }
        _ => None,
    })
}

#[cfg(test)]
#[path = "bypass_tests.rs"]
mod tests;
