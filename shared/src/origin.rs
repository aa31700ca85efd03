//! Origin allow-list for browser callers.

use regex::Regex;

use crate::{Error, Result};

/// Any loopback host, http or https, with or without a port.
pub const LOOPBACK_PATTERN: &str = r"^https?://(localhost|127\.0\.0\.1|\[::1\])(:\d{1,5})?$";

/// Decides which origins may call the endpoint.
///
/// Production origins are compared by exact string equality. The loopback rule is the
/// only pattern and exists for local development.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    exact: Vec<String>,
    loopback: Option<Regex>,
}

impl OriginPolicy {
    /// Create a policy from exact origins, optionally admitting loopback callers.
    pub fn new(exact: Vec<String>, allow_loopback: bool) -> Result<Self> {
        let loopback = if allow_loopback {
            Some(
                Regex::new(LOOPBACK_PATTERN)
                    .map_err(|e| Error::Config(format!("Invalid loopback pattern: {}", e)))?,
            )
        } else {
            None
        };

        Ok(Self { exact, loopback })
    }

    /// Return the origin itself if it is allowed.
    pub fn allow<'a>(&self, origin: Option<&'a str>) -> Option<&'a str> {
        let origin = origin?;

        if self.exact.iter().any(|allowed| allowed == origin) {
            return Some(origin);
        }

        match &self.loopback {
            Some(pattern) if pattern.is_match(origin) => Some(origin),
            _ => None,
        }
    }

    /// Exact origins this policy admits.
    pub fn exact_origins(&self) -> &[String] {
        &self.exact
    }
}
