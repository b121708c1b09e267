//! Readiness pattern derived from the target URL.

use std::fmt;

/// Substring that marks the dev server as ready once it shows up in output.
///
/// Derived from the configured URL with a single trailing slash removed, so
/// `http://localhost:4200/` matches a banner that prints `http://localhost:4200`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPattern(String);

impl ReadinessPattern {
    pub fn from_url(url: &str) -> Self {
        Self(url.strip_suffix('/').unwrap_or(url).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-sensitive substring test against an already ANSI-stripped line.
    pub fn matches(&self, line: &str) -> bool {
        line.contains(self.0.as_str())
    }
}

impl fmt::Display for ReadinessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
