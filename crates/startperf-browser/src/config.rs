//! Browser launch configuration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Environment switch for a visible browser window.
pub const SHOW_BROWSER_VAR: &str = "SHOW_BROWSER";
pub const AUTH_USER_VAR: &str = "AUTH_USER";
pub const AUTH_PASSWORD_VAR: &str = "AUTH_PASSWORD";

/// Credentials sent as an `Authorization: Basic` header on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn header_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

// Keep the password out of logs
impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub auth: Option<BasicAuth>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1366,
            viewport_height: 768,
            auth: None,
        }
    }
}

impl LaunchConfig {
    /// Read `SHOW_BROWSER`, `AUTH_USER` and `AUTH_PASSWORD` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Only the exact value `true` shows the browser. Auth is enabled when
    /// both variables are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let headless = lookup(SHOW_BROWSER_VAR).as_deref() != Some("true");
        let auth = match (lookup(AUTH_USER_VAR), lookup(AUTH_PASSWORD_VAR)) {
            (Some(username), Some(password)) => Some(BasicAuth { username, password }),
            _ => None,
        };

        Self {
            headless,
            auth,
            ..Self::default()
        }
    }
}
