//! Browser automation ports.
//!
//! The pipeline treats the browser as an opaque capability: it can navigate,
//! wait for an element, wait for the network to settle, and be closed. The
//! concrete driver lives in an adapter crate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The browser process or its protocol connection could not be started.
    #[error("Browser failed to launch: {0}")]
    Launch(String),

    /// Navigation failed before a response was received.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A browser-side wait exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Protocol-level failure talking to the browser.
    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Response of the root document after navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// Final URL of the document.
    pub url: String,
    /// HTTP status of the document response.
    pub status: u16,
}

impl NavigationResponse {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }

    /// 2xx, plus 302 and 304, count as a successful load.
    pub const fn is_acceptable(&self) -> bool {
        matches!(self.status, 200..=299 | 302 | 304)
    }
}

/// An open browser page the pipeline drives.
///
/// All methods take `&self` so the session can be shared between the running
/// pipeline and the cleanup path.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url` and return the document response.
    async fn navigate(&self, url: &str, timeout: Duration)
    -> Result<NavigationResponse, BrowserError>;

    /// Resolve once an element matching `selector` is visible.
    ///
    /// Callers bound this wait themselves.
    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError>;

    /// Resolve once no network request has been in flight for the idle window.
    async fn wait_for_network_idle(&self) -> Result<(), BrowserError>;

    /// Close the browser. Must tolerate repeated calls.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// Factory for browser sessions.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, BrowserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptable_statuses() {
        for status in [200, 201, 204, 299, 302, 304] {
            assert!(NavigationResponse::new("/", status).is_acceptable(), "{status}");
        }
        for status in [199, 301, 307, 308, 404, 500] {
            assert!(!NavigationResponse::new("/", status).is_acceptable(), "{status}");
        }
    }

    #[tokio::test]
    async fn mock_session_is_usable_as_trait_object() {
        let mut session = MockBrowserSession::new();
        session
            .expect_navigate()
            .returning(|url, _| Ok(NavigationResponse::new(url, 200)));

        let session: Arc<dyn BrowserSession> = Arc::new(session);
        let response = session
            .navigate("http://localhost:4200", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }
}
