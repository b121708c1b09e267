//! OS signal interception.
//!
//! SIGINT, SIGTERM and SIGQUIT all run the session cleanup and then exit the
//! process with code 0.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::session::Session;

/// Signals that end the run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
        })
    }
}

/// Runs the session cleanup in response to a shutdown signal.
#[derive(Clone)]
pub struct SignalHandler {
    session: Arc<Session>,
}

impl SignalHandler {
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Clean up after `signal`. Waits for an in-flight cleanup instead of
    /// racing it; works with or without a running measurement.
    pub async fn handle(&self, signal: ShutdownSignal) {
        warn!("Received {}, cleaning up...", signal);
        self.session.cleanup().await;
    }

    /// Listen for shutdown signals in the background. Each signal is handled
    /// on its own task; the first to finish cleanup exits the process.
    #[cfg(unix)]
    pub fn install(self) -> std::io::Result<tokio::task::JoinHandle<()>> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut quit = signal(SignalKind::quit())?;

        Ok(tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = interrupt.recv() => ShutdownSignal::Interrupt,
                    _ = terminate.recv() => ShutdownSignal::Terminate,
                    _ = quit.recv() => ShutdownSignal::Quit,
                };

                let handler = self.clone();
                tokio::spawn(async move {
                    handler.handle(received).await;
                    std::process::exit(0);
                });
            }
        }))
    }

    #[cfg(not(unix))]
    pub fn install(self) -> std::io::Result<tokio::task::JoinHandle<()>> {
        Ok(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                self.handle(ShutdownSignal::Interrupt).await;
                std::process::exit(0);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use startperf_core::ports::MockBrowserSession;

    #[test]
    fn signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(ShutdownSignal::Quit.to_string(), "SIGQUIT");
    }

    #[tokio::test]
    async fn handles_signal_with_no_run_in_progress() {
        let handler = SignalHandler::new(Arc::new(Session::new()));
        handler.handle(ShutdownSignal::Quit).await;
    }

    #[tokio::test]
    async fn signal_during_reload_restores_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        std::fs::write(&path, "render(App);").unwrap();

        let session = Arc::new(Session::new());
        let mutation = crate::reload::FileMutation::prepare(&path).await.unwrap();
        session
            .touch_file(mutation, crate::reload::RELOAD_SENTINEL)
            .await
            .unwrap();

        SignalHandler::new(Arc::clone(&session))
            .handle(ShutdownSignal::Interrupt)
            .await;
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "render(App);");
    }

    #[tokio::test]
    async fn overlapping_signals_close_browser_once() {
        let mut browser = MockBrowserSession::new();
        browser.expect_close().times(1).returning(|| Ok(()));

        let session = Arc::new(Session::new());
        session.attach_browser(Arc::new(browser));
        let handler = SignalHandler::new(Arc::clone(&session));

        tokio::join!(
            handler.handle(ShutdownSignal::Interrupt),
            handler.handle(ShutdownSignal::Terminate),
        );
        assert!(!session.has_browser());
    }
}
