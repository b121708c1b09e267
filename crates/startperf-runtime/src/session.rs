//! Per-run context holding the server and browser handles.
//!
//! Both the pipeline and the signal handler reach the handles only through a
//! [`Session`], which serializes cleanup so overlapping callers wait for the
//! in-flight teardown instead of starting a second one. A touched reload file
//! is held here too, so a signal mid-reload still puts it back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use startperf_core::{BrowserSession, MeasureError, ServerState};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::process::{OutputWatcher, ProcessSupervisor, ServerProcess};
use crate::reload::FileMutation;

/// Clears the session's active flag when dropped.
pub struct RunGuard<'a> {
    active: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Handles acquired during one measurement run.
#[derive(Default)]
pub struct Session {
    server: Mutex<Option<ServerProcess>>,
    browser: StdMutex<Option<Arc<dyn BrowserSession>>>,
    reload: Mutex<Option<FileMutation>>,
    cleanup_lock: Mutex<()>,
    active: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session for one run.
    ///
    /// # Errors
    ///
    /// [`MeasureError::SessionBusy`] while another run holds the guard.
    pub fn begin(&self) -> Result<RunGuard<'_>, MeasureError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MeasureError::SessionBusy)?;
        Ok(RunGuard {
            active: &self.active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Spawn `command` and store the process before anything else can
    /// observe the slot, so a concurrent cleanup never misses it.
    pub async fn spawn_server(
        &self,
        supervisor: &ProcessSupervisor,
        command: &str,
    ) -> Result<OutputWatcher, MeasureError> {
        let mut slot = self.server.lock().await;
        let (server, watcher) = supervisor.start(command)?;
        // A previous run's process is already terminated
        *slot = Some(server);
        Ok(watcher)
    }

    pub async fn mark_server_ready(&self) {
        if let Some(server) = self.server.lock().await.as_mut() {
            server.mark_ready();
        }
    }

    pub async fn server_state(&self) -> Option<ServerState> {
        self.server.lock().await.as_ref().map(ServerProcess::state)
    }

    pub async fn server_pid(&self) -> Option<u32> {
        self.server.lock().await.as_ref().map(ServerProcess::pid)
    }

    pub fn attach_browser(&self, browser: Arc<dyn BrowserSession>) {
        if let Ok(mut slot) = self.browser.lock() {
            *slot = Some(browser);
        }
    }

    pub fn has_browser(&self) -> bool {
        self.browser.lock().is_ok_and(|slot| slot.is_some())
    }

    /// Terminate the server if one was started. Safe to call repeatedly.
    pub async fn terminate_server(&self) {
        if let Some(server) = self.server.lock().await.as_mut() {
            server.terminate().await;
        }
    }

    /// Append `suffix` to the file behind `mutation` and keep the mutation
    /// until [`Session::restore_file`] or cleanup puts the original back.
    pub async fn touch_file(
        &self,
        mut mutation: FileMutation,
        suffix: &[u8],
    ) -> Result<(), MeasureError> {
        let mut slot = self.reload.lock().await;
        let written = mutation.append(suffix).await;
        *slot = Some(mutation);
        written
    }

    pub async fn has_touched_file(&self) -> bool {
        self.reload.lock().await.is_some()
    }

    /// Write back the original content of a touched file, if any.
    pub async fn restore_file(&self) -> Result<(), MeasureError> {
        let mut slot = self.reload.lock().await;
        match slot.take() {
            Some(mutation) => mutation.restore().await,
            None => Ok(()),
        }
    }

    /// Close and forget the browser, logging any failure.
    pub async fn release_browser(&self) {
        let browser = match self.browser.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(browser) = browser {
            debug!("closing browser");
            if let Err(e) = browser.close().await {
                warn!(error = %e, "Failed to close browser");
            }
        }
    }

    /// Server first, then the reload file, then browser. Concurrent callers
    /// run one after another, and the second finds nothing left to do.
    pub async fn cleanup(&self) {
        let _serial = self.cleanup_lock.lock().await;
        self.terminate_server().await;
        if let Err(e) = self.restore_file().await {
            warn!(error = %e, "Failed to restore reload file");
        }
        self.release_browser().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use startperf_core::ports::MockBrowserSession;

    #[test]
    fn second_run_is_refused_until_guard_drops() {
        let session = Session::new();
        let guard = session.begin().unwrap();
        assert!(session.is_active());
        assert!(matches!(session.begin(), Err(MeasureError::SessionBusy)));

        drop(guard);
        assert!(!session.is_active());
        assert!(session.begin().is_ok());
    }

    #[tokio::test]
    async fn cleanup_without_handles_is_a_no_op() {
        let session = Session::new();
        session.cleanup().await;
        assert_eq!(session.server_state().await, None);
        assert!(!session.has_browser());
    }

    #[tokio::test]
    async fn browser_is_closed_once_across_cleanups() {
        let mut browser = MockBrowserSession::new();
        browser.expect_close().times(1).returning(|| Ok(()));

        let session = Session::new();
        session.attach_browser(Arc::new(browser));
        assert!(session.has_browser());

        session.cleanup().await;
        session.cleanup().await;
        assert!(!session.has_browser());
    }

    #[tokio::test]
    async fn cleanup_restores_touched_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.component.ts");
        std::fs::write(&path, b"@Component({})\n").unwrap();

        let session = Session::new();
        let mutation = FileMutation::prepare(&path).await.unwrap();
        session
            .touch_file(mutation, crate::reload::RELOAD_SENTINEL)
            .await
            .unwrap();
        assert!(std::fs::read(&path).unwrap().ends_with(b"// reload trigger"));
        assert!(session.has_touched_file().await);

        session.cleanup().await;
        assert_eq!(std::fs::read(&path).unwrap(), b"@Component({})\n");
        assert!(!session.has_touched_file().await);

        // Nothing left for a second pass
        session.cleanup().await;
        assert_eq!(std::fs::read(&path).unwrap(), b"@Component({})\n");
    }

    #[tokio::test]
    async fn close_failure_is_swallowed() {
        let mut browser = MockBrowserSession::new();
        browser.expect_close().times(1).returning(|| {
            Err(startperf_core::BrowserError::Protocol("connection reset".into()))
        });

        let session = Session::new();
        session.attach_browser(Arc::new(browser));
        session.release_browser().await;
        assert!(!session.has_browser());
    }
}
