//! The measurement sequence: server readiness, first load, optional reload.
//!
//! # Guarantees
//!
//! Whatever step fails, [`MeasurementPipeline::measure`] terminates the
//! server and closes the browser before returning the error.

use std::path::Path;
use std::sync::Arc;

use startperf_core::{
    BrowserError, BrowserLauncher, BrowserSession, Clock, MeasureError, MeasurementResult,
    Options, ReloadTimings, Timeouts,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::process::ProcessSupervisor;
use crate::reload::{FileMutation, RELOAD_SENTINEL};
use crate::session::Session;

/// Drives one measurement run against a dev server and a browser.
pub struct MeasurementPipeline {
    supervisor: ProcessSupervisor,
    launcher: Arc<dyn BrowserLauncher>,
    timeouts: Timeouts,
}

impl MeasurementPipeline {
    pub fn new(supervisor: ProcessSupervisor, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            supervisor,
            launcher,
            timeouts: Timeouts::default(),
        }
    }

    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run the full measurement.
    ///
    /// # Errors
    ///
    /// The first fatal [`MeasureError`] encountered, or
    /// [`MeasureError::SessionBusy`] if `session` is already running.
    pub async fn measure(
        &self,
        session: &Session,
        options: &Options,
    ) -> Result<MeasurementResult, MeasureError> {
        let _run = session.begin()?;

        let outcome = self.run(session, options).await;
        session.cleanup().await;

        if let Err(e) = &outcome {
            debug!(error = %e, "measurement aborted");
        }
        outcome
    }

    async fn run(
        &self,
        session: &Session,
        options: &Options,
    ) -> Result<MeasurementResult, MeasureError> {
        let browser = self
            .launcher
            .launch()
            .await
            .map_err(|e| MeasureError::BrowserLaunchFailure(e.to_string()))?;
        session.attach_browser(Arc::clone(&browser));

        let clock = Clock::start();
        let at_start = clock.now();

        let mut watcher = session
            .spawn_server(&self.supervisor, &options.full_command())
            .await?;
        let pattern = options.readiness_pattern();
        debug!(%pattern, "waiting for readiness line");
        watcher
            .await_pattern(&pattern, options.server_start_timeout)
            .await?;
        // Passthrough continues in the readers; nothing else needs the lines
        drop(watcher);
        session.mark_server_ready().await;
        let at_server_up = clock.now();
        debug!(elapsed = ?at_server_up.since(at_start), "server readiness recorded");

        info!("Loading {}", options.url);
        let response = browser
            .navigate(&options.url, options.page_load_timeout)
            .await?;
        if !response.is_acceptable() {
            return Err(MeasureError::PageLoadFailure {
                url: options.url.clone(),
                status: response.status,
            });
        }
        let at_first_paint = clock.now();

        browser.wait_for_network_idle().await?;
        self.wait_for_app(browser.as_ref(), &options.wait_for_selector)
            .await?;
        let at_app_load = clock.now();
        info!(elapsed = ?at_app_load.since(at_start), "App loaded");

        let reload = match &options.file {
            Some(path) => measure_reload(session, browser.as_ref(), path, &clock).await?,
            None => None,
        };

        session.terminate_server().await;

        Ok(MeasurementResult {
            at_start,
            at_server_up,
            at_first_paint,
            at_app_load,
            reload,
        })
    }

    async fn wait_for_app(
        &self,
        browser: &dyn BrowserSession,
        selector: &str,
    ) -> Result<(), MeasureError> {
        let limit = self.timeouts.selector;
        match timeout(limit, browser.wait_for_selector(selector)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(BrowserError::Timeout(_))) | Err(_) => Err(MeasureError::SelectorTimeout {
                selector: selector.to_string(),
                timeout: limit,
            }),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

/// Touch `path` and time the browser settling again.
///
/// A missing file is logged and yields `None`. The touched file is held by
/// the session until restored, so cleanup can restore it on any path.
async fn measure_reload(
    session: &Session,
    browser: &dyn BrowserSession,
    path: &Path,
    clock: &Clock,
) -> Result<Option<ReloadTimings>, MeasureError> {
    let at_file_change = clock.now();
    let mutation = match FileMutation::prepare(path).await {
        Ok(mutation) => mutation,
        Err(e) if !e.is_fatal() => {
            warn!("{}", e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    info!("Measuring reload after changing {}", path.display());
    session.touch_file(mutation, RELOAD_SENTINEL).await?;
    let at_file_changed = clock.now();

    let settled = browser.wait_for_network_idle().await;
    let at_reload_complete = clock.now();

    session.restore_file().await?;
    settled?;

    Ok(Some(ReloadTimings {
        at_file_change,
        at_file_changed,
        at_reload_complete,
    }))
}
