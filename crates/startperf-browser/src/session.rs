//! A single Chromium page driven over CDP.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, Headers,
    SetExtraHttpHeadersParams,
};
use chromiumoxide::error::CdpError;
use futures_util::StreamExt;
use startperf_core::{BrowserError, BrowserSession, NavigationResponse, Timeouts};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

use crate::config::LaunchConfig;
use crate::diagnostics;
use crate::network::NetworkActivity;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn protocol(e: CdpError) -> BrowserError {
    BrowserError::Protocol(e.to_string())
}

/// Browser process plus the one page every measurement runs in.
pub struct ChromiumSession {
    browser: Mutex<Option<Browser>>,
    page: Page,
    network: Arc<StdMutex<NetworkActivity>>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
    idle_window: Duration,
    idle_cap: Duration,
}

impl ChromiumSession {
    pub(crate) async fn open(
        browser: Browser,
        handler: JoinHandle<()>,
        config: &LaunchConfig,
        timeouts: &Timeouts,
    ) -> Result<Self, BrowserError> {
        let mut tasks = vec![handler];
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                for task in &tasks {
                    task.abort();
                }
                return Err(BrowserError::Launch(e.to_string()));
            }
        };

        if let Some(auth) = &config.auth {
            let headers = Headers::new(serde_json::json!({ "Authorization": auth.header_value() }));
            page.execute(SetExtraHttpHeadersParams::new(headers))
                .await
                .map_err(protocol)?;
            debug!(user = %auth.username, "basic auth header installed");
        }

        let network = Arc::new(StdMutex::new(NetworkActivity::new(Instant::now())));
        tasks.extend(track_network(&page, &network).await.map_err(protocol)?);
        tasks.extend(diagnostics::attach(&page).await.map_err(protocol)?);

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            network,
            tasks: StdMutex::new(tasks),
            idle_window: timeouts.network_idle,
            idle_cap: timeouts.network_idle_max,
        })
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError> {
        let script = visibility_script(selector);
        let result = self.page.evaluate(script).await.map_err(protocol)?;
        result
            .into_value::<bool>()
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    fn network_idle(&self, since: Instant) -> bool {
        self.network
            .lock()
            .is_ok_and(|net| net.is_idle(since, self.idle_window, Instant::now()))
    }
}

async fn track_network(
    page: &Page,
    network: &Arc<StdMutex<NetworkActivity>>,
) -> Result<Vec<JoinHandle<()>>, CdpError> {
    let mut started = page.event_listener::<EventRequestWillBeSent>().await?;
    let mut finished = page.event_listener::<EventLoadingFinished>().await?;
    let mut failed = page.event_listener::<EventLoadingFailed>().await?;

    let net = Arc::clone(network);
    let started_task = tokio::spawn(async move {
        while let Some(event) = started.next().await {
            if let Ok(mut net) = net.lock() {
                net.request_started(event.request_id.inner(), Instant::now());
            }
        }
    });

    let net = Arc::clone(network);
    let finished_task = tokio::spawn(async move {
        while let Some(event) = finished.next().await {
            if let Ok(mut net) = net.lock() {
                net.request_settled(event.request_id.inner(), Instant::now());
            }
        }
    });

    let net = Arc::clone(network);
    let failed_task = tokio::spawn(async move {
        while let Some(event) = failed.next().await {
            if let Ok(mut net) = net.lock() {
                net.request_settled(event.request_id.inner(), Instant::now());
            }
        }
    });

    Ok(vec![started_task, finished_task, failed_task])
}

/// JS expression: element exists, is displayed and visible, and has a
/// non-empty box.
fn visibility_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!(
        "(() => {{ \
            const el = document.querySelector({selector}); \
            if (!el) return false; \
            const style = window.getComputedStyle(el); \
            if (style.display === 'none' || style.visibility === 'hidden') return false; \
            const rect = el.getBoundingClientRect(); \
            return rect.width > 0 && rect.height > 0; \
        }})()"
    )
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(
        &self,
        url: &str,
        limit: Duration,
    ) -> Result<NavigationResponse, BrowserError> {
        let load = async {
            self.page.goto(url).await.map_err(|e| BrowserError::Navigation(e.to_string()))?;
            self.page
                .wait_for_navigation_response()
                .await
                .map_err(|e| BrowserError::Navigation(e.to_string()))
        };

        let request = timeout(limit, load)
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigation to {url} after {limit:?}")))??;

        let response = request
            .as_ref()
            .and_then(|request| request.response.as_ref())
            .ok_or_else(|| BrowserError::Navigation(format!("no response from {url}")))?;

        Ok(NavigationResponse::new(
            response.url.clone(),
            u16::try_from(response.status).unwrap_or(0),
        ))
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        while !self.is_visible(selector).await? {
            sleep(POLL_INTERVAL).await;
        }
        debug!(selector, "selector visible");
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<(), BrowserError> {
        let since = Instant::now();
        let deadline = since + self.idle_cap;
        while !self.network_idle(since) {
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "network not idle after {:?}",
                    self.idle_cap
                )));
            }
            sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        let closed = browser.close().await.map(|_| ()).map_err(protocol);
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }

        if let Ok(tasks) = self.tasks.lock() {
            for task in tasks.iter() {
                task.abort();
            }
        }
        closed
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.lock() {
            for task in tasks.iter() {
                task.abort();
            }
        }
    }
}
