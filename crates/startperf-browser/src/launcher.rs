//! Chromium process launch.

use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures_util::StreamExt;
use startperf_core::{BrowserError, BrowserLauncher, BrowserSession, Timeouts};
use tracing::{debug, info};

use crate::config::LaunchConfig;
use crate::session::ChromiumSession;

/// Launches a local Chrome/Chromium for each measurement.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: LaunchConfig,
    timeouts: Timeouts,
}

impl ChromiumLauncher {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            timeouts: Timeouts::default(),
        }
    }

    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn browser_config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                ..Viewport::default()
            });
        if !self.config.headless {
            builder = builder.with_head();
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, BrowserError> {
        info!(headless = self.config.headless, "Launching browser...");

        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while this is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler error");
                }
            }
            debug!("CDP handler stopped");
        });

        let session = ChromiumSession::open(browser, handler_task, &self.config, &self.timeouts)
            .await?;
        Ok(Arc::new(session))
    }
}
