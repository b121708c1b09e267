//! Page diagnostics forwarded to the log: console errors and warnings,
//! uncaught exceptions, and failed HTTP responses.

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
};
use chromiumoxide::error::CdpError;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Statuses outside 2xx other than redirects the browser follows or
/// cache revalidations.
pub const fn is_failed_status(status: u16) -> bool {
    !matches!(status, 200..=299 | 302 | 304)
}

/// Subscribe to the page's diagnostic events. The returned tasks end when
/// the page goes away; abort them on close.
pub(crate) async fn attach(page: &Page) -> Result<Vec<JoinHandle<()>>, CdpError> {
    let mut console = page.event_listener::<EventConsoleApiCalled>().await?;
    let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
    let mut responses = page.event_listener::<EventResponseReceived>().await?;

    let console_task = tokio::spawn(async move {
        while let Some(event) = console.next().await {
            let text = join_args(&event.args);
            match event.r#type {
                ConsoleApiCalledType::Error => warn!("PAGE ERROR: {}", text),
                ConsoleApiCalledType::Warning => warn!("PAGE WARNING: {}", text),
                _ => {}
            }
        }
    });

    let exception_task = tokio::spawn(async move {
        while let Some(event) = exceptions.next().await {
            let details = &event.exception_details;
            let message = details
                .exception
                .as_ref()
                .and_then(|e| e.description.clone())
                .unwrap_or_else(|| details.text.clone());
            error!("PAGE ERROR: {}", message);
        }
    });

    let response_task = tokio::spawn(async move {
        while let Some(event) = responses.next().await {
            let status = u16::try_from(event.response.status).unwrap_or(0);
            if is_failed_status(status) {
                warn!(
                    "FAILED HTTP REQUEST TO {} Status: {}",
                    event.response.url, event.response.status
                );
            }
        }
    });

    Ok(vec![console_task, exception_task, response_task])
}

fn join_args(args: &[RemoteObject]) -> String {
    args.iter()
        .map(|arg| match (&arg.value, &arg.description) {
            (Some(serde_json::Value::String(s)), _) => s.clone(),
            (Some(value), _) => value.to_string(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_and_revalidation_are_not_failures() {
        assert!(!is_failed_status(200));
        assert!(!is_failed_status(204));
        assert!(!is_failed_status(302));
        assert!(!is_failed_status(304));
    }

    #[test]
    fn errors_and_other_redirects_are_failures() {
        assert!(is_failed_status(301));
        assert!(is_failed_status(404));
        assert!(is_failed_status(500));
        assert!(is_failed_status(0));
    }
}
