//! Output sink port for live server output passthrough.
//!
//! This port abstracts where the supervised server's output is echoed, so the
//! CLI can prefix and color lines while tests collect or discard them.

use crate::domain::StreamKind;

/// Port for forwarding server output lines for live visibility.
///
/// Implementations should be thread-safe and non-blocking where possible.
pub trait OutputSinkPort: Send + Sync {
    /// Forward one raw line (without trailing newline) from `stream`.
    fn forward(&self, stream: StreamKind, line: &str);

    /// Report a server lifecycle step ("Starting dev server with: ...").
    ///
    /// Shown to the user regardless of the log level.
    fn status(&self, message: &str) {
        let _ = message;
    }
}
