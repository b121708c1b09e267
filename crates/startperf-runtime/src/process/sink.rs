//! Output sink implementations owned by the runtime.

use startperf_core::{OutputSinkPort, StreamKind};

/// Sink that discards all passthrough output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOutputSink;

impl OutputSinkPort for NoopOutputSink {
    fn forward(&self, _stream: StreamKind, _line: &str) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every forwarded line.
    #[derive(Debug, Default)]
    pub(crate) struct CollectingSink {
        lines: Mutex<Vec<(StreamKind, String)>>,
        statuses: Mutex<Vec<String>>,
    }

    impl CollectingSink {
        pub(crate) fn lines(&self) -> Vec<(StreamKind, String)> {
            self.lines.lock().unwrap().clone()
        }

        pub(crate) fn statuses(&self) -> Vec<String> {
            self.statuses.lock().unwrap().clone()
        }
    }

    impl OutputSinkPort for CollectingSink {
        fn forward(&self, stream: StreamKind, line: &str) {
            self.lines.lock().unwrap().push((stream, line.to_string()));
        }

        fn status(&self, message: &str) {
            self.statuses.lock().unwrap().push(message.to_string());
        }
    }
}
