//! Async stream line readers (non-UTF8-safe).
//!
//! Bundlers and compilers can emit non-UTF8 bytes on stdout/stderr. Using
//! `BufReader::lines()` would terminate the reader task on invalid UTF-8, so
//! lines are read as bytes and decoded lossily.
//!
//! Every line is pushed onto the watcher channel and, unless blank, forwarded
//! to the passthrough sink.

use std::sync::Arc;

use startperf_core::{OutputLine, OutputSinkPort, StreamKind};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    kind: StreamKind,
    sink: Arc<dyn OutputSinkPort>,
    lines: mpsc::UnboundedSender<OutputLine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    // Trim trailing newline(s)
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if !line.trim().is_empty() {
                        sink.forward(kind, &line);
                    }

                    // The watcher hangs up once readiness is decided; keep
                    // draining so passthrough continues and the pipe never fills.
                    let _ = lines.send(OutputLine::new(kind, line));
                }
                Err(e) => {
                    debug!(stream = %kind, error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(stream = %kind, "output reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::sink::tests::CollectingSink;

    #[tokio::test]
    async fn splits_chunks_into_lines() {
        let stream = tokio_test::io::Builder::new()
            .read(b"Building...\nListening on http://local")
            .read(b"host:4200\r\n\n")
            .read(b"tail without newline")
            .build();
        let sink = Arc::new(CollectingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_stream_reader(stream, StreamKind::Stdout, sink.clone(), tx)
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(line) = rx.recv().await {
            assert_eq!(line.stream, StreamKind::Stdout);
            received.push(line.text);
        }
        assert_eq!(
            received,
            vec![
                "Building...",
                "Listening on http://localhost:4200",
                "",
                "tail without newline"
            ]
        );

        // Blank lines are not echoed
        assert_eq!(sink.lines().len(), 3);
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let stream = tokio_test::io::Builder::new()
            .read(b"bad \xff byte\nok\n")
            .build();
        let sink = Arc::new(CollectingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_stream_reader(stream, StreamKind::Stderr, sink.clone(), tx)
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().text, "bad \u{FFFD} byte");
        assert_eq!(rx.recv().await.unwrap().text, "ok");
        assert_eq!(
            sink.lines()[1],
            (StreamKind::Stderr, "ok".to_string())
        );
    }

    #[tokio::test]
    async fn keeps_forwarding_after_receiver_hangs_up() {
        let stream = tokio_test::io::Builder::new()
            .read(b"one\ntwo\nthree\n")
            .build();
        let sink = Arc::new(CollectingSink::default());
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        spawn_stream_reader(stream, StreamKind::Stdout, sink.clone(), tx)
            .await
            .unwrap();

        assert_eq!(sink.lines().len(), 3);
    }
}
