//! Live passthrough of dev server output to the terminal.

use std::io::Write;

use console::style;
use startperf_core::{OutputSinkPort, StreamKind};

const PREFIX: &str = "[Server]";

/// Writes each server line with a colored `[Server]` tag: cyan on stdout,
/// red on stderr. Lifecycle status messages go to stdout untagged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

pub fn format_line(stream: StreamKind, line: &str) -> String {
    let tag = match stream {
        StreamKind::Stdout => style(PREFIX).cyan(),
        StreamKind::Stderr => style(PREFIX).for_stderr().red(),
    };
    format!("{tag} {line}")
}

impl OutputSinkPort for ConsoleSink {
    fn forward(&self, stream: StreamKind, line: &str) {
        let formatted = format_line(stream, line);
        // A closed terminal must not take the reader down
        let _ = match stream {
            StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{formatted}"),
            StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{formatted}"),
        };
    }

    fn status(&self, message: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_keeps_text_after_tag() {
        let line = format_line(StreamKind::Stdout, "compiled in 1.2s");
        assert!(line.ends_with("] compiled in 1.2s"));
        assert_eq!(console::strip_ansi_codes(&line), "[Server] compiled in 1.2s");
    }

    #[test]
    fn stderr_uses_same_tag() {
        let line = format_line(StreamKind::Stderr, "warning: unused import");
        assert_eq!(
            console::strip_ansi_codes(&line),
            "[Server] warning: unused import"
        );
    }
}
