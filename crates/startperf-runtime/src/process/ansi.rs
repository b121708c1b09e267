//! ANSI escape stripping for readiness matching.
//!
//! Dev servers color their banners, so `http://localhost:4200` often arrives
//! as `\x1b[36mhttp://localhost:\x1b[1m4200\x1b[22m/`. Lines are normalized
//! before matching; passthrough output keeps the colors.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences (colors, cursor movement) and BEL-terminated OSC sequences
/// (titles, hyperlinks).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x1B\x{9B}][\[\]()#;?]*(?:(?:(?:(?:;[-a-zA-Z\d/#&.:=?%@~_]+)*|[a-zA-Z\d]+(?:;[-a-zA-Z\d/#&.:=?%@~_]*)*)?\x07)|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PR-TZcf-nq-uy=><~]))",
    )
    .expect("ANSI escape pattern is valid")
});

/// Remove ANSI escape sequences from `line`.
///
/// Borrows when the line contains no escapes.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}
