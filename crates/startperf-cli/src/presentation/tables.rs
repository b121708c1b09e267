//! Markdown results table.

use std::time::Duration;

use startperf_core::MeasurementResult;

const HEADERS: [&str; 4] = [
    "Dev Server Ready",
    "First Paint",
    "App Loaded",
    "Reload after change",
];

/// Milliseconds rounded half-up, with en-US digit grouping, e.g. `1,200 ms`.
pub fn format_ms(duration: Duration) -> String {
    let millis = (duration.as_micros() + 500) / 1000;
    let digits = millis.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped} ms")
}

/// One header row, a delimiter row and one value row. The reload column is
/// omitted when no reload was measured.
pub fn render_results(result: &MeasurementResult) -> String {
    let mut cells = vec![
        format_ms(result.server_ready_duration()),
        format_ms(result.first_paint_duration()),
        format_ms(result.app_load_duration()),
    ];
    if let Some(reload) = result.reload_duration() {
        cells.push(format_ms(reload));
    }
    let headers = &HEADERS[..cells.len()];

    let header = row(headers.iter().map(|h| (*h).to_string()));
    let delimiter = row(headers.iter().map(|h| "-".repeat(h.len())));
    let values = row(
        cells
            .iter()
            .zip(headers)
            .map(|(cell, h)| format!("{cell:<width$}", width = h.len())),
    );

    format!("{header}\n{delimiter}\n{values}")
}

/// Success banner followed by the table.
pub fn render_report(result: &MeasurementResult) -> String {
    format!(
        "\nMeasurement completed successfully!\n\n# Performance Results\n\n{}\n",
        render_results(result)
    )
}

fn row(cells: impl Iterator<Item = String>) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(&cell);
        line.push_str(" |");
    }
    line
}
