//! Output formatting for run reports.
//!
//! The core hands a [`RunReport`](crate::types::RunReport) to a [`Reporter`]
//! without knowing which renderer is active. Three renderers are provided:
//! colorized terminal output, machine-readable JSON, and a self-contained
//! HTML document.

mod html;
mod json;
mod terminal;

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::types::{RunReport, TestResult};
use crate::util::truncate;
use serde_json::Value;
use std::io;
use std::time::Duration;

/// Renders a complete run report.
pub trait Reporter {
    /// Output the report to the reporter's destination.
    fn report(&mut self, report: &RunReport) -> io::Result<()>;
}

/// Human-readable duration: microseconds below 1ms, milliseconds below 1s,
/// fractional seconds above.
pub(crate) fn format_duration(d: Duration) -> String {
    if d < Duration::from_millis(1) {
        format!("{}µs", d.as_micros())
    } else if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

/// Compact rendering of one side of a diff; absent sides show `<missing>`.
pub(crate) fn format_value(value: Option<&Value>) -> String {
    match value {
        None => "<missing>".to_string(),
        Some(v) => truncate(&v.to_string(), 60),
    }
}

/// First non-empty provider label in a result set.
pub(crate) fn provider_of(results: &[TestResult]) -> &str {
    results
        .iter()
        .filter_map(|r| r.provider.as_deref())
        .find(|p| !p.is_empty())
        .unwrap_or("")
}
