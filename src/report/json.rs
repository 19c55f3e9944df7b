//! JSON output for verification reports.
//!
//! Serializes the whole Report, checks that did not run as null.

use crate::verify::Report;

pub fn render(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
