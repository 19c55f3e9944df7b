//! Human readable report.
//!
//! Layout:
//! - snapshot summary block (metadata, totals, identity counts)
//! - one PASSED/FAILED line per check that ran
//! - an indented line per mismatched source, the failure cause and the
//!   computed digest when a check failed

use crate::store::Summary;
use crate::util::{format_bytes, format_count};
use crate::verify::{Failure, Report, SourceCheck, Verification};
use crate::error::FailureKind;

pub fn render(report: &Report) -> String {
    let mut output = String::new();

    if !report.format.passed() {
        render_format_failure(&mut output, report);
        return output;
    }

    match &report.summary {
        Some(summary) => render_summary(&mut output, summary),
        None => output.push_str("\nNo snapshot_info row found.\n"),
    }

    if let Some(content) = &report.content {
        render_check(
            &mut output,
            "Logical Content Integrity",
            content,
            &[
                ("INTERNAL MISMATCH", &content.evidence().internal),
                ("CONTENT SIDECAR MISMATCH", &content.evidence().sidecar),
                ("CLI HASH MISMATCH", &content.evidence().external),
            ],
            content.evidence().computed.as_deref(),
        );
    }

    if let Some(file) = &report.file {
        render_check(
            &mut output,
            "Physical File Integrity",
            file,
            &[
                ("SIDECAR MISMATCH", &file.evidence().sidecar),
                ("CLI HASH MISMATCH", &file.evidence().external),
            ],
            file.evidence().computed.as_deref(),
        );
    }

    output
}

fn render_format_failure(output: &mut String, report: &Report) {
    output.push_str(&format!("[FAIL] Format Integrity: FAILED ({})\n", report.name));
    if let Some(gate) = report.format.evidence().failed_gate {
        output.push_str(&format!("   - failed gate: {gate:?}\n"));
    }
    if let Some(failure) = report.format.failure() {
        output.push_str(&format!("   - [!] {}\n", failure.message));
    }
}

fn render_summary(output: &mut String, summary: &Summary) {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    let count = |v: Option<i64>| v.map(format_count).unwrap_or_else(|| "N/A".to_string());

    let created = summary
        .scan_start
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let duration = summary
        .duration_ms()
        .map(|ms| format!("{:.2}s", ms as f64 / 1000.0))
        .unwrap_or_else(|| "N/A".to_string());

    let size = summary
        .total_size
        .map(|s| format_bytes(s.max(0) as u64))
        .unwrap_or_else(|| "N/A".to_string());

    output.push_str("\n--- Snapshot Summary ---\n");
    output.push_str(&format!("- Version:       {}\n", text(&summary.version)));
    output.push_str(&format!("- Target Path:   {}\n", text(&summary.root_path)));
    // scan_start is epoch millis, always shown in UTC next to the recorded zone
    output.push_str(&format!("- Created On:    {created}\n"));
    output.push_str(&format!("- Time Zone:     {}\n", text(&summary.time_zone)));
    output.push_str(&format!("- Platform:      {}\n", text(&summary.os_platform)));
    output.push_str(&format!("- Duration:      {duration}\n"));
    output.push_str(&"-".repeat(43));
    output.push('\n');
    output.push_str(&format!("- Total Entries: {}\n", count(summary.total_entries)));
    output.push_str(&format!("  - Files:       {}\n", count(summary.total_files)));
    output.push_str(&format!("  - Dirs:        {}\n", count(summary.total_dirs)));
    output.push_str(&format!("  - Links:       {}\n", count(summary.total_links)));
    output.push_str(&format!("- Data Size:     {size}\n"));
    output.push_str(&format!("- Errors:        {}\n", count(summary.total_errors)));
    output.push_str(&format!("- Content Hash:  {}\n", text(&summary.snapshot_hash)));
    output.push_str(&"-".repeat(43));
    output.push('\n');
    output.push_str("- Auth Metadata:\n");
    output.push_str(&format!("  - Users:       {}\n", summary.user_count));
    output.push_str(&format!("  - Groups:      {}\n", summary.group_count));
    output.push('\n');
}

fn render_check<E>(
    output: &mut String,
    title: &str,
    result: &Verification<E>,
    sources: &[(&str, &SourceCheck)],
    computed: Option<&str>,
) {
    if result.passed() {
        output.push_str(&format!("[PASS] {title}: PASSED\n"));
        return;
    }

    output.push_str(&format!("[FAIL] {title}: FAILED\n"));

    for (label, source) in sources {
        if source.is_mismatch() {
            let expected = source.expected.as_deref().unwrap_or_default();
            output.push_str(&format!("   - [{label}] Expected: {expected}\n"));
        }
    }

    if let Some(Failure { kind, message }) = result.failure() {
        if *kind != FailureKind::HashMismatch {
            output.push_str(&format!("   - [!] {message}\n"));
        }
    }

    if let Some(computed) = computed {
        output.push_str(&format!("   - Actual Calculated: {computed}\n"));
    }
}
