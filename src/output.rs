//! CLI output formatting.
//!
//! Output is **thumbnail-centric**: every line leads with the key the
//! thumbnail is stored under, and the source file name (when there is one) is
//! shown as indented context.
//!
//! # Output Format
//!
//! ## Events (as they happen)
//!
//! ```text
//! Store created (version 1)
//! thumbdrop_171803123456742:image/png
//!     Source: dawn.png
//! FAILED notes.txt: UnsupportedFileType: unsupported file type: text/plain
//! ```
//!
//! ## Ingest summary
//!
//! ```text
//! Ingested 2 of 3 files (1 rejected)
//!     Presented: 2
//!     Persisted: 2
//!     Failures: 1
//! ```
//!
//! ## List
//!
//! ```text
//! 001 thumbdrop_171803123456742:image/png (2.1 KB)
//! 002 thumbdrop_171803123456813:image/jpeg (1.4 KB)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::diagnostics::PipelineEvent;
use crate::loader::LoadReport;
use crate::media::parse_data_uri;
use crate::pipeline::IngestReport;
use crate::store::{OpenOutcome, StoreRecord};
use serde::Serialize;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Format a single diagnostic event as display lines.
pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::StoreOpened(outcome) => vec![match outcome {
            OpenOutcome::Opened => "Store opened".to_string(),
            OpenOutcome::Upgraded { from: 0, to } => format!("Store created (version {})", to),
            OpenOutcome::Upgraded { from, to } => {
                format!("Store upgraded (version {} → {})", from, to)
            }
            OpenOutcome::AlreadyOpen => "Store already open".to_string(),
        }],
        PipelineEvent::StoreReset => vec!["Store reset".to_string()],
        PipelineEvent::Presented { key, name } => {
            vec![key.to_string(), format!("    Source: {}", name)]
        }
        PipelineEvent::Persisted { key } => vec![format!("    Stored: {}", key)],
        PipelineEvent::Replayed { key } => vec![format!("{} (cached)", key)],
        PipelineEvent::Failed {
            subject,
            kind,
            message,
        } => vec![format!("FAILED {}: {}: {}", subject, kind, message)],
    }
}

pub fn print_event(event: &PipelineEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Summaries
// ============================================================================

pub fn format_ingest_report(report: &IngestReport) -> Vec<String> {
    let total = report.accepted + report.rejected.len();
    let mut header = format!("Ingested {} of {} files", report.accepted, total);
    if !report.rejected.is_empty() {
        header.push_str(&format!(" ({} rejected)", report.rejected.len()));
    }

    let mut lines = vec![header];
    lines.push(format!("    Presented: {}", report.presented.len()));
    lines.push(format!("    Persisted: {}", report.persisted.len()));
    if !report.failures.is_empty() {
        lines.push(format!("    Failures: {}", report.failures.len()));
    }
    lines
}

pub fn print_ingest_report(report: &IngestReport) {
    for line in format_ingest_report(report) {
        println!("{}", line);
    }
}

pub fn format_load_report(report: &LoadReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Replayed {} of {} stored thumbnails",
        report.replayed.len(),
        report.records
    )];
    if !report.failures.is_empty() {
        lines.push(format!("    Failures: {}", report.failures.len()));
    }
    lines
}

pub fn print_load_report(report: &LoadReport) {
    for line in format_load_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Listing
// ============================================================================

/// One stored thumbnail, as `list --json` reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub key: String,
    pub media_type: Option<String>,
    /// Size of the decoded thumbnail; `None` if the value is not a data URI.
    pub bytes: Option<usize>,
}

impl RecordSummary {
    pub fn from_record(record: &StoreRecord) -> Self {
        Self {
            key: record.key.to_string(),
            media_type: record.key.media_type().map(str::to_string),
            bytes: parse_data_uri(&record.value).ok().map(|(_, b)| b.len()),
        }
    }
}

pub fn format_records(records: &[StoreRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["Store is empty".to_string()];
    }
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let summary = RecordSummary::from_record(record);
            match summary.bytes {
                Some(n) => format!("{} {} ({})", format_index(i + 1), summary.key, format_size(n)),
                None => format!("{} {} (unreadable)", format_index(i + 1), summary.key),
            }
        })
        .collect()
}

pub fn format_records_json(records: &[StoreRecord]) -> serde_json::Result<String> {
    let summaries: Vec<RecordSummary> = records.iter().map(RecordSummary::from_record).collect();
    serde_json::to_string_pretty(&summaries)
}

pub fn print_records(records: &[StoreRecord]) {
    for line in format_records(records) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ThumbnailKey;
    use crate::media::to_data_uri;
    use crate::pipeline::{ErrorKind, Failure};

    fn key(raw: &str) -> ThumbnailKey {
        ThumbnailKey::from(raw.to_string())
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }

    // =========================================================================
    // Event formatting tests
    // =========================================================================

    #[test]
    fn format_store_outcomes() {
        let created = PipelineEvent::StoreOpened(OpenOutcome::Upgraded { from: 0, to: 1 });
        assert_eq!(format_event(&created), vec!["Store created (version 1)"]);

        let upgraded = PipelineEvent::StoreOpened(OpenOutcome::Upgraded { from: 1, to: 2 });
        assert_eq!(format_event(&upgraded), vec!["Store upgraded (version 1 → 2)"]);

        let opened = PipelineEvent::StoreOpened(OpenOutcome::Opened);
        assert_eq!(format_event(&opened), vec!["Store opened"]);
    }

    #[test]
    fn format_presented_shows_source() {
        let event = PipelineEvent::Presented {
            key: key("t_15:image/png"),
            name: "dawn.png".to_string(),
        };
        assert_eq!(
            format_event(&event),
            vec!["t_15:image/png", "    Source: dawn.png"]
        );
    }

    #[test]
    fn format_failure_names_kind() {
        let event = PipelineEvent::Failed {
            subject: "notes.txt".to_string(),
            kind: ErrorKind::UnsupportedFileType,
            message: "unsupported file type: text/plain".to_string(),
        };
        assert_eq!(
            format_event(&event),
            vec!["FAILED notes.txt: UnsupportedFileType: unsupported file type: text/plain"]
        );
    }

    // =========================================================================
    // Summary formatting tests
    // =========================================================================

    #[test]
    fn format_ingest_report_with_rejections() {
        let report = IngestReport {
            accepted: 2,
            rejected: vec!["notes.txt".to_string()],
            presented: vec![key("a"), key("b")],
            persisted: vec![key("a"), key("b")],
            failures: vec![Failure {
                subject: "notes.txt".to_string(),
                kind: ErrorKind::UnsupportedFileType,
                message: String::new(),
            }],
        };
        assert_eq!(
            format_ingest_report(&report),
            vec![
                "Ingested 2 of 3 files (1 rejected)",
                "    Presented: 2",
                "    Persisted: 2",
                "    Failures: 1",
            ]
        );
    }

    #[test]
    fn format_ingest_report_clean() {
        let report = IngestReport {
            accepted: 1,
            presented: vec![key("a")],
            persisted: vec![key("a")],
            ..IngestReport::default()
        };
        assert_eq!(format_ingest_report(&report)[0], "Ingested 1 of 1 files");
        assert_eq!(format_ingest_report(&report).len(), 3);
    }

    #[test]
    fn format_load_report_counts() {
        let report = LoadReport {
            records: 2,
            replayed: vec![key("a"), key("b")],
            failures: vec![],
        };
        assert_eq!(
            format_load_report(&report),
            vec!["Replayed 2 of 2 stored thumbnails"]
        );
    }

    // =========================================================================
    // Listing tests
    // =========================================================================

    #[test]
    fn format_records_lists_keys_and_sizes() {
        let records = vec![
            StoreRecord {
                key: key("t_1:image/png"),
                value: to_data_uri("image/png", &[0u8; 100]),
            },
            StoreRecord {
                key: key("t_2:image/jpeg"),
                value: "garbage".to_string(),
            },
        ];
        assert_eq!(
            format_records(&records),
            vec!["001 t_1:image/png (100 B)", "002 t_2:image/jpeg (unreadable)"]
        );
    }

    #[test]
    fn format_records_empty() {
        assert_eq!(format_records(&[]), vec!["Store is empty"]);
    }

    #[test]
    fn format_records_json_shape() {
        let records = vec![StoreRecord {
            key: key("t_1:image/png"),
            value: to_data_uri("image/png", b"abc"),
        }];
        let json = format_records_json(&records).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["key"], "t_1:image/png");
        assert_eq!(parsed[0]["media_type"], "image/png");
        assert_eq!(parsed[0]["bytes"], 3);
    }
}
