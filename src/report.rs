//! End-to-end pipeline: raw table in, summary and diagnostics out.

use serde::Serialize;
use tracing::warn;

use crate::columns::DiscoveryConfig;
use crate::error::Warning;
use crate::metrics::{CommentEntry, NpsSummary, recent_comments, summarize};
use crate::normalize::{NormalizedRecord, normalize};
use crate::table::RawTable;

/// Everything the presentation layer consumes for one load.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: NpsSummary,
    pub recent_comments: Vec<CommentEntry>,
    pub warnings: Vec<Warning>,
    #[serde(skip)]
    pub records: Vec<NormalizedRecord>,
}

/// Normalizes `raw` and computes its summary. Never fails: structural
/// problems show up as an empty summary plus a warning.
pub fn build_report(raw: &RawTable, config: &DiscoveryConfig, comment_limit: usize) -> Report {
    let normalized = normalize(raw, config);
    if !normalized.warnings.is_empty() {
        warn!(count = normalized.warnings.len(), "Ingestion warnings");
    }

    let summary = if normalized.records.is_empty() {
        NpsSummary::empty()
    } else {
        summarize(&normalized.records)
    };

    Report {
        summary,
        recent_comments: recent_comments(&normalized.records, comment_limit),
        warnings: normalized.warnings,
        records: normalized.records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;

    #[test]
    fn test_report_on_empty_source() {
        let report = build_report(&RawTable::default(), &DiscoveryConfig::default(), 5);
        assert_eq!(report.summary, NpsSummary::empty());
        assert_eq!(report.warnings[0].kind, WarningKind::EmptySource);
    }

    #[test]
    fn test_report_scores_and_comments() {
        let raw = RawTable::from_str_rows(&[
            &["Horodateur", "Recommandation", "Commentaire"],
            &["01/02/2024 10:00:00", "10", "Top"],
            &["02/02/2024 10:00:00", "8", ""],
            &["03/02/2024 10:00:00", "3", "Bof"],
        ]);
        let report = build_report(&raw, &DiscoveryConfig::default(), 1);
        assert_eq!(report.summary.total_valid, 3);
        assert_eq!(report.summary.nps_score(), Some(0.0));
        assert_eq!(report.recent_comments.len(), 1);
        assert_eq!(report.recent_comments[0].text, "Bof");
        assert_eq!(report.records.len(), 3);
    }

    #[test]
    fn test_report_json_carries_comments_and_warnings() {
        let raw = RawTable::from_str_rows(&[
            &["Horodateur", "Recommandation", "Commentaire"],
            &["01/02/2024 10:00:00", "10", "Top"],
            &["pas une date", "9", ""],
        ]);
        let report = build_report(&raw, &DiscoveryConfig::default(), 5);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["total_valid"], 2);
        assert_eq!(json["recent_comments"][0]["text"], "Top");
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
        assert!(json.get("records").is_none());
    }
}
