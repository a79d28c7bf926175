//! Ingestion normalizer: turns a [`RawTable`] into typed survey records.
//!
//! Field-level failures degrade the single field to null and are reported as
//! [`Warning`]s. Structural failures (no rows, no recommendation column) yield
//! an empty record set plus one warning instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::columns::{ColumnMap, DiscoveryConfig};
use crate::error::{IngestError, Warning};
use crate::metrics::category::NpsCategory;
use crate::table::{CleanTable, RawTable};

/// Primary timestamp layout written by the survey form.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const FALLBACK_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Highest valid value for a 0–10 score.
pub const MAX_SCORE: u8 = 10;

fn digits_re() -> &'static Regex {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    DIGITS_RE.get_or_init(|| Regex::new(r"\d+").expect("valid digit-run regex"))
}

/// One cleaned survey response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// Zero-based data row index in the source.
    pub row: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub recommendation_score: Option<u8>,
    pub retention_score: Option<u8>,
    /// Every discovered service column, keyed by its header.
    pub service_ratings: BTreeMap<String, Option<f64>>,
    pub comment_text: Option<String>,
    pub comment_retention_text: Option<String>,
}

impl NormalizedRecord {
    /// Recomputed from the score on every call; never stored.
    pub fn category(&self) -> Option<NpsCategory> {
        self.recommendation_score.map(NpsCategory::from_score)
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub warnings: Vec<Warning>,
}

/// Returns the first run of ASCII digits in `raw`, parsed as an integer.
///
/// `"9 - Extrêmement probable"` gives `Some(9)`; `"Pas de note"` gives `None`.
/// A run too long for `u32` also gives `None`.
pub fn extract_number(raw: &str) -> Option<u32> {
    digits_re().find(raw)?.as_str().parse().ok()
}

/// Parses a timestamp with [`TIMESTAMP_FORMAT`], then falls back to a set of
/// common layouts (ISO 8601, RFC 3339, RFC 2822, date-only).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    parse_timestamp_fallback(raw)
}

fn parse_timestamp_fallback(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.naive_local());
    }
    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalizes a raw table using the given discovery config.
///
/// Record order follows source row order. The record set is rebuilt in full
/// on every call.
pub fn normalize(raw: &RawTable, config: &DiscoveryConfig) -> Normalized {
    match try_normalize(raw, config) {
        Ok(out) => out,
        Err(err) => {
            warn!(error = %err, "Normalization produced an empty record set");
            Normalized {
                records: Vec::new(),
                warnings: vec![Warning::from_error(&err)],
            }
        }
    }
}

fn try_normalize(raw: &RawTable, config: &DiscoveryConfig) -> Result<Normalized, IngestError> {
    if raw.is_empty() {
        return Err(IngestError::EmptySource);
    }

    let table = CleanTable::from_raw(raw);
    if !table.pruned.is_empty() {
        debug!(pruned = ?table.pruned, "Dropped empty columns");
    }

    let columns = config.discover(&table.headers)?;
    let mut builder = RecordBuilder {
        table: &table,
        columns: &columns,
        warnings: Vec::new(),
    };

    let records = (0..table.rows.len()).map(|row| builder.build(row)).collect();

    Ok(Normalized {
        records,
        warnings: builder.warnings,
    })
}

struct RecordBuilder<'a> {
    table: &'a CleanTable,
    columns: &'a ColumnMap,
    warnings: Vec<Warning>,
}

impl RecordBuilder<'_> {
    fn build(&mut self, row: usize) -> NormalizedRecord {
        let columns = self.columns;

        let timestamp = columns.timestamp.and_then(|c| self.timestamp(row, c));
        let recommendation_score = self.score(row, columns.recommendation);
        let retention_score = columns.retention.and_then(|c| self.score(row, c));

        let service_ratings = columns
            .services
            .iter()
            .map(|&c| (self.table.headers[c].clone(), self.rating(row, c)))
            .collect();

        let comment_text = columns.comment.and_then(|c| text(self.table.value(row, c)));
        let comment_retention_text = columns
            .retention_comment
            .and_then(|c| text(self.table.value(row, c)));

        NormalizedRecord {
            row,
            timestamp,
            recommendation_score,
            retention_score,
            service_ratings,
            comment_text,
            comment_retention_text,
        }
    }

    fn warn(&mut self, row: usize, col: usize, message: String) {
        let warning = Warning::parse(row, &self.table.headers[col], message);
        debug!(%warning, "Field degraded to null");
        self.warnings.push(warning);
    }

    fn timestamp(&mut self, row: usize, col: usize) -> Option<NaiveDateTime> {
        let table = self.table;
        let raw = table.value(row, col);
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            self.warn(row, col, format!("unparseable date '{raw}'"));
        }
        parsed
    }

    fn score(&mut self, row: usize, col: usize) -> Option<u8> {
        let table = self.table;
        let raw = table.value(row, col);
        if raw.trim().is_empty() {
            return None;
        }
        match extract_number(raw) {
            Some(n) if n <= u32::from(MAX_SCORE) => u8::try_from(n).ok(),
            Some(_) => {
                self.warn(row, col, format!("score out of range 0-{MAX_SCORE}: '{raw}'"));
                None
            }
            None => {
                self.warn(row, col, format!("no numeric score in '{raw}'"));
                None
            }
        }
    }

    fn rating(&mut self, row: usize, col: usize) -> Option<f64> {
        let table = self.table;
        let raw = table.value(row, col);
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = extract_number(raw).map(f64::from);
        if parsed.is_none() {
            self.warn(row, col, format!("no numeric rating in '{raw}'"));
        }
        parsed
    }
}
