//! Output formatting and persistence for NPS summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append of the
//! monthly trend.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::metrics::{CommentEntry, MonthlyBucket, NpsSummary};
use csv::WriterBuilder;
use std::fs::OpenOptions;

/// Logs the headline figures, one line per block, rounded for display.
pub fn print_pretty(summary: &NpsSummary) {
    debug!("{:#?}", summary);

    match &summary.breakdown {
        Some(b) => info!(
            nps = %format!("{:.1}", b.nps_score),
            promoters = %format!("{:.1}% ({})", b.promoter_pct, b.promoters),
            passives = %format!("{:.1}% ({})", b.passive_pct, b.passives),
            detractors = %format!("{:.1}% ({})", b.detractor_pct, b.detractors),
            total_valid = summary.total_valid,
            "NPS"
        ),
        None => info!("No valid responses"),
    }

    for bucket in &summary.monthly_trend {
        info!(
            month = %bucket.month,
            responses = bucket.responses,
            nps = %format!("{:.1}", bucket.breakdown.nps_score),
            mean_score = %format!("{:.1}/10", bucket.mean_score),
            "Monthly"
        );
    }

    for (service, avg) in &summary.service_averages {
        info!(service = %service, average = %format!("{avg:.2}"), "Service rating");
    }

    if let Some(r) = summary.correlation_recommendation_retention {
        info!(r = %format!("{r:.2}"), "Recommendation vs retention correlation");
    }
}

/// Logs recent comments with the respondent category.
pub fn print_comments(comments: &[CommentEntry]) {
    for c in comments {
        let date = c
            .timestamp
            .map(|t| t.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        let category = c.category.map(|c| c.to_string()).unwrap_or_default();
        info!(date = %date, category = %category, "{}", c.text);
    }
}

/// Logs a report (or any part of one) as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Flat CSV row for one month of the trend.
#[derive(Debug, Serialize)]
struct TrendRow {
    month: String,
    responses: usize,
    total_valid: usize,
    promoters: usize,
    passives: usize,
    detractors: usize,
    promoter_pct: f64,
    passive_pct: f64,
    detractor_pct: f64,
    nps_score: f64,
    mean_score: f64,
}

impl From<&MonthlyBucket> for TrendRow {
    fn from(b: &MonthlyBucket) -> Self {
        TrendRow {
            month: b.month.to_string(),
            responses: b.responses,
            total_valid: b.total_valid,
            promoters: b.breakdown.promoters,
            passives: b.breakdown.passives,
            detractors: b.breakdown.detractors,
            promoter_pct: b.breakdown.promoter_pct,
            passive_pct: b.breakdown.passive_pct,
            detractor_pct: b.breakdown.detractor_pct,
            nps_score: b.breakdown.nps_score,
            mean_score: b.mean_score,
        }
    }
}

/// Appends the monthly trend as rows to a CSV file.
///
/// Writes the header row only when the file is missing or empty.
pub fn append_trend(path: &str, trend: &[MonthlyBucket]) -> Result<()> {
    let has_content = std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    debug!(path, has_content, rows = trend.len(), "Appending trend rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!has_content)
        .from_writer(file);

    for bucket in trend {
        writer.serialize(TrendRow::from(bucket))?;
    }
    writer.flush()?;

    Ok(())
}
