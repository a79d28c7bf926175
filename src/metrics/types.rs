//! Data types produced by the metrics engine.

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::metrics::category::NpsCategory;
use crate::metrics::utility::pct;

/// Category counts and percentages over the records holding a valid score.
///
/// `nps_score` is `promoter_pct - detractor_pct`, unrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub promoters: usize,
    pub passives: usize,
    pub detractors: usize,
    pub promoter_pct: f64,
    pub passive_pct: f64,
    pub detractor_pct: f64,
    pub nps_score: f64,
}

impl CategoryBreakdown {
    /// Builds a breakdown from a sequence of categories. Returns `None` when
    /// the sequence is empty.
    pub fn from_categories(categories: impl IntoIterator<Item = NpsCategory>) -> Option<Self> {
        let (mut promoters, mut passives, mut detractors) = (0, 0, 0);
        for c in categories {
            match c {
                NpsCategory::Promoter => promoters += 1,
                NpsCategory::Passive => passives += 1,
                NpsCategory::Detractor => detractors += 1,
            }
        }

        let total = promoters + passives + detractors;
        if total == 0 {
            return None;
        }

        let promoter_pct = pct(promoters, total);
        let detractor_pct = pct(detractors, total);
        Some(CategoryBreakdown {
            promoters,
            passives,
            detractors,
            promoter_pct,
            passive_pct: pct(passives, total),
            detractor_pct,
            nps_score: promoter_pct - detractor_pct,
        })
    }

    pub fn total(&self) -> usize {
        self.promoters + self.passives + self.detractors
    }
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(ts: &NaiveDateTime) -> Self {
        MonthKey {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// NPS figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub month: MonthKey,
    /// Records timestamped in this month, with or without a score.
    pub responses: usize,
    /// Records in this month holding a valid score.
    pub total_valid: usize,
    pub mean_score: f64,
    #[serde(flatten)]
    pub breakdown: CategoryBreakdown,
}

/// Full result of the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpsSummary {
    pub total_valid: usize,
    /// `None` when no record holds a valid score.
    #[serde(flatten)]
    pub breakdown: Option<CategoryBreakdown>,
    pub monthly_trend: Vec<MonthlyBucket>,
    pub service_averages: BTreeMap<String, f64>,
    pub correlation_recommendation_retention: Option<f64>,
}

impl NpsSummary {
    pub fn empty() -> Self {
        NpsSummary {
            total_valid: 0,
            breakdown: None,
            monthly_trend: Vec::new(),
            service_averages: BTreeMap::new(),
            correlation_recommendation_retention: None,
        }
    }

    pub fn nps_score(&self) -> Option<f64> {
        self.breakdown.as_ref().map(|b| b.nps_score)
    }

    /// Most recent month in the trend.
    pub fn latest_month(&self) -> Option<&MonthlyBucket> {
        self.monthly_trend.last()
    }
}

/// A non-empty comment with the respondent's category, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentEntry {
    pub row: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub category: Option<NpsCategory>,
    pub text: String,
}
