use std::collections::BTreeMap;

use crate::metrics::types::{CategoryBreakdown, MonthKey, MonthlyBucket};
use crate::metrics::utility::mean;
use crate::normalize::NormalizedRecord;

/// Groups records by calendar month of their timestamp and computes NPS
/// figures per month.
///
/// Records without a timestamp are skipped. Months with no valid score are
/// omitted. The result is in ascending chronological order.
pub fn monthly_trend(records: &[NormalizedRecord]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<MonthKey, Vec<&NormalizedRecord>> = BTreeMap::new();
    for record in records {
        if let Some(ts) = &record.timestamp {
            months.entry(MonthKey::of(ts)).or_default().push(record);
        }
    }

    months
        .into_iter()
        .filter_map(|(month, rows)| {
            let scores: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.recommendation_score.map(f64::from))
                .collect();
            let breakdown = CategoryBreakdown::from_categories(rows.iter().filter_map(|r| r.category()))?;
            Some(MonthlyBucket {
                month,
                responses: rows.len(),
                total_valid: breakdown.total(),
                mean_score: mean(&scores)?,
                breakdown,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{at, record};

    #[test]
    fn test_buckets_are_chronological() {
        let records = vec![
            at(record(0, Some(10), None), 2024, 3, 5),
            at(record(1, Some(2), None), 2023, 12, 31),
            at(record(2, Some(8), None), 2024, 1, 15),
            at(record(3, Some(9), None), 2024, 3, 20),
        ];
        let trend = monthly_trend(&records);
        let months: Vec<String> = trend.iter().map(|b| b.month.to_string()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);

        let march = &trend[2];
        assert_eq!(march.total_valid, 2);
        assert_eq!(march.breakdown.promoter_pct, 100.0);
        assert_eq!(march.breakdown.nps_score, 100.0);
        assert_eq!(march.mean_score, 9.5);
    }

    #[test]
    fn test_null_timestamp_excluded() {
        let records = vec![
            record(0, Some(10), None),
            at(record(1, Some(3), None), 2024, 2, 1),
        ];
        let trend = monthly_trend(&records);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].breakdown.detractors, 1);
    }

    #[test]
    fn test_month_without_valid_score_omitted() {
        let records = vec![
            at(record(0, None, Some(5)), 2024, 1, 10),
            at(record(1, Some(7), None), 2024, 2, 10),
            at(record(2, None, None), 2024, 2, 11),
        ];
        let trend = monthly_trend(&records);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].month.to_string(), "2024-02");
        assert_eq!(trend[0].responses, 2);
        assert_eq!(trend[0].total_valid, 1);
        assert_eq!(trend[0].breakdown.passive_pct, 100.0);
    }
}
