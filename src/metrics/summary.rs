use std::collections::BTreeMap;
use tracing::info;

use crate::metrics::trend::monthly_trend;
use crate::metrics::types::{CategoryBreakdown, NpsSummary};
use crate::metrics::utility::{mean, pearson};
use crate::normalize::NormalizedRecord;

/// Computes the overall breakdown, monthly trend, service averages and the
/// recommendation/retention correlation from normalized records.
///
/// Records without a recommendation score are left out of every percentage
/// but still feed the service averages.
pub fn summarize(records: &[NormalizedRecord]) -> NpsSummary {
    let breakdown = CategoryBreakdown::from_categories(records.iter().filter_map(|r| r.category()));
    let total_valid = breakdown.as_ref().map_or(0, CategoryBreakdown::total);

    let summary = NpsSummary {
        total_valid,
        breakdown,
        monthly_trend: monthly_trend(records),
        service_averages: service_averages(records),
        correlation_recommendation_retention: correlation(records),
    };

    info!(
        records = records.len(),
        total_valid,
        nps = ?summary.nps_score(),
        months = summary.monthly_trend.len(),
        "NPS summary computed"
    );

    summary
}

/// Mean of the parsed ratings per service. Services with no rating at all
/// are omitted.
pub fn service_averages(records: &[NormalizedRecord]) -> BTreeMap<String, f64> {
    let mut series: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in records {
        for (service, rating) in &record.service_ratings {
            let values = series.entry(service.as_str()).or_default();
            if let Some(v) = rating {
                values.push(*v);
            }
        }
    }

    series
        .into_iter()
        .filter_map(|(service, values)| mean(&values).map(|m| (service.to_string(), m)))
        .collect()
}

/// Pearson correlation between recommendation and retention scores over the
/// records where both are present.
pub fn correlation(records: &[NormalizedRecord]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((f64::from(r.recommendation_score?), f64::from(r.retention_score?))))
        .collect();
    pearson(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::record;

    #[test]
    fn test_three_way_split() {
        let records = vec![
            record(0, Some(10), None),
            record(1, Some(8), None),
            record(2, Some(3), None),
        ];
        let s = summarize(&records);
        let b = s.breakdown.as_ref().unwrap();

        assert_eq!(s.total_valid, 3);
        assert!((b.promoter_pct - 33.33).abs() < 0.01);
        assert!((b.passive_pct - 33.33).abs() < 0.01);
        assert!((b.detractor_pct - 33.33).abs() < 0.01);
        assert_eq!(b.nps_score, 0.0);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let records: Vec<_> = [0, 5, 6, 7, 7, 8, 9, 9, 10, 10, 10]
            .iter()
            .enumerate()
            .map(|(i, &s)| record(i, Some(s), None))
            .collect();
        let b = summarize(&records).breakdown.unwrap();

        assert!((b.promoter_pct + b.passive_pct + b.detractor_pct - 100.0).abs() < 1e-9);
        assert_eq!(b.nps_score, b.promoter_pct - b.detractor_pct);
    }

    #[test]
    fn test_nps_keeps_two_decimals() {
        // 2 promoters, 1 passive, 4 detractors: 28.571... - 57.142... = -28.571...
        let records: Vec<_> = [10, 9, 7, 1, 2, 3, 4]
            .iter()
            .enumerate()
            .map(|(i, &s)| record(i, Some(s), None))
            .collect();
        let nps = summarize(&records).nps_score().unwrap();
        assert_eq!((nps * 100.0).round() / 100.0, -28.57);
    }

    #[test]
    fn test_all_null_scores() {
        let records = vec![record(0, None, None), record(1, None, Some(4))];
        let s = summarize(&records);
        assert_eq!(s.total_valid, 0);
        assert!(s.breakdown.is_none());
        assert!(s.nps_score().is_none());
        assert!(s.monthly_trend.is_empty());
    }

    #[test]
    fn test_null_scores_excluded_from_denominator() {
        let records = vec![record(0, Some(10), None), record(1, None, None)];
        let s = summarize(&records);
        assert_eq!(s.total_valid, 1);
        assert_eq!(s.breakdown.unwrap().promoter_pct, 100.0);
    }

    #[test]
    fn test_service_averages_ignore_nulls_and_omit_empty() {
        let mut a = record(0, Some(9), None);
        a.service_ratings.insert("Piscine".into(), Some(4.0));
        a.service_ratings.insert("Accueil".into(), None);
        let mut b = record(1, None, None);
        b.service_ratings.insert("Piscine".into(), Some(2.0));
        b.service_ratings.insert("Accueil".into(), None);
        let mut c = record(2, Some(5), None);
        c.service_ratings.insert("Piscine".into(), None);
        c.service_ratings.insert("Accueil".into(), None);

        let avg = service_averages(&[a, b, c]);
        assert_eq!(avg.get("Piscine"), Some(&3.0));
        assert!(!avg.contains_key("Accueil"));
    }

    #[test]
    fn test_correlation_null_below_two_pairs() {
        let records = vec![
            record(0, Some(10), Some(9)),
            record(1, Some(8), None),
            record(2, None, Some(2)),
        ];
        assert_eq!(correlation(&records), None);
    }

    #[test]
    fn test_correlation_over_paired_records() {
        let records = vec![
            record(0, Some(10), Some(10)),
            record(1, Some(5), Some(5)),
            record(2, Some(0), Some(0)),
            record(3, Some(7), None),
        ];
        let r = correlation(&records).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }
}
