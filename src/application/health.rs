// Compliance health scoring over the fixed per-customer areas
use chrono::NaiveDate;

use crate::domain::chart::ChartSeries;
use crate::domain::customer::ComplianceArea;
use crate::domain::dashboard::HealthReport;

/// Base score per status keyword, checked in priority order.
///
/// Matching is by substring, not equality, so vocabulary variants like
/// "Certificate Issued" and "Issued" land on the same score.
const STATUS_SCORES: &[(&str, i64)] = &[
    ("issued", 95),
    ("certificate issued", 95),
    ("compliant", 95),
    ("standard", 90),
    ("temporary", 75),
    ("applied", 55),
    ("pending", 50),
    ("none", 30),
    ("not applicable", 60),
    ("na", 60),
];

const EXPIRED_PENALTY: i64 = 20;
const UNMATCHED_SCORE: i64 = 65;
const EMPTY_SCORE: i64 = 30;

/// Base score for one status string, before the expiry penalty.
pub fn score_from_status(status: &str) -> i64 {
    let normalized = status.trim().to_lowercase();
    if normalized.is_empty() {
        return EMPTY_SCORE;
    }
    for (keyword, score) in STATUS_SCORES {
        if normalized.contains(keyword) {
            return *score;
        }
    }
    UNMATCHED_SCORE
}

/// Score one compliance area: status base score, minus the expiry penalty
/// when the area is already past its expiry date, floored at 0.
pub fn area_score(area: &ComplianceArea, today: NaiveDate) -> i64 {
    let mut score = score_from_status(&area.status);
    if area.expiry.is_some_and(|expiry| expiry < today) {
        score = (score - EXPIRED_PENALTY).max(0);
    }
    score
}

/// Overall health: arithmetic mean of the area scores, rounded to the
/// nearest integer. Zero areas score 0. Always within [0, 100].
pub fn health_report(areas: &[ComplianceArea], today: NaiveDate) -> HealthReport {
    let scores: Vec<(String, i64)> = areas
        .iter()
        .map(|area| (area.label.clone(), area_score(area, today)))
        .collect();

    let score = if scores.is_empty() {
        0
    } else {
        let sum: i64 = scores.iter().map(|(_, s)| s).sum();
        (sum as f64 / scores.len() as f64).round() as i64
    };

    let (labels, values): (Vec<String>, Vec<i64>) = scores.into_iter().unzip();
    HealthReport {
        score,
        area_breakdown: ChartSeries::new("Compliance", labels, values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(label: &str, status: &str, expiry: Option<NaiveDate>) -> ComplianceArea {
        ComplianceArea {
            label: label.to_string(),
            status: status.to_string(),
            expiry,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_table_substring_matching() {
        assert_eq!(score_from_status("Certificate Issued"), 95);
        assert_eq!(score_from_status("Issued"), 95);
        assert_eq!(score_from_status("Fully Compliant"), 95);
        assert_eq!(score_from_status("Standard Permit"), 90);
        assert_eq!(score_from_status("Temporary"), 75);
        assert_eq!(score_from_status("Applied"), 55);
        assert_eq!(score_from_status("Pending Review"), 50);
        assert_eq!(score_from_status("Not Applicable"), 60);
        assert_eq!(score_from_status("None"), 30);
        assert_eq!(score_from_status(""), 30);
        assert_eq!(score_from_status("   "), 30);
        assert_eq!(score_from_status("Under Dispute"), 65);
    }

    #[test]
    fn test_expired_area_loses_twenty_points() {
        let today = date(2025, 6, 15);
        let expired = area("Tender", "Certificate Issued", Some(date(2025, 6, 14)));
        assert_eq!(area_score(&expired, today), 75);

        // expiring today is not yet expired
        let due_today = area("Tender", "Certificate Issued", Some(today));
        assert_eq!(area_score(&due_today, today), 95);
    }

    #[test]
    fn test_expiry_penalty_floors_at_zero() {
        // no status keyword can score below the penalty, so exercise the
        // floor with the lowest base score
        let today = date(2025, 6, 15);
        let worst = area("Land", "None", Some(date(2020, 1, 1)));
        assert_eq!(area_score(&worst, today), 10);
        assert!(area_score(&worst, today) >= 0);
    }

    #[test]
    fn test_overall_score_is_rounded_mean() {
        let today = date(2025, 6, 15);
        let areas = vec![
            area("Tender", "Issued", None),       // 95
            area("Land", "Pending", None),        // 50
            area("Work Permit", "Standard", None), // 90
            area("Firearm", "", None),            // 30
        ];
        let report = health_report(&areas, today);
        // mean of 95, 50, 90, 30 = 66.25 -> 66
        assert_eq!(report.score, 66);
        assert_eq!(report.area_breakdown.labels.len(), 4);
        assert_eq!(report.area_breakdown.values(), &[95, 50, 90, 30]);
    }

    #[test]
    fn test_zero_areas_scores_zero() {
        let report = health_report(&[], date(2025, 1, 1));
        assert_eq!(report.score, 0);
        assert!(report.area_breakdown.labels.is_empty());
    }

    #[test]
    fn test_score_always_within_bounds() {
        let today = date(2025, 6, 15);
        let statuses = ["Issued", "Pending", "None", "???", "", "Temporary"];
        for status in statuses {
            for expiry in [None, Some(date(2000, 1, 1)), Some(date(2100, 1, 1))] {
                let report = health_report(&[area("Tender", status, expiry)], today);
                assert!((0..=100).contains(&report.score), "status {status:?}");
            }
        }
    }
}
