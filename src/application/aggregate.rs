// Time-bucket and categorical aggregation over fetched records
use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::chart::ChartSeries;

/// Label substituted when a categorical field is absent or blank.
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// A fixed sequence of 12 month buckets, oldest first.
#[derive(Debug, Clone)]
pub struct MonthWindow {
    months: Vec<(i32, u32)>,
}

impl MonthWindow {
    pub const LENGTH: usize = 12;

    /// Window ending at `today`'s month, inclusive.
    pub fn rolling(today: NaiveDate) -> Self {
        let first_of_month =
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
        Self::starting_at(first_of_month - Months::new(Self::LENGTH as u32 - 1))
    }

    /// Jan..Dec of one calendar year.
    pub fn calendar_year(year: i32) -> Self {
        Self {
            months: (1..=12).map(|month| (year, month)).collect(),
        }
    }

    fn starting_at(start: NaiveDate) -> Self {
        let mut months = Vec::with_capacity(Self::LENGTH);
        let mut current = start;
        for _ in 0..Self::LENGTH {
            months.push((current.year(), current.month()));
            current = current + Months::new(1);
        }
        Self { months }
    }

    pub fn labels(&self) -> Vec<String> {
        self.months
            .iter()
            .map(|&(year, month)| month_label(year, month))
            .collect()
    }

    /// Count dates into the window's buckets.
    ///
    /// `None` dates and dates outside the window are dropped silently:
    /// undated records simply do not plot. Output is always exactly 12
    /// index-aligned labels and counts.
    pub fn bucket(
        &self,
        name: &str,
        dates: impl IntoIterator<Item = Option<NaiveDate>>,
    ) -> ChartSeries {
        let mut values = vec![0i64; self.months.len()];
        for date in dates.into_iter().flatten() {
            let key = (date.year(), date.month());
            if let Some(idx) = self.months.iter().position(|&bucket| bucket == key) {
                values[idx] += 1;
            }
        }
        ChartSeries::new(name, self.labels(), values)
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

/// Count occurrences of a possibly-missing categorical value.
///
/// Labels come out in first-seen order, so output is deterministic for a
/// fixed input ordering. Absent and blank values count under `placeholder`.
/// No cardinality cap; display limits are the caller's concern.
pub fn count_by_category<'a>(
    name: &str,
    values: impl IntoIterator<Item = Option<&'a str>>,
    placeholder: &str,
) -> ChartSeries {
    let mut labels: Vec<String> = Vec::new();
    let mut counts: Vec<i64> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        let label = match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => placeholder,
        };
        match index.get(label) {
            Some(&idx) => counts[idx] += 1,
            None => {
                index.insert(label.to_string(), labels.len());
                labels.push(label.to_string());
                counts.push(1);
            }
        }
    }

    ChartSeries::new(name, labels, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rolling_window_is_twelve_months_ending_now() {
        let window = MonthWindow::rolling(date(2025, 6, 15));
        let labels = window.labels();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels.first().map(String::as_str), Some("Jul 2024"));
        assert_eq!(labels.last().map(String::as_str), Some("Jun 2025"));
    }

    #[test]
    fn test_rolling_window_spans_year_boundary() {
        let window = MonthWindow::rolling(date(2025, 2, 1));
        let labels = window.labels();
        assert_eq!(labels[0], "Mar 2024");
        assert_eq!(labels[10], "Jan 2025");
        assert_eq!(labels[11], "Feb 2025");
    }

    #[test]
    fn test_calendar_year_window() {
        let window = MonthWindow::calendar_year(2023);
        let labels = window.labels();
        assert_eq!(labels.first().map(String::as_str), Some("Jan 2023"));
        assert_eq!(labels.last().map(String::as_str), Some("Dec 2023"));
    }

    #[test]
    fn test_bucket_counts_are_index_aligned() {
        let window = MonthWindow::calendar_year(2024);
        let series = window.bucket(
            "Uploads",
            vec![
                Some(date(2024, 1, 5)),
                Some(date(2024, 1, 28)),
                Some(date(2024, 12, 31)),
                Some(date(2023, 12, 31)), // outside the window
                None,                     // undated
            ],
        );
        assert_eq!(series.labels.len(), 12);
        assert_eq!(series.values().len(), 12);
        assert_eq!(series.values()[0], 2);
        assert_eq!(series.values()[11], 1);
        assert_eq!(series.total(), 3);
    }

    #[test]
    fn test_rolling_window_edge_eleven_months_in_twelve_out() {
        let today = date(2025, 6, 15);
        let window = MonthWindow::rolling(today);
        let series = window.bucket(
            "Filings",
            vec![
                Some(date(2024, 7, 1)),  // 11 months back, first bucket
                Some(date(2024, 6, 30)), // 12 months back, dropped
            ],
        );
        assert_eq!(series.values()[0], 1);
        assert_eq!(series.total(), 1);
    }

    #[test]
    fn test_count_by_category_first_seen_order_with_placeholder() {
        let series = count_by_category(
            "Documents",
            vec![Some("A"), Some("A"), Some("B"), None],
            UNSPECIFIED_LABEL,
        );
        assert_eq!(series.labels, vec!["A", "B", "Unspecified"]);
        assert_eq!(series.values(), &[2, 1, 1]);
    }

    #[test]
    fn test_count_by_category_blank_counts_as_placeholder() {
        let series = count_by_category("Status", vec![Some("  "), Some("Filed")], UNSPECIFIED_LABEL);
        assert_eq!(series.labels, vec!["Unspecified", "Filed"]);
        assert_eq!(series.values(), &[1, 1]);
    }
}
