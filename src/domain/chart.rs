// Chart series value objects (frappe-charts wire shape)
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartDataset {
    pub name: String,
    pub values: Vec<i64>,
}

/// An ordered label/value series backing one dashboard chart.
///
/// Labels are unique within a series and keep either chronological order
/// (time buckets) or first-seen order (categories). Recomputed per request,
/// never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, labels: Vec<String>, values: Vec<i64>) -> Self {
        Self {
            labels,
            datasets: vec![ChartDataset {
                name: name.into(),
                values,
            }],
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    pub fn values(&self) -> &[i64] {
        self.datasets
            .first()
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> i64 {
        self.values().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_total_sums_first_dataset() {
        let series = ChartSeries::new("Filings", vec!["Jan 2025".into(), "Feb 2025".into()], vec![3, 4]);
        assert_eq!(series.total(), 7);
        assert_eq!(series.values(), &[3, 4]);
    }

    #[test]
    fn test_empty_series_has_no_values() {
        let series = ChartSeries::empty("Documents");
        assert!(series.labels.is_empty());
        assert_eq!(series.total(), 0);
    }
}
