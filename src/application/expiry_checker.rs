// Scheduled scan for expired and soon-expiring compliance records
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::application::record_fetcher::{ExpiryClause, RecordFetcher};

const UPCOMING_HORIZON_DAYS: u64 = 30;

/// Outcome of one scan over a single entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryReport {
    pub entity_type: String,
    pub expired: usize,
    pub upcoming: usize,
}

/// Daily expiry check over documents and filed forms.
///
/// A downstream consumer of the same fetcher contract the dashboard uses:
/// it counts records past their expiry date and records expiring within
/// the next 30 days, and emits one diagnostic log line per entity type so
/// administrators can verify the scheduler ran. Entity types with no
/// matching records are skipped.
#[derive(Clone)]
pub struct ExpiryChecker {
    fetcher: RecordFetcher,
}

impl ExpiryChecker {
    pub fn new(fetcher: RecordFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn run_once(&self) -> anyhow::Result<Vec<ExpiryReport>> {
        self.run_at(chrono::Local::now().date_naive()).await
    }

    pub async fn run_at(&self, today: NaiveDate) -> anyhow::Result<Vec<ExpiryReport>> {
        let horizon = today
            .checked_add_days(Days::new(UPCOMING_HORIZON_DAYS))
            .unwrap_or(today);
        let mut reports = Vec::new();

        if let Some(binding) = self.fetcher.documents() {
            let entity_type = binding.entity_type.clone();
            let expired = self
                .fetcher
                .fetch_documents_by_expiry(ExpiryClause::Before(today))
                .await?
                .len();
            let upcoming = self
                .fetcher
                .fetch_documents_by_expiry(ExpiryClause::Within(today, horizon))
                .await?
                .len();
            if let Some(report) = Self::report(entity_type, expired, upcoming) {
                reports.push(report);
            }
        }

        if let Some(binding) = self.fetcher.filings() {
            let entity_type = binding.entity_type.clone();
            let expired = self
                .fetcher
                .fetch_filings_by_expiry(ExpiryClause::Before(today))
                .await?
                .len();
            let upcoming = self
                .fetcher
                .fetch_filings_by_expiry(ExpiryClause::Within(today, horizon))
                .await?
                .len();
            if let Some(report) = Self::report(entity_type, expired, upcoming) {
                reports.push(report);
            }
        }

        Ok(reports)
    }

    fn report(entity_type: String, expired: usize, upcoming: usize) -> Option<ExpiryReport> {
        if expired == 0 && upcoming == 0 {
            return None;
        }
        tracing::info!(%entity_type, expired, upcoming, "compliance expiry check");
        Some(ExpiryReport {
            entity_type,
            expired,
            upcoming,
        })
    }
}
