// Dashboard composition - orchestrates fetching, aggregation and scoring
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde_json::Value;

use crate::application::aggregate::{count_by_category, MonthWindow, UNSPECIFIED_LABEL};
use crate::application::health::health_report;
use crate::application::record_fetcher::{
    DashboardFilters, DocumentBinding, FilingBinding, RecordFetcher,
};
use crate::application::record_store::{RecordStore, SortDirection};
use crate::domain::chart::ChartSeries;
use crate::domain::customer::CustomerProfile;
use crate::domain::dashboard::{
    AuditEvent, DashboardCharts, DashboardPayload, DashboardSummary, DocumentStats, FilingStats,
    FilterOptions, HealthReport,
};
use crate::domain::record::Record;
use crate::error::DashboardError;

const CUSTOMER_ENTITY: &str = "Customer";
pub const DEFAULT_AUDIT_LIMIT: usize = 50;
const EXPIRY_HORIZON_DAYS: u64 = 30;

/// Read-only dashboard use cases for one customer.
///
/// Request-scoped and side-effect free: each call issues a small fixed
/// number of sequential store queries and then aggregates in memory, so
/// concurrent invocation needs no coordination.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn RecordStore>,
    fetcher: RecordFetcher,
}

impl DashboardService {
    /// Build the service, resolving entity and field bindings once against
    /// the live store schemas.
    pub async fn bind(store: Arc<dyn RecordStore>) -> anyhow::Result<Self> {
        let fetcher = RecordFetcher::bind(store.clone()).await?;
        Ok(Self { store, fetcher })
    }

    pub fn fetcher(&self) -> &RecordFetcher {
        &self.fetcher
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub async fn get_dashboard_data(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
    ) -> Result<DashboardPayload, DashboardError> {
        self.get_dashboard_data_at(customer_id, filters, Self::today())
            .await
    }

    pub async fn get_dashboard_data_at(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
        today: NaiveDate,
    ) -> Result<DashboardPayload, DashboardError> {
        let profile = self.customer_profile(customer_id).await?;

        let documents = self.fetcher.fetch_documents(customer_id, filters).await?;
        let filings = self
            .fetcher
            .fetch_filings(customer_id, filters, SortDirection::Ascending)
            .await?;

        let document_stats =
            compute_document_stats(self.fetcher.documents(), &documents, filters, today, false);
        let filing_stats = compute_filing_stats(self.fetcher.filings(), &filings, filters, today);

        let health = match &profile {
            Some(profile) => health_report(&profile.areas, today),
            None => health_report(&[], today),
        };

        let audit_timeline = self.audit_events(customer_id, DEFAULT_AUDIT_LIMIT).await?;

        // renewal scalars span documents and filed forms and ignore the
        // year filter
        let mut renewal_dates = expiry_dates(
            self.fetcher.documents().and_then(|b| b.expiry.as_deref()),
            &documents,
        );
        renewal_dates.extend(expiry_dates(
            self.fetcher.filings().and_then(|b| b.expiry.as_deref()),
            &filings,
        ));
        let horizon = today
            .checked_add_days(Days::new(EXPIRY_HORIZON_DAYS))
            .unwrap_or(today);
        let expiring_within_30_days = renewal_dates
            .iter()
            .filter(|e| **e >= today && **e <= horizon)
            .count() as i64;
        let next_renewal_date = renewal_dates.iter().filter(|e| **e >= today).min().copied();

        let summary = DashboardSummary {
            total_documents: document_stats.total_documents,
            total_filed_forms: filing_stats.total_filed_forms,
            expiring_within_30_days,
            compliance_health_score: health.score,
            last_filing_date: filing_stats.last_filing_date,
            next_renewal_date,
        };

        let filter_options = FilterOptions {
            document_types: document_stats.available_types.clone(),
            statuses: document_stats.available_statuses.clone(),
            years: filing_stats.available_years.clone(),
        };

        Ok(DashboardPayload {
            customer: customer_id.to_string(),
            profile,
            summary,
            charts: DashboardCharts {
                document_type_distribution: document_stats.document_type_distribution,
                filed_form_type_distribution: filing_stats.filed_form_type_distribution,
                compliance_status_breakdown: document_stats.compliance_status_breakdown,
                filing_trends: filing_stats.filing_trends,
                document_upload_activity: document_stats.document_upload_activity,
                compliance_renewals: document_stats.compliance_renewals,
            },
            audit_timeline,
            filters: filter_options,
        })
    }

    pub async fn get_document_stats(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
        include_raw: bool,
    ) -> Result<DocumentStats, DashboardError> {
        self.get_document_stats_at(customer_id, filters, include_raw, Self::today())
            .await
    }

    pub async fn get_document_stats_at(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
        include_raw: bool,
        today: NaiveDate,
    ) -> Result<DocumentStats, DashboardError> {
        let documents = self.fetcher.fetch_documents(customer_id, filters).await?;
        Ok(compute_document_stats(
            self.fetcher.documents(),
            &documents,
            filters,
            today,
            include_raw,
        ))
    }

    pub async fn get_filing_stats(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
    ) -> Result<FilingStats, DashboardError> {
        self.get_filing_stats_at(customer_id, filters, Self::today())
            .await
    }

    pub async fn get_filing_stats_at(
        &self,
        customer_id: &str,
        filters: &DashboardFilters,
        today: NaiveDate,
    ) -> Result<FilingStats, DashboardError> {
        let filings = self
            .fetcher
            .fetch_filings(customer_id, filters, SortDirection::Ascending)
            .await?;
        Ok(compute_filing_stats(
            self.fetcher.filings(),
            &filings,
            filters,
            today,
        ))
    }

    pub async fn get_filing_trends(
        &self,
        customer_id: &str,
        year: Option<String>,
    ) -> Result<ChartSeries, DashboardError> {
        let filters = DashboardFilters {
            year,
            ..Default::default()
        };
        let stats = self.get_filing_stats(customer_id, &filters).await?;
        Ok(stats.filing_trends)
    }

    pub async fn get_audit_timeline(
        &self,
        customer_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEvent>, DashboardError> {
        self.audit_events(customer_id, limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
            .await
    }

    pub async fn get_compliance_health_score(
        &self,
        customer_id: &str,
    ) -> Result<HealthReport, DashboardError> {
        self.get_compliance_health_score_at(customer_id, Self::today())
            .await
    }

    pub async fn get_compliance_health_score_at(
        &self,
        customer_id: &str,
        today: NaiveDate,
    ) -> Result<HealthReport, DashboardError> {
        let profile = self.customer_profile(customer_id).await?;
        let areas = profile.map(|p| p.areas).unwrap_or_default();
        Ok(health_report(&areas, today))
    }

    async fn customer_profile(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerProfile>, DashboardError> {
        if customer_id.trim().is_empty() {
            return Err(DashboardError::validation(
                "customer id is required to load the dashboard",
            ));
        }
        let record = self.store.get_single(CUSTOMER_ENTITY, customer_id).await?;
        Ok(record.map(|r| CustomerProfile::from_record(customer_id, &r)))
    }

    async fn audit_events(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, DashboardError> {
        let records = self.fetcher.fetch_audit(customer_id, limit).await?;
        let Some(binding) = self.fetcher.audit() else {
            return Ok(Vec::new());
        };

        let events = records
            .iter()
            .map(|record| AuditEvent {
                timestamp: binding
                    .timestamp
                    .as_deref()
                    .and_then(|f| record.str_field(f))
                    .map(str::to_string),
                user: binding
                    .user
                    .as_deref()
                    .and_then(|f| record.str_field(f))
                    .unwrap_or("Unknown")
                    .to_string(),
                action: binding
                    .action
                    .as_deref()
                    .and_then(|f| record.str_field(f))
                    .unwrap_or("Updated")
                    .to_string(),
                payload: audit_payload(binding.payload.as_deref(), record),
                remarks: binding
                    .remarks
                    .as_deref()
                    .and_then(|f| record.str_field(f))
                    .map(str::to_string),
            })
            .collect();
        Ok(events)
    }
}

/// Audit payloads arrive either as embedded JSON or serialized into a
/// string column. Strings that parse as JSON are expanded; anything else
/// passes through verbatim.
fn audit_payload(field: Option<&str>, record: &Record) -> Option<Value> {
    let value = field.and_then(|f| record.value(f)).cloned()?;
    match value {
        Value::Null => None,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed) => Some(parsed),
            Err(_) => Some(Value::String(s)),
        },
        other => Some(other),
    }
}

fn expiry_dates(field: Option<&str>, records: &[Record]) -> Vec<NaiveDate> {
    let Some(field) = field else {
        return Vec::new();
    };
    records.iter().filter_map(|r| r.date_field(field)).collect()
}

/// Aggregate a customer's documents into the dashboard card and chart
/// values. The year filter narrows the counted set (a document qualifies
/// when its upload year or expiry year matches); the expiry scalars and the
/// renewals chart look at the full set, since upcoming renewals matter
/// regardless of which year is displayed.
pub fn compute_document_stats(
    binding: Option<&DocumentBinding>,
    records: &[Record],
    filters: &DashboardFilters,
    today: NaiveDate,
    include_raw: bool,
) -> DocumentStats {
    let Some(binding) = binding else {
        // document subsystem not configured: render empty, don't error
        return DocumentStats {
            total_documents: 0,
            expiring_within_30_days: 0,
            next_compliance_due: None,
            document_type_distribution: ChartSeries::empty("Documents"),
            compliance_status_breakdown: ChartSeries::empty("Status"),
            document_upload_activity: ChartSeries::empty("Uploads"),
            compliance_renewals: ChartSeries::empty("Expiries"),
            available_types: Vec::new(),
            available_statuses: Vec::new(),
            records: include_raw.then(Vec::new),
        };
    };
    let doc_type_field = binding.doc_type.as_deref();
    let expiry_field = binding.expiry.as_deref();
    let status_field = binding.status.as_deref();
    let uploaded_field = binding.uploaded.as_deref();
    let year = filters.year();

    let facts: Vec<(&Record, Option<NaiveDate>, Option<NaiveDate>)> = records
        .iter()
        .map(|r| {
            let expiry = expiry_field.and_then(|f| r.date_field(f));
            let upload = r.date_field_or(uploaded_field, "creation");
            (r, expiry, upload)
        })
        .collect();

    let horizon = today
        .checked_add_days(Days::new(EXPIRY_HORIZON_DAYS))
        .unwrap_or(today);
    let mut expiring_within_30_days = 0;
    let mut next_compliance_due: Option<NaiveDate> = None;
    for (_, expiry, _) in &facts {
        let Some(expiry) = expiry else { continue };
        if *expiry >= today {
            if *expiry <= horizon {
                expiring_within_30_days += 1;
            }
            next_compliance_due = Some(next_compliance_due.map_or(*expiry, |d| d.min(*expiry)));
        }
    }

    let selected: Vec<&(&Record, Option<NaiveDate>, Option<NaiveDate>)> = facts
        .iter()
        .filter(|(_, expiry, upload)| match year {
            Some(y) => upload.map(|d| d.year()) == Some(y) || expiry.map(|d| d.year()) == Some(y),
            None => true,
        })
        .collect();

    let window = match year {
        Some(y) => MonthWindow::calendar_year(y),
        None => MonthWindow::rolling(today),
    };

    let document_type_distribution = count_by_category(
        "Documents",
        selected
            .iter()
            .map(|(r, _, _)| doc_type_field.and_then(|f| r.str_field(f))),
        UNSPECIFIED_LABEL,
    );
    let compliance_status_breakdown = count_by_category(
        "Status",
        selected
            .iter()
            .map(|(r, _, _)| status_field.and_then(|f| r.str_field(f))),
        UNSPECIFIED_LABEL,
    );
    let document_upload_activity =
        window.bucket("Uploads", selected.iter().map(|(_, _, upload)| *upload));
    let compliance_renewals =
        MonthWindow::rolling(today).bucket("Expiries", facts.iter().map(|(_, expiry, _)| *expiry));

    let available_types: BTreeSet<String> = selected
        .iter()
        .filter_map(|(r, _, _)| doc_type_field.and_then(|f| r.str_field(f)))
        .map(str::to_string)
        .collect();
    let available_statuses: BTreeSet<String> = selected
        .iter()
        .filter_map(|(r, _, _)| status_field.and_then(|f| r.str_field(f)))
        .map(str::to_string)
        .collect();

    DocumentStats {
        total_documents: selected.len() as i64,
        expiring_within_30_days,
        next_compliance_due,
        document_type_distribution,
        compliance_status_breakdown,
        document_upload_activity,
        compliance_renewals,
        available_types: available_types.into_iter().collect(),
        available_statuses: available_statuses.into_iter().collect(),
        records: include_raw.then(|| selected.iter().map(|(r, _, _)| Record::clone(r)).collect()),
    }
}

/// Aggregate a customer's filed forms. Available years come from the full
/// set so the UI can offer other years while one is selected; undated
/// filings are excluded while a year filter is active.
pub fn compute_filing_stats(
    binding: Option<&FilingBinding>,
    records: &[Record],
    filters: &DashboardFilters,
    today: NaiveDate,
) -> FilingStats {
    let Some(binding) = binding else {
        return FilingStats {
            total_filed_forms: 0,
            filing_trends: ChartSeries::empty("Filings"),
            filed_form_type_distribution: ChartSeries::empty("Forms"),
            available_years: Vec::new(),
            last_filing_date: None,
        };
    };
    let date_field = binding.date.as_deref();
    let form_type_field = binding.form_type.as_deref();
    let year = filters.year();

    let facts: Vec<(&Record, Option<NaiveDate>)> = records
        .iter()
        .map(|r| (r, r.date_field_or(date_field, "creation")))
        .collect();

    let available_years: BTreeSet<i32> = facts
        .iter()
        .filter_map(|(_, date)| date.map(|d| d.year()))
        .collect();

    let selected: Vec<&(&Record, Option<NaiveDate>)> = facts
        .iter()
        .filter(|(_, date)| match year {
            Some(y) => date.map(|d| d.year()) == Some(y),
            None => true,
        })
        .collect();

    let window = match year {
        Some(y) => MonthWindow::calendar_year(y),
        None => MonthWindow::rolling(today),
    };
    let filing_trends = window.bucket("Filings", selected.iter().map(|(_, date)| *date));
    let filed_form_type_distribution = count_by_category(
        "Forms",
        selected
            .iter()
            .map(|(r, _)| form_type_field.and_then(|f| r.str_field(f))),
        UNSPECIFIED_LABEL,
    );

    FilingStats {
        total_filed_forms: selected.len() as i64,
        filing_trends,
        filed_form_type_distribution,
        available_years: available_years.into_iter().rev().collect(),
        last_filing_date: selected.iter().filter_map(|(_, date)| *date).max(),
    }
}
