// Dashboard response payloads
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::chart::ChartSeries;
use super::customer::CustomerProfile;
use super::record::Record;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_documents: i64,
    pub total_filed_forms: i64,
    pub expiring_within_30_days: i64,
    pub compliance_health_score: i64,
    pub last_filing_date: Option<NaiveDate>,
    pub next_renewal_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCharts {
    pub document_type_distribution: ChartSeries,
    pub filed_form_type_distribution: ChartSeries,
    pub compliance_status_breakdown: ChartSeries,
    pub filing_trends: ChartSeries,
    pub document_upload_activity: ChartSeries,
    pub compliance_renewals: ChartSeries,
}

/// Echo of the filter options actually present in the data, so the UI can
/// populate its dropdowns without a second round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub document_types: Vec<String>,
    pub statuses: Vec<String>,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub timestamp: Option<String>,
    pub user: String,
    pub action: String,
    pub payload: Option<Value>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub score: i64,
    pub area_breakdown: ChartSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentStats {
    pub total_documents: i64,
    pub expiring_within_30_days: i64,
    pub next_compliance_due: Option<NaiveDate>,
    pub document_type_distribution: ChartSeries,
    pub compliance_status_breakdown: ChartSeries,
    pub document_upload_activity: ChartSeries,
    pub compliance_renewals: ChartSeries,
    pub available_types: Vec<String>,
    pub available_statuses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilingStats {
    pub total_filed_forms: i64,
    pub filing_trends: ChartSeries,
    pub filed_form_type_distribution: ChartSeries,
    pub available_years: Vec<i32>,
    pub last_filing_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPayload {
    pub customer: String,
    pub profile: Option<CustomerProfile>,
    pub summary: DashboardSummary,
    pub charts: DashboardCharts,
    pub audit_timeline: Vec<AuditEvent>,
    pub filters: FilterOptions,
}
