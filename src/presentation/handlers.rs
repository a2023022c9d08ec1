// HTTP request handlers
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::application::record_fetcher::DashboardFilters;
use crate::domain::chart::ChartSeries;
use crate::domain::dashboard::{AuditEvent, DashboardPayload, DocumentStats, HealthReport};
use crate::error::DashboardError;
use crate::presentation::app_state::AppState;

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        match self {
            DashboardError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            DashboardError::Store(error) => {
                tracing::error!(error = %error, "record store failure");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "record store unavailable" })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub year: Option<String>,
    pub document_type: Option<String>,
    #[serde(default)]
    pub include_raw: bool,
}

#[derive(Deserialize)]
pub struct TrendsQuery {
    pub year: Option<String>,
}

#[derive(Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard payload for one customer
pub async fn get_dashboard(
    Path(id): Path<String>,
    Query(filters): Query<DashboardFilters>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardPayload>, DashboardError> {
    let payload = state
        .dashboard_service
        .get_dashboard_data(&id, &filters)
        .await?;
    Ok(Json(payload))
}

/// Document aggregates only
pub async fn get_document_stats(
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentStats>, DashboardError> {
    let filters = DashboardFilters {
        status: None,
        document_type: query.document_type,
        year: query.year,
    };
    let stats = state
        .dashboard_service
        .get_document_stats(&id, &filters, query.include_raw)
        .await?;
    Ok(Json(stats))
}

/// Monthly filing trend series
pub async fn get_filing_trends(
    Path(id): Path<String>,
    Query(query): Query<TrendsQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartSeries>, DashboardError> {
    let trends = state
        .dashboard_service
        .get_filing_trends(&id, query.year)
        .await?;
    Ok(Json(trends))
}

/// Newest-first audit timeline
pub async fn get_audit_timeline(
    Path(id): Path<String>,
    Query(query): Query<TimelineQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AuditEvent>>, DashboardError> {
    let events = state
        .dashboard_service
        .get_audit_timeline(&id, query.limit)
        .await?;
    Ok(Json(events))
}

/// Compliance health score with the per-area breakdown
pub async fn get_health_score(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthReport>, DashboardError> {
    let report = state.dashboard_service.get_compliance_health_score(&id).await?;
    Ok(Json(report))
}
