// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::expiry_checker::ExpiryChecker;
use crate::infrastructure::config::load_service_config;
use crate::infrastructure::frappe_store::FrappeStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_audit_timeline, get_dashboard, get_document_stats, get_filing_trends, get_health_score,
    health_check,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_service_config()?;

    // Create the store adapter (infrastructure layer)
    let store = Arc::new(FrappeStore::new(
        config.store.host,
        config.store.api_key,
        config.store.api_secret,
    ));

    // Create the service, resolving entity bindings once at startup
    let dashboard_service = DashboardService::bind(store).await?;

    // Daily expiry scan, a downstream consumer of the same fetcher
    let expiry_checker = ExpiryChecker::new(dashboard_service.fetcher().clone());
    let check_interval = Duration::from_secs(config.server.expiry_check_hours * 3600);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(check_interval);
        loop {
            ticker.tick().await;
            if let Err(error) = expiry_checker.run_once().await {
                tracing::error!(error = %error, "expiry check failed");
            }
        }
    });

    // Application state for handlers
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/customers/:id/dashboard", get(get_dashboard))
        .route("/api/customers/:id/documents/stats", get(get_document_stats))
        .route("/api/customers/:id/filings/trends", get(get_filing_trends))
        .route("/api/customers/:id/audit-timeline", get(get_audit_timeline))
        .route("/api/customers/:id/health-score", get(get_health_score))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!(%addr, "starting compliance-dashboard service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
