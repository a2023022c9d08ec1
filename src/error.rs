// Service error taxonomy
use thiserror::Error;

/// Errors surfaced to callers of the dashboard service.
///
/// Only two conditions are real errors: a caller-side validation failure
/// and a backend failure. Everything else (missing entity types, missing
/// fields, unparseable per-record values) degrades to empty or zero
/// aggregates so the dashboard renders with fewer charts instead of
/// failing entirely.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Missing or invalid caller input, e.g. an empty customer id.
    #[error("{0}")]
    Validation(String),

    /// Backend store failure, propagated unmodified. No retries happen
    /// anywhere in this service.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
