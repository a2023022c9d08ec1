// Filtered record fetching over startup-resolved field bindings
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::field_resolver::resolve_field;
use crate::application::record_store::{FilterClause, OrderBy, RecordStore, SortDirection};
use crate::domain::record::Record;
use crate::error::DashboardError;

const DOCUMENT_ENTITY_CANDIDATES: &[&str] = &[
    "Compliance Document",
    "Compliance Document Item",
    "Customer Document",
];
const FILING_ENTITY_CANDIDATES: &[&str] = &[
    "Compliance Filing",
    "Filed Compliance Form",
    "Filed Form Item",
    "Compliance Form Submission",
];
const AUDIT_ENTITY_CANDIDATES: &[&str] = &["Client Audit Log", "Audit Log", "Customer Audit Log"];

const OWNER_ALIASES: &[&str] = &["customer", "client", "party", "customer_id"];

/// Caller-supplied dashboard filters, raw as they arrive off the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilters {
    pub status: Option<String>,
    // older clients send "doctype"
    #[serde(alias = "doctype")]
    pub document_type: Option<String>,
    pub year: Option<String>,
}

impl DashboardFilters {
    /// Normalized year filter. Malformed values degrade to "no filter"
    /// rather than an error.
    pub fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.trim().parse().ok())
    }
}

/// Expiry-date predicates used by the expiry checker.
#[derive(Debug, Clone, Copy)]
pub enum ExpiryClause {
    Before(NaiveDate),
    Within(NaiveDate, NaiveDate),
}

impl ExpiryClause {
    fn into_filter(self, field: &str) -> FilterClause {
        match self {
            ExpiryClause::Before(date) => FilterClause::Lt(field.to_string(), date.to_string()),
            ExpiryClause::Within(from, to) => {
                FilterClause::Between(field.to_string(), from.to_string(), to.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentBinding {
    pub entity_type: String,
    pub owner: String,
    pub doc_type: Option<String>,
    pub expiry: Option<String>,
    pub status: Option<String>,
    pub uploaded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FilingBinding {
    pub entity_type: String,
    pub owner: String,
    pub date: Option<String>,
    pub form_type: Option<String>,
    pub status: Option<String>,
    pub expiry: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuditBinding {
    pub entity_type: String,
    pub owner: String,
    pub timestamp: Option<String>,
    pub user: Option<String>,
    pub action: Option<String>,
    pub payload: Option<String>,
    pub remarks: Option<String>,
}

/// Issues filtered, sorted queries for a customer's records.
///
/// Field bindings are resolved once against live schemas when the fetcher
/// is built, not per request. A missing entity type or missing owner field
/// leaves that binding unset, and every fetch against an unset binding
/// returns an empty result: dashboards degrade when optional subsystems
/// are absent.
#[derive(Clone)]
pub struct RecordFetcher {
    store: Arc<dyn RecordStore>,
    documents: Option<DocumentBinding>,
    filings: Option<FilingBinding>,
    audit: Option<AuditBinding>,
}

impl RecordFetcher {
    pub async fn bind(store: Arc<dyn RecordStore>) -> anyhow::Result<Self> {
        let documents = Self::bind_documents(store.as_ref()).await?;
        let filings = Self::bind_filings(store.as_ref()).await?;
        let audit = Self::bind_audit(store.as_ref()).await?;

        for (role, bound) in [
            ("documents", documents.is_some()),
            ("filings", filings.is_some()),
            ("audit", audit.is_some()),
        ] {
            if !bound {
                tracing::warn!(role, "no usable entity binding, aggregates will be empty");
            }
        }

        Ok(Self {
            store,
            documents,
            filings,
            audit,
        })
    }

    pub fn documents(&self) -> Option<&DocumentBinding> {
        self.documents.as_ref()
    }

    pub fn filings(&self) -> Option<&FilingBinding> {
        self.filings.as_ref()
    }

    pub fn audit(&self) -> Option<&AuditBinding> {
        self.audit.as_ref()
    }

    async fn bind_documents(store: &dyn RecordStore) -> anyhow::Result<Option<DocumentBinding>> {
        let Some(entity_type) = first_existing(store, DOCUMENT_ENTITY_CANDIDATES).await? else {
            return Ok(None);
        };
        let schema = store.schema_of(&entity_type).await?;
        let Some(owner) = resolve_field(&schema, OWNER_ALIASES) else {
            return Ok(None);
        };
        let binding = DocumentBinding {
            owner: owner.to_string(),
            doc_type: resolve_field(&schema, &["document_type", "doc_type", "type", "category"])
                .map(str::to_string),
            expiry: resolve_field(
                &schema,
                &["expiry_date", "valid_till", "expiration_date", "end_date"],
            )
            .map(str::to_string),
            status: resolve_field(&schema, &["status", "compliance_status"]).map(str::to_string),
            uploaded: resolve_field(&schema, &["uploaded_on", "upload_date", "date", "creation"])
                .map(str::to_string),
            entity_type,
        };
        tracing::debug!(entity_type = %binding.entity_type, owner = %binding.owner, "bound document entity");
        Ok(Some(binding))
    }

    async fn bind_filings(store: &dyn RecordStore) -> anyhow::Result<Option<FilingBinding>> {
        let Some(entity_type) = first_existing(store, FILING_ENTITY_CANDIDATES).await? else {
            return Ok(None);
        };
        let schema = store.schema_of(&entity_type).await?;
        let Some(owner) = resolve_field(&schema, OWNER_ALIASES) else {
            return Ok(None);
        };
        let binding = FilingBinding {
            owner: owner.to_string(),
            date: resolve_field(
                &schema,
                &["filing_date", "date", "submitted_on", "creation", "posting_date"],
            )
            .map(str::to_string),
            form_type: resolve_field(
                &schema,
                &["form_type", "document_type", "compliance_type", "type"],
            )
            .map(str::to_string),
            status: resolve_field(&schema, &["status", "state", "workflow_state"])
                .map(str::to_string),
            expiry: resolve_field(&schema, &["expiry_date", "valid_till", "end_date"])
                .map(str::to_string),
            entity_type,
        };
        tracing::debug!(entity_type = %binding.entity_type, owner = %binding.owner, "bound filing entity");
        Ok(Some(binding))
    }

    async fn bind_audit(store: &dyn RecordStore) -> anyhow::Result<Option<AuditBinding>> {
        let Some(entity_type) = first_existing(store, AUDIT_ENTITY_CANDIDATES).await? else {
            return Ok(None);
        };
        let schema = store.schema_of(&entity_type).await?;
        let owner_aliases = ["customer", "client", "party", "reference_customer"];
        let Some(owner) = resolve_field(&schema, &owner_aliases) else {
            return Ok(None);
        };
        let binding = AuditBinding {
            owner: owner.to_string(),
            timestamp: resolve_field(
                &schema,
                &["timestamp", "event_timestamp", "log_time", "modified", "creation"],
            )
            .map(str::to_string),
            user: resolve_field(&schema, &["user", "owner", "modified_by", "changed_by"])
                .map(str::to_string),
            action: resolve_field(&schema, &["action", "event", "activity"]).map(str::to_string),
            payload: resolve_field(&schema, &["payload", "data", "changes", "context"])
                .map(str::to_string),
            remarks: resolve_field(&schema, &["remarks", "notes", "comment"]).map(str::to_string),
            entity_type,
        };
        Ok(Some(binding))
    }

    /// All of a customer's documents, newest first, with the status and
    /// document-type filters applied at the store. The year filter is
    /// applied in memory by the caller, which needs both views.
    pub async fn fetch_documents(
        &self,
        owner_id: &str,
        filters: &DashboardFilters,
    ) -> Result<Vec<Record>, DashboardError> {
        require_owner(owner_id)?;
        let Some(binding) = &self.documents else {
            return Ok(Vec::new());
        };

        let mut clauses = vec![FilterClause::Eq(binding.owner.clone(), owner_id.to_string())];
        if let (Some(field), Some(doc_type)) = (&binding.doc_type, &filters.document_type) {
            clauses.push(FilterClause::Eq(field.clone(), doc_type.clone()));
        }
        if let (Some(field), Some(status)) = (&binding.status, &filters.status) {
            clauses.push(FilterClause::Eq(field.clone(), status.clone()));
        }

        let fields = field_list(&[
            Some("name"),
            Some("creation"),
            binding.doc_type.as_deref(),
            binding.expiry.as_deref(),
            binding.status.as_deref(),
            binding.uploaded.as_deref(),
        ]);
        let order = OrderBy {
            field: binding.uploaded.clone().unwrap_or_else(|| "creation".to_string()),
            direction: SortDirection::Descending,
        };

        let records = self
            .store
            .query(&binding.entity_type, &clauses, &fields, Some(&order), None)
            .await?;
        Ok(records)
    }

    /// All of a customer's filed forms, with the requested sort direction.
    /// Trend computation asks for ascending order so buckets fill
    /// chronologically.
    pub async fn fetch_filings(
        &self,
        owner_id: &str,
        filters: &DashboardFilters,
        direction: SortDirection,
    ) -> Result<Vec<Record>, DashboardError> {
        require_owner(owner_id)?;
        let Some(binding) = &self.filings else {
            return Ok(Vec::new());
        };

        let mut clauses = vec![FilterClause::Eq(binding.owner.clone(), owner_id.to_string())];
        if let (Some(field), Some(status)) = (&binding.status, &filters.status) {
            clauses.push(FilterClause::Eq(field.clone(), status.clone()));
        }

        let fields = field_list(&[
            Some("name"),
            Some("creation"),
            binding.date.as_deref(),
            binding.form_type.as_deref(),
            binding.status.as_deref(),
            binding.expiry.as_deref(),
        ]);
        let order = OrderBy {
            field: binding.date.clone().unwrap_or_else(|| "creation".to_string()),
            direction,
        };

        let records = self
            .store
            .query(&binding.entity_type, &clauses, &fields, Some(&order), None)
            .await?;
        Ok(records)
    }

    /// Newest-first audit entries for a customer, capped at `limit`.
    pub async fn fetch_audit(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<Record>, DashboardError> {
        require_owner(owner_id)?;
        let Some(binding) = &self.audit else {
            return Ok(Vec::new());
        };

        let clauses = vec![FilterClause::Eq(binding.owner.clone(), owner_id.to_string())];
        let fields = field_list(&[
            Some("name"),
            binding.timestamp.as_deref(),
            binding.user.as_deref(),
            binding.action.as_deref(),
            binding.payload.as_deref(),
            binding.remarks.as_deref(),
        ]);
        let order = OrderBy::descending(
            binding.timestamp.clone().unwrap_or_else(|| "modified".to_string()),
        );

        let records = self
            .store
            .query(&binding.entity_type, &clauses, &fields, Some(&order), Some(limit))
            .await?;
        Ok(records)
    }

    /// Documents matching an expiry predicate, across all customers.
    pub async fn fetch_documents_by_expiry(
        &self,
        clause: ExpiryClause,
    ) -> anyhow::Result<Vec<Record>> {
        let Some(binding) = &self.documents else {
            return Ok(Vec::new());
        };
        let Some(expiry) = &binding.expiry else {
            return Ok(Vec::new());
        };
        let filters = vec![clause.into_filter(expiry)];
        let fields = field_list(&[Some("name"), Some(binding.owner.as_str()), Some(expiry)]);
        self.store
            .query(&binding.entity_type, &filters, &fields, None, None)
            .await
    }

    /// Filed forms matching an expiry predicate, across all customers.
    pub async fn fetch_filings_by_expiry(
        &self,
        clause: ExpiryClause,
    ) -> anyhow::Result<Vec<Record>> {
        let Some(binding) = &self.filings else {
            return Ok(Vec::new());
        };
        let Some(expiry) = &binding.expiry else {
            return Ok(Vec::new());
        };
        let filters = vec![clause.into_filter(expiry)];
        let fields = field_list(&[Some("name"), Some(binding.owner.as_str()), Some(expiry)]);
        self.store
            .query(&binding.entity_type, &filters, &fields, None, None)
            .await
    }
}

async fn first_existing(
    store: &dyn RecordStore,
    candidates: &[&str],
) -> anyhow::Result<Option<String>> {
    for candidate in candidates {
        if store.exists(candidate).await? {
            return Ok(Some((*candidate).to_string()));
        }
    }
    Ok(None)
}

fn require_owner(owner_id: &str) -> Result<(), DashboardError> {
    if owner_id.trim().is_empty() {
        return Err(DashboardError::validation(
            "customer id is required to load the dashboard",
        ));
    }
    Ok(())
}

fn field_list(fields: &[Option<&str>]) -> Vec<String> {
    let unique: BTreeSet<&str> = fields.iter().flatten().copied().collect();
    unique.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_filter_is_lenient() {
        let parse = |raw: &str| DashboardFilters {
            year: Some(raw.to_string()),
            ..Default::default()
        };
        assert_eq!(parse("2024").year(), Some(2024));
        assert_eq!(parse(" 2024 ").year(), Some(2024));
        assert_eq!(parse("20x4").year(), None);
        assert_eq!(parse("").year(), None);
        assert_eq!(DashboardFilters::default().year(), None);
    }

    #[test]
    fn test_field_list_dedupes() {
        let fields = field_list(&[Some("name"), Some("creation"), Some("creation"), None]);
        assert_eq!(fields, vec!["creation".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_expiry_clause_maps_to_filters() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            ExpiryClause::Before(date).into_filter("expiry_date"),
            FilterClause::Lt("expiry_date".into(), "2025-06-15".into())
        );
        let to = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        assert_eq!(
            ExpiryClause::Within(date, to).into_filter("expiry_date"),
            FilterClause::Between("expiry_date".into(), "2025-06-15".into(), "2025-07-15".into())
        );
    }
}
