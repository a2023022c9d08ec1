// Repository trait for the external record-management backend
use crate::domain::record::{FieldDescriptor, Record};
use async_trait::async_trait;

/// One query predicate against a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Exact, case-sensitive match.
    Eq(String, String),
    /// Field value strictly before the given date string.
    Lt(String, String),
    /// Field value within the inclusive range.
    Between(String, String, String),
}

impl FilterClause {
    pub fn field(&self) -> &str {
        match self {
            FilterClause::Eq(field, _)
            | FilterClause::Lt(field, _)
            | FilterClause::Between(field, _, _) => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// Read-only access to the backing record store.
///
/// Implementations must not mutate the store; every method is safe to call
/// concurrently. Query failures surface as errors and propagate unmodified,
/// no retries happen at this layer.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ordered field descriptors of an entity type's schema.
    async fn schema_of(&self, entity_type: &str) -> anyhow::Result<Vec<FieldDescriptor>>;

    /// Whether the entity type exists in the store at all.
    async fn exists(&self, entity_type: &str) -> anyhow::Result<bool>;

    /// Filtered, sorted, optionally limited record query.
    async fn query(
        &self,
        entity_type: &str,
        filters: &[FilterClause],
        fields: &[String],
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<Record>>;

    /// Single record by id, or `None` when absent.
    async fn get_single(&self, entity_type: &str, id: &str) -> anyhow::Result<Option<Record>>;
}
