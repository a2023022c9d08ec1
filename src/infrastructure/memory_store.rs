// In-memory record store used by tests and local development
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::record_store::{FilterClause, OrderBy, RecordStore, SortDirection};
use crate::domain::record::{FieldDescriptor, Record};

/// A fully in-memory `RecordStore`.
///
/// Built once via the builder methods and then only read, so it needs no
/// locking. Filter, sort and limit semantics mirror the real backend:
/// string comparison for equality, lexicographic comparison for ranges
/// (ISO dates order correctly under it).
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: HashMap<String, Vec<FieldDescriptor>>,
    records: HashMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type with the given schema field names.
    pub fn with_entity(mut self, entity_type: &str, field_names: &[&str]) -> Self {
        self.schemas.insert(
            entity_type.to_string(),
            field_names.iter().map(|n| FieldDescriptor::new(*n)).collect(),
        );
        self.records.entry(entity_type.to_string()).or_default();
        self
    }

    pub fn with_record(mut self, entity_type: &str, record: Record) -> Self {
        self.records
            .entry(entity_type.to_string())
            .or_default()
            .push(record);
        self
    }

    fn field_as_string(record: &Record, field: &str) -> Option<String> {
        match record.value(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    fn matches(record: &Record, clause: &FilterClause) -> bool {
        let value = Self::field_as_string(record, clause.field());
        match (clause, value) {
            (FilterClause::Eq(_, expected), Some(v)) => v == *expected,
            (FilterClause::Lt(_, bound), Some(v)) => v.as_str() < bound.as_str(),
            (FilterClause::Between(_, from, to), Some(v)) => {
                v.as_str() >= from.as_str() && v.as_str() <= to.as_str()
            }
            (_, None) => false,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn schema_of(&self, entity_type: &str) -> anyhow::Result<Vec<FieldDescriptor>> {
        Ok(self.schemas.get(entity_type).cloned().unwrap_or_default())
    }

    async fn exists(&self, entity_type: &str) -> anyhow::Result<bool> {
        Ok(self.schemas.contains_key(entity_type))
    }

    async fn query(
        &self,
        entity_type: &str,
        filters: &[FilterClause],
        _fields: &[String],
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<Record>> {
        let mut rows: Vec<Record> = self
            .records
            .get(entity_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filters.iter().all(|c| Self::matches(r, c)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order_by {
            // stable sort keeps insertion order as the fallback for ties
            rows.sort_by_key(|r| Self::field_as_string(r, &order.field));
            if order.direction == SortDirection::Descending {
                rows.reverse();
            }
        }

        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn get_single(&self, entity_type: &str, id: &str) -> anyhow::Result<Option<Record>> {
        Ok(self
            .records
            .get(entity_type)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| r.str_field("name") == Some(id))
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_entity("Filed Form Item", &["name", "customer", "filing_date", "status"])
            .with_record(
                "Filed Form Item",
                Record::new()
                    .with("name", "F-1")
                    .with("customer", "CUST-1")
                    .with("filing_date", "2024-03-10")
                    .with("status", "Filed"),
            )
            .with_record(
                "Filed Form Item",
                Record::new()
                    .with("name", "F-2")
                    .with("customer", "CUST-1")
                    .with("filing_date", "2024-05-01")
                    .with("status", "Pending"),
            )
            .with_record(
                "Filed Form Item",
                Record::new()
                    .with("name", "F-3")
                    .with("customer", "CUST-2")
                    .with("filing_date", "2024-04-20")
                    .with("status", "Filed"),
            )
    }

    #[tokio::test]
    async fn test_query_filters_and_sorts() {
        let store = store();
        let filters = vec![FilterClause::Eq("customer".into(), "CUST-1".into())];
        let rows = store
            .query(
                "Filed Form Item",
                &filters,
                &[],
                Some(&OrderBy::descending("filing_date")),
                None,
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].str_field("name"), Some("F-2"));
        assert_eq!(rows[1].str_field("name"), Some("F-1"));
    }

    #[tokio::test]
    async fn test_query_between_on_iso_dates() {
        let store = store();
        let filters = vec![FilterClause::Between(
            "filing_date".into(),
            "2024-04-01".into(),
            "2024-05-31".into(),
        )];
        let rows = store
            .query("Filed Form Item", &filters, &[], None, None)
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.str_field("name")).collect();
        assert_eq!(names, vec!["F-2", "F-3"]);
    }

    #[tokio::test]
    async fn test_query_respects_limit() {
        let store = store();
        let rows = store
            .query(
                "Filed Form Item",
                &[],
                &[],
                Some(&OrderBy::ascending("filing_date")),
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].str_field("name"), Some("F-1"));
    }

    #[tokio::test]
    async fn test_unknown_entity_type_reads_empty() {
        let store = store();
        assert!(!store.exists("Customer Document").await.unwrap());
        assert!(store.schema_of("Customer Document").await.unwrap().is_empty());
        let rows = store
            .query("Customer Document", &[], &[], None, None)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_get_single_by_name() {
        let store = store();
        let row = store.get_single("Filed Form Item", "F-3").await.unwrap();
        assert_eq!(row.and_then(|r| r.str_field("customer").map(str::to_string)), Some("CUST-2".into()));
        assert!(store.get_single("Filed Form Item", "F-9").await.unwrap().is_none());
    }
}
