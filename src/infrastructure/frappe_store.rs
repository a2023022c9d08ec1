// Record store implementation over a Frappe-style REST resource API
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::record_store::{FilterClause, OrderBy, RecordStore, SortDirection};
use crate::domain::record::{FieldDescriptor, Record};

/// `RecordStore` backed by the record manager's REST resource API.
///
/// Read-only: only GET requests are ever issued. Transport and HTTP-level
/// failures propagate as errors with context; a 404 on a lookup reads as
/// "absent", not as an error.
#[derive(Debug, Clone)]
pub struct FrappeStore {
    host: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct EntityMeta {
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

impl FrappeStore {
    pub fn new(host: String, api_key: String, api_secret: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key,
            api_secret,
            client: reqwest::Client::new(),
        }
    }

    fn resource_url(&self, entity_type: &str, id: Option<&str>) -> String {
        let entity = urlencoding::encode(entity_type);
        match id {
            Some(id) => format!("{}/api/resource/{}/{}", self.host, entity, urlencoding::encode(id)),
            None => format!("{}/api/resource/{}", self.host, entity),
        }
    }

    /// GET a JSON envelope; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(
                "Authorization",
                format!("token {}:{}", self.api_key, self.api_secret),
            )
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to record store")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("record store query failed with status {}: {}", status, body);
        }

        let envelope = response
            .json::<DataEnvelope<T>>()
            .await
            .context("Failed to parse record store response")?;
        Ok(Some(envelope.data))
    }

    fn filters_param(filters: &[FilterClause]) -> String {
        let clauses: Vec<Value> = filters
            .iter()
            .map(|clause| match clause {
                FilterClause::Eq(field, value) => json!([field, "=", value]),
                FilterClause::Lt(field, value) => json!([field, "<", value]),
                FilterClause::Between(field, from, to) => {
                    json!([field, "between", [from, to]])
                }
            })
            .collect();
        Value::Array(clauses).to_string()
    }

    fn order_param(order_by: &OrderBy) -> String {
        let direction = match order_by.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        format!("{} {}", order_by.field, direction)
    }
}

#[async_trait]
impl RecordStore for FrappeStore {
    async fn schema_of(&self, entity_type: &str) -> Result<Vec<FieldDescriptor>> {
        let url = self.resource_url("DocType", Some(entity_type));
        let meta: Option<EntityMeta> = self.get_json(&url, &[]).await?;
        Ok(meta.map(|m| m.fields).unwrap_or_default())
    }

    async fn exists(&self, entity_type: &str) -> Result<bool> {
        let url = self.resource_url("DocType", Some(entity_type));
        let meta: Option<EntityMeta> = self.get_json(&url, &[]).await?;
        Ok(meta.is_some())
    }

    async fn query(
        &self,
        entity_type: &str,
        filters: &[FilterClause],
        fields: &[String],
        order_by: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let url = self.resource_url(entity_type, None);

        let mut query: Vec<(&str, String)> = Vec::new();
        if !filters.is_empty() {
            query.push(("filters", Self::filters_param(filters)));
        }
        if fields.is_empty() {
            query.push(("fields", r#"["*"]"#.to_string()));
        } else {
            query.push((
                "fields",
                serde_json::to_string(fields).unwrap_or_else(|_| r#"["*"]"#.to_string()),
            ));
        }
        if let Some(order) = order_by {
            query.push(("order_by", Self::order_param(order)));
        }
        // 0 means "no page limit" upstream
        query.push((
            "limit_page_length",
            limit.map(|l| l.to_string()).unwrap_or_else(|| "0".to_string()),
        ));

        tracing::debug!(entity_type, "querying record store");
        let rows: Option<Vec<Record>> = self.get_json(&url, &query).await?;
        Ok(rows.unwrap_or_default())
    }

    async fn get_single(&self, entity_type: &str, id: &str) -> Result<Option<Record>> {
        let url = self.resource_url(entity_type, Some(id));
        self.get_json(&url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_param_rendering() {
        let filters = vec![
            FilterClause::Eq("customer".into(), "CUST-1".into()),
            FilterClause::Between("expiry_date".into(), "2025-06-15".into(), "2025-07-15".into()),
        ];
        assert_eq!(
            FrappeStore::filters_param(&filters),
            r#"[["customer","=","CUST-1"],["expiry_date","between",["2025-06-15","2025-07-15"]]]"#
        );
    }

    #[test]
    fn test_order_param_rendering() {
        assert_eq!(
            FrappeStore::order_param(&OrderBy::descending("filing_date")),
            "filing_date desc"
        );
        assert_eq!(
            FrappeStore::order_param(&OrderBy::ascending("creation")),
            "creation asc"
        );
    }

    #[test]
    fn test_resource_url_encodes_entity_and_id() {
        let store = FrappeStore::new(
            "https://records.example.com/".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        assert_eq!(
            store.resource_url("Compliance Document Item", None),
            "https://records.example.com/api/resource/Compliance%20Document%20Item"
        );
        assert_eq!(
            store.resource_url("Customer", Some("CUST 1")),
            "https://records.example.com/api/resource/Customer/CUST%201"
        );
    }
}
