// Loosely-schematized record values returned by the record store
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field descriptor of an entity schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub fieldname: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub fieldtype: Option<String>,
}

impl FieldDescriptor {
    pub fn new(fieldname: impl Into<String>) -> Self {
        Self {
            fieldname: fieldname.into(),
            label: None,
            fieldtype: None,
        }
    }
}

/// A single record row: a JSON object with lenient typed accessors.
///
/// The backing store is externally mutable and unversioned, so accessors
/// never fail hard: a missing field, an empty string or an unparseable
/// value all read as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record(pub serde_json::Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(serde_json::Map::new())
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Non-empty string value of a field, if present.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Date value of a field, coerced leniently.
    pub fn date_field(&self, field: &str) -> Option<NaiveDate> {
        self.str_field(field).and_then(coerce_date)
    }

    /// First present date among `primary` and `fallback` fields.
    pub fn date_field_or(&self, primary: Option<&str>, fallback: &str) -> Option<NaiveDate> {
        primary
            .and_then(|f| self.date_field(f))
            .or_else(|| self.date_field(fallback))
    }
}

/// Parse a date out of the store's string renderings.
///
/// Accepts `YYYY-MM-DD` as-is and longer timestamp forms by taking the
/// leading date part. Anything else reads as `None`.
pub fn coerce_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let head = trimmed.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_date_accepts_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(coerce_date("2025-03-14"), Some(expected));
        assert_eq!(coerce_date("2025-03-14 09:30:00"), Some(expected));
        assert_eq!(coerce_date(" 2025-03-14T09:30:00Z "), Some(expected));
    }

    #[test]
    fn test_coerce_date_rejects_garbage() {
        assert_eq!(coerce_date(""), None);
        assert_eq!(coerce_date("next tuesday"), None);
        assert_eq!(coerce_date("2025-13-40"), None);
    }

    #[test]
    fn test_str_field_treats_blank_as_absent() {
        let record = Record::new().with("status", "  ").with("kind", "Permit");
        assert_eq!(record.str_field("status"), None);
        assert_eq!(record.str_field("kind"), Some("Permit"));
        assert_eq!(record.str_field("missing"), None);
    }

    #[test]
    fn test_date_field_or_falls_back_to_creation() {
        let record = Record::new().with("creation", "2024-01-02 08:00:00");
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(record.date_field_or(Some("filing_date"), "creation"), Some(expected));
        assert_eq!(record.date_field_or(None, "creation"), Some(expected));
    }
}
