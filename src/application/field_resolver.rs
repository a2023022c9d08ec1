// Alias-based field resolution against a live entity schema
use crate::domain::record::FieldDescriptor;

/// Pick the first schema field matching any candidate alias.
///
/// Matching is ASCII case-insensitive and runs in candidate-priority order:
/// the first alias present anywhere in the schema wins, regardless of where
/// that field sits in the schema. Upstream deployments rename fields freely
/// ("customer" vs "client" vs "party"), so callers pass a fixed priority
/// list instead of hardcoding one convention.
pub fn resolve_field<'a>(schema: &'a [FieldDescriptor], aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        let found = schema
            .iter()
            .find(|field| field.fieldname.eq_ignore_ascii_case(alias));
        if let Some(field) = found {
            return Some(field.fieldname.as_str());
        }
    }
    None
}
