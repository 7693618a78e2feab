//! Normalization of Avni lookup responses.
//!
//! The server answers lookups in three shapes depending on the endpoint:
//!
//! - a bare JSON array of records
//! - a Spring page, `{"content": [...], ...}`
//! - a HAL collection, `{"_embedded": {"<rel>": [...]}, "page": {...}}`
//!
//! All of them reduce to a flat list of records.

use avniconf_core::{AppError, EntityKind, NameMatch};
use serde_json::Value;

/// Flattens any supported response shape into a list of records.
///
/// A HAL collection with an empty result set has no `_embedded` key at all,
/// only `page`; that is an empty list, not an error.
///
/// # Errors
///
/// Returns `AppError::UnexpectedResponse` for any other shape.
///
/// # Examples
///
/// ```
/// use avniconf_client::response::normalize_records;
/// use serde_json::json;
///
/// let records = normalize_records(json!({
///     "_embedded": {"program": [{"name": "Nutrition"}]},
///     "page": {"totalElements": 1}
/// })).unwrap();
/// assert_eq!(records.len(), 1);
/// ```
pub fn normalize_records(body: Value) -> Result<Vec<Value>, AppError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(records) => Ok(records),
        Value::Object(mut object) => {
            if let Some(content) = object.remove("content") {
                return match content {
                    Value::Array(records) => Ok(records),
                    Value::Null => Ok(Vec::new()),
                    other => Err(AppError::UnexpectedResponse(format!(
                        "'content' is not a list: {}",
                        type_name(&other)
                    ))),
                };
            }

            if let Some(embedded) = object.remove("_embedded") {
                let Value::Object(collections) = embedded else {
                    return Err(AppError::UnexpectedResponse(
                        "'_embedded' is not an object".to_string(),
                    ));
                };
                let mut records = Vec::new();
                for (_, collection) in collections {
                    if let Value::Array(items) = collection {
                        records.extend(items);
                    }
                }
                return Ok(records);
            }

            if object.contains_key("page") {
                return Ok(Vec::new());
            }

            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            Err(AppError::UnexpectedResponse(format!(
                "object without 'content' or '_embedded' (keys: {})",
                keys.join(", ")
            )))
        }
        other => Err(AppError::UnexpectedResponse(format!(
            "expected a list or an object, got {}",
            type_name(&other)
        ))),
    }
}

/// Finds the record matching `name` or `uuid`.
///
/// A record matches on an equal `uuid`, or on its display name under
/// `policy`. Locations are searched by `title` first, then `name`.
pub fn find_match(
    records: Vec<Value>,
    kind: EntityKind,
    name: &str,
    uuid: Option<&str>,
    policy: NameMatch,
) -> Option<Value> {
    records.into_iter().find(|record| {
        if let Some(uuid) = uuid {
            if record.get("uuid").and_then(Value::as_str) == Some(uuid) {
                return true;
            }
        }
        display_names(record, kind).any(|candidate| policy.matches(name, candidate))
    })
}

fn display_names(record: &Value, kind: EntityKind) -> impl Iterator<Item = &str> {
    let fields: &[&str] = match kind {
        EntityKind::Locations => &["title", "name"],
        _ => &["name"],
    };
    fields
        .iter()
        .filter_map(move |field| record.get(*field).and_then(Value::as_str))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
