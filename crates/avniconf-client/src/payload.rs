//! Request bodies for entity creation.
//!
//! Each kind has its own contract on the server. Address level types and
//! locations are whitelisted field by field; the web entities accept their
//! definitions as declared, with `"true"`/`"false"` strings in undeclared
//! fields sent as booleans. In every case `null` values and empty objects are
//! dropped, so an absent parent is an absent key.

use avniconf_core::{AppError, EntityDefinition};
use serde_json::{json, Map, Value};

/// Builds the creation body for `definition`.
///
/// Locations are wrapped in a one-element array, the shape the bulk location
/// endpoint expects. The declared parent becomes `parent: {uuid}`.
///
/// # Errors
///
/// Returns `AppError::SerializationError` if a definition cannot be rendered
/// as JSON.
pub fn build_payload(definition: &EntityDefinition) -> Result<Value, AppError> {
    let body = match definition {
        EntityDefinition::AddressLevelType(alt) => {
            let mut body = Map::new();
            body.insert("uuid".into(), json!(alt.uuid));
            body.insert("name".into(), json!(alt.name));
            body.insert("level".into(), json!(alt.level));
            body.insert("parentId".into(), json!(alt.parent_id));
            body.insert("voided".into(), json!(alt.voided.unwrap_or(false)));
            Value::Object(prune(body))
        }
        EntityDefinition::Location(location) => {
            let mut body = Map::new();
            body.insert("uuid".into(), json!(location.uuid));
            body.insert("name".into(), json!(location.name));
            body.insert("level".into(), json!(location.level));
            body.insert("type".into(), json!(location.location_type));
            body.insert(
                "addressLevelTypeUUID".into(),
                json!(location.address_level_type_uuid),
            );
            body.insert("legacyId".into(), json!(location.legacy_id));
            body.insert("gpsCoordinates".into(), json!(location.gps_coordinates));
            body.insert(
                "locationProperties".into(),
                json!(location.location_properties),
            );
            body.insert("voided".into(), json!(location.voided.unwrap_or(false)));
            if let Some(parent) = location
                .parent_location_uuid
                .as_deref()
                .filter(|p| !p.is_empty())
            {
                body.insert("parent".into(), json!({ "uuid": parent }));
            }
            Value::Array(vec![Value::Object(prune(body))])
        }
        EntityDefinition::Catchment(catchment) => {
            let mut body = match serde_json::to_value(catchment)? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            body.insert(
                "deleteFastSync".into(),
                json!(catchment.delete_fast_sync.unwrap_or(false)),
            );
            coerce_bool_strings(&mut body, &catchment.extras);
            Value::Object(prune(body))
        }
        other => match serde_json::to_value(other)? {
            Value::Object(mut map) => {
                if let Some(extras) = web_extras(other) {
                    coerce_bool_strings(&mut map, extras);
                }
                Value::Object(prune(map))
            }
            value => value,
        },
    };
    Ok(body)
}

fn web_extras(definition: &EntityDefinition) -> Option<&Map<String, Value>> {
    match definition {
        EntityDefinition::SubjectType(e) => Some(&e.extras),
        EntityDefinition::Program(e) => Some(&e.extras),
        EntityDefinition::EncounterType(e) => Some(&e.extras),
        _ => None,
    }
}

/// Rewrites `"true"`/`"false"` strings (any case) to booleans, for keys
/// that came from `extras` only. Typed fields are left as they are.
fn coerce_bool_strings(body: &mut Map<String, Value>, extras: &Map<String, Value>) {
    for key in extras.keys() {
        if let Some(value) = body.get_mut(key) {
            let flag = match value.as_str().map(|s| s.trim().to_ascii_lowercase()) {
                Some(s) if s == "true" => true,
                Some(s) if s == "false" => false,
                _ => continue,
            };
            *value = Value::Bool(flag);
        }
    }
}

/// Drops `null` values and empty objects.
fn prune(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::Object(o) => !o.is_empty(),
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use avniconf_core::{ConfigDocument, EntityKind, Location};
    use serde_json::json;

    fn first(doc: &ConfigDocument, kind: EntityKind) -> EntityDefinition {
        doc.definitions(kind).remove(0)
    }

    #[test]
    fn test_address_level_type_whitelist() {
        let doc = ConfigDocument::from_value(&json!({
            "addressLevelTypes": [{
                "name": "District",
                "uuid": "alt-2",
                "level": 2,
                "parentId": 1,
                "colour": "red"
            }]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::AddressLevelTypes)).unwrap();
        assert_eq!(
            body,
            json!({
                "uuid": "alt-2",
                "name": "District",
                "level": 2.0,
                "parentId": 1,
                "voided": false
            })
        );
    }

    #[test]
    fn test_location_with_parent() {
        let mut location = Location::new("Bengaluru", 2.0).with_uuid("loc-2");
        location.location_type = Some("District".to_string());
        location.parent_location_uuid = Some("loc-1".to_string());
        location.parent_name = Some("Karnataka".to_string());

        let body = build_payload(&EntityDefinition::Location(location)).unwrap();
        assert_eq!(
            body,
            json!([{
                "uuid": "loc-2",
                "name": "Bengaluru",
                "level": 2.0,
                "type": "District",
                "voided": false,
                "parent": {"uuid": "loc-1"}
            }])
        );
    }

    #[test]
    fn test_root_location_has_no_parent_key() {
        let location = Location::new("Karnataka", 1.0).with_uuid("loc-1");
        let body = build_payload(&EntityDefinition::Location(location)).unwrap();

        let object = body[0].as_object().unwrap();
        assert!(!object.contains_key("parent"));
        assert!(!object.contains_key("locationProperties"));
        assert!(!object.contains_key("gpsCoordinates"));
    }

    #[test]
    fn test_string_booleans_are_sent_as_booleans() {
        let doc = ConfigDocument::from_value(&json!({
            "locations": [{"name": "Karnataka", "level": 1, "voided": "true"}]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::Locations)).unwrap();
        assert_eq!(body[0]["voided"], json!(true));
    }

    #[test]
    fn test_catchment_defaults() {
        let doc = ConfigDocument::from_value(&json!({
            "catchments": [{"name": "North", "uuid": "c-1", "locationIds": [4, 5]}]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::Catchments)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "North",
                "uuid": "c-1",
                "locationIds": [4, 5],
                "deleteFastSync": false
            })
        );
    }

    #[test]
    fn test_web_entities_keep_declared_fields() {
        let doc = ConfigDocument::from_value(&json!({
            "programs": [{
                "name": "Nutrition",
                "colour": "#ff0000",
                "active": "true",
                "programSubjectLabel": null,
                "enrolmentSummaryRule": "",
                "settings": {}
            }]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::Programs)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Nutrition",
                "colour": "#ff0000",
                "active": true,
                "enrolmentSummaryRule": ""
            })
        );
    }

    #[test]
    fn test_undeclared_string_booleans_are_sent_as_booleans() {
        let doc = ConfigDocument::from_value(&json!({
            "programs": [{
                "name": "true",
                "colour": "False",
                "enableApproval": "true",
                "featureToggle": " FALSE ",
                "label": "yes"
            }]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::Programs)).unwrap();
        assert_eq!(body["enableApproval"], json!(true));
        assert_eq!(body["featureToggle"], json!(false));
        assert_eq!(body["label"], json!("yes"));
        // declared string fields keep their text
        assert_eq!(body["name"], json!("true"));
        assert_eq!(body["colour"], json!("False"));
    }

    #[test]
    fn test_catchment_extras_string_booleans() {
        let doc = ConfigDocument::from_value(&json!({
            "catchments": [{"name": "North", "uuid": "c-1", "fastSyncEnabled": "TRUE"}]
        }))
        .unwrap();

        let body = build_payload(&first(&doc, EntityKind::Catchments)).unwrap();
        assert_eq!(body["fastSyncEnabled"], json!(true));
    }
}
