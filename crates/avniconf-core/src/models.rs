//! Configuration document and entity definitions.
//!
//! Each entity kind has its own typed record. Known fields are typed; anything
//! else lands in the flattened `extras` map and is carried through untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// One category of configuration object.
///
/// Variants are declared in dependency order, so the derived `Ord` matches
/// [`EntityKind::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    AddressLevelTypes,
    Locations,
    Catchments,
    SubjectTypes,
    Programs,
    EncounterTypes,
}

impl EntityKind {
    /// Processing order: parents before dependents.
    pub const ORDER: [EntityKind; 6] = [
        EntityKind::AddressLevelTypes,
        EntityKind::Locations,
        EntityKind::Catchments,
        EntityKind::SubjectTypes,
        EntityKind::Programs,
        EntityKind::EncounterTypes,
    ];

    /// Key of this kind in a configuration document.
    pub fn config_key(&self) -> &'static str {
        match self {
            EntityKind::AddressLevelTypes => "addressLevelTypes",
            EntityKind::Locations => "locations",
            EntityKind::Catchments => "catchments",
            EntityKind::SubjectTypes => "subjectTypes",
            EntityKind::Programs => "programs",
            EntityKind::EncounterTypes => "encounterTypes",
        }
    }

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|k| k.config_key() == key)
    }

    /// Singular human-readable label, used in outcome messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::AddressLevelTypes => "Address level type",
            EntityKind::Locations => "Location",
            EntityKind::Catchments => "Catchment",
            EntityKind::SubjectTypes => "Subject type",
            EntityKind::Programs => "Program",
            EntityKind::EncounterTypes => "Encounter type",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Accepts `true`/`false` as JSON booleans or as strings in any case.
///
/// Output is always a JSON boolean, so string booleans never reach the server.
mod lenient_bool {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Bool(b)) => Ok(Some(b)),
            Some(Raw::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(serde::de::Error::custom(format!(
                    "expected a boolean, found \"{}\"",
                    s
                ))),
            },
        }
    }
}

/// A named hierarchy tier such as State or District.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressLevelType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Lower values are higher in the hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// A concrete place in the location hierarchy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    /// Name of the address level type (tier) this location belongs to.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(
        rename = "addressLevelTypeUUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_level_type_uuid: Option<String>,
    /// Stable identifier of the parent location, set explicitly or by hierarchy resolution.
    #[serde(
        rename = "parentLocationUUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_location_uuid: Option<String>,
    /// Name of the parent location, as declared or as assigned by hierarchy resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_coordinates: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_properties: Option<Map<String, Value>>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Location {
    /// Minimal location, mostly useful in tests and examples.
    pub fn new(name: impl Into<String>, level: f64) -> Self {
        Self {
            name: name.into(),
            uuid: None,
            level: Some(level),
            location_type: None,
            address_level_type_uuid: None,
            parent_location_uuid: None,
            parent_name: None,
            legacy_id: None,
            gps_coordinates: None,
            location_properties: None,
            voided: None,
            extras: Map::new(),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }
}

/// A group of locations assigned to field workers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catchment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub location_ids: Vec<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_fast_sync: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Person, Individual, Group, Household or User.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub household: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_empty_location: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub should_sync_by_location: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_form_uuid: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_subject_label: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_eligibility_check_required: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_growth_chart: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_multiple_enrolments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_enrolment_form_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_exit_form_uuid: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type_uuid: Option<String>,
    /// Absent for general (non-program) encounters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_uuid: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub voided: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_bool::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_immutable: Option<bool>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// One entity to reconcile, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityDefinition {
    AddressLevelType(AddressLevelType),
    Location(Location),
    Catchment(Catchment),
    SubjectType(SubjectType),
    Program(Program),
    EncounterType(EncounterType),
}

impl EntityDefinition {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDefinition::AddressLevelType(_) => EntityKind::AddressLevelTypes,
            EntityDefinition::Location(_) => EntityKind::Locations,
            EntityDefinition::Catchment(_) => EntityKind::Catchments,
            EntityDefinition::SubjectType(_) => EntityKind::SubjectTypes,
            EntityDefinition::Program(_) => EntityKind::Programs,
            EntityDefinition::EncounterType(_) => EntityKind::EncounterTypes,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityDefinition::AddressLevelType(e) => &e.name,
            EntityDefinition::Location(e) => &e.name,
            EntityDefinition::Catchment(e) => &e.name,
            EntityDefinition::SubjectType(e) => &e.name,
            EntityDefinition::Program(e) => &e.name,
            EntityDefinition::EncounterType(e) => &e.name,
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid_slot().as_deref()
    }

    /// Assigns a random v4 UUID when none was declared. Returns the UUID in effect.
    pub fn ensure_uuid(&mut self) -> &str {
        self.uuid_slot_mut()
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
    }

    fn uuid_slot(&self) -> &Option<String> {
        match self {
            EntityDefinition::AddressLevelType(e) => &e.uuid,
            EntityDefinition::Location(e) => &e.uuid,
            EntityDefinition::Catchment(e) => &e.uuid,
            EntityDefinition::SubjectType(e) => &e.uuid,
            EntityDefinition::Program(e) => &e.uuid,
            EntityDefinition::EncounterType(e) => &e.uuid,
        }
    }

    fn uuid_slot_mut(&mut self) -> &mut Option<String> {
        match self {
            EntityDefinition::AddressLevelType(e) => &mut e.uuid,
            EntityDefinition::Location(e) => &mut e.uuid,
            EntityDefinition::Catchment(e) => &mut e.uuid,
            EntityDefinition::SubjectType(e) => &mut e.uuid,
            EntityDefinition::Program(e) => &mut e.uuid,
            EntityDefinition::EncounterType(e) => &mut e.uuid,
        }
    }
}

/// A full configuration: one list of definitions per entity kind.
///
/// Absent and empty kinds are both represented by an empty list and are
/// skipped during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub address_level_types: Vec<AddressLevelType>,
    pub locations: Vec<Location>,
    pub catchments: Vec<Catchment>,
    pub subject_types: Vec<SubjectType>,
    pub programs: Vec<Program>,
    pub encounter_types: Vec<EncounterType>,
}

impl ConfigDocument {
    /// Builds a document from untyped JSON.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidConfig` if `value` is not an object, a kind is not a
    ///   list, or a record is malformed (the message names `kind[index]`).
    /// - `AppError::NoEntityKinds` if none of the known kind keys is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avniconf_core::ConfigDocument;
    /// use serde_json::json;
    ///
    /// let doc = ConfigDocument::from_value(&json!({
    ///     "locations": [{"name": "Karnataka", "level": 1.0, "voided": "false"}]
    /// })).unwrap();
    /// assert_eq!(doc.locations[0].voided, Some(false));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, AppError> {
        let object = value.as_object().ok_or_else(|| {
            AppError::InvalidConfig("configuration must be a JSON object".to_string())
        })?;

        let present: Vec<EntityKind> = EntityKind::ORDER
            .into_iter()
            .filter(|k| object.get(k.config_key()).is_some_and(|v| !v.is_null()))
            .collect();
        if present.is_empty() {
            return Err(AppError::NoEntityKinds);
        }

        for key in object.keys() {
            if EntityKind::from_config_key(key).is_none() {
                tracing::debug!("Ignoring unknown configuration key '{}'", key);
            }
        }

        let items = |kind: EntityKind| object.get(kind.config_key());

        Ok(Self {
            address_level_types: parse_records(
                EntityKind::AddressLevelTypes,
                items(EntityKind::AddressLevelTypes),
            )?,
            locations: parse_records(EntityKind::Locations, items(EntityKind::Locations))?,
            catchments: parse_records(EntityKind::Catchments, items(EntityKind::Catchments))?,
            subject_types: parse_records(
                EntityKind::SubjectTypes,
                items(EntityKind::SubjectTypes),
            )?,
            programs: parse_records(EntityKind::Programs, items(EntityKind::Programs))?,
            encounter_types: parse_records(
                EntityKind::EncounterTypes,
                items(EntityKind::EncounterTypes),
            )?,
        })
    }

    /// Parses a JSON document. Parse failures are configuration errors.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidConfig(format!("not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Definitions of one kind, in declaration order.
    pub fn definitions(&self, kind: EntityKind) -> Vec<EntityDefinition> {
        fn wrap<T: Clone>(items: &[T], f: fn(T) -> EntityDefinition) -> Vec<EntityDefinition> {
            items.iter().cloned().map(f).collect()
        }

        match kind {
            EntityKind::AddressLevelTypes => {
                wrap(&self.address_level_types, EntityDefinition::AddressLevelType)
            }
            EntityKind::Locations => wrap(&self.locations, EntityDefinition::Location),
            EntityKind::Catchments => wrap(&self.catchments, EntityDefinition::Catchment),
            EntityKind::SubjectTypes => wrap(&self.subject_types, EntityDefinition::SubjectType),
            EntityKind::Programs => wrap(&self.programs, EntityDefinition::Program),
            EntityKind::EncounterTypes => {
                wrap(&self.encounter_types, EntityDefinition::EncounterType)
            }
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::AddressLevelTypes => self.address_level_types.len(),
            EntityKind::Locations => self.locations.len(),
            EntityKind::Catchments => self.catchments.len(),
            EntityKind::SubjectTypes => self.subject_types.len(),
            EntityKind::Programs => self.programs.len(),
            EntityKind::EncounterTypes => self.encounter_types.len(),
        }
    }

    /// Total number of definitions across all kinds.
    pub fn len(&self) -> usize {
        EntityKind::ORDER.iter().map(|k| self.count(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records that carry a display name.
trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($t:ty),*) => {
        $(impl Named for $t {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(AddressLevelType, Location, Catchment, SubjectType, Program, EncounterType);

fn parse_records<T: DeserializeOwned + Named>(
    kind: EntityKind,
    value: Option<&Value>,
) -> Result<Vec<T>, AppError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AppError::InvalidConfig(format!(
                "{} must be a list",
                kind.config_key()
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let record: T = serde_json::from_value(item.clone()).map_err(|e| {
                AppError::InvalidConfig(format!("{}[{}]: {}", kind.config_key(), i, e))
            })?;
            if record.name().trim().is_empty() {
                return Err(AppError::InvalidConfig(format!(
                    "{}[{}]: name must not be empty",
                    kind.config_key(),
                    i
                )));
            }
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_order_matches_ord() {
        let mut sorted = EntityKind::ORDER;
        sorted.sort();
        assert_eq!(sorted, EntityKind::ORDER);
    }

    #[test]
    fn test_kind_config_keys_round_trip() {
        for kind in EntityKind::ORDER {
            assert_eq!(EntityKind::from_config_key(kind.config_key()), Some(kind));
        }
        assert_eq!(EntityKind::from_config_key("users"), None);
    }

    #[test]
    fn test_from_value_rejects_non_mapping() {
        let result = ConfigDocument::from_value(&json!(["locations"]));
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_value_rejects_no_kinds() {
        let result = ConfigDocument::from_value(&json!({"users": []}));
        assert!(matches!(result, Err(AppError::NoEntityKinds)));

        let result = ConfigDocument::from_value(&json!({"locations": null}));
        assert!(matches!(result, Err(AppError::NoEntityKinds)));
    }

    #[test]
    fn test_from_value_accepts_empty_kinds() {
        let doc = ConfigDocument::from_value(&json!({
            "addressLevelTypes": [],
            "locations": []
        }))
        .unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_string_booleans_become_booleans() {
        let doc = ConfigDocument::from_value(&json!({
            "subjectTypes": [{"name": "Person", "type": "Person", "active": "TRUE", "voided": "false"}]
        }))
        .unwrap();
        let st = &doc.subject_types[0];
        assert_eq!(st.active, Some(true));
        assert_eq!(st.voided, Some(false));

        let out = serde_json::to_value(st).unwrap();
        assert_eq!(out["active"], json!(true));
        assert_eq!(out["voided"], json!(false));
    }

    #[test]
    fn test_invalid_string_boolean_is_config_error() {
        let result = ConfigDocument::from_value(&json!({
            "addressLevelTypes": [{"name": "State", "level": 1, "voided": "maybe"}]
        }));
        match result {
            Err(AppError::InvalidConfig(msg)) => assert!(msg.starts_with("addressLevelTypes[0]")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_name_is_config_error() {
        let result = ConfigDocument::from_value(&json!({
            "programs": [{"name": "ok"}, {"name": "  "}]
        }));
        match result {
            Err(AppError::InvalidConfig(msg)) => assert!(msg.contains("programs[1]")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_must_be_list() {
        let result = ConfigDocument::from_value(&json!({"locations": {"name": "x"}}));
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_extras_are_preserved() {
        let doc = ConfigDocument::from_value(&json!({
            "encounterTypes": [{
                "name": "Home Visit",
                "subjectTypeUuid": "st-1",
                "entityEligibilityCheckRule": "rule()"
            }]
        }))
        .unwrap();
        let et = &doc.encounter_types[0];
        assert_eq!(et.subject_type_uuid.as_deref(), Some("st-1"));
        assert_eq!(et.extras["entityEligibilityCheckRule"], json!("rule()"));
    }

    #[test]
    fn test_location_field_names() {
        let doc = ConfigDocument::from_value(&json!({
            "locations": [{
                "name": "Bengaluru",
                "level": 2.0,
                "type": "District",
                "addressLevelTypeUUID": "alt-2",
                "parentLocationUUID": "loc-1",
                "locationProperties": {"population": 8500000}
            }]
        }))
        .unwrap();
        let loc = &doc.locations[0];
        assert_eq!(loc.location_type.as_deref(), Some("District"));
        assert_eq!(loc.address_level_type_uuid.as_deref(), Some("alt-2"));
        assert_eq!(loc.parent_location_uuid.as_deref(), Some("loc-1"));
        assert!(loc.extras.is_empty());
    }

    #[test]
    fn test_definitions_and_counts() {
        let doc = ConfigDocument::from_value(&json!({
            "locations": [{"name": "A", "level": 1}, {"name": "B", "level": 2}],
            "programs": [{"name": "P"}]
        }))
        .unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.count(EntityKind::Locations), 2);

        let defs = doc.definitions(EntityKind::Locations);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].name(), "B");
        assert_eq!(defs[1].kind(), EntityKind::Locations);
    }

    #[test]
    fn test_ensure_uuid_keeps_declared() {
        let mut def = EntityDefinition::Location(Location::new("A", 1.0).with_uuid("fixed"));
        assert_eq!(def.ensure_uuid(), "fixed");

        let mut def = EntityDefinition::Location(Location::new("B", 1.0));
        let generated = def.ensure_uuid().to_string();
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
        assert_eq!(def.uuid(), Some(generated.as_str()));
    }
}
