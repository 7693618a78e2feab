//! Parent assignment for location hierarchies.
//!
//! Locations are grouped by their numeric `level`. Every location below the
//! top tier is given a parent from the tier exactly one level above it,
//! either an explicitly declared parent or one chosen round-robin across that
//! tier in input order. The round-robin choice has no geographic meaning; it
//! spreads children evenly and is fully determined by input order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::models::Location;

/// A non-fatal problem found while assigning parents.
///
/// The affected location is still reconciled, just without a parent reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// No location exists at `parent_level`.
    NoParentTier {
        location: String,
        level: f64,
        parent_level: f64,
    },
    /// The location has no usable `level`, so it cannot be placed in the hierarchy.
    MissingLevel { location: String },
    /// `parentName` does not name any declared location.
    UnknownParentName {
        location: String,
        parent_name: String,
    },
    /// A top-tier location declared a parent; it was dropped.
    RootParentIgnored { location: String },
}

impl ResolutionWarning {
    pub fn location(&self) -> &str {
        match self {
            ResolutionWarning::NoParentTier { location, .. }
            | ResolutionWarning::MissingLevel { location }
            | ResolutionWarning::UnknownParentName { location, .. }
            | ResolutionWarning::RootParentIgnored { location } => location,
        }
    }
}

impl std::fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionWarning::NoParentTier {
                location,
                level,
                parent_level,
            } => write!(
                f,
                "'{}' (level {}) has no parent: no locations at level {}",
                location, level, parent_level
            ),
            ResolutionWarning::MissingLevel { location } => {
                write!(f, "'{}' has no level; created without a parent", location)
            }
            ResolutionWarning::UnknownParentName {
                location,
                parent_name,
            } => write!(
                f,
                "'{}' names unknown parent '{}'; falling back to round-robin",
                location, parent_name
            ),
            ResolutionWarning::RootParentIgnored { location } => write!(
                f,
                "'{}' is at the top level; its declared parent was dropped",
                location
            ),
        }
    }
}

/// Locations with parents assigned, in their original input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyResolution {
    pub locations: Vec<Location>,
    pub warnings: Vec<ResolutionWarning>,
}

/// Exact-value key for grouping `f64` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct LevelKey(u64);

impl LevelKey {
    fn new(level: f64) -> Self {
        // -0.0 and 0.0 are the same tier
        let level = if level == 0.0 { 0.0 } else { level };
        Self(level.to_bits())
    }
}

fn usable_level(location: &Location) -> Option<f64> {
    location.level.filter(|l| l.is_finite())
}

/// Ascending by level; locations without a usable level sort last.
fn compare_levels(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Assigns a parent reference to every location below the top tier.
///
/// Locations without a `uuid` get a generated one first, so every location
/// can be referenced by its children. For each location, in level order:
///
/// 1. A location at the minimum level never has a parent.
/// 2. `parentLocationUUID` is kept as declared; `parentName` is resolved
///    through the name → uuid map of all input locations.
/// 3. Otherwise the parent is taken from the tier at `level - 1`, using one
///    counter per child level: the k-th such child gets parent `k mod P`.
/// 4. If that tier is empty, the location keeps no parent and a
///    [`ResolutionWarning`] is recorded.
///
/// # Examples
///
/// ```
/// use avniconf_core::hierarchy::resolve_hierarchy;
/// use avniconf_core::Location;
///
/// let resolution = resolve_hierarchy(vec![
///     Location::new("Karnataka", 1.0).with_uuid("ka"),
///     Location::new("Bengaluru", 2.0),
/// ]);
///
/// assert_eq!(resolution.locations[0].parent_location_uuid, None);
/// assert_eq!(resolution.locations[1].parent_location_uuid.as_deref(), Some("ka"));
/// assert!(resolution.warnings.is_empty());
/// ```
pub fn resolve_hierarchy(mut locations: Vec<Location>) -> HierarchyResolution {
    for location in &mut locations {
        // blank references count as undeclared
        location.parent_location_uuid = location.parent_location_uuid.take().filter(|p| !p.trim().is_empty());
        location.parent_name = location.parent_name.take().filter(|p| !p.trim().is_empty());
        if location.uuid.is_none() {
            location.uuid = Some(uuid::Uuid::new_v4().to_string());
        }
    }

    let uuid_by_name: HashMap<String, String> = locations
        .iter()
        .filter_map(|l| l.uuid.clone().map(|u| (l.name.clone(), u)))
        .collect();

    // sort_by is stable, so input order is kept within a level
    let mut order: Vec<usize> = (0..locations.len()).collect();
    order.sort_by(|&a, &b| compare_levels(usable_level(&locations[a]), usable_level(&locations[b])));

    let mut tiers: BTreeMap<LevelKey, Vec<usize>> = BTreeMap::new();
    for &i in &order {
        if let Some(level) = usable_level(&locations[i]) {
            tiers.entry(LevelKey::new(level)).or_default().push(i);
        }
    }

    let min_level = order.first().and_then(|&i| usable_level(&locations[i]));

    let mut counters: HashMap<LevelKey, usize> = HashMap::new();
    let mut assigned: Vec<Option<(String, String)>> = vec![None; locations.len()];
    let mut warnings = Vec::new();

    for &i in &order {
        let location = &locations[i];
        let level = usable_level(location);

        if level.is_some() && level == min_level {
            if location.parent_location_uuid.is_some() || location.parent_name.is_some() {
                warnings.push(ResolutionWarning::RootParentIgnored {
                    location: location.name.clone(),
                });
            }
            continue;
        }

        if let Some(uuid) = &location.parent_location_uuid {
            let name = location.parent_name.clone().unwrap_or_default();
            assigned[i] = Some((uuid.clone(), name));
            continue;
        }

        if let Some(parent_name) = &location.parent_name {
            match uuid_by_name.get(parent_name) {
                Some(uuid) => {
                    assigned[i] = Some((uuid.clone(), parent_name.clone()));
                    continue;
                }
                None => warnings.push(ResolutionWarning::UnknownParentName {
                    location: location.name.clone(),
                    parent_name: parent_name.clone(),
                }),
            }
        }

        let Some(level) = level else {
            warnings.push(ResolutionWarning::MissingLevel {
                location: location.name.clone(),
            });
            continue;
        };

        let parent_level = level - 1.0;
        let parents = match tiers.get(&LevelKey::new(parent_level)) {
            Some(parents) if !parents.is_empty() => parents,
            _ => {
                warnings.push(ResolutionWarning::NoParentTier {
                    location: location.name.clone(),
                    level,
                    parent_level,
                });
                continue;
            }
        };

        let counter = counters.entry(LevelKey::new(level)).or_insert(0);
        let parent = &locations[parents[*counter % parents.len()]];
        *counter += 1;

        // uuids were filled in above
        if let Some(uuid) = &parent.uuid {
            assigned[i] = Some((uuid.clone(), parent.name.clone()));
        }
    }

    for (location, assignment) in locations.iter_mut().zip(assigned) {
        match assignment {
            Some((uuid, name)) => {
                location.parent_location_uuid = Some(uuid);
                if !name.is_empty() {
                    location.parent_name = Some(name);
                }
            }
            None => {
                location.parent_location_uuid = None;
                location.parent_name = None;
            }
        }
    }

    for warning in &warnings {
        warn!("Location hierarchy: {}", warning);
    }

    HierarchyResolution {
        locations,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_names(resolution: &HierarchyResolution) -> Vec<Option<&str>> {
        resolution
            .locations
            .iter()
            .map(|l| l.parent_name.as_deref())
            .collect()
    }

    #[test]
    fn test_round_robin_across_parents() {
        let resolution = resolve_hierarchy(vec![
            Location::new("Karnataka", 1.0),
            Location::new("Maharashtra", 1.0),
            Location::new("Bengaluru", 2.0),
            Location::new("Mumbai", 2.0),
            Location::new("Mysore", 2.0),
            Location::new("Pune", 2.0),
            Location::new("Hubli", 2.0),
        ]);

        assert_eq!(
            parent_names(&resolution),
            vec![
                None,
                None,
                Some("Karnataka"),
                Some("Maharashtra"),
                Some("Karnataka"),
                Some("Maharashtra"),
                Some("Karnataka"),
            ]
        );
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_kth_child_gets_parent_k_mod_p() {
        let parents = 3;
        let children = 8;
        let mut input: Vec<Location> = (0..parents)
            .map(|p| Location::new(format!("P{}", p), 1.0).with_uuid(format!("p-{}", p)))
            .collect();
        input.extend((0..children).map(|c| Location::new(format!("C{}", c), 2.0)));

        let resolution = resolve_hierarchy(input);
        for k in 0..children {
            let child = &resolution.locations[parents + k];
            assert_eq!(
                child.parent_location_uuid.as_deref(),
                Some(format!("p-{}", k % parents).as_str())
            );
        }
    }

    #[test]
    fn test_output_keeps_input_order() {
        let resolution = resolve_hierarchy(vec![
            Location::new("Bengaluru", 2.0),
            Location::new("Whitefield", 3.0),
            Location::new("Karnataka", 1.0),
        ]);

        let names: Vec<&str> = resolution.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Bengaluru", "Whitefield", "Karnataka"]);
        assert_eq!(parent_names(&resolution), vec![Some("Karnataka"), Some("Bengaluru"), None]);
    }

    #[test]
    fn test_parent_reference_is_parent_uuid() {
        let resolution = resolve_hierarchy(vec![
            Location::new("Karnataka", 1.0),
            Location::new("Bengaluru", 2.0),
        ]);
        let karnataka = &resolution.locations[0];
        let bengaluru = &resolution.locations[1];
        assert!(karnataka.uuid.is_some());
        assert_eq!(bengaluru.parent_location_uuid, karnataka.uuid);
    }

    #[test]
    fn test_missing_tier_is_warning_not_error() {
        let resolution = resolve_hierarchy(vec![
            Location::new("Karnataka", 1.0),
            Location::new("Whitefield", 3.0),
        ]);

        assert_eq!(resolution.locations.len(), 2);
        assert_eq!(resolution.locations[1].parent_location_uuid, None);
        assert_eq!(
            resolution.warnings,
            vec![ResolutionWarning::NoParentTier {
                location: "Whitefield".to_string(),
                level: 3.0,
                parent_level: 2.0,
            }]
        );
    }

    #[test]
    fn test_non_integer_levels() {
        let resolution = resolve_hierarchy(vec![
            Location::new("Region", 0.5),
            Location::new("Zone", 1.5),
        ]);
        assert_eq!(parent_names(&resolution), vec![None, Some("Region")]);
    }

    #[test]
    fn test_missing_level_sorts_last_and_warns() {
        let mut floating = Location::new("Floating", 1.0);
        floating.level = None;

        let resolution = resolve_hierarchy(vec![
            floating,
            Location::new("Karnataka", 1.0),
            Location::new("Bengaluru", 2.0),
        ]);

        assert_eq!(parent_names(&resolution), vec![None, None, Some("Karnataka")]);
        assert_eq!(
            resolution.warnings,
            vec![ResolutionWarning::MissingLevel {
                location: "Floating".to_string()
            }]
        );
    }

    #[test]
    fn test_explicit_parent_uuid_wins_and_skips_counter() {
        let mut mysore = Location::new("Mysore", 2.0);
        mysore.parent_location_uuid = Some("mh".to_string());

        let resolution = resolve_hierarchy(vec![
            Location::new("Karnataka", 1.0).with_uuid("ka"),
            Location::new("Maharashtra", 1.0).with_uuid("mh"),
            mysore,
            Location::new("Bengaluru", 2.0),
        ]);

        assert_eq!(resolution.locations[2].parent_location_uuid.as_deref(), Some("mh"));
        // first round-robin child still starts at parent 0
        assert_eq!(resolution.locations[3].parent_location_uuid.as_deref(), Some("ka"));
    }

    #[test]
    fn test_parent_name_resolves_through_map() {
        let mut pune = Location::new("Pune", 2.0);
        pune.parent_name = Some("Maharashtra".to_string());

        let resolution = resolve_hierarchy(vec![
            pune,
            Location::new("Karnataka", 1.0).with_uuid("ka"),
            Location::new("Maharashtra", 1.0).with_uuid("mh"),
        ]);

        assert_eq!(resolution.locations[0].parent_location_uuid.as_deref(), Some("mh"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_unknown_parent_name_falls_back() {
        let mut pune = Location::new("Pune", 2.0);
        pune.parent_name = Some("Gujarat".to_string());

        let resolution = resolve_hierarchy(vec![Location::new("Karnataka", 1.0).with_uuid("ka"), pune]);

        assert_eq!(resolution.locations[1].parent_location_uuid.as_deref(), Some("ka"));
        assert_eq!(resolution.locations[1].parent_name.as_deref(), Some("Karnataka"));
        assert_eq!(resolution.warnings.len(), 1);
        assert!(matches!(
            resolution.warnings[0],
            ResolutionWarning::UnknownParentName { .. }
        ));
    }

    #[test]
    fn test_root_parent_dropped() {
        let mut karnataka = Location::new("Karnataka", 1.0);
        karnataka.parent_location_uuid = Some("india".to_string());

        let resolution = resolve_hierarchy(vec![karnataka]);

        assert_eq!(resolution.locations[0].parent_location_uuid, None);
        assert_eq!(
            resolution.warnings,
            vec![ResolutionWarning::RootParentIgnored {
                location: "Karnataka".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_parent_uuid_falls_back_to_round_robin() {
        let doc = crate::models::ConfigDocument::from_value(&serde_json::json!({
            "locations": [
                {"name": "Karnataka", "level": 1, "uuid": "ka"},
                {"name": "Bengaluru", "level": 2, "parentLocationUUID": ""}
            ]
        }))
        .unwrap();

        let resolution = resolve_hierarchy(doc.locations);

        assert_eq!(resolution.locations[1].parent_location_uuid.as_deref(), Some("ka"));
        assert_eq!(resolution.locations[1].parent_name.as_deref(), Some("Karnataka"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_blank_parent_name_falls_back_to_round_robin() {
        let mut pune = Location::new("Pune", 2.0);
        pune.parent_name = Some("   ".to_string());

        let resolution = resolve_hierarchy(vec![Location::new("Maharashtra", 1.0).with_uuid("mh"), pune]);

        assert_eq!(resolution.locations[1].parent_location_uuid.as_deref(), Some("mh"));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_blank_parent_without_tier_warns() {
        let mut whitefield = Location::new("Whitefield", 3.0);
        whitefield.parent_location_uuid = Some(" ".to_string());

        let resolution = resolve_hierarchy(vec![Location::new("Karnataka", 1.0), whitefield]);

        assert_eq!(resolution.locations[1].parent_location_uuid, None);
        assert_eq!(
            resolution.warnings,
            vec![ResolutionWarning::NoParentTier {
                location: "Whitefield".to_string(),
                level: 3.0,
                parent_level: 2.0,
            }]
        );
    }

    #[test]
    fn test_blank_parent_on_root_is_not_warned() {
        let mut karnataka = Location::new("Karnataka", 1.0);
        karnataka.parent_location_uuid = Some(String::new());

        let resolution = resolve_hierarchy(vec![karnataka]);

        assert_eq!(resolution.locations[0].parent_location_uuid, None);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_declared_uuids_are_kept() {
        let resolution = resolve_hierarchy(vec![Location::new("Karnataka", 1.0).with_uuid("ka")]);
        assert_eq!(resolution.locations[0].uuid.as_deref(), Some("ka"));
    }

    #[test]
    fn test_empty_input() {
        let resolution = resolve_hierarchy(Vec::new());
        assert!(resolution.locations.is_empty());
        assert!(resolution.warnings.is_empty());
    }
}
