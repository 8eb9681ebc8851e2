//! Content pools for location generation.
//!
//! Defaults are embedded in the binary via `include_str!`; a data directory
//! can replace them file by file. Bad or missing files never fail the game:
//! they are logged and replaced by a fallback.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::types::{
    EntityTemplate, ItemTemplate, LocationTemplate, ObjectKind, ObjectTemplate,
};

const DEFAULT_LOCATIONS_JSON: &str = include_str!("../../data/defaults/locations.json");
const DEFAULT_OBJECTS_JSON: &str = include_str!("../../data/defaults/objects.json");
const DEFAULT_ENTITIES_JSON: &str = include_str!("../../data/defaults/entities.json");
const DEFAULT_ITEMS_JSON: &str = include_str!("../../data/defaults/items.json");

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<LocationTemplate>,
}

#[derive(Deserialize)]
struct ObjectsFile {
    objects: Vec<ObjectTemplate>,
}

#[derive(Deserialize)]
struct EntitiesFile {
    entities: Vec<EntityTemplate>,
}

#[derive(Deserialize)]
struct ItemsFile {
    items: Vec<ItemTemplate>,
}

/// Read-only spawn tables, loaded once per game.
///
/// Not stored in save files; generated locations carry copies of everything
/// they need.
#[derive(Clone, Debug, Default)]
pub struct ContentData {
    pub locations: Vec<LocationTemplate>,
    pub objects: Vec<ObjectTemplate>,
    pub entities: Vec<EntityTemplate>,
    /// Item templates keyed by id.
    pub items: BTreeMap<String, ItemTemplate>,
}

impl ContentData {
    /// The content shipped with the game.
    pub fn embedded() -> Self {
        let locations = parse::<LocationsFile>("locations.json", DEFAULT_LOCATIONS_JSON)
            .map(|f| f.locations)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(minimal_templates);
        let objects = parse::<ObjectsFile>("objects.json", DEFAULT_OBJECTS_JSON)
            .map_or_else(Vec::new, |f| f.objects);
        let entities = parse::<EntitiesFile>("entities.json", DEFAULT_ENTITIES_JSON)
            .map_or_else(Vec::new, |f| f.entities);
        let items = parse::<ItemsFile>("items.json", DEFAULT_ITEMS_JSON)
            .map_or_else(Vec::new, |f| f.items);

        Self::assemble(locations, objects, entities, items)
    }

    /// Load `locations.json`, `objects.json`, `entities.json` and `items.json`
    /// from `dir`.
    ///
    /// Missing or invalid location data falls back to the minimal template
    /// set; missing pools become empty.
    pub fn load_from(dir: &Path) -> Self {
        let locations = read::<LocationsFile>(dir, "locations.json")
            .map(|f| f.locations)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(dir = %dir.display(), "no usable location templates, using minimal set");
                minimal_templates()
            });
        let objects = read::<ObjectsFile>(dir, "objects.json").map_or_else(Vec::new, |f| f.objects);
        let entities = read::<EntitiesFile>(dir, "entities.json").map_or_else(Vec::new, |f| f.entities);
        let items = read::<ItemsFile>(dir, "items.json").map_or_else(Vec::new, |f| f.items);

        let data = Self::assemble(locations, objects, entities, items);
        tracing::info!(
            dir = %dir.display(),
            locations = data.locations.len(),
            objects = data.objects.len(),
            entities = data.entities.len(),
            items = data.items.len(),
            "content loaded"
        );
        data
    }

    fn assemble(
        locations: Vec<LocationTemplate>,
        objects: Vec<ObjectTemplate>,
        entities: Vec<EntityTemplate>,
        items: Vec<ItemTemplate>,
    ) -> Self {
        Self {
            locations,
            objects,
            entities,
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    /// Templates of one location bucket.
    pub fn templates_for(&self, location_type: &str) -> Vec<&LocationTemplate> {
        self.locations
            .iter()
            .filter(|t| t.location_type == location_type)
            .collect()
    }

    pub fn item(&self, id: &str) -> Option<&ItemTemplate> {
        self.items.get(id)
    }
}

fn parse<T: DeserializeOwned>(label: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(file = label, error = %err, "failed to parse content file");
            None
        }
    }
}

fn read<T: DeserializeOwned>(dir: &Path, file: &str) -> Option<T> {
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse(&path.display().to_string(), &contents),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "content file unavailable");
            None
        }
    }
}

/// Exit location used when a bucket has no exit-flagged template of its own.
pub fn fallback_exit_template() -> LocationTemplate {
    LocationTemplate {
        id: "wilderness_trail".to_string(),
        name: "Wilderness Trail".to_string(),
        description: "A faint trail leading back out into the open country.".to_string(),
        location_type: "forest".to_string(),
        tags: vec!["woodland".to_string(), "grassland".to_string()],
        spawn_weight: 1,
        exit: true,
    }
}

/// Spawn used when no object or entity shares a tag with the template.
pub fn fallback_object() -> ObjectTemplate {
    ObjectTemplate {
        id: "loose_stones".to_string(),
        name: "Loose Stones".to_string(),
        description: "A scatter of weathered stones.".to_string(),
        kind: ObjectKind::Scenery,
        tags: Vec::new(),
        spawn_weight: 1,
        drop_chance: 0,
        drops: Vec::new(),
    }
}

fn minimal_templates() -> Vec<LocationTemplate> {
    vec![
        fallback_exit_template(),
        LocationTemplate {
            id: "quiet_hollow".to_string(),
            name: "Quiet Hollow".to_string(),
            description: "A sheltered dip in the land, out of the wind.".to_string(),
            location_type: "forest".to_string(),
            tags: vec!["woodland".to_string()],
            spawn_weight: 1,
            exit: false,
        },
    ]
}
