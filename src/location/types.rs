//! Content templates and the runtime location graph built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Coord;

fn default_weight() -> u32 {
    1
}

/// What an item does when used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Food { nourishment: u8 },
    Drink { quench: u8 },
    Healing { amount: u32 },
    Key,
    Tool,
    Material,
    Treasure,
}

/// What the player can do with an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Scenery,
    Forageable,
    Tree,
    WaterSource,
    Container { locked: bool },
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Scenery => "scenery",
            ObjectKind::Forageable => "forageable",
            ObjectKind::Tree => "tree",
            ObjectKind::WaterSource => "water source",
            ObjectKind::Container { .. } => "container",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityDisposition {
    Friendly,
    Neutral,
    Hostile,
}

impl fmt::Display for EntityDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityDisposition::Friendly => "friendly",
            EntityDisposition::Neutral => "neutral",
            EntityDisposition::Hostile => "hostile",
        })
    }
}

/// One weighted entry of a drop table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEntry {
    pub item: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ObjectKind,
    pub tags: Vec<String>,
    #[serde(default = "default_weight")]
    pub spawn_weight: u32,
    /// Percent chance (0-100) that the object carries an item.
    #[serde(default)]
    pub drop_chance: u8,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub disposition: EntityDisposition,
    pub hit_points: u32,
    pub tags: Vec<String>,
    #[serde(default = "default_weight")]
    pub spawn_weight: u32,
    #[serde(default)]
    pub drop_chance: u8,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Bucket this template belongs to ("forest", "coast", ...).
    pub location_type: String,
    pub tags: Vec<String>,
    #[serde(default = "default_weight")]
    pub spawn_weight: u32,
    /// Whether this location connects back to the overworld.
    #[serde(default)]
    pub exit: bool,
}

impl LocationTemplate {
    pub fn shares_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItem {
    /// Template id; stacks of the same item share it.
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub quantity: u32,
}

impl GameItem {
    pub fn from_template(template: &ItemTemplate, quantity: u32) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            kind: template.kind.clone(),
            quantity,
        }
    }

    pub fn label(&self) -> String {
        if self.quantity > 1 {
            format!("{} x{}", self.name, self.quantity)
        } else {
            self.name.clone()
        }
    }
}

/// Add `item` to `items`, merging it into an existing stack.
pub fn add_item(items: &mut Vec<GameItem>, item: GameItem) {
    match items.iter_mut().find(|i| i.id == item.id) {
        Some(stack) => stack.quantity += item.quantity,
        None => items.push(item),
    }
}

/// Take one unit of the item matching `query` out of `items`.
pub fn take_one(items: &mut Vec<GameItem>, query: &str) -> Option<GameItem> {
    let index = items.iter().position(|i| matches_name(&i.name, &i.id, query))?;
    let stack = &mut items[index];
    if stack.quantity > 1 {
        stack.quantity -= 1;
        let mut one = stack.clone();
        one.quantity = 1;
        Some(one)
    } else {
        Some(items.remove(index))
    }
}

/// Case-insensitive match against a display name or an id.
pub fn matches_name(name: &str, id: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    !query.is_empty() && (name.to_lowercase().contains(&query) || id == query)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: String,
    pub template: String,
    pub name: String,
    pub description: String,
    pub kind: ObjectKind,
    /// Items hidden in or on the object until it is searched.
    pub items: Vec<GameItem>,
    pub searched: bool,
    /// Set once the object has been foraged, chopped or emptied.
    pub depleted: bool,
    /// Drop table kept for foraging and chopping.
    pub drops: Vec<DropEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntity {
    pub id: String,
    pub template: String,
    pub name: String,
    pub description: String,
    pub disposition: EntityDisposition,
    pub hit_points: u32,
    pub items: Vec<GameItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "location", rename_all = "snake_case")]
pub enum Exit {
    Overworld,
    Location(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub description: String,
    pub objects: Vec<GameObject>,
    pub entities: Vec<GameEntity>,
    /// Loose items lying in the open.
    pub items: Vec<GameItem>,
    pub exits: Vec<Exit>,
}

impl Area {
    pub fn spawn_count(&self) -> usize {
        self.objects.len() + self.entities.len()
    }

    pub fn find_object(&self, query: &str) -> Option<&GameObject> {
        self.objects.iter().find(|o| matches_name(&o.name, &o.template, query))
    }

    pub fn find_object_mut(&mut self, query: &str) -> Option<&mut GameObject> {
        self.objects
            .iter_mut()
            .find(|o| matches_name(&o.name, &o.template, query))
    }

    pub fn find_entity(&self, query: &str) -> Option<&GameEntity> {
        self.entities.iter().find(|e| matches_name(&e.name, &e.template, query))
    }

    pub fn describe(&self) -> String {
        let mut text = format!("{}\n{}", self.name, self.description);
        if !self.objects.is_empty() {
            let names: Vec<&str> = self.objects.iter().map(|o| o.name.as_str()).collect();
            text.push_str(&format!("\nYou see: {}", names.join(", ")));
        }
        if !self.entities.is_empty() {
            let names: Vec<String> = self
                .entities
                .iter()
                .map(|e| format!("{} ({})", e.name, e.disposition))
                .collect();
            text.push_str(&format!("\nCreatures: {}", names.join(", ")));
        }
        if !self.items.is_empty() {
            let names: Vec<String> = self.items.iter().map(|i| i.label()).collect();
            text.push_str(&format!("\nOn the ground: {}", names.join(", ")));
        }
        text
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// `<hex key>_<n>`, unique across the world.
    pub id: String,
    pub hex: Coord,
    pub template: String,
    pub name: String,
    pub description: String,
    pub location_type: String,
    pub is_exit: bool,
    pub areas: Vec<Area>,
}

impl Location {
    pub fn main_area(&self) -> Option<&Area> {
        self.areas.first()
    }

    pub fn main_area_mut(&mut self) -> Option<&mut Area> {
        self.areas.first_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berries(quantity: u32) -> GameItem {
        GameItem {
            id: "wild_berries".to_string(),
            name: "Wild Berries".to_string(),
            description: String::new(),
            kind: ItemKind::Food { nourishment: 10 },
            quantity,
        }
    }

    #[test]
    fn test_stacks_merge_and_split() {
        let mut items = Vec::new();
        add_item(&mut items, berries(1));
        add_item(&mut items, berries(2));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);

        let one = take_one(&mut items, "berries").unwrap();
        assert_eq!(one.quantity, 1);
        assert_eq!(items[0].quantity, 2);
        assert!(take_one(&mut items, "sword").is_none());
    }

    #[test]
    fn test_kind_json_shape() {
        let kind: ObjectKind = serde_json::from_str(r#"{ "type": "container", "locked": true }"#).unwrap();
        assert_eq!(kind, ObjectKind::Container { locked: true });
        let exit = serde_json::to_value(Exit::Location("0101_1".to_string())).unwrap();
        assert_eq!(exit["to"], "location");
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(!matches_name("Oak Tree", "oak_tree", "  "));
        assert!(matches_name("Oak Tree", "oak_tree", "OAK"));
    }
}
