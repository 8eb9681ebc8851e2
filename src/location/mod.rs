//! Explorable locations inside a hex.
//!
//! Each hex holds one to three locations built from tagged templates.
//! Locations are generated the first time the player enters a hex and are
//! cached by the world from then on.

pub mod data;
pub mod generator;
pub mod types;

pub use data::ContentData;
pub use generator::{LocationGenerator, MAX_OBJECTS_PER_LOCATION, MIN_OBJECTS_PER_LOCATION};
pub use types::{
    add_item, take_one, Area, EntityDisposition, Exit, GameEntity, GameItem, GameObject, ItemKind,
    Location, ObjectKind,
};
