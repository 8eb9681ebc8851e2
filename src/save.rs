//! Save files and debug dumps.
//!
//! A save is one pretty-printed JSON document: the player's state plus the
//! whole generated world, with hexes keyed by their zero-padded coordinate
//! string. The format version is checked before anything else is parsed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, WorldError};
use crate::game::clock::{GameClock, Weather};
use crate::game::player::{Character, Survival};
use crate::grid::{hex_key, Coord, Grid};
use crate::history::civilization::Civilization;
use crate::history::events::HistoricalEvent;
use crate::history::figures::HistoricalFigure;
use crate::location::Location;
use crate::seeds::WorldSeeds;
use crate::terrain::{Lake, River};
use crate::world::{Hex, World};

pub const SAVE_VERSION: &str = "1.0";

/// Everything needed to rebuild a [`World`] without regenerating it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    pub hexes: BTreeMap<String, Hex>,
    pub rivers: Vec<River>,
    pub lakes: Vec<Lake>,
    pub watershed_count: usize,
    /// Visited locations keyed by hex key, with the player's changes.
    pub locations: BTreeMap<String, Vec<Location>>,
    pub historical_figures: Vec<HistoricalFigure>,
    pub civilizations: Vec<Civilization>,
    pub historical_events: Vec<HistoricalEvent>,
}

impl WorldData {
    pub fn from_world(world: &World) -> Self {
        Self {
            seeds: world.seeds,
            width: world.width,
            height: world.height,
            hexes: world
                .hexes
                .iter()
                .map(|(x, y, hex)| (hex_key(x, y), hex.clone()))
                .collect(),
            rivers: world.rivers.clone(),
            lakes: world.lakes.clone(),
            watershed_count: world.watershed_count,
            locations: world.locations.clone(),
            historical_figures: world.figures.clone(),
            civilizations: world.civilizations.clone(),
            historical_events: world.events.clone(),
        }
    }

    pub fn into_world(mut self) -> Result<World> {
        let mut cells = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let key = hex_key(x, y);
                let hex = self
                    .hexes
                    .remove(&key)
                    .ok_or_else(|| WorldError::CorruptSave(format!("missing hex {}", key)))?;
                cells.push(hex);
            }
        }
        let hexes = Grid::from_cells(self.width, self.height, cells)
            .ok_or_else(|| WorldError::CorruptSave("hex count does not match world size".into()))?;

        Ok(World {
            seeds: self.seeds,
            width: self.width,
            height: self.height,
            hexes,
            rivers: self.rivers,
            lakes: self.lakes,
            watershed_count: self.watershed_count,
            figures: self.historical_figures,
            civilizations: self.civilizations,
            events: self.historical_events,
            locations: self.locations,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub character: Character,
    pub survival: Survival,
    pub position: Coord,
    pub current_location: Option<String>,
    pub clock: GameClock,
    pub weather: Weather,
    pub world_data: WorldData,
}

/// Write `save` as pretty JSON, creating parent directories as needed.
pub fn save_game(path: &Path, save: &SaveFile) -> Result<()> {
    write_json(path, &serde_json::to_value(save)?)?;
    tracing::info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load_game(path: &Path) -> Result<SaveFile> {
    if !path.exists() {
        return Err(WorldError::SaveNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;

    let found = value
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("missing");
    if found != SAVE_VERSION {
        return Err(WorldError::IncompatibleSaveVersion {
            found: found.to_string(),
            expected: SAVE_VERSION.to_string(),
        });
    }

    let save: SaveFile = serde_json::from_value(value)?;
    tracing::info!(path = %path.display(), saved_at = %save.saved_at, "game loaded");
    Ok(save)
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Write the world data alone, without any player state.
pub fn export_world(path: &Path, world: &World) -> Result<()> {
    write_json(path, &serde_json::to_value(WorldData::from_world(world))?)?;
    tracing::info!(path = %path.display(), "world exported");
    Ok(())
}

/// Dump the whole world to `debug_world_data.json`.
pub fn dump_world(dir: &Path, world: &World) -> Result<PathBuf> {
    let path = dir.join("debug_world_data.json");
    export_world(&path, world)?;
    Ok(path)
}

/// Dump one hex, its owner and its generated locations to `debug_hex_XXYY.json`.
pub fn dump_hex(dir: &Path, world: &World, coord: Coord) -> Result<PathBuf> {
    let key = hex_key(coord.0, coord.1);
    let path = dir.join(format!("debug_hex_{}.json", key));
    let value = json!({
        "key": key,
        "hex": world.hex(coord),
        "owner": world.owner_of(coord).map(|c| c.id),
        "locations": world.locations.get(&key),
    });
    write_json(&path, &value)?;
    tracing::debug!(path = %path.display(), "hex dumped");
    Ok(path)
}

pub fn dump_location(dir: &Path, location: &Location) -> Result<PathBuf> {
    let path = dir.join(format!("debug_location_{}.json", location.id));
    write_json(&path, &serde_json::to_value(location)?)?;
    tracing::debug!(path = %path.display(), "location dumped");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn small_world() -> World {
        let config = GameConfig {
            seed: Some(99),
            world_width: 12,
            world_height: 10,
            ..GameConfig::default()
        };
        World::generate(&config).unwrap()
    }

    fn save_of(world: &World) -> SaveFile {
        SaveFile {
            version: SAVE_VERSION.to_string(),
            saved_at: Utc::now(),
            character: Character::new("Tester"),
            survival: Survival::default(),
            position: (1, 2),
            current_location: None,
            clock: GameClock::default(),
            weather: Weather::Fog,
            world_data: WorldData::from_world(world),
        }
    }

    #[test]
    fn test_world_data_round_trip() {
        let world = small_world();
        let data = WorldData::from_world(&world);
        assert_eq!(data.hexes.len(), 120);
        assert!(data.hexes.contains_key("1109"));

        let rebuilt = data.into_world().unwrap();
        assert_eq!(rebuilt.hexes, world.hexes);
        assert_eq!(rebuilt.civilizations, world.civilizations);
        assert_eq!(rebuilt.seed(), world.seed());
    }

    #[test]
    fn test_missing_hex_is_corrupt() {
        let mut data = WorldData::from_world(&small_world());
        data.hexes.remove("0000");
        assert!(matches!(data.into_world(), Err(WorldError::CorruptSave(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("save.json");
        let save = save_of(&small_world());

        save_game(&path, &save).unwrap();
        let loaded = load_game(&path).unwrap();
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_game(&missing), Err(WorldError::SaveNotFound(_))));

        let old = dir.path().join("old.json");
        fs::write(&old, r#"{"version": "0.9", "character": {}}"#).unwrap();
        match load_game(&old) {
            Err(WorldError::IncompatibleSaveVersion { found, expected }) => {
                assert_eq!(found, "0.9");
                assert_eq!(expected, SAVE_VERSION);
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.version)),
        }
    }

    #[test]
    fn test_dumps_written() {
        let dir = tempfile::tempdir().unwrap();
        let world = small_world();

        let path = dump_world(dir.path(), &world).unwrap();
        assert!(path.ends_with("debug_world_data.json"));

        let path = dump_hex(dir.path(), &world, (3, 4)).unwrap();
        assert!(path.ends_with("debug_hex_0304.json"));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["key"], "0304");
        assert_eq!(value["hex"]["x"], 3);
    }
}
