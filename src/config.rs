//! Configuration for world generation and the game session.
//!
//! Every section has a `Default`, and a JSON file may override any subset of
//! fields; command-line flags are applied on top of whatever the file sets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::calendar::CURRENT_YEAR;

/// Top-level configuration for a new game.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Master seed (random if not set).
    pub seed: Option<u64>,
    /// World width in hexes.
    pub world_width: usize,
    /// World height in hexes.
    pub world_height: usize,
    pub terrain: TerrainConfig,
    pub history: HistoryConfig,
    /// Directory holding content overrides (`locations.json`, ...).
    pub data_dir: Option<PathBuf>,
    /// Where `save`/`load` read and write.
    pub save_path: PathBuf,
    /// Where the `dump_*` commands write their snapshots.
    pub debug_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            world_width: 20,
            world_height: 20,
            terrain: TerrainConfig::default(),
            history: HistoryConfig::default(),
            data_dir: None,
            save_path: PathBuf::from("save.json"),
            debug_dir: PathBuf::from("."),
        }
    }
}

impl GameConfig {
    /// Load a configuration file. Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Parameters for terrain and hydrology.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of tectonic plates (random 3-6 if not set).
    pub plate_count: Option<usize>,
    /// Octaves in the regional noise layer.
    pub regional_octaves: u32,
    /// Minimum flow accumulation for a cell to carry a river.
    pub river_flow_threshold: u32,
    /// Step cap while tracing a river downstream.
    pub max_river_steps: usize,
    /// Elevation tolerance admitted by the lake flood-fill.
    pub lake_elevation_tolerance: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            plate_count: None,
            regional_octaves: 4,
            river_flow_threshold: 8,
            max_river_steps: 50,
            lake_elevation_tolerance: 0.05,
        }
    }
}

/// Parameters for civilizations and the historical simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of civilizations (random 5-8 if not set).
    pub civilization_count: Option<usize>,
    /// Founding figures generated per race before civilizations are drawn.
    pub founders_per_race: usize,
    /// Chance that a simulated year produces an event.
    pub event_chance: f64,
    /// Last simulated year (the "present day" of a new game).
    pub end_year: i32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            civilization_count: None,
            founders_per_race: 2,
            event_chance: 0.3,
            end_year: CURRENT_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.world_width, 20);
        assert_eq!(config.world_height, 20);
        assert_eq!(config.terrain.max_river_steps, 50);
        assert_eq!(config.history.event_chance, 0.3);
        assert_eq!(config.history.end_year, CURRENT_YEAR);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "seed": 42, "history": { "civilization_count": 6 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.history.civilization_count, Some(6));
        assert_eq!(config.history.event_chance, 0.3);
        assert_eq!(config.world_width, 20);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "world_width": 12, "terrain": { "plate_count": 4 } }"#).unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.world_width, 12);
        assert_eq!(config.terrain.plate_count, Some(4));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(GameConfig::load(Path::new("/nonexistent/config.json")).is_err());
    }
}
