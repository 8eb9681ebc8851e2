//! Terrain and hydrology generation.
//!
//! Pipeline: continental heightmap (plates + noise layers + shelf) →
//! terrain classes → drainage → flow accumulation → watersheds → rivers and
//! lakes → biomes. Every stage is a pure function of its inputs and the seed.

pub mod biomes;
pub mod drainage;
pub mod lakes;
pub mod plates;
pub mod rivers;

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::TerrainConfig;
use crate::grid::{Coord, Grid};
use crate::noise_gen::NoiseGenerator;

pub use biomes::{assign_biomes, Biome};
pub use drainage::{
    calculate_drainage_patterns, calculate_flow_accumulation, identify_watersheds, Watersheds,
};
pub use lakes::{identify_lakes, Lake, LakeSize};
pub use plates::{Plate, PlateId, PlateType};
pub use rivers::{identify_rivers, River, RiverWidth};

/// Elevation below which a hex is open water.
pub const SEA_LEVEL: f32 = 0.30;

/// Elevation class of a hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    #[default]
    Water,
    Plains,
    Hills,
    Mountains,
    Peaks,
}

impl TerrainType {
    pub fn from_elevation(elevation: f32) -> Self {
        if elevation < SEA_LEVEL {
            TerrainType::Water
        } else if elevation < 0.50 {
            TerrainType::Plains
        } else if elevation < 0.70 {
            TerrainType::Hills
        } else if elevation < 0.85 {
            TerrainType::Mountains
        } else {
            TerrainType::Peaks
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerrainType::Water => "water",
            TerrainType::Plains => "plains",
            TerrainType::Hills => "hills",
            TerrainType::Mountains => "mountains",
            TerrainType::Peaks => "peaks",
        }
    }

    pub fn is_land(&self) -> bool {
        !matches!(self, TerrainType::Water)
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Count of hexes per terrain class, in class order.
pub fn terrain_histogram(terrain: &Grid<TerrainType>) -> BTreeMap<TerrainType, usize> {
    let mut histogram = BTreeMap::new();
    for (_, _, t) in terrain.iter() {
        *histogram.entry(*t).or_insert(0) += 1;
    }
    histogram
}

/// Builds heightmaps and hydrology for one world.
pub struct TerrainGenerator {
    pub width: usize,
    pub height: usize,
    config: TerrainConfig,
    /// Base and regional layers.
    noise: NoiseGenerator,
    /// Local detail and boundary uplift/subsidence decisions.
    detail: NoiseGenerator,
    rng: ChaCha8Rng,
}

impl TerrainGenerator {
    pub fn new(seed: u64, width: usize, height: usize) -> Self {
        Self::with_config(seed, width, height, TerrainConfig::default())
    }

    pub fn with_config(seed: u64, width: usize, height: usize, config: TerrainConfig) -> Self {
        Self {
            width,
            height,
            config,
            noise: NoiseGenerator::new(seed),
            detail: NoiseGenerator::new(seed.wrapping_add(0x5eed)),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Plain fractal heightmap: octave noise per cell remapped from [-1, 1] to [0, 1].
    pub fn generate_heightmap(&self, octaves: u32, persistence: f64, scale: f64) -> Grid<f32> {
        Grid::from_fn(self.width, self.height, |x, y| {
            let n = self.noise.octave_noise2d(
                x as f64 + 0.5,
                y as f64 + 0.5,
                octaves,
                persistence,
                scale,
            );
            (((n + 1.0) / 2.0) as f32).clamp(0.0, 1.0)
        })
    }

    /// Heightmap with continental shapes from a Voronoi plate layout.
    ///
    /// `num_plates` overrides both the config and the random 3-6 default.
    pub fn generate_continental_heightmap(&mut self, num_plates: Option<usize>) -> Grid<f32> {
        let count = num_plates.or(self.config.plate_count);
        let (plate_map, plate_list) = plates::generate_plates(self.width, self.height, count, &mut self.rng);
        let boundary_distance = plates::boundary_distance(&plate_map);

        let mut heightmap = Grid::from_fn(self.width, self.height, |x, y| {
            let plate = &plate_list[plate_map.get(x, y).0 as usize];
            let mut elevation = plate.base_elevation;

            if let Some(d) = *boundary_distance.get(x, y) {
                elevation += plates::boundary_relief(&self.detail, x, y, d);
            }

            let regional = self.noise.octave_noise2d(
                x as f64 + 0.5,
                y as f64 + 0.5,
                self.config.regional_octaves,
                0.5,
                0.09,
            );
            let local = plates::sample_layer(&self.detail, x, y, 0.45);
            elevation += regional as f32 * 0.08 + local as f32 * 0.03;

            elevation.clamp(0.0, 1.0)
        });

        plates::apply_continental_shelf(&mut heightmap);

        tracing::debug!(
            plates = plate_list.len(),
            continental = plate_list.iter().filter(|p| p.plate_type == PlateType::Continental).count(),
            "continental heightmap generated"
        );

        heightmap
    }

    pub fn generate_terrain_types(&self, heightmap: &Grid<f32>) -> Grid<TerrainType> {
        heightmap.map(|&e| TerrainType::from_elevation(e))
    }

    pub fn calculate_drainage_patterns(&self, heightmap: &Grid<f32>) -> Grid<Option<Coord>> {
        calculate_drainage_patterns(heightmap)
    }

    pub fn calculate_flow_accumulation(
        &self,
        heightmap: &Grid<f32>,
        flow_dir: &Grid<Option<Coord>>,
    ) -> Grid<u32> {
        calculate_flow_accumulation(heightmap, flow_dir)
    }

    pub fn identify_watersheds(&self, flow_dir: &Grid<Option<Coord>>) -> Watersheds {
        identify_watersheds(flow_dir)
    }

    pub fn identify_rivers(&self, flow_dir: &Grid<Option<Coord>>, flow_acc: &Grid<u32>) -> Vec<River> {
        identify_rivers(
            flow_dir,
            flow_acc,
            self.config.river_flow_threshold,
            self.config.max_river_steps,
        )
    }

    pub fn identify_lakes(
        &self,
        heightmap: &Grid<f32>,
        flow_dir: &Grid<Option<Coord>>,
        flow_acc: &Grid<u32>,
    ) -> Vec<Lake> {
        identify_lakes(heightmap, flow_dir, flow_acc, self.config.lake_elevation_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_terrain_thresholds() {
        assert_eq!(TerrainType::from_elevation(0.0), TerrainType::Water);
        assert_eq!(TerrainType::from_elevation(0.29), TerrainType::Water);
        assert_eq!(TerrainType::from_elevation(0.30), TerrainType::Plains);
        assert_eq!(TerrainType::from_elevation(0.6), TerrainType::Hills);
        assert_eq!(TerrainType::from_elevation(0.8), TerrainType::Mountains);
        assert_eq!(TerrainType::from_elevation(1.0), TerrainType::Peaks);
    }

    #[test]
    fn test_plain_heightmap_in_unit_range() {
        let gen = TerrainGenerator::new(3, 16, 9);
        let map = gen.generate_heightmap(5, 0.5, 0.1);
        assert_eq!(map.len(), 16 * 9);
        assert!(map.iter().all(|(_, _, &h)| (0.0..=1.0).contains(&h)));
    }

    #[test]
    fn test_seed_12345_histogram_has_water_and_land() {
        let histogram = |seed| {
            let mut gen = TerrainGenerator::new(seed, 20, 20);
            let heightmap = gen.generate_continental_heightmap(None);
            let terrain = gen.generate_terrain_types(&heightmap);
            terrain_histogram(&terrain)
        };

        let first = histogram(12345);
        assert!(first.get(&TerrainType::Water).copied().unwrap_or(0) > 0);
        let land: usize = first
            .iter()
            .filter(|(t, _)| t.is_land())
            .map(|(_, n)| *n)
            .sum();
        assert!(land > 0);
        assert_eq!(first.values().sum::<usize>(), 400);

        assert_eq!(first, histogram(12345));
    }

    #[test]
    fn test_continental_heightmap_is_reproducible() {
        let a = TerrainGenerator::new(77, 20, 20).generate_continental_heightmap(Some(4));
        let b = TerrainGenerator::new(77, 20, 20).generate_continental_heightmap(Some(4));
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn continental_heightmap_clamped(seed in any::<u64>(), w in 1usize..24, h in 1usize..24) {
            let mut gen = TerrainGenerator::new(seed, w, h);
            let map = gen.generate_continental_heightmap(None);
            prop_assert_eq!(map.len(), w * h);
            for (_, _, &e) in map.iter() {
                prop_assert!((0.0..=1.0).contains(&e));
            }
        }
    }
}
