//! Biome classification from elevation, moisture and latitude.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};
use crate::noise_gen::NoiseGenerator;

use super::{Lake, TerrainType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Ocean,
    Lake,
    Beach,
    Grassland,
    Forest,
    Swamp,
    Desert,
    Tundra,
    Hills,
    Mountain,
    SnowyPeaks,
}

impl Biome {
    pub const ALL: [Biome; 11] = [
        Biome::Ocean,
        Biome::Lake,
        Biome::Beach,
        Biome::Grassland,
        Biome::Forest,
        Biome::Swamp,
        Biome::Desert,
        Biome::Tundra,
        Biome::Hills,
        Biome::Mountain,
        Biome::SnowyPeaks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Lake => "lake",
            Biome::Beach => "beach",
            Biome::Grassland => "grassland",
            Biome::Forest => "forest",
            Biome::Swamp => "swamp",
            Biome::Desert => "desert",
            Biome::Tundra => "tundra",
            Biome::Hills => "hills",
            Biome::Mountain => "mountain",
            Biome::SnowyPeaks => "snowy_peaks",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::Lake)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Moisture in [0, 1] from three octaves of low-frequency noise.
pub fn moisture_at(moisture: &NoiseGenerator, x: usize, y: usize) -> f32 {
    let n = moisture.octave_noise2d(x as f64 + 0.5, y as f64 + 0.5, 3, 0.5, 0.12);
    ((n + 1.0) / 2.0) as f32
}

/// Temperature in [0, 1]: warmest on the middle row, colder towards the map
/// edges and with altitude.
pub fn temperature_at(y: usize, height: usize, elevation: f32) -> f32 {
    let latitude = if height > 1 {
        (y as f32 / (height - 1) as f32 - 0.5).abs() * 2.0
    } else {
        0.0
    };
    (1.0 - latitude - (elevation - 0.3).max(0.0) * 0.5).clamp(0.0, 1.0)
}

pub fn assign_biomes(
    heightmap: &Grid<f32>,
    terrain: &Grid<TerrainType>,
    lakes: &[Lake],
    moisture: &NoiseGenerator,
) -> Grid<Biome> {
    let lake_cells: HashSet<Coord> = lakes.iter().flat_map(|l| l.cells.iter().copied()).collect();

    Grid::from_fn(heightmap.width, heightmap.height, |x, y| {
        if lake_cells.contains(&(x, y)) {
            return Biome::Lake;
        }

        let elevation = *heightmap.get(x, y);
        let wet = moisture_at(moisture, x, y);
        let cold = temperature_at(y, heightmap.height, elevation) < 0.25;

        match terrain.get(x, y) {
            TerrainType::Water => Biome::Ocean,
            TerrainType::Peaks => Biome::SnowyPeaks,
            TerrainType::Mountains => Biome::Mountain,
            TerrainType::Hills if cold => Biome::Tundra,
            TerrainType::Hills => Biome::Hills,
            TerrainType::Plains => {
                let shore = elevation < 0.34
                    && terrain
                        .neighbors_8(x, y)
                        .into_iter()
                        .any(|(nx, ny)| *terrain.get(nx, ny) == TerrainType::Water);
                if shore {
                    Biome::Beach
                } else if cold {
                    Biome::Tundra
                } else if wet > 0.7 && elevation < 0.4 {
                    Biome::Swamp
                } else if wet > 0.55 {
                    Biome::Forest
                } else if wet < 0.3 {
                    Biome::Desert
                } else {
                    Biome::Grassland
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::LakeSize;

    #[test]
    fn test_names_round_trip() {
        for biome in Biome::ALL {
            assert_eq!(Biome::from_name(biome.name()), Some(biome));
        }
        assert_eq!(Biome::from_name("lava"), None);
        assert_eq!(serde_json::to_string(&Biome::SnowyPeaks).unwrap(), "\"snowy_peaks\"");
    }

    #[test]
    fn test_temperature_gradient() {
        assert_eq!(temperature_at(10, 21, 0.3), 1.0);
        assert_eq!(temperature_at(0, 21, 0.3), 0.0);
        assert!(temperature_at(10, 21, 0.9) < temperature_at(10, 21, 0.4));
        assert_eq!(temperature_at(0, 1, 0.3), 1.0);
    }

    #[test]
    fn test_elevation_driven_biomes() {
        let heightmap = Grid::from_fn(5, 1, |x, _| [0.1, 0.6, 0.8, 0.9, 0.45][x]);
        let terrain = heightmap.map(|&e| TerrainType::from_elevation(e));
        let lake = Lake {
            id: 0,
            center: (4, 0),
            cells: vec![(4, 0)],
            size: LakeSize::Pond,
            max_radius: 1.0,
            elevation: 0.45,
        };
        let biomes = assign_biomes(&heightmap, &terrain, &[lake], &NoiseGenerator::new(1));

        assert_eq!(*biomes.get(0, 0), Biome::Ocean);
        assert_eq!(*biomes.get(1, 0), Biome::Hills);
        assert_eq!(*biomes.get(2, 0), Biome::Mountain);
        assert_eq!(*biomes.get(3, 0), Biome::SnowyPeaks);
        assert_eq!(*biomes.get(4, 0), Biome::Lake);
    }

    #[test]
    fn test_water_terrain_is_always_water_biome() {
        let mut gen = crate::terrain::TerrainGenerator::new(8, 20, 20);
        let map = gen.generate_continental_heightmap(None);
        let terrain = gen.generate_terrain_types(&map);
        let biomes = assign_biomes(&map, &terrain, &[], &NoiseGenerator::new(8));
        for (x, y, t) in terrain.iter() {
            assert_eq!(*t == TerrainType::Water, biomes.get(x, y).is_water());
        }
    }
}
