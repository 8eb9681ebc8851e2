//! World data container
//!
//! Runs the whole generation pipeline and owns everything it produces: the
//! hex grid with its features, rivers, lakes, history, and the location cache
//! that fills in as the player explores.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{Result, WorldError};
use crate::grid::{hex_key, Coord, Grid};
use crate::history::calendar::MAX_CIV_AGE;
use crate::history::civgen::CivilizationGenerator;
use crate::history::civilization::Civilization;
use crate::history::eventgen::HistoricalEventGenerator;
use crate::history::events::HistoricalEvent;
use crate::history::figures::{FigureGenerator, HistoricalFigure};
use crate::history::races::Race;
use crate::history::CivId;
use crate::location::{Location, LocationGenerator};
use crate::noise_gen::NoiseGenerator;
use crate::seeds::WorldSeeds;
use crate::terrain::{
    assign_biomes, terrain_histogram, Biome, Lake, LakeSize, River, RiverWidth, TerrainGenerator,
    TerrainType,
};

/// Hex keys are two zero-padded digits per axis.
pub const MAX_WORLD_SIDE: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HexFeature {
    River { width: RiverWidth },
    Lake { size: LakeSize },
    Coast,
    Capital { civilization: CivId },
}

/// One cell of the world map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hex {
    pub x: usize,
    pub y: usize,
    pub elevation: f32,
    pub terrain: TerrainType,
    pub biome: Biome,
    /// Watershed label (index of the sink the hex drains to).
    pub watershed: usize,
    pub features: Vec<HexFeature>,
}

impl Hex {
    pub fn coord(&self) -> Coord {
        (self.x, self.y)
    }

    pub fn river_width(&self) -> Option<RiverWidth> {
        self.features.iter().find_map(|f| match f {
            HexFeature::River { width } => Some(*width),
            _ => None,
        })
    }

    pub fn has_fresh_water(&self) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, HexFeature::River { .. } | HexFeature::Lake { .. }))
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| match f {
                HexFeature::River { width } => width.name().to_string(),
                HexFeature::Lake { size } => size.name().to_string(),
                HexFeature::Coast => "coast".to_string(),
                HexFeature::Capital { civilization } => format!("capital of {}", civilization),
            })
            .collect()
    }
}

/// All generated world data bundled together
#[derive(Clone, Debug)]
pub struct World {
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    pub hexes: Grid<Hex>,
    pub rivers: Vec<River>,
    pub lakes: Vec<Lake>,
    pub watershed_count: usize,
    pub figures: Vec<HistoricalFigure>,
    pub civilizations: Vec<Civilization>,
    pub events: Vec<HistoricalEvent>,
    /// Generated locations keyed by hex key.
    pub locations: BTreeMap<String, Vec<Location>>,
}

impl World {
    /// Run the full generation pipeline.
    pub fn generate(config: &GameConfig) -> Result<Self> {
        let (width, height) = (config.world_width, config.world_height);
        if width == 0 || height == 0 || width > MAX_WORLD_SIDE || height > MAX_WORLD_SIDE {
            return Err(WorldError::InvalidWorldSize { width, height });
        }

        let seeds = WorldSeeds::from_master(config.seed.unwrap_or_else(rand::random));
        tracing::info!(seed = seeds.master, width, height, "generating world");

        let mut terrain_gen =
            TerrainGenerator::with_config(seeds.terrain, width, height, config.terrain.clone());
        let heightmap = terrain_gen.generate_continental_heightmap(None);
        let terrain = terrain_gen.generate_terrain_types(&heightmap);
        let flow_dir = terrain_gen.calculate_drainage_patterns(&heightmap);
        let flow_acc = terrain_gen.calculate_flow_accumulation(&heightmap, &flow_dir);
        let watersheds = terrain_gen.identify_watersheds(&flow_dir);
        let rivers = terrain_gen.identify_rivers(&flow_dir, &flow_acc);
        let lakes = terrain_gen.identify_lakes(&heightmap, &flow_dir, &flow_acc);
        let biomes = assign_biomes(&heightmap, &terrain, &lakes, &NoiseGenerator::new(seeds.moisture));
        tracing::info!(
            rivers = rivers.len(),
            lakes = lakes.len(),
            watersheds = watersheds.count(),
            "terrain and hydrology generated"
        );

        let mut figures =
            FigureGenerator::new(seeds.figures).generate(config.history.founders_per_race, &Race::ALL);

        let mut civ_gen = CivilizationGenerator::new(seeds.civilizations);
        let mut civilizations = civ_gen.generate_civilizations(
            (width, height),
            &mut figures,
            config.history.civilization_count,
        );
        civ_gen.place_civilizations(&mut civilizations, &heightmap, &terrain, &biomes);
        CivilizationGenerator::seed_relationships(&mut civilizations);
        tracing::info!(civilizations = civilizations.len(), figures = figures.len(), "civilizations founded");

        let end_year = config.history.end_year;
        let start_year = civilizations
            .iter()
            .map(|c| c.founding_year)
            .min()
            .unwrap_or(end_year - MAX_CIV_AGE);
        let events = HistoricalEventGenerator::with_event_chance(seeds.history, config.history.event_chance)
            .simulate(&mut civilizations, &terrain, start_year, end_year);

        let mut hexes = Grid::from_fn(width, height, |x, y| Hex {
            x,
            y,
            elevation: *heightmap.get(x, y),
            terrain: *terrain.get(x, y),
            biome: *biomes.get(x, y),
            watershed: watersheds.label(x, y),
            features: Vec::new(),
        });
        annotate_features(&mut hexes, &rivers, &lakes, &civilizations);

        Ok(Self {
            seeds,
            width,
            height,
            hexes,
            rivers,
            lakes,
            watershed_count: watersheds.count(),
            figures,
            civilizations,
            events,
            locations: BTreeMap::new(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn hex(&self, coord: Coord) -> Option<&Hex> {
        self.hexes
            .in_bounds(coord.0, coord.1)
            .then(|| self.hexes.get(coord.0, coord.1))
    }

    /// The civilization holding `coord`, if any.
    pub fn owner_of(&self, coord: Coord) -> Option<&Civilization> {
        self.civilizations.iter().find(|c| c.territory.contains(coord))
    }

    /// Locations of a hex, generating them on the first visit.
    ///
    /// Generation is seeded per hex, and the result is cached, so later calls
    /// return the same locations with whatever changes the player made.
    pub fn locations_at(&mut self, coord: Coord, generator: &LocationGenerator) -> Option<&mut Vec<Location>> {
        let hex = self.hex(coord)?;
        let key = hex_key(coord.0, coord.1);
        if !self.locations.contains_key(&key) {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.location_seed(coord.0, coord.1));
            let generated = generator.generate_for_hex(hex, &mut rng);
            self.locations.insert(key.clone(), generated);
        }
        self.locations.get_mut(&key)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.values().flatten().find(|l| l.id == id)
    }

    pub fn location_mut(&mut self, id: &str) -> Option<&mut Location> {
        self.locations.values_mut().flatten().find(|l| l.id == id)
    }

    pub fn find_civilization(&self, query: &str) -> Option<&Civilization> {
        let query = query.to_lowercase();
        self.civilizations
            .iter()
            .find(|c| c.id.to_string() == query || c.name.to_lowercase().contains(&query))
    }

    pub fn find_figure(&self, query: &str) -> Option<&HistoricalFigure> {
        let query = query.to_lowercase();
        self.figures
            .iter()
            .find(|f| f.id.to_string() == query || f.name.to_lowercase().contains(&query))
    }

    /// What the player sees of the hex they stand on.
    pub fn describe_hex(&self, coord: Coord) -> String {
        let Some(hex) = self.hex(coord) else {
            return "You stand at the edge of the known world.".to_string();
        };
        let mut text = format!(
            "Hex {} ({}, {}): {} {}, elevation {:.2}.",
            hex_key(hex.x, hex.y),
            hex.x,
            hex.y,
            hex.biome,
            hex.terrain,
            hex.elevation
        );
        let features = hex.feature_names();
        if !features.is_empty() {
            text.push_str(&format!(" Features: {}.", features.join(", ")));
        }
        match self.owner_of(coord) {
            Some(civ) => text.push_str(&format!(" These lands belong to {}.", civ.name)),
            None => text.push_str(" No realm claims this land."),
        }
        text
    }

    /// Multi-line report for `--summary` and the `debug` command.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "World seed {} ({}x{}), {} rivers, {} lakes, {} watersheds",
            self.seeds.master,
            self.width,
            self.height,
            self.rivers.len(),
            self.lakes.len(),
            self.watershed_count
        )];

        let terrain = self.hexes.map(|h| h.terrain);
        let histogram: Vec<String> = terrain_histogram(&terrain)
            .iter()
            .map(|(t, n)| format!("{} {}", t, n))
            .collect();
        lines.push(format!("Terrain: {}", histogram.join(", ")));

        lines.push(format!(
            "{} civilizations, {} historical figures, {} recorded events",
            self.civilizations.len(),
            self.figures.len(),
            self.events.len()
        ));
        for civ in &self.civilizations {
            lines.push(format!(
                "  {} {}: {} {}, {} hexes, population {}",
                civ.id,
                civ.name,
                civ.races,
                civ.government,
                civ.territory.size(),
                civ.population
            ));
        }
        lines.join("\n")
    }
}

fn annotate_features(hexes: &mut Grid<Hex>, rivers: &[River], lakes: &[Lake], civs: &[Civilization]) {
    for river in rivers {
        for &(x, y) in &river.path {
            let hex = hexes.get_mut(x, y);
            match hex.river_width() {
                Some(width) if width >= river.width => {}
                Some(_) => {
                    hex.features.retain(|f| !matches!(f, HexFeature::River { .. }));
                    hex.features.push(HexFeature::River { width: river.width });
                }
                None => hex.features.push(HexFeature::River { width: river.width }),
            }
        }
    }

    for lake in lakes {
        for &(x, y) in &lake.cells {
            hexes.get_mut(x, y).features.push(HexFeature::Lake { size: lake.size });
        }
    }

    let coast: Vec<Coord> = hexes
        .iter()
        .filter(|(x, y, hex)| {
            hex.terrain.is_land()
                && hexes
                    .neighbors_8(*x, *y)
                    .iter()
                    .any(|&(nx, ny)| !hexes.get(nx, ny).terrain.is_land())
        })
        .map(|(x, y, _)| (x, y))
        .collect();
    for (x, y) in coast {
        hexes.get_mut(x, y).features.push(HexFeature::Coast);
    }

    for civ in civs {
        if let Some((x, y)) = civ.territory.capital {
            hexes
                .get_mut(x, y)
                .features
                .push(HexFeature::Capital { civilization: civ.id });
        }
    }
}
