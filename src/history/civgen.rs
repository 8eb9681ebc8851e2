//! Civilization generation, placement on the map and relationship seeding.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::{distance, Coord, Grid};
use crate::terrain::{Biome, TerrainType};

use super::calendar::{EventDate, CURRENT_YEAR, MAX_CIV_AGE, MIN_CIV_AGE};
use super::civilization::{
    set_relationship, Civilization, RaceComposition, RelationshipLevel, TerritorialChange,
    Territory, TerritoryChangeKind,
};
use super::figures::HistoricalFigure;
use super::naming::NameGenerator;
use super::races::{weighted_choice, CulturalValue, Government, Race};
use super::CivId;

const MIXED_RACE_CHANCE: f64 = 0.25;
const MIN_RACE_SHARE: u8 = 5;
const MAX_FOUNDING_FIGURES: usize = 2;

/// Split 100% between `parts` races: exponential draws normalized to 100,
/// every share at least 5, rounding error folded into the largest share.
pub fn mixed_percentages(parts: usize, rng: &mut impl Rng) -> Vec<u8> {
    if parts == 0 {
        return Vec::new();
    }
    let draws: Vec<f64> = (0..parts)
        .map(|_| -rng.gen_range(f64::EPSILON..1.0f64).ln())
        .collect();
    let total: f64 = draws.iter().sum();

    let mut shares: Vec<i32> = draws
        .iter()
        .map(|d| ((d / total * 100.0).round() as i32).max(MIN_RACE_SHARE as i32))
        .collect();

    let sum: i32 = shares.iter().sum();
    if let Some(largest) = (0..parts).max_by_key(|&i| (shares[i], std::cmp::Reverse(i))) {
        shares[largest] += 100 - sum;
    }

    shares.into_iter().map(|s| s.clamp(0, 100) as u8).collect()
}

/// Hexes a civilization of this size grows to.
pub fn territory_size_range(population: u32) -> (usize, usize) {
    if population < 5_000 {
        (2, 4)
    } else if population < 20_000 {
        (4, 8)
    } else {
        (8, 15)
    }
}

pub struct CivilizationGenerator {
    rng: ChaCha8Rng,
}

impl CivilizationGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create civilizations with ids `civ_1..`. Without `target_count` the
    /// world gets 5-8 of them. Founding figures are taken from unassigned
    /// figures of each civilization's primary race and marked as assigned.
    pub fn generate_civilizations(
        &mut self,
        world_size: (usize, usize),
        historical_figures: &mut [HistoricalFigure],
        target_count: Option<usize>,
    ) -> Vec<Civilization> {
        let count = target_count
            .unwrap_or_else(|| self.rng.gen_range(5..=8))
            .min(world_size.0 * world_size.1);

        let mut civs: Vec<Civilization> = Vec::with_capacity(count);
        let mut used_names = HashSet::new();

        for n in 1..=count {
            let id = CivId(n as u32);
            let races = self.draw_composition();
            let archetype = races.primary_race().archetype();

            let mut name = NameGenerator::civilization_name(archetype, &mut self.rng);
            for _ in 0..10 {
                if !used_names.contains(&name) {
                    break;
                }
                name = NameGenerator::civilization_name(archetype, &mut self.rng);
            }
            used_names.insert(name.clone());

            let government =
                weighted_choice(&mut self.rng, archetype.governments).unwrap_or(Government::Monarchy);
            let values = self.draw_values(archetype.values);
            let religion = weighted_choice(&mut self.rng, archetype.religions)
                .unwrap_or("the old ways")
                .to_string();
            let founding_year = CURRENT_YEAR - self.rng.gen_range(MIN_CIV_AGE..=MAX_CIV_AGE);
            let population = self
                .rng
                .gen_range(archetype.population.0..=archetype.population.1);

            let founding_figures: Vec<_> = historical_figures
                .iter_mut()
                .filter(|f| f.civilization.is_none() && f.race == archetype.race)
                .take(MAX_FOUNDING_FIGURES)
                .map(|f| {
                    f.civilization = Some(id);
                    f.id
                })
                .collect();

            civs.push(Civilization {
                id,
                name,
                races,
                government,
                values,
                religion,
                founding_year,
                territory: Territory::default(),
                population,
                faction_relationships: BTreeMap::new(),
                founding_figures,
                territorial_history: Vec::new(),
            });
        }

        tracing::info!(count = civs.len(), "civilizations generated");
        civs
    }

    fn draw_composition(&mut self) -> RaceComposition {
        if !self.rng.gen_bool(MIXED_RACE_CHANCE) {
            let race = Race::ALL[self.rng.gen_range(0..Race::ALL.len())];
            return RaceComposition::Single(race);
        }

        let parts = self.rng.gen_range(2..=3);
        let races: Vec<Race> = Race::ALL
            .choose_multiple(&mut self.rng, parts)
            .copied()
            .collect();
        let shares = mixed_percentages(parts, &mut self.rng);

        let mut mixed: Vec<(Race, u8)> = races.into_iter().zip(shares).collect();
        mixed.sort_by(|a, b| b.1.cmp(&a.1));
        RaceComposition::Mixed(mixed)
    }

    fn draw_values(&mut self, pool: &[(CulturalValue, u32)]) -> Vec<CulturalValue> {
        let wanted = self.rng.gen_range(2..=3).min(pool.len());
        let mut remaining = pool.to_vec();
        let mut values = Vec::with_capacity(wanted);
        while values.len() < wanted {
            let Some(v) = weighted_choice(&mut self.rng, &remaining) else {
                break;
            };
            values.push(v);
            remaining.retain(|(r, _)| *r != v);
        }
        values
    }

    /// Give every civilization a capital and a contiguous territory.
    ///
    /// The capital is a random pick from the best-scored fifth of unclaimed
    /// land; territory then grows one frontier hex at a time, nearest the
    /// capital first. Water is only used once no land is left.
    pub fn place_civilizations(
        &mut self,
        civs: &mut [Civilization],
        heightmap: &Grid<f32>,
        terrain: &Grid<TerrainType>,
        biomes: &Grid<Biome>,
    ) {
        let mut claimed: HashSet<Coord> = civs
            .iter()
            .flat_map(|c| c.territory.hexes.iter().copied())
            .collect();

        for civ in civs.iter_mut() {
            let archetype = civ.primary_race().archetype();

            let mut candidates: Vec<(Coord, f64)> = terrain
                .iter()
                .filter(|(x, y, t)| t.is_land() && !claimed.contains(&(*x, *y)))
                .map(|(x, y, _)| {
                    let neighbors = terrain.neighbors_8(x, y);
                    let land = neighbors
                        .iter()
                        .filter(|(nx, ny)| terrain.get(*nx, *ny).is_land())
                        .count();
                    let interior = if neighbors.is_empty() {
                        0.0
                    } else {
                        land as f64 / neighbors.len() as f64
                    };
                    let score = archetype.biome_weight(*biomes.get(x, y)) as f64 + interior;
                    ((x, y), score)
                })
                .collect();

            if candidates.is_empty() {
                candidates = terrain
                    .coords()
                    .filter(|c| !claimed.contains(c))
                    .map(|c| (c, 0.0))
                    .collect();
            }
            if candidates.is_empty() {
                tracing::warn!(civ = %civ.id, "no free hex left, civilization has no territory");
                continue;
            }

            candidates.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            let top = (candidates.len() / 5).max(1);
            let capital = candidates[self.rng.gen_range(0..top)].0;

            let (min_size, max_size) = territory_size_range(civ.population);
            let target = self.rng.gen_range(min_size..=max_size);

            let mut hexes = BTreeSet::from([capital]);
            claimed.insert(capital);
            while hexes.len() < target {
                let Some(next) = nearest_frontier(&hexes, capital, terrain, &claimed, true) else {
                    break;
                };
                hexes.insert(next);
                claimed.insert(next);
            }

            let mean_elevation =
                hexes.iter().map(|&(x, y)| *heightmap.get(x, y)).sum::<f32>() / hexes.len() as f32;
            let landscape = if mean_elevation >= 0.6 {
                "highlands"
            } else if mean_elevation >= 0.4 {
                "uplands"
            } else {
                "lowlands"
            };

            civ.territory = Territory {
                description: format!(
                    "{} hexes of {} around a {} capital",
                    hexes.len(),
                    landscape,
                    biomes.get(capital.0, capital.1)
                ),
                hexes: hexes.clone(),
                capital: Some(capital),
            };
            civ.record_change(TerritorialChange {
                date: EventDate::start_of(civ.founding_year),
                kind: TerritoryChangeKind::Founded,
                hexes: hexes.into_iter().collect(),
                other_civilization: None,
                event: None,
            });

            tracing::debug!(civ = %civ.id, name = %civ.name, ?capital, size = civ.territory.size(), "civilization placed");
        }
    }

    /// Score every pair and set a symmetric relationship between them.
    pub fn seed_relationships(civs: &mut [Civilization]) {
        let mut levels = Vec::new();
        for (i, a) in civs.iter().enumerate() {
            for b in &civs[i + 1..] {
                levels.push((a.id, b.id, RelationshipLevel::from_score(relationship_score(a, b))));
            }
        }
        for (a, b, level) in levels {
            set_relationship(civs, a, b, level);
        }
    }
}

/// Unclaimed hex touching `hexes`, nearest `capital`. Land comes first;
/// water only when `allow_water` is set and no land is left.
pub fn nearest_frontier(
    hexes: &BTreeSet<Coord>,
    capital: Coord,
    terrain: &Grid<TerrainType>,
    claimed: &HashSet<Coord>,
    allow_water: bool,
) -> Option<Coord> {
    let frontier: BTreeSet<Coord> = hexes
        .iter()
        .flat_map(|&(x, y)| terrain.neighbors_8(x, y))
        .filter(|c| !claimed.contains(c) && !hexes.contains(c))
        .collect();

    let nearest = |land: bool| {
        frontier
            .iter()
            .copied()
            .filter(|&(x, y)| terrain.get(x, y).is_land() == land)
            .min_by(|&a, &b| {
                distance(a, capital)
                    .partial_cmp(&distance(b, capital))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    };

    nearest(true).or_else(|| if allow_water { nearest(false) } else { None })
}

fn relationship_score(a: &Civilization, b: &Civilization) -> i32 {
    let mut score = 0;

    if a.primary_race() == b.primary_race() {
        score += 2;
    } else if (a.races.is_mixed() || b.races.is_mixed())
        && a.races.races().iter().any(|r| b.races.contains(*r))
    {
        score += 1;
    }

    for va in &a.values {
        if b.values.contains(va) {
            score += 1;
        }
        score -= b.values.iter().filter(|vb| va.conflicts_with(**vb)).count() as i32;
    }

    if a.government == b.government {
        score += 1;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::civilization::test_support::civ;
    use crate::history::figures::FigureGenerator;
    use proptest::prelude::*;

    #[test]
    fn test_six_civilizations_on_empty_figures() {
        let mut gen = CivilizationGenerator::new(12345);
        let civs = gen.generate_civilizations((20, 20), &mut [], Some(6));
        assert_eq!(civs.len(), 6);
        for (i, civ) in civs.iter().enumerate() {
            assert_eq!(civ.id.to_string(), format!("civ_{}", i + 1));
            assert!((852..=1252).contains(&civ.founding_year));
            assert!((2..=3).contains(&civ.values.len()));
            assert!(civ.founding_figures.is_empty());
        }
    }

    #[test]
    fn test_default_count_range() {
        for seed in 0..10 {
            let civs = CivilizationGenerator::new(seed).generate_civilizations((20, 20), &mut [], None);
            assert!((5..=8).contains(&civs.len()));
        }
    }

    #[test]
    fn test_founding_figures_match_primary_race() {
        let mut figures = FigureGenerator::new(5).generate(2, &Race::ALL);
        let civs = CivilizationGenerator::new(5).generate_civilizations((20, 20), &mut figures, Some(8));

        let mut seen = HashSet::new();
        for civ in &civs {
            assert!(civ.founding_figures.len() <= MAX_FOUNDING_FIGURES);
            for id in &civ.founding_figures {
                assert!(seen.insert(*id));
                let figure = figures.iter().find(|f| f.id == *id).unwrap();
                assert_eq!(figure.race, civ.primary_race());
                assert_eq!(figure.civilization, Some(civ.id));
            }
        }
    }

    #[test]
    fn test_placement_never_double_claims() {
        let mut terrain_gen = crate::terrain::TerrainGenerator::new(12345, 20, 20);
        let heightmap = terrain_gen.generate_continental_heightmap(None);
        let terrain = terrain_gen.generate_terrain_types(&heightmap);
        let biomes = terrain.map(|t| if t.is_land() { Biome::Grassland } else { Biome::Ocean });

        let mut gen = CivilizationGenerator::new(12345);
        let mut civs = gen.generate_civilizations((20, 20), &mut [], Some(8));
        gen.place_civilizations(&mut civs, &heightmap, &terrain, &biomes);

        let mut claimed = HashSet::new();
        for civ in &civs {
            let capital = civ.territory.capital.unwrap();
            assert!(civ.territory.contains(capital));
            let (_, max) = territory_size_range(civ.population);
            assert!(civ.territory.size() <= max);
            for &hex in &civ.territory.hexes {
                assert!(claimed.insert(hex), "{hex:?} claimed twice");
            }
            assert_eq!(civ.territorial_history.len(), 1);
        }
    }

    #[test]
    fn test_territory_is_contiguous() {
        let heightmap = Grid::new_with(10, 10, 0.4f32);
        let terrain = heightmap.map(|&e| TerrainType::from_elevation(e));
        let biomes = Grid::new_with(10, 10, Biome::Grassland);

        let mut gen = CivilizationGenerator::new(3);
        let mut civs = gen.generate_civilizations((10, 10), &mut [], Some(3));
        gen.place_civilizations(&mut civs, &heightmap, &terrain, &biomes);

        for civ in &civs {
            let (min, _) = territory_size_range(civ.population);
            assert!(civ.territory.size() >= min);
            for &hex in &civ.territory.hexes {
                let touches = civ.territory.size() == 1
                    || civ.territory.hexes.iter().any(|&o| crate::grid::is_adjacent(hex, o));
                assert!(touches);
            }
        }
    }

    #[test]
    fn test_all_water_world_still_places() {
        let heightmap = Grid::new_with(6, 6, 0.1f32);
        let terrain = heightmap.map(|&e| TerrainType::from_elevation(e));
        let biomes = Grid::new_with(6, 6, Biome::Ocean);

        let mut gen = CivilizationGenerator::new(1);
        let mut civs = gen.generate_civilizations((6, 6), &mut [], Some(2));
        gen.place_civilizations(&mut civs, &heightmap, &terrain, &biomes);
        assert!(civs.iter().all(|c| c.territory.capital.is_some()));
    }

    #[test]
    fn test_relationships_are_symmetric_and_complete() {
        let mut civs = CivilizationGenerator::new(77).generate_civilizations((20, 20), &mut [], Some(7));
        CivilizationGenerator::seed_relationships(&mut civs);
        for a in &civs {
            assert_eq!(a.faction_relationships.len(), civs.len() - 1);
            for b in &civs {
                if a.id != b.id {
                    assert_eq!(a.relationship_with(b.id), b.relationship_with(a.id));
                }
            }
        }
    }

    #[test]
    fn test_relationship_score_terms() {
        let a = civ(1, &[]);
        let mut b = civ(2, &[]);
        // Same race +2, two shared values +2, same government +1
        assert_eq!(relationship_score(&a, &b), 5);

        b.races = RaceComposition::Single(Race::Orc);
        b.values = vec![CulturalValue::Wealth];
        b.government = Government::Chiefdom;
        // Honor conflicts with wealth
        assert_eq!(relationship_score(&a, &b), -1);
    }

    proptest! {
        #[test]
        fn mixed_shares_sum_to_100(seed in any::<u64>(), parts in 2usize..=3) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let shares = mixed_percentages(parts, &mut rng);
            prop_assert_eq!(shares.len(), parts);
            prop_assert_eq!(shares.iter().map(|&s| s as u32).sum::<u32>(), 100);
            prop_assert!(shares.iter().all(|&s| s >= MIN_RACE_SHARE));
        }
    }
}
