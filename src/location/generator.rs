//! Per-hex location generation.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::hex_key;
use crate::terrain::{Biome, TerrainType};
use crate::world::Hex;

use super::data::{fallback_exit_template, fallback_object, ContentData};
use super::types::{
    Area, DropEntry, EntityTemplate, Exit, GameEntity, GameItem, GameObject, Location,
    LocationTemplate, ObjectTemplate,
};

pub const MIN_OBJECTS_PER_LOCATION: usize = 10;
pub const MAX_OBJECTS_PER_LOCATION: usize = 10;

const MAX_LOCATIONS_PER_HEX: usize = 3;
const FALLBACK_LOCATION_TYPE: &str = "forest";

/// Biome (optionally narrowed by terrain) to location bucket.
const LOCATION_TYPES: &[(Biome, Option<TerrainType>, &str)] = &[
    (Biome::Ocean, None, "coast"),
    (Biome::Beach, None, "coast"),
    (Biome::Lake, None, "lake"),
    (Biome::Grassland, Some(TerrainType::Hills), "hills"),
    (Biome::Grassland, None, "plains"),
    (Biome::Forest, None, "forest"),
    (Biome::Swamp, None, "swamp"),
    (Biome::Desert, None, "desert"),
    (Biome::Tundra, None, "tundra"),
    (Biome::Hills, None, "hills"),
    (Biome::Mountain, None, "mountain"),
    (Biome::SnowyPeaks, None, "mountain"),
];

enum Spawn<'a> {
    Object(&'a ObjectTemplate),
    Entity(&'a EntityTemplate),
}

impl Spawn<'_> {
    fn weight(&self) -> u32 {
        match self {
            Spawn::Object(o) => o.spawn_weight,
            Spawn::Entity(e) => e.spawn_weight,
        }
    }
}

pub struct LocationGenerator {
    content: ContentData,
}

impl LocationGenerator {
    pub fn new(content: ContentData) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &ContentData {
        &self.content
    }

    /// Location bucket for a hex. Combinations not in the table are "forest".
    pub fn location_type_for(biome: Biome, terrain: TerrainType) -> &'static str {
        LOCATION_TYPES
            .iter()
            .find(|(b, t, _)| *b == biome && t.map_or(true, |t| t == terrain))
            .map_or(FALLBACK_LOCATION_TYPE, |(_, _, bucket)| *bucket)
    }

    /// Generate the 1-3 locations of a hex. The first one is always an exit
    /// to the overworld; the others lead to it.
    pub fn generate_for_hex(&self, hex: &Hex, rng: &mut impl Rng) -> Vec<Location> {
        let bucket = Self::location_type_for(hex.biome, hex.terrain);
        let mut pool = self.content.templates_for(bucket);
        if pool.is_empty() {
            tracing::warn!(bucket, "no templates for location type, using {}", FALLBACK_LOCATION_TYPE);
            pool = self.content.templates_for(FALLBACK_LOCATION_TYPE);
        }

        let fallback_exit = fallback_exit_template();
        let exits: Vec<&LocationTemplate> = pool.iter().copied().filter(|t| t.exit).collect();
        let first = exits
            .choose_weighted(rng, |t| t.spawn_weight.max(1))
            .map(|t| *t)
            .unwrap_or(&fallback_exit);

        let wanted = rng.gen_range(1..=MAX_LOCATIONS_PER_HEX);
        let mut remaining: Vec<&LocationTemplate> =
            pool.iter().copied().filter(|t| t.id != first.id).collect();
        let mut chosen = vec![first];
        while chosen.len() < wanted && !remaining.is_empty() {
            let Some(index) = weighted_index(&remaining, rng) else {
                break;
            };
            chosen.push(remaining.swap_remove(index));
        }

        let key = hex_key(hex.x, hex.y);
        let exit_id = format!("{}_1", key);
        let locations: Vec<Location> = chosen
            .into_iter()
            .enumerate()
            .map(|(i, template)| {
                let id = format!("{}_{}", key, i + 1);
                let exit = if i == 0 {
                    Exit::Overworld
                } else {
                    Exit::Location(exit_id.clone())
                };
                self.instantiate(template, id, hex, exit, rng)
            })
            .collect();

        tracing::debug!(hex = %key, bucket, locations = locations.len(), "locations generated");
        locations
    }

    fn instantiate(
        &self,
        template: &LocationTemplate,
        id: String,
        hex: &Hex,
        exit: Exit,
        rng: &mut impl Rng,
    ) -> Location {
        let mut spawns: Vec<Spawn> = self
            .content
            .objects
            .iter()
            .filter(|o| template.shares_tag(&o.tags))
            .map(Spawn::Object)
            .chain(
                self.content
                    .entities
                    .iter()
                    .filter(|e| template.shares_tag(&e.tags))
                    .map(Spawn::Entity),
            )
            .collect();
        let fallback = fallback_object();
        if spawns.is_empty() {
            tracing::warn!(template = %template.id, "no spawns share a tag, using fallback object");
            spawns.push(Spawn::Object(&fallback));
        }

        let count = rng.gen_range(MIN_OBJECTS_PER_LOCATION..=MAX_OBJECTS_PER_LOCATION);
        let mut objects = Vec::new();
        let mut entities = Vec::new();
        for n in 0..count {
            let spawn = spawns
                .choose_weighted(rng, |s| s.weight().max(1))
                .unwrap_or(&spawns[0]);
            match spawn {
                Spawn::Object(o) => objects.push(GameObject {
                    id: format!("{}_o{}", id, n + 1),
                    template: o.id.clone(),
                    name: o.name.clone(),
                    description: o.description.clone(),
                    kind: o.kind.clone(),
                    items: self.roll_drop(o.drop_chance, &o.drops, rng).into_iter().collect(),
                    searched: false,
                    depleted: false,
                    drops: o.drops.clone(),
                }),
                Spawn::Entity(e) => entities.push(GameEntity {
                    id: format!("{}_e{}", id, n + 1),
                    template: e.id.clone(),
                    name: e.name.clone(),
                    description: e.description.clone(),
                    disposition: e.disposition,
                    hit_points: e.hit_points,
                    items: self.roll_drop(e.drop_chance, &e.drops, rng).into_iter().collect(),
                }),
            }
        }

        let area = Area {
            id: format!("{}_a1", id),
            name: template.name.clone(),
            description: template.description.clone(),
            objects,
            entities,
            items: Vec::new(),
            exits: vec![exit],
        };

        Location {
            id,
            hex: (hex.x, hex.y),
            template: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            location_type: template.location_type.clone(),
            is_exit: template.exit,
            areas: vec![area],
        }
    }

    /// Roll `drop_chance` percent, then draw one item from the table.
    pub fn roll_drop(&self, drop_chance: u8, drops: &[DropEntry], rng: &mut impl Rng) -> Option<GameItem> {
        if drops.is_empty() || rng.gen_range(0..100) >= u32::from(drop_chance) {
            return None;
        }
        self.draw_item(drops, rng)
    }

    /// Weighted draw from a drop table. Unknown item ids are skipped.
    pub fn draw_item(&self, drops: &[DropEntry], rng: &mut impl Rng) -> Option<GameItem> {
        let entry = drops.choose_weighted(rng, |d| d.weight).ok()?;
        match self.content.item(&entry.item) {
            Some(template) => Some(GameItem::from_template(template, 1)),
            None => {
                tracing::warn!(item = %entry.item, "drop table names an unknown item, skipping");
                None
            }
        }
    }
}

fn weighted_index(templates: &[&LocationTemplate], rng: &mut impl Rng) -> Option<usize> {
    let indices: Vec<usize> = (0..templates.len()).collect();
    indices
        .choose_weighted(rng, |&i| templates[i].spawn_weight.max(1))
        .ok()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::types::ItemKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hex(biome: Biome, terrain: TerrainType) -> Hex {
        Hex {
            x: 5,
            y: 7,
            elevation: 0.5,
            terrain,
            biome,
            watershed: 0,
            features: Vec::new(),
        }
    }

    #[test]
    fn test_location_type_lookup() {
        assert_eq!(LocationGenerator::location_type_for(Biome::Beach, TerrainType::Plains), "coast");
        assert_eq!(LocationGenerator::location_type_for(Biome::Grassland, TerrainType::Hills), "hills");
        assert_eq!(LocationGenerator::location_type_for(Biome::Grassland, TerrainType::Plains), "plains");
        assert_eq!(LocationGenerator::location_type_for(Biome::SnowyPeaks, TerrainType::Peaks), "mountain");
    }

    #[test]
    fn test_every_hex_gets_an_exit_and_full_areas() {
        let gen = LocationGenerator::new(ContentData::embedded());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for biome in Biome::ALL {
            for _ in 0..5 {
                let locations = gen.generate_for_hex(&hex(biome, TerrainType::Plains), &mut rng);
                assert!((1..=3).contains(&locations.len()));
                assert!(locations[0].is_exit);
                assert_eq!(locations[0].areas[0].exits, vec![Exit::Overworld]);
                assert_eq!(locations[0].id, "0507_1");
                for location in &locations[1..] {
                    assert_eq!(location.areas[0].exits, vec![Exit::Location("0507_1".to_string())]);
                }
                for location in &locations {
                    assert_eq!(location.areas.len(), 1);
                    assert_eq!(location.areas[0].spawn_count(), MIN_OBJECTS_PER_LOCATION);
                }
                let mut templates: Vec<_> = locations.iter().map(|l| &l.template).collect();
                templates.sort();
                templates.dedup();
                assert_eq!(templates.len(), locations.len());
            }
        }
    }

    #[test]
    fn test_empty_content_still_generates() {
        let gen = LocationGenerator::new(ContentData::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let locations = gen.generate_for_hex(&hex(Biome::Desert, TerrainType::Plains), &mut rng);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].template, "wilderness_trail");
        assert_eq!(locations[0].areas[0].objects.len(), MIN_OBJECTS_PER_LOCATION);
    }

    #[test]
    fn test_unknown_drop_is_skipped() {
        let gen = LocationGenerator::new(ContentData::embedded());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let drops = vec![DropEntry {
            item: "no_such_item".to_string(),
            weight: 1,
        }];
        assert!(gen.roll_drop(100, &drops, &mut rng).is_none());

        let berries = vec![DropEntry {
            item: "wild_berries".to_string(),
            weight: 1,
        }];
        let item = gen.roll_drop(100, &berries, &mut rng).unwrap();
        assert_eq!(item.kind, ItemKind::Food { nourishment: 10 });
        assert!(gen.roll_drop(0, &berries, &mut rng).is_none());
    }

    #[test]
    fn test_same_seed_same_locations() {
        let gen = LocationGenerator::new(ContentData::embedded());
        let h = hex(Biome::Forest, TerrainType::Plains);
        let a = gen.generate_for_hex(&h, &mut ChaCha8Rng::seed_from_u64(9));
        let b = gen.generate_for_hex(&h, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
