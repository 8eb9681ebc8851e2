//! Playable races and the cultural archetype each one draws from.
//!
//! An archetype is a fixed table of weighted options: governments, values,
//! religions and the biomes a race likes to settle. Civilizations take their
//! character from the archetype of their largest race.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::Biome;

/// Biome weight for biomes an archetype does not list.
pub const DEFAULT_BIOME_WEIGHT: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Halfling,
    Orc,
    Gnome,
}

impl Race {
    pub const ALL: [Race; 6] = [
        Race::Human,
        Race::Elf,
        Race::Dwarf,
        Race::Halfling,
        Race::Orc,
        Race::Gnome,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Race::Human => "human",
            Race::Elf => "elf",
            Race::Dwarf => "dwarf",
            Race::Halfling => "halfling",
            Race::Orc => "orc",
            Race::Gnome => "gnome",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.tag() == tag)
    }

    pub fn plural_name(&self) -> &'static str {
        match self {
            Race::Human => "Humans",
            Race::Elf => "Elves",
            Race::Dwarf => "Dwarves",
            Race::Halfling => "Halflings",
            Race::Orc => "Orcs",
            Race::Gnome => "Gnomes",
        }
    }

    pub fn archetype(&self) -> &'static RaceArchetype {
        match self {
            Race::Human => &HUMAN,
            Race::Elf => &ELF,
            Race::Dwarf => &DWARF,
            Race::Halfling => &HALFLING,
            Race::Orc => &ORC,
            Race::Gnome => &GNOME,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Government {
    Monarchy,
    Republic,
    Theocracy,
    Council,
    Chiefdom,
    Oligarchy,
    Clanhold,
}

impl Government {
    pub fn name(&self) -> &'static str {
        match self {
            Government::Monarchy => "monarchy",
            Government::Republic => "republic",
            Government::Theocracy => "theocracy",
            Government::Council => "council of elders",
            Government::Chiefdom => "chiefdom",
            Government::Oligarchy => "merchant oligarchy",
            Government::Clanhold => "clanhold",
        }
    }
}

impl fmt::Display for Government {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalValue {
    Honor,
    Tradition,
    Knowledge,
    Nature,
    Craftsmanship,
    Wealth,
    Strength,
    Freedom,
    Piety,
    Family,
    Conquest,
    Harmony,
}

/// Value pairs that breed resentment between civilizations holding one each.
const CONFLICTING_VALUES: [(CulturalValue, CulturalValue); 6] = [
    (CulturalValue::Tradition, CulturalValue::Freedom),
    (CulturalValue::Nature, CulturalValue::Wealth),
    (CulturalValue::Conquest, CulturalValue::Harmony),
    (CulturalValue::Strength, CulturalValue::Knowledge),
    (CulturalValue::Piety, CulturalValue::Freedom),
    (CulturalValue::Honor, CulturalValue::Wealth),
];

impl CulturalValue {
    pub fn conflicts_with(&self, other: CulturalValue) -> bool {
        CONFLICTING_VALUES
            .iter()
            .any(|&(a, b)| (a == *self && b == other) || (b == *self && a == other))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CulturalValue::Honor => "honor",
            CulturalValue::Tradition => "tradition",
            CulturalValue::Knowledge => "knowledge",
            CulturalValue::Nature => "nature",
            CulturalValue::Craftsmanship => "craftsmanship",
            CulturalValue::Wealth => "wealth",
            CulturalValue::Strength => "strength",
            CulturalValue::Freedom => "freedom",
            CulturalValue::Piety => "piety",
            CulturalValue::Family => "family",
            CulturalValue::Conquest => "conquest",
            CulturalValue::Harmony => "harmony",
        }
    }
}

impl fmt::Display for CulturalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cultural template for one race.
#[derive(Debug)]
pub struct RaceArchetype {
    pub race: Race,
    /// Name patterns; `{}` is replaced with a generated root.
    pub name_forms: &'static [&'static str],
    pub governments: &'static [(Government, u32)],
    pub values: &'static [(CulturalValue, u32)],
    pub religions: &'static [(&'static str, u32)],
    pub biome_preferences: &'static [(Biome, u32)],
    pub population: (u32, u32),
    pub lifespan: (i32, i32),
}

impl RaceArchetype {
    pub fn biome_weight(&self, biome: Biome) -> u32 {
        self.biome_preferences
            .iter()
            .find(|(b, _)| *b == biome)
            .map_or(DEFAULT_BIOME_WEIGHT, |(_, w)| *w)
    }
}

/// Pick from `(option, weight)` pairs. `None` only when every weight is zero.
pub fn weighted_choice<T: Copy>(rng: &mut impl Rng, options: &[(T, u32)]) -> Option<T> {
    options.choose_weighted(rng, |(_, w)| *w).ok().map(|(t, _)| *t)
}

static HUMAN: RaceArchetype = RaceArchetype {
    race: Race::Human,
    name_forms: &["Kingdom of {}", "{} Empire", "Free Cities of {}", "Realm of {}"],
    governments: &[
        (Government::Monarchy, 40),
        (Government::Republic, 20),
        (Government::Theocracy, 15),
        (Government::Oligarchy, 25),
    ],
    values: &[
        (CulturalValue::Honor, 15),
        (CulturalValue::Wealth, 20),
        (CulturalValue::Tradition, 15),
        (CulturalValue::Freedom, 15),
        (CulturalValue::Piety, 15),
        (CulturalValue::Conquest, 10),
        (CulturalValue::Family, 10),
    ],
    religions: &[
        ("the Church of the Radiant Dawn", 40),
        ("the Old Gods of Field and Hearth", 35),
        ("the Cult of the Unconquered Sun", 25),
    ],
    biome_preferences: &[
        (Biome::Grassland, 10),
        (Biome::Forest, 6),
        (Biome::Beach, 7),
        (Biome::Hills, 5),
        (Biome::Desert, 1),
        (Biome::Tundra, 1),
    ],
    population: (5_000, 40_000),
    lifespan: (50, 80),
};

static ELF: RaceArchetype = RaceArchetype {
    race: Race::Elf,
    name_forms: &["{} Dominion", "Court of {}", "Sylvan Realm of {}"],
    governments: &[
        (Government::Monarchy, 30),
        (Government::Council, 50),
        (Government::Theocracy, 20),
    ],
    values: &[
        (CulturalValue::Nature, 30),
        (CulturalValue::Knowledge, 25),
        (CulturalValue::Harmony, 20),
        (CulturalValue::Tradition, 15),
        (CulturalValue::Freedom, 10),
    ],
    religions: &[
        ("the Song of the Eternal Grove", 50),
        ("the Starlit Pantheon", 35),
        ("the Silent Moon", 15),
    ],
    biome_preferences: &[
        (Biome::Forest, 12),
        (Biome::Grassland, 5),
        (Biome::Lake, 6),
        (Biome::Swamp, 2),
        (Biome::Desert, 0),
        (Biome::Tundra, 1),
    ],
    population: (2_000, 15_000),
    lifespan: (300, 600),
};

static DWARF: RaceArchetype = RaceArchetype {
    race: Race::Dwarf,
    name_forms: &["{} Hold", "Clans of {}", "Deep Kingdom of {}"],
    governments: &[
        (Government::Monarchy, 35),
        (Government::Clanhold, 45),
        (Government::Council, 20),
    ],
    values: &[
        (CulturalValue::Craftsmanship, 30),
        (CulturalValue::Tradition, 25),
        (CulturalValue::Honor, 20),
        (CulturalValue::Wealth, 15),
        (CulturalValue::Family, 10),
    ],
    religions: &[
        ("the Forge Father", 55),
        ("the Ancestors in Stone", 45),
    ],
    biome_preferences: &[
        (Biome::Mountain, 12),
        (Biome::Hills, 10),
        (Biome::SnowyPeaks, 4),
        (Biome::Swamp, 0),
        (Biome::Beach, 1),
    ],
    population: (3_000, 25_000),
    lifespan: (150, 300),
};

static HALFLING: RaceArchetype = RaceArchetype {
    race: Race::Halfling,
    name_forms: &["The {} Shire", "{} Commons", "Hamlets of {}"],
    governments: &[
        (Government::Council, 50),
        (Government::Republic, 35),
        (Government::Oligarchy, 15),
    ],
    values: &[
        (CulturalValue::Family, 30),
        (CulturalValue::Harmony, 25),
        (CulturalValue::Tradition, 20),
        (CulturalValue::Nature, 15),
        (CulturalValue::Wealth, 10),
    ],
    religions: &[
        ("the Harvest Mother", 60),
        ("the Hearthkeepers", 40),
    ],
    biome_preferences: &[
        (Biome::Grassland, 12),
        (Biome::Forest, 6),
        (Biome::Hills, 6),
        (Biome::Mountain, 1),
        (Biome::Desert, 1),
    ],
    population: (1_000, 10_000),
    lifespan: (70, 120),
};

static ORC: RaceArchetype = RaceArchetype {
    race: Race::Orc,
    name_forms: &["{} Horde", "Warbands of {}", "{} Dominion"],
    governments: &[
        (Government::Chiefdom, 60),
        (Government::Clanhold, 25),
        (Government::Theocracy, 15),
    ],
    values: &[
        (CulturalValue::Strength, 30),
        (CulturalValue::Conquest, 30),
        (CulturalValue::Honor, 20),
        (CulturalValue::Freedom, 10),
        (CulturalValue::Family, 10),
    ],
    religions: &[
        ("the Blood Moon", 45),
        ("the Thunder Father", 35),
        ("the Spirits of the Hunt", 20),
    ],
    biome_preferences: &[
        (Biome::Hills, 8),
        (Biome::Desert, 7),
        (Biome::Tundra, 6),
        (Biome::Swamp, 6),
        (Biome::Forest, 2),
    ],
    population: (4_000, 30_000),
    lifespan: (40, 60),
};

static GNOME: RaceArchetype = RaceArchetype {
    race: Race::Gnome,
    name_forms: &["{} Collegium", "Burrows of {}", "{} Confederacy"],
    governments: &[
        (Government::Republic, 40),
        (Government::Council, 40),
        (Government::Oligarchy, 20),
    ],
    values: &[
        (CulturalValue::Knowledge, 35),
        (CulturalValue::Craftsmanship, 30),
        (CulturalValue::Freedom, 15),
        (CulturalValue::Harmony, 10),
        (CulturalValue::Wealth, 10),
    ],
    religions: &[
        ("the Clockwork Order", 45),
        ("the Whispering Roots", 35),
        ("the Lantern Saints", 20),
    ],
    biome_preferences: &[
        (Biome::Hills, 10),
        (Biome::Forest, 8),
        (Biome::Grassland, 4),
        (Biome::SnowyPeaks, 1),
        (Biome::Desert, 1),
    ],
    population: (1_000, 8_000),
    lifespan: (200, 400),
};
