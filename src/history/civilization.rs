//! Civilizations: who they are, where they rule and how they regard each other.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{is_adjacent, Coord};

use super::calendar::EventDate;
use super::races::{CulturalValue, Government, Race};
use super::{CivId, EventId, FigureId};

/// Racial make-up of a civilization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceComposition {
    Single(Race),
    /// Races with their percentage share. Shares sum to 100.
    Mixed(Vec<(Race, u8)>),
}

impl RaceComposition {
    /// The largest component (the first one on ties).
    pub fn primary_race(&self) -> Race {
        match self {
            RaceComposition::Single(race) => *race,
            RaceComposition::Mixed(parts) => parts
                .iter()
                .fold(None::<(Race, u8)>, |best, &(r, p)| match best {
                    Some((_, bp)) if bp >= p => best,
                    _ => Some((r, p)),
                })
                .map_or(Race::Human, |(r, _)| r),
        }
    }

    pub fn races(&self) -> Vec<Race> {
        match self {
            RaceComposition::Single(race) => vec![*race],
            RaceComposition::Mixed(parts) => parts.iter().map(|(r, _)| *r).collect(),
        }
    }

    pub fn contains(&self, race: Race) -> bool {
        self.races().contains(&race)
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, RaceComposition::Mixed(_))
    }

    pub fn percent_of(&self, race: Race) -> u8 {
        match self {
            RaceComposition::Single(r) if *r == race => 100,
            RaceComposition::Single(_) => 0,
            RaceComposition::Mixed(parts) => parts
                .iter()
                .find(|(r, _)| *r == race)
                .map_or(0, |(_, p)| *p),
        }
    }
}

impl fmt::Display for RaceComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceComposition::Single(race) => write!(f, "{}", race),
            RaceComposition::Mixed(parts) => {
                let described: Vec<String> =
                    parts.iter().map(|(r, p)| format!("{}% {}", p, r)).collect();
                f.write_str(&described.join(", "))
            }
        }
    }
}

/// Standing between two civilizations, worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipLevel {
    AtWar,
    Hostile,
    Tense,
    #[default]
    Neutral,
    Friendly,
    Allied,
}

impl RelationshipLevel {
    const ORDER: [RelationshipLevel; 6] = [
        RelationshipLevel::AtWar,
        RelationshipLevel::Hostile,
        RelationshipLevel::Tense,
        RelationshipLevel::Neutral,
        RelationshipLevel::Friendly,
        RelationshipLevel::Allied,
    ];

    /// Map a seeding score onto a level.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 4 => RelationshipLevel::Allied,
            2..=3 => RelationshipLevel::Friendly,
            0..=1 => RelationshipLevel::Neutral,
            -2..=-1 => RelationshipLevel::Tense,
            -3 => RelationshipLevel::Hostile,
            _ => RelationshipLevel::AtWar,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// One step friendlier, saturating at allied.
    pub fn improved(&self) -> Self {
        Self::ORDER[(self.index() + 1).min(Self::ORDER.len() - 1)]
    }

    /// One step worse, saturating at war.
    pub fn worsened(&self) -> Self {
        Self::ORDER[self.index().saturating_sub(1)]
    }

    pub fn is_antagonistic(&self) -> bool {
        matches!(
            self,
            RelationshipLevel::AtWar | RelationshipLevel::Hostile | RelationshipLevel::Tense
        )
    }

    pub fn is_cordial(&self) -> bool {
        matches!(self, RelationshipLevel::Friendly | RelationshipLevel::Allied)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelationshipLevel::AtWar => "at_war",
            RelationshipLevel::Hostile => "hostile",
            RelationshipLevel::Tense => "tense",
            RelationshipLevel::Neutral => "neutral",
            RelationshipLevel::Friendly => "friendly",
            RelationshipLevel::Allied => "allied",
        }
    }
}

impl fmt::Display for RelationshipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Land a civilization controls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub hexes: BTreeSet<Coord>,
    pub capital: Option<Coord>,
    pub description: String,
}

impl Territory {
    pub fn size(&self) -> usize {
        self.hexes.len()
    }

    pub fn contains(&self, hex: Coord) -> bool {
        self.hexes.contains(&hex)
    }

    /// Hexes of this territory touching any hex of `other`.
    pub fn border_with(&self, other: &Territory) -> Vec<Coord> {
        self.hexes
            .iter()
            .copied()
            .filter(|&h| other.hexes.iter().any(|&o| is_adjacent(h, o)))
            .collect()
    }

    /// Remove hexes, moving the capital to the remaining hex nearest the old
    /// one when it is among them.
    pub fn remove(&mut self, lost: &[Coord]) {
        for hex in lost {
            self.hexes.remove(hex);
        }
        if let Some(capital) = self.capital {
            if !self.hexes.contains(&capital) {
                self.capital = self
                    .hexes
                    .iter()
                    .copied()
                    .min_by(|a, b| {
                        crate::grid::distance(*a, capital)
                            .partial_cmp(&crate::grid::distance(*b, capital))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryChangeKind {
    Founded,
    Conquered,
    Lost,
    Expanded,
    Fragmented,
}

/// One dated entry in a civilization's territorial history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerritorialChange {
    pub date: EventDate,
    pub kind: TerritoryChangeKind,
    pub hexes: Vec<Coord>,
    /// The other side of a conquest, if any.
    pub other_civilization: Option<CivId>,
    pub event: Option<EventId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    pub id: CivId,
    pub name: String,
    pub races: RaceComposition,
    pub government: Government,
    pub values: Vec<CulturalValue>,
    pub religion: String,
    pub founding_year: i32,
    pub territory: Territory,
    pub population: u32,
    pub faction_relationships: BTreeMap<CivId, RelationshipLevel>,
    pub founding_figures: Vec<FigureId>,
    pub territorial_history: Vec<TerritorialChange>,
}

impl Civilization {
    pub fn primary_race(&self) -> Race {
        self.races.primary_race()
    }

    pub fn relationship_with(&self, other: CivId) -> RelationshipLevel {
        self.faction_relationships
            .get(&other)
            .copied()
            .unwrap_or_default()
    }

    pub fn exists_in(&self, year: i32) -> bool {
        self.founding_year <= year
    }

    /// Kill up to `casualties` people, never dropping below one survivor.
    /// Returns how many actually died.
    pub fn apply_casualties(&mut self, casualties: u32) -> u32 {
        let lost = casualties.min(self.population.saturating_sub(1));
        self.population -= lost;
        lost
    }

    pub fn record_change(&mut self, change: TerritorialChange) {
        self.territorial_history.push(change);
    }

    /// One-paragraph description for the `research` command.
    pub fn summary(&self) -> String {
        let values: Vec<&str> = self.values.iter().map(|v| v.name()).collect();
        format!(
            "{} ({}): a {} of {}, founded in {}. Population {}, {} hexes. Values: {}. Worships {}.",
            self.name,
            self.id,
            self.government,
            self.races,
            self.founding_year,
            self.population,
            self.territory.size(),
            values.join(", "),
            self.religion
        )
    }
}

fn position(civs: &[Civilization], id: CivId) -> Option<usize> {
    civs.iter().position(|c| c.id == id)
}

pub fn find_civ(civs: &[Civilization], id: CivId) -> Option<&Civilization> {
    position(civs, id).map(|i| &civs[i])
}

/// Set the standing between two civilizations on both sides.
pub fn set_relationship(civs: &mut [Civilization], a: CivId, b: CivId, level: RelationshipLevel) {
    if a == b {
        return;
    }
    if let Some(i) = position(civs, a) {
        civs[i].faction_relationships.insert(b, level);
    }
    if let Some(j) = position(civs, b) {
        civs[j].faction_relationships.insert(a, level);
    }
}

/// Mutable access to two distinct civilizations at once.
pub fn pair_mut(
    civs: &mut [Civilization],
    a: CivId,
    b: CivId,
) -> Option<(&mut Civilization, &mut Civilization)> {
    let i = position(civs, a)?;
    let j = position(civs, b)?;
    if i == j {
        return None;
    }
    if i < j {
        let (left, right) = civs.split_at_mut(j);
        Some((&mut left[i], &mut right[0]))
    } else {
        let (left, right) = civs.split_at_mut(i);
        Some((&mut right[0], &mut left[j]))
    }
}
