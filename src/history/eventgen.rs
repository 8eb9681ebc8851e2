//! Year-by-year historical simulation.
//!
//! Each simulated year may produce one event. Events are applied to the
//! civilizations immediately: territory and relationships change as they
//! happen and every territorial change is logged with its date and event.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::{distance, Coord, Grid};
use crate::terrain::TerrainType;

use super::calendar::EventDate;
use super::civgen::nearest_frontier;
use super::civilization::{
    pair_mut, Civilization, RelationshipLevel, TerritorialChange, TerritoryChangeKind,
};
use super::events::{
    DisasterKind, EventKind, HistoricalEvent, MovementKind, RelationshipChange, Severity,
    SuccessionKind, TerritoryTransfer, WarOutcome,
};
use super::naming::NameGenerator;
use super::races::weighted_choice;
use super::{CivId, EventId, IdGenerator};

/// Chance that a simulated year produces an event.
pub const DEFAULT_EVENT_CHANCE: f64 = 0.3;

/// Share of a defeated civilization's border that changes hands.
const CONQUEST_SHARE: f64 = 0.25;
const CIVIL_WAR_FRAGMENT_CHANCE: f64 = 0.5;
const MOVEMENT_SPREAD_CHANCE: f64 = 0.4;
const STALEMATE_CHANCE: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EventChoice {
    War,
    Succession,
    Disaster,
    Cultural,
    Alliance,
    Betrayal,
    Expansion,
}

const EVENT_WEIGHTS: [(EventChoice, u32); 7] = [
    (EventChoice::War, 23),
    (EventChoice::Succession, 18),
    (EventChoice::Disaster, 15),
    (EventChoice::Cultural, 18),
    (EventChoice::Alliance, 13),
    (EventChoice::Betrayal, 5),
    (EventChoice::Expansion, 8),
];

const SUCCESSION_WEIGHTS: [(SuccessionKind, u32); 5] = [
    (SuccessionKind::Peaceful, 50),
    (SuccessionKind::Contested, 20),
    (SuccessionKind::CivilWar, 10),
    (SuccessionKind::Coup, 10),
    (SuccessionKind::Assassination, 10),
];

const DISASTER_SEVERITY_WEIGHTS: [(Severity, u32); 4] = [
    (Severity::Minor, 40),
    (Severity::Moderate, 30),
    (Severity::Major, 20),
    (Severity::Catastrophic, 10),
];

/// Population fraction killed by a disaster of each severity.
pub fn disaster_casualty_rate(severity: Severity) -> (f64, f64) {
    match severity {
        Severity::Minor => (0.001, 0.01),
        Severity::Moderate => (0.01, 0.05),
        Severity::Major => (0.05, 0.15),
        Severity::Catastrophic => (0.15, 0.30),
    }
}

/// Population fraction each side of a war loses.
fn war_casualty_rate(severity: Severity) -> (f64, f64) {
    match severity {
        Severity::Minor => (0.005, 0.02),
        Severity::Moderate => (0.01, 0.04),
        Severity::Major => (0.03, 0.08),
        Severity::Catastrophic => (0.05, 0.12),
    }
}

fn war_severity(combined_population: u32) -> Severity {
    match combined_population {
        0..=19_999 => Severity::Minor,
        20_000..=49_999 => Severity::Moderate,
        50_000..=99_999 => Severity::Major,
        _ => Severity::Catastrophic,
    }
}

fn draw_rate(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Move ⌈25%⌉ of the loser's border hexes (those touching the winner) to the
/// winner, nearest the winner's capital first. A non-empty border always
/// yields at least one hex, even the loser's last. Returns the hexes that
/// changed hands.
pub fn resolve_conquest(
    winner: &mut Civilization,
    loser: &mut Civilization,
    date: EventDate,
    event: EventId,
) -> Vec<Coord> {
    let mut border = loser.territory.border_with(&winner.territory);
    if border.is_empty() {
        return border;
    }

    let taken = ((border.len() as f64 * CONQUEST_SHARE).ceil() as usize).max(1);

    let anchor = winner.territory.capital.unwrap_or(border[0]);
    border.sort_by(|a, b| {
        distance(*a, anchor)
            .partial_cmp(&distance(*b, anchor))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    border.truncate(taken);

    loser.territory.remove(&border);
    winner.territory.hexes.extend(border.iter().copied());

    winner.record_change(TerritorialChange {
        date,
        kind: TerritoryChangeKind::Conquered,
        hexes: border.clone(),
        other_civilization: Some(loser.id),
        event: Some(event),
    });
    loser.record_change(TerritorialChange {
        date,
        kind: TerritoryChangeKind::Lost,
        hexes: border.clone(),
        other_civilization: Some(winner.id),
        event: Some(event),
    });

    border
}

pub struct HistoricalEventGenerator {
    rng: ChaCha8Rng,
    ids: IdGenerator,
    event_chance: f64,
}

impl HistoricalEventGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_event_chance(seed, DEFAULT_EVENT_CHANCE)
    }

    pub fn with_event_chance(seed: u64, event_chance: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            ids: IdGenerator::new(),
            event_chance: event_chance.clamp(0.0, 1.0),
        }
    }

    fn next_event_id(&mut self) -> EventId {
        EventId(self.ids.next_id())
    }

    /// Run the simulation from `start_year` to `end_year` inclusive.
    pub fn simulate(
        &mut self,
        civs: &mut [Civilization],
        terrain: &Grid<TerrainType>,
        start_year: i32,
        end_year: i32,
    ) -> Vec<HistoricalEvent> {
        let mut events: Vec<HistoricalEvent> = Vec::new();

        for year in start_year..=end_year {
            if !self.rng.gen_bool(self.event_chance) {
                continue;
            }

            let active: Vec<usize> = (0..civs.len())
                .filter(|&i| civs[i].exists_in(year) && civs[i].territory.size() > 0)
                .collect();
            if active.is_empty() {
                continue;
            }

            let Some(choice) = weighted_choice(&mut self.rng, &EVENT_WEIGHTS) else {
                continue;
            };
            let date = EventDate::random_in(year, &mut self.rng);

            let event = match choice {
                EventChoice::War => self.war(civs, &active, date, &mut events),
                EventChoice::Succession => self.succession(civs, &active, date),
                EventChoice::Disaster => self.disaster(civs, &active, date),
                EventChoice::Cultural => self.cultural_movement(civs, &active, date),
                EventChoice::Alliance => self.alliance(civs, &active, date),
                EventChoice::Betrayal => self.betrayal(civs, &active, date),
                EventChoice::Expansion => self.expansion(civs, &active, terrain, date),
            };

            if let Some(event) = event {
                tracing::debug!(id = %event.id, kind = event.kind.type_name(), year, "{}", event.title);
                events.push(event);
            }
        }

        tracing::info!(events = events.len(), start_year, end_year, "history simulated");
        events
    }

    /// Pairs of active civilizations, as indices into `civs`.
    fn pairs(active: &[usize]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (n, &i) in active.iter().enumerate() {
            for &j in &active[n + 1..] {
                pairs.push((i, j));
            }
        }
        pairs
    }

    fn pairs_where(
        civs: &[Civilization],
        active: &[usize],
        pred: impl Fn(RelationshipLevel) -> bool,
    ) -> Vec<(usize, usize)> {
        Self::pairs(active)
            .into_iter()
            .filter(|&(i, j)| pred(civs[i].relationship_with(civs[j].id)))
            .collect()
    }

    fn change_relationship(
        civs: &mut [Civilization],
        a: CivId,
        b: CivId,
        to: RelationshipLevel,
    ) -> Option<RelationshipChange> {
        let (ca, cb) = pair_mut(civs, a, b)?;
        let from = ca.relationship_with(b);
        ca.faction_relationships.insert(b, to);
        cb.faction_relationships.insert(a, to);
        Some(RelationshipChange { a, b, from, to })
    }

    fn war(
        &mut self,
        civs: &mut [Civilization],
        active: &[usize],
        date: EventDate,
        events: &mut [HistoricalEvent],
    ) -> Option<HistoricalEvent> {
        let hostile = Self::pairs_where(civs, active, |r| r.is_antagonistic());
        let pool = if hostile.is_empty() { Self::pairs(active) } else { hostile };
        let &(i, j) = pool.choose(&mut self.rng)?;
        let (i, j) = if self.rng.gen_bool(0.5) { (i, j) } else { (j, i) };

        let id = self.next_event_id();
        let (attacker, defender) = (civs[i].id, civs[j].id);
        let severity = war_severity(civs[i].population.saturating_add(civs[j].population));

        let outcome = if self.rng.gen_bool(STALEMATE_CHANCE) {
            WarOutcome::Stalemate
        } else {
            let a_pop = civs[i].population as f64;
            let d_pop = civs[j].population as f64;
            let attacker_odds = (a_pop / (a_pop + d_pop).max(1.0)).clamp(0.1, 0.9);
            if self.rng.gen_bool(attacker_odds) {
                WarOutcome::Victory { winner: attacker, loser: defender }
            } else {
                WarOutcome::Victory { winner: defender, loser: attacker }
            }
        };

        let rate = war_casualty_rate(severity);
        let mut casualties = 0;
        for (idx, side) in [(i, attacker), (j, defender)] {
            let mut r = draw_rate(&mut self.rng, rate);
            if matches!(outcome, WarOutcome::Victory { loser, .. } if loser == side) {
                r *= 1.5;
            }
            let deaths = (civs[idx].population as f64 * r).round() as u32;
            casualties += civs[idx].apply_casualties(deaths);
        }

        let mut transferred = Vec::new();
        if let WarOutcome::Victory { winner, loser } = outcome {
            if let Some((w, l)) = pair_mut(civs, winner, loser) {
                transferred = resolve_conquest(w, l, date, id);
            }
        }

        let worse = civs[i].relationship_with(defender).worsened();
        let change = Self::change_relationship(civs, attacker, defender, worse);

        let name_of = |id: CivId| civs.iter().find(|c| c.id == id).map_or("", |c| c.name.as_str());
        let title = format!("War between {} and {}", name_of(attacker), name_of(defender));
        let description = match outcome {
            WarOutcome::Victory { winner, loser } => format!(
                "{} defeated {}. {} died and {} hexes changed hands.",
                name_of(winner),
                name_of(loser),
                casualties,
                transferred.len()
            ),
            WarOutcome::Stalemate => format!(
                "{} and {} fought to a bitter stalemate. {} died and no land changed hands.",
                name_of(attacker),
                name_of(defender),
                casualties
            ),
        };

        let mut event = HistoricalEvent::new(
            id,
            EventKind::War {
                attacker,
                defender,
                outcome,
                casualties,
            },
            date,
            severity,
            title,
            attacker,
        )
        .affecting(defender)
        .with_description(description);

        if let Some(change) = change {
            event = event.with_relationship_change(change);
        }
        if let WarOutcome::Victory { winner, loser } = outcome {
            event = event.with_transfer(TerritoryTransfer {
                from: Some(loser),
                to: Some(winner),
                hexes: transferred,
            });
        }

        // A war between a betrayed pair is the consequence of that betrayal
        let betrayal = events.iter_mut().rev().find(|e| {
            matches!(e.kind, EventKind::Betrayal { betrayer, victim }
                if (betrayer == attacker && victim == defender) || (betrayer == defender && victim == attacker))
        });
        if let Some(betrayal) = betrayal {
            betrayal.causes_future_events.push(id);
            event = event.caused_by(betrayal.id);
        }

        Some(event)
    }

    fn succession(&mut self, civs: &mut [Civilization], active: &[usize], date: EventDate) -> Option<HistoricalEvent> {
        let &i = active.choose(&mut self.rng)?;
        let kind = weighted_choice(&mut self.rng, &SUCCESSION_WEIGHTS)?;
        let id = self.next_event_id();

        let rate = draw_rate(&mut self.rng, kind.casualty_rate());
        let deaths = (civs[i].population as f64 * rate).round() as u32;
        let casualties = civs[i].apply_casualties(deaths);

        let mut ceded = Vec::new();
        let mut breakaway = None;
        if kind == SuccessionKind::CivilWar && self.rng.gen_bool(CIVIL_WAR_FRAGMENT_CHANCE) {
            let capital = civs[i].territory.capital;
            let outlying: Vec<Coord> = civs[i]
                .territory
                .hexes
                .iter()
                .copied()
                .filter(|h| Some(*h) != capital)
                .collect();
            if !outlying.is_empty() {
                let share = self.rng.gen_range(0.10..=0.30);
                let count = ((outlying.len() as f64 * share).round() as usize).clamp(1, outlying.len());
                ceded = outlying.choose_multiple(&mut self.rng, count).copied().collect();
                ceded.sort();

                civs[i].territory.remove(&ceded);
                civs[i].record_change(TerritorialChange {
                    date,
                    kind: TerritoryChangeKind::Fragmented,
                    hexes: ceded.clone(),
                    other_civilization: None,
                    event: Some(id),
                });
                breakaway = Some(NameGenerator::breakaway_name(civs[i].primary_race(), &mut self.rng));
            }
        }

        let civ = &civs[i];
        let title = match kind {
            SuccessionKind::Peaceful => format!("A new ruler for {}", civ.name),
            _ => format!("The {} of {}", kind.name(), civ.name),
        };
        let mut description = format!(
            "{} passed power through a {}, costing {} lives.",
            civ.name,
            kind.name(),
            casualties
        );
        if let Some(faction) = &breakaway {
            description.push_str(&format!(
                " {} broke away, and {} hexes fell out of the realm's control.",
                faction,
                ceded.len()
            ));
        }

        Some(
            HistoricalEvent::new(
                id,
                EventKind::Succession {
                    kind,
                    casualties,
                    breakaway,
                },
                date,
                kind.severity(),
                title,
                civ.id,
            )
            .with_description(description)
            .with_transfer(TerritoryTransfer {
                from: Some(civ.id),
                to: None,
                hexes: ceded,
            }),
        )
    }

    fn disaster(&mut self, civs: &mut [Civilization], active: &[usize], date: EventDate) -> Option<HistoricalEvent> {
        let kind = *DisasterKind::ALL.choose(&mut self.rng)?;
        let count = self.rng.gen_range(1..=3).min(active.len());
        let struck: Vec<usize> = active.choose_multiple(&mut self.rng, count).copied().collect();
        let severity = weighted_choice(&mut self.rng, &DISASTER_SEVERITY_WEIGHTS)?;
        let id = self.next_event_id();

        let combined: u64 = struck.iter().map(|&i| civs[i].population as u64).sum();
        let rate = draw_rate(&mut self.rng, disaster_casualty_rate(severity));
        let total = (combined as f64 * rate).round();

        let mut casualties = 0;
        for &i in &struck {
            let share = if combined == 0 {
                0.0
            } else {
                civs[i].population as f64 / combined as f64
            };
            casualties += civs[i].apply_casualties((total * share).round() as u32);
        }

        let primary = civs[struck[0]].id;
        let names: Vec<&str> = struck.iter().map(|&i| civs[i].name.as_str()).collect();
        let mut event = HistoricalEvent::new(
            id,
            EventKind::Disaster { kind, casualties },
            date,
            severity,
            format!("The Great {} of {}", capitalize(kind.name()), date.year),
            primary,
        )
        .with_description(format!(
            "A {} {} struck {}, killing {}.",
            severity,
            kind.name(),
            names.join(", "),
            casualties
        ));
        for &i in &struck[1..] {
            event = event.affecting(civs[i].id);
        }
        Some(event)
    }

    fn cultural_movement(&mut self, civs: &mut [Civilization], active: &[usize], date: EventDate) -> Option<HistoricalEvent> {
        let &origin = active.choose(&mut self.rng)?;
        let kind = *MovementKind::ALL.choose(&mut self.rng)?;
        let id = self.next_event_id();
        let origin_id = civs[origin].id;

        let mut adopters = Vec::new();
        for &i in active {
            if i != origin
                && civs[i].relationship_with(origin_id).is_cordial()
                && !civs[i].territory.border_with(&civs[origin].territory).is_empty()
                && self.rng.gen_bool(MOVEMENT_SPREAD_CHANCE)
            {
                adopters.push(civs[i].id);
            }
        }

        let origin_civ = &civs[origin];
        let mut description = format!(
            "A {} movement took hold in {}.",
            kind.name(),
            origin_civ.name
        );
        if !adopters.is_empty() {
            description.push_str(&format!(" It spread to {} of its friends.", adopters.len()));
        }

        let mut event = HistoricalEvent::new(
            id,
            EventKind::CulturalMovement {
                kind,
                adopters: adopters.clone(),
            },
            date,
            Severity::Minor,
            format!("The {} awakening of {}", capitalize(kind.name()), origin_civ.name),
            origin_id,
        )
        .with_description(description);
        for adopter in adopters {
            event = event.affecting(adopter);
        }
        Some(event)
    }

    fn alliance(&mut self, civs: &mut [Civilization], active: &[usize], date: EventDate) -> Option<HistoricalEvent> {
        let eligible = Self::pairs_where(civs, active, |r| {
            matches!(r, RelationshipLevel::Neutral | RelationshipLevel::Friendly)
        });
        let &(i, j) = eligible.choose(&mut self.rng)?;
        let id = self.next_event_id();
        let (a, b) = (civs[i].id, civs[j].id);

        let better = civs[i].relationship_with(b).improved();
        let change = Self::change_relationship(civs, a, b, better)?;

        let title = if better == RelationshipLevel::Allied {
            format!("Alliance of {} and {}", civs[i].name, civs[j].name)
        } else {
            format!("Accord between {} and {}", civs[i].name, civs[j].name)
        };
        Some(
            HistoricalEvent::new(id, EventKind::Alliance, date, Severity::Minor, title, a)
                .affecting(b)
                .with_description(format!(
                    "{} and {} drew closer, moving from {} to {}.",
                    civs[i].name, civs[j].name, change.from, change.to
                ))
                .with_relationship_change(change),
        )
    }

    fn betrayal(&mut self, civs: &mut [Civilization], active: &[usize], date: EventDate) -> Option<HistoricalEvent> {
        let allied = Self::pairs_where(civs, active, |r| r == RelationshipLevel::Allied);
        let &(i, j) = allied.choose(&mut self.rng)?;
        let (b, v) = if self.rng.gen_bool(0.5) { (i, j) } else { (j, i) };
        let id = self.next_event_id();
        let (betrayer, victim) = (civs[b].id, civs[v].id);

        let change = Self::change_relationship(civs, betrayer, victim, RelationshipLevel::Hostile)?;

        Some(
            HistoricalEvent::new(
                id,
                EventKind::Betrayal { betrayer, victim },
                date,
                Severity::Major,
                format!("The betrayal of {}", civs[v].name),
                betrayer,
            )
            .affecting(victim)
            .with_description(format!(
                "{} broke faith with its ally {}. The two are now hostile.",
                civs[b].name, civs[v].name
            ))
            .with_relationship_change(change),
        )
    }

    fn expansion(
        &mut self,
        civs: &mut [Civilization],
        active: &[usize],
        terrain: &Grid<TerrainType>,
        date: EventDate,
    ) -> Option<HistoricalEvent> {
        let &i = active
            .choose_weighted(&mut self.rng, |&i| 1.0 / (civs[i].territory.size() as f64 + 1.0))
            .ok()?;
        let capital = civs[i].territory.capital?;

        let mut claimed: HashSet<Coord> = civs
            .iter()
            .flat_map(|c| c.territory.hexes.iter().copied())
            .collect();

        let size = civs[i].territory.size();
        let share = self.rng.gen_range(0.02..=0.10);
        let wanted = ((size as f64 * share).round() as usize).max(1);

        let mut hexes: BTreeSet<Coord> = civs[i].territory.hexes.clone();
        let mut gained = Vec::new();
        while gained.len() < wanted {
            let Some(next) = nearest_frontier(&hexes, capital, terrain, &claimed, false) else {
                break;
            };
            hexes.insert(next);
            claimed.insert(next);
            gained.push(next);
        }
        if gained.is_empty() {
            return None;
        }

        let id = self.next_event_id();
        let civ = &mut civs[i];
        civ.territory.hexes = hexes;
        civ.record_change(TerritorialChange {
            date,
            kind: TerritoryChangeKind::Expanded,
            hexes: gained.clone(),
            other_civilization: None,
            event: Some(id),
        });

        Some(
            HistoricalEvent::new(
                id,
                EventKind::Expansion,
                date,
                Severity::Minor,
                format!("{} expands its borders", civ.name),
                civ.id,
            )
            .with_description(format!("{} settled {} new hexes.", civ.name, gained.len()))
            .with_transfer(TerritoryTransfer {
                from: None,
                to: Some(civ.id),
                hexes: gained,
            }),
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
