//! Historical event records and their cause/effect links.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Coord;

use super::calendar::EventDate;
use super::civilization::RelationshipLevel;
use super::{CivId, EventId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
            Severity::Catastrophic => "catastrophic",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarOutcome {
    Victory { winner: CivId, loser: CivId },
    Stalemate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessionKind {
    Peaceful,
    Contested,
    CivilWar,
    Coup,
    Assassination,
}

impl SuccessionKind {
    pub const ALL: [SuccessionKind; 5] = [
        SuccessionKind::Peaceful,
        SuccessionKind::Contested,
        SuccessionKind::CivilWar,
        SuccessionKind::Coup,
        SuccessionKind::Assassination,
    ];

    pub fn severity(&self) -> Severity {
        match self {
            SuccessionKind::Peaceful => Severity::Minor,
            SuccessionKind::Contested | SuccessionKind::Assassination => Severity::Moderate,
            SuccessionKind::Coup => Severity::Major,
            SuccessionKind::CivilWar => Severity::Catastrophic,
        }
    }

    /// Fraction of the population lost, as a (min, max) range.
    pub fn casualty_rate(&self) -> (f64, f64) {
        match self {
            SuccessionKind::Peaceful => (0.0, 0.0),
            SuccessionKind::Contested => (0.001, 0.01),
            SuccessionKind::Assassination => (0.0, 0.002),
            SuccessionKind::Coup => (0.005, 0.02),
            SuccessionKind::CivilWar => (0.05, 0.15),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SuccessionKind::Peaceful => "peaceful succession",
            SuccessionKind::Contested => "contested succession",
            SuccessionKind::CivilWar => "civil war",
            SuccessionKind::Coup => "coup",
            SuccessionKind::Assassination => "assassination",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterKind {
    Plague,
    Famine,
    Earthquake,
    Flood,
    Drought,
}

impl DisasterKind {
    pub const ALL: [DisasterKind; 5] = [
        DisasterKind::Plague,
        DisasterKind::Famine,
        DisasterKind::Earthquake,
        DisasterKind::Flood,
        DisasterKind::Drought,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DisasterKind::Plague => "plague",
            DisasterKind::Famine => "famine",
            DisasterKind::Earthquake => "earthquake",
            DisasterKind::Flood => "flood",
            DisasterKind::Drought => "drought",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Artistic,
    Religious,
    Philosophical,
    Scholarly,
}

impl MovementKind {
    pub const ALL: [MovementKind; 4] = [
        MovementKind::Artistic,
        MovementKind::Religious,
        MovementKind::Philosophical,
        MovementKind::Scholarly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MovementKind::Artistic => "artistic",
            MovementKind::Religious => "religious",
            MovementKind::Philosophical => "philosophical",
            MovementKind::Scholarly => "scholarly",
        }
    }
}

/// What happened, with the details particular to each kind of event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    War {
        attacker: CivId,
        defender: CivId,
        outcome: WarOutcome,
        casualties: u32,
    },
    Succession {
        kind: SuccessionKind,
        casualties: u32,
        /// Narrative name of the faction that split off, if the realm fractured.
        breakaway: Option<String>,
    },
    Disaster {
        kind: DisasterKind,
        casualties: u32,
    },
    CulturalMovement {
        kind: MovementKind,
        adopters: Vec<CivId>,
    },
    Alliance,
    Betrayal {
        betrayer: CivId,
        victim: CivId,
    },
    Expansion,
}

impl EventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::War { .. } => "war",
            EventKind::Succession { .. } => "succession",
            EventKind::Disaster { .. } => "disaster",
            EventKind::CulturalMovement { .. } => "cultural",
            EventKind::Alliance => "alliance",
            EventKind::Betrayal { .. } => "betrayal",
            EventKind::Expansion => "expansion",
        }
    }
}

/// A relationship that an event moved from one level to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipChange {
    pub a: CivId,
    pub b: CivId,
    pub from: RelationshipLevel,
    pub to: RelationshipLevel,
}

/// Hexes that changed hands. `None` on either side is the unclaimed pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryTransfer {
    pub from: Option<CivId>,
    pub to: Option<CivId>,
    pub hexes: Vec<Coord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub date: EventDate,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub primary_civilization: CivId,
    pub affected_civilizations: Vec<CivId>,
    pub relationship_changes: Vec<RelationshipChange>,
    pub territorial_changes: Vec<TerritoryTransfer>,
    pub caused_by_events: Vec<EventId>,
    pub causes_future_events: Vec<EventId>,
}

impl HistoricalEvent {
    pub fn new(
        id: EventId,
        kind: EventKind,
        date: EventDate,
        severity: Severity,
        title: String,
        primary_civilization: CivId,
    ) -> Self {
        Self {
            id,
            kind,
            date,
            severity,
            title,
            description: String::new(),
            primary_civilization,
            affected_civilizations: Vec::new(),
            relationship_changes: Vec::new(),
            territorial_changes: Vec::new(),
            caused_by_events: Vec::new(),
            causes_future_events: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// Add an affected civilization (other than the primary one).
    pub fn affecting(mut self, civ: CivId) -> Self {
        if civ != self.primary_civilization && !self.affected_civilizations.contains(&civ) {
            self.affected_civilizations.push(civ);
        }
        self
    }

    pub fn with_relationship_change(mut self, change: RelationshipChange) -> Self {
        self.relationship_changes.push(change);
        self
    }

    pub fn with_transfer(mut self, transfer: TerritoryTransfer) -> Self {
        if !transfer.hexes.is_empty() {
            self.territorial_changes.push(transfer);
        }
        self
    }

    pub fn caused_by(mut self, event: EventId) -> Self {
        if !self.caused_by_events.contains(&event) {
            self.caused_by_events.push(event);
        }
        self
    }

    pub fn involves(&self, civ: CivId) -> bool {
        self.primary_civilization == civ || self.affected_civilizations.contains(&civ)
    }

    /// Two-line entry for the chronicle and `research` output.
    pub fn summary(&self) -> String {
        format!("[{}] {} ({})\n  {}", self.date, self.title, self.severity, self.description)
    }
}

/// Events a civilization took part in, oldest first.
pub fn events_involving(events: &[HistoricalEvent], civ: CivId) -> Vec<&HistoricalEvent> {
    let mut found: Vec<_> = events.iter().filter(|e| e.involves(civ)).collect();
    found.sort_by_key(|e| e.date);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HistoricalEvent {
        HistoricalEvent::new(
            EventId(0),
            EventKind::Betrayal {
                betrayer: CivId(1),
                victim: CivId(2),
            },
            EventDate::new(1100, 4, 12),
            Severity::Major,
            "The Broken Oath".to_string(),
            CivId(1),
        )
        .affecting(CivId(2))
        .affecting(CivId(2))
        .affecting(CivId(1))
    }

    #[test]
    fn test_builder_dedups_participants() {
        let event = sample();
        assert_eq!(event.affected_civilizations, vec![CivId(2)]);
        assert!(event.involves(CivId(1)));
        assert!(event.involves(CivId(2)));
        assert!(!event.involves(CivId(3)));
    }

    #[test]
    fn test_causality_links() {
        let war = HistoricalEvent::new(
            EventId(1),
            EventKind::Expansion,
            EventDate::new(1101, 1, 1),
            Severity::Minor,
            "Expansion".to_string(),
            CivId(2),
        )
        .caused_by(EventId(0))
        .caused_by(EventId(0));
        assert_eq!(war.caused_by_events, vec![EventId(0)]);
    }

    #[test]
    fn test_empty_transfers_are_dropped() {
        let event = sample().with_transfer(TerritoryTransfer {
            from: Some(CivId(2)),
            to: Some(CivId(1)),
            hexes: Vec::new(),
        });
        assert!(event.territorial_changes.is_empty());
    }

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let json = serde_json::to_value(&sample().kind).unwrap();
        assert_eq!(json["type"], "betrayal");
        assert_eq!(json["betrayer"], "civ_1");
    }

    #[test]
    fn test_succession_table() {
        assert_eq!(SuccessionKind::CivilWar.severity(), Severity::Catastrophic);
        for kind in SuccessionKind::ALL {
            let (lo, hi) = kind.casualty_rate();
            assert!(lo <= hi);
        }
    }
}
