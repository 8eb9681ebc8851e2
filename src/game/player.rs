//! The player character and survival needs.

use serde::{Deserialize, Serialize};

use crate::grid::Coord;
use crate::location::{add_item, GameItem};

/// Needs saturate at this value.
pub const MAX_NEED: u32 = 100;
const STARTING_HIT_POINTS: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub inventory: Vec<GameItem>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hit_points: STARTING_HIT_POINTS,
            max_hit_points: STARTING_HIT_POINTS,
            inventory: Vec::new(),
        }
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hit_points;
        self.hit_points = (self.hit_points + amount).min(self.max_hit_points);
        self.hit_points - before
    }

    pub fn hurt(&mut self, amount: u32) {
        self.hit_points = self.hit_points.saturating_sub(amount);
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    pub fn give(&mut self, item: GameItem) {
        add_item(&mut self.inventory, item);
    }

    pub fn has_item(&self, query: &str) -> bool {
        self.inventory
            .iter()
            .any(|i| crate::location::types::matches_name(&i.name, &i.id, query))
    }

    pub fn inventory_text(&self) -> String {
        if self.inventory.is_empty() {
            return "You carry nothing.".to_string();
        }
        let items: Vec<String> = self.inventory.iter().map(|i| i.label()).collect();
        format!("You carry: {}", items.join(", "))
    }
}

/// Hunger, thirst and fatigue, each 0 (fine) to 100 (desperate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survival {
    pub hunger: u32,
    pub thirst: u32,
    pub fatigue: u32,
}

impl Survival {
    /// Needs grow by one hour of activity. Returns hit points lost to
    /// starvation or dehydration.
    pub fn pass_hour(&mut self, resting: bool) -> u32 {
        self.hunger = (self.hunger + 2).min(MAX_NEED);
        self.thirst = (self.thirst + 3).min(MAX_NEED);
        if !resting {
            self.fatigue = (self.fatigue + 2).min(MAX_NEED);
        }
        u32::from(self.hunger >= MAX_NEED) + u32::from(self.thirst >= MAX_NEED)
    }

    pub fn eat(&mut self, nourishment: u32) {
        self.hunger = self.hunger.saturating_sub(nourishment);
    }

    pub fn drink(&mut self, quench: u32) {
        self.thirst = self.thirst.saturating_sub(quench);
    }

    pub fn recover(&mut self, amount: u32) {
        self.fatigue = self.fatigue.saturating_sub(amount);
    }

    fn level(value: u32) -> &'static str {
        match value {
            0..=24 => "fine",
            25..=49 => "noticeable",
            50..=74 => "strong",
            75..=99 => "severe",
            _ => "desperate",
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "Hunger {} ({}), thirst {} ({}), fatigue {} ({})",
            self.hunger,
            Self::level(self.hunger),
            self.thirst,
            Self::level(self.thirst),
            self.fatigue,
            Self::level(self.fatigue)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub character: Character,
    pub survival: Survival,
    pub position: Coord,
    /// Id of the location the player is inside, if any.
    pub current_location: Option<String>,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Coord) -> Self {
        Self {
            character: Character::new(name),
            survival: Survival::default(),
            position,
            current_location: None,
        }
    }

    pub fn status(&self) -> String {
        format!(
            "{}: {}/{} HP. {}.",
            self.character.name,
            self.character.hit_points,
            self.character.max_hit_points,
            self.survival.describe()
        )
    }
}
