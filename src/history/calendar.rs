//! Calendar for dated historical events.
//!
//! Twelve months of thirty days; each month belongs to one season.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The "present day" a new game starts in.
pub const CURRENT_YEAR: i32 = 1452;
/// Youngest a civilization can be at the present day.
pub const MIN_CIV_AGE: i32 = 200;
/// Oldest a civilization can be at the present day.
pub const MAX_CIV_AGE: i32 = 600;

pub const MONTHS_PER_YEAR: u8 = 12;
pub const DAYS_PER_MONTH: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Months 12, 1, 2 are winter; 3-5 spring; 6-8 summer; 9-11 autumn.
    pub fn from_month(month: u8) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A specific day in the world calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub season: Season,
}

impl EventDate {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        let month = month.clamp(1, MONTHS_PER_YEAR);
        Self {
            year,
            month,
            day: day.clamp(1, DAYS_PER_MONTH),
            season: Season::from_month(month),
        }
    }

    /// First day of a year.
    pub fn start_of(year: i32) -> Self {
        Self::new(year, 1, 1)
    }

    /// A random day within `year`.
    pub fn random_in(year: i32, rng: &mut impl Rng) -> Self {
        Self::new(
            year,
            rng.gen_range(1..=MONTHS_PER_YEAR),
            rng.gen_range(1..=DAYS_PER_MONTH),
        )
    }

    fn ordinal(&self) -> (i32, u8, u8) {
        (self.year, self.month, self.day)
    }
}

impl Ord for EventDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for EventDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {} of {} in Year {}", self.day, self.season, self.year)
    }
}
