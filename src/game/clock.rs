//! In-game time and weather.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::Biome;

const MINUTES_PER_DAY: u32 = 24 * 60;
const START_MINUTE: u32 = 8 * 60;

/// Chance per elapsed hour that the weather moves on.
const WEATHER_CHANGE_CHANCE: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub day: u32,
    /// Minutes since midnight.
    pub minute: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            day: 1,
            minute: START_MINUTE,
        }
    }
}

impl GameClock {
    /// Advance by `minutes`; returns how many hour marks were crossed.
    pub fn advance(&mut self, minutes: u32) -> u32 {
        let before = self.total_minutes();
        let after = before + u64::from(minutes);
        self.day = (after / u64::from(MINUTES_PER_DAY)) as u32;
        self.minute = (after % u64::from(MINUTES_PER_DAY)) as u32;
        (after / 60 - before / 60) as u32
    }

    fn total_minutes(&self) -> u64 {
        u64::from(self.day) * u64::from(MINUTES_PER_DAY) + u64::from(self.minute)
    }

    pub fn hour(&self) -> u32 {
        self.minute / 60
    }

    pub fn time_of_day(&self) -> &'static str {
        match self.hour() {
            5..=7 => "dawn",
            8..=11 => "morning",
            12..=16 => "afternoon",
            17..=20 => "evening",
            _ => "night",
        }
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Day {}, {:02}:{:02} ({})",
            self.day,
            self.hour(),
            self.minute % 60,
            self.time_of_day()
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Storm,
    Fog,
    Snow,
}

impl Weather {
    pub fn name(&self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
            Weather::Storm => "storm",
            Weather::Fog => "fog",
            Weather::Snow => "snow",
        }
    }

    fn weights(biome: Biome) -> [(Weather, u32); 6] {
        let cold = matches!(biome, Biome::Tundra | Biome::Mountain | Biome::SnowyPeaks);
        let dry = biome == Biome::Desert;
        [
            (Weather::Clear, if dry { 70 } else { 40 }),
            (Weather::Cloudy, 25),
            (Weather::Rain, if dry { 2 } else if cold { 5 } else { 15 }),
            (Weather::Storm, if dry { 3 } else { 5 }),
            (Weather::Fog, if dry { 0 } else { 10 }),
            (Weather::Snow, if cold { 20 } else { 0 }),
        ]
    }

    /// Weather after `hours` hours over a hex of `biome`.
    pub fn evolve(self, hours: u32, biome: Biome, rng: &mut impl Rng) -> Weather {
        let mut weather = self;
        for _ in 0..hours {
            if rng.gen_bool(WEATHER_CHANGE_CHANCE) {
                let table = Self::weights(biome);
                weather = crate::history::races::weighted_choice(rng, &table).unwrap_or(weather);
            }
        }
        weather
    }

    /// Extra fatigue per hour of travel.
    pub fn travel_strain(&self) -> u32 {
        match self {
            Weather::Storm | Weather::Snow => 2,
            Weather::Rain => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_clock_rolls_over() {
        let mut clock = GameClock::default();
        assert_eq!(clock.to_string(), "Day 1, 08:00 (morning)");
        assert_eq!(clock.advance(30), 0);
        assert_eq!(clock.advance(30), 1);
        assert_eq!(clock.advance(16 * 60), 16);
        assert_eq!(clock.day, 2);
        assert_eq!(clock.hour(), 1);
    }

    #[test]
    fn test_no_snow_in_desert() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut weather = Weather::Clear;
        for _ in 0..200 {
            weather = weather.evolve(5, Biome::Desert, &mut rng);
            assert_ne!(weather, Weather::Snow);
            assert_ne!(weather, Weather::Fog);
        }
    }
}
