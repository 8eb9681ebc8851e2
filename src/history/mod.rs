//! World history: races, civilizations, historical figures and the
//! year-by-year event simulation that shapes them before play begins.

pub mod calendar;
pub mod civgen;
pub mod civilization;
pub mod eventgen;
pub mod events;
pub mod figures;
pub mod naming;
pub mod races;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate newtype ID wrappers with common derives and Display.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

define_id!(FigureId, "figure_");
define_id!(EventId, "event_");

/// Civilization identifier, written `civ_N` everywhere it is shown or saved.
///
/// Serialized as its display string so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CivId(pub u32);

impl fmt::Display for CivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "civ_{}", self.0)
    }
}

impl From<CivId> for String {
    fn from(id: CivId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CivId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("civ_")
            .and_then(|n| n.parse().ok())
            .map(CivId)
            .ok_or_else(|| format!("invalid civilization id '{value}'"))
    }
}

/// Monotonic ID source.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a specific value (used when continuing a loaded history).
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}
