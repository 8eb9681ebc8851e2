//! Lakes filling inland drainage sinks.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::grid::{distance, Coord, Grid};

use super::SEA_LEVEL;

pub const LAKE_MIN_ELEVATION: f32 = 0.15;
pub const LAKE_MAX_ELEVATION: f32 = 0.9;
pub const LAKE_MIN_FLOW: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LakeSize {
    Pond,
    Small,
    Lake,
    Large,
}

impl LakeSize {
    pub fn from_flow(flow: u32) -> Self {
        match flow {
            0..=5 => LakeSize::Pond,
            6..=11 => LakeSize::Small,
            12..=24 => LakeSize::Lake,
            _ => LakeSize::Large,
        }
    }

    pub fn max_radius(&self) -> f64 {
        match self {
            LakeSize::Pond => 1.0,
            LakeSize::Small => 2.0,
            LakeSize::Lake => 3.0,
            LakeSize::Large => 4.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LakeSize::Pond => "pond",
            LakeSize::Small => "small lake",
            LakeSize::Lake => "lake",
            LakeSize::Large => "large lake",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lake {
    pub id: usize,
    /// The sink the lake fills.
    pub center: Coord,
    pub cells: Vec<Coord>,
    pub size: LakeSize,
    pub max_radius: f64,
    pub elevation: f32,
}

/// Turn suitable sinks into lakes.
///
/// A sink qualifies when it is on land, within the elevation band and
/// receives at least [`LAKE_MIN_FLOW`] cells of drainage. Its extent is a
/// flood-fill over land neighbours within `tolerance` of the sink elevation
/// and the size class radius. Lakes never share cells.
pub fn identify_lakes(
    heightmap: &Grid<f32>,
    flow_dir: &Grid<Option<Coord>>,
    flow_acc: &Grid<u32>,
    tolerance: f32,
) -> Vec<Lake> {
    let mut claimed: HashSet<Coord> = HashSet::new();
    let mut lakes = Vec::new();

    for (x, y, dir) in flow_dir.iter() {
        if dir.is_some() || claimed.contains(&(x, y)) {
            continue;
        }

        let elevation = *heightmap.get(x, y);
        let flow = *flow_acc.get(x, y);
        if !(LAKE_MIN_ELEVATION..=LAKE_MAX_ELEVATION).contains(&elevation)
            || elevation < SEA_LEVEL
            || flow < LAKE_MIN_FLOW
        {
            continue;
        }

        let size = LakeSize::from_flow(flow);
        let radius = size.max_radius();
        let center = (x, y);

        let mut cells = vec![center];
        claimed.insert(center);
        let mut queue = VecDeque::from([center]);

        while let Some((cx, cy)) = queue.pop_front() {
            for n in heightmap.neighbors_8(cx, cy) {
                if claimed.contains(&n) {
                    continue;
                }
                let e = *heightmap.get(n.0, n.1);
                if e >= SEA_LEVEL && (e - elevation).abs() <= tolerance && distance(center, n) <= radius {
                    claimed.insert(n);
                    cells.push(n);
                    queue.push_back(n);
                }
            }
        }

        lakes.push(Lake {
            id: lakes.len(),
            center,
            cells,
            size,
            max_radius: radius,
            elevation,
        });
    }

    tracing::debug!(lakes = lakes.len(), "lakes identified");
    lakes
}
