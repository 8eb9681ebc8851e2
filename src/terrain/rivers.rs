//! River networks traced along high-accumulation drainage paths.

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};

use super::drainage::upstream_neighbors;

/// Shortest path kept as a river.
pub const MIN_RIVER_LENGTH: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverWidth {
    Stream,
    Creek,
    River,
    LargeRiver,
    MajorRiver,
}

impl RiverWidth {
    /// Width class from the peak flow along a river.
    pub fn from_flow(peak_flow: u32) -> Self {
        match peak_flow {
            0..=9 => RiverWidth::Stream,
            10..=19 => RiverWidth::Creek,
            20..=39 => RiverWidth::River,
            40..=79 => RiverWidth::LargeRiver,
            _ => RiverWidth::MajorRiver,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiverWidth::Stream => "stream",
            RiverWidth::Creek => "creek",
            RiverWidth::River => "river",
            RiverWidth::LargeRiver => "large river",
            RiverWidth::MajorRiver => "major river",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub id: usize,
    /// Source first, mouth last.
    pub path: Vec<Coord>,
    pub peak_flow: u32,
    pub width: RiverWidth,
}

impl River {
    pub fn source(&self) -> Coord {
        self.path[0]
    }

    pub fn mouth(&self) -> Coord {
        self.path[self.path.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Trace rivers from every source down the flow graph.
///
/// A cell can carry a river when its accumulation reaches `threshold`. Sources
/// are such cells with at most one upstream river cell, taken smallest flow
/// first; a source already covered by an earlier river is skipped so one
/// channel is not traced again from each of its cells.
pub fn identify_rivers(
    flow_dir: &Grid<Option<Coord>>,
    flow_acc: &Grid<u32>,
    threshold: u32,
    max_steps: usize,
) -> Vec<River> {
    let carries_river = |(x, y): Coord| *flow_acc.get(x, y) >= threshold;

    let mut sources: Vec<Coord> = flow_acc
        .coords()
        .filter(|&c| carries_river(c))
        .filter(|&(x, y)| {
            upstream_neighbors(flow_dir, x, y)
                .into_iter()
                .filter(|&n| carries_river(n))
                .count()
                <= 1
        })
        .collect();
    sources.sort_by_key(|&(x, y)| *flow_acc.get(x, y));

    let mut covered = Grid::new_with(flow_acc.width, flow_acc.height, false);
    let mut rivers = Vec::new();

    for source in sources {
        if *covered.get(source.0, source.1) {
            continue;
        }

        let mut path = vec![source];
        let mut current = source;
        for _ in 0..max_steps {
            let Some(next) = *flow_dir.get(current.0, current.1) else {
                break;
            };
            path.push(next);
            if !carries_river(next) {
                // Mouth: the first cell that no longer carries the river
                break;
            }
            current = next;
        }

        if path.len() < MIN_RIVER_LENGTH {
            continue;
        }

        for &(x, y) in &path {
            if carries_river((x, y)) {
                covered.set(x, y, true);
            }
        }

        let peak_flow = path.iter().map(|&(x, y)| *flow_acc.get(x, y)).max().unwrap_or(0);
        rivers.push(River {
            id: rivers.len(),
            path,
            peak_flow,
            width: RiverWidth::from_flow(peak_flow),
        });
    }

    tracing::debug!(rivers = rivers.len(), threshold, "rivers traced");
    rivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::drainage::{calculate_drainage_patterns, calculate_flow_accumulation};
    use crate::terrain::TerrainGenerator;

    /// A long slope falling towards x = 0.
    fn ramp(width: usize, height: usize) -> Grid<f32> {
        Grid::from_fn(width, height, |x, y| {
            let center = (height as f32 - 1.0) / 2.0;
            x as f32 * 0.05 + (y as f32 - center).abs() * 0.1
        })
    }

    #[test]
    fn test_width_steps() {
        assert_eq!(RiverWidth::from_flow(8), RiverWidth::Stream);
        assert_eq!(RiverWidth::from_flow(15), RiverWidth::Creek);
        assert_eq!(RiverWidth::from_flow(39), RiverWidth::River);
        assert_eq!(RiverWidth::from_flow(40), RiverWidth::LargeRiver);
        assert_eq!(RiverWidth::from_flow(500), RiverWidth::MajorRiver);
    }

    #[test]
    fn test_ramp_produces_single_valley_river() {
        let map = ramp(12, 5);
        let flow = calculate_drainage_patterns(&map);
        let acc = calculate_flow_accumulation(&map, &flow);
        let rivers = identify_rivers(&flow, &acc, 8, 50);

        assert_eq!(rivers.len(), 1);
        let river = &rivers[0];
        assert!(river.len() >= MIN_RIVER_LENGTH);
        assert!(river.path.iter().all(|&(_, y)| y == 2));
        assert_eq!(river.mouth(), (0, 2));
        assert_eq!(river.peak_flow, 60);
        assert_eq!(river.width, RiverWidth::LargeRiver);
    }

    #[test]
    fn test_step_cap_limits_length() {
        let map = ramp(40, 5);
        let flow = calculate_drainage_patterns(&map);
        let acc = calculate_flow_accumulation(&map, &flow);
        let rivers = identify_rivers(&flow, &acc, 8, 10);
        assert!(rivers.iter().all(|r| r.len() <= 11));
    }

    #[test]
    fn test_generated_rivers_terminate_properly() {
        let mut gen = TerrainGenerator::new(31337, 20, 20);
        let map = gen.generate_continental_heightmap(None);
        let flow = gen.calculate_drainage_patterns(&map);
        let acc = gen.calculate_flow_accumulation(&map, &flow);

        for river in gen.identify_rivers(&flow, &acc) {
            assert!(river.len() >= MIN_RIVER_LENGTH);
            for pair in river.path.windows(2) {
                assert_eq!(*flow.get(pair[0].0, pair[0].1), Some(pair[1]));
            }
            let (mx, my) = river.mouth();
            let ends_at_sink = flow.get(mx, my).is_none();
            let ends_below_threshold = *acc.get(mx, my) < 8;
            let hit_cap = river.len() == 51;
            assert!(ends_at_sink || ends_below_threshold || hit_cap);
        }
    }
}
