//! D8 drainage: flow directions, flow accumulation, and watersheds.
//!
//! Water leaves every cell towards its lowest strictly lower 8-neighbour.
//! Because each step strictly lowers elevation, following directions can
//! never revisit a cell and every path ends in a sink.

use std::cmp::Ordering;

use crate::grid::{Coord, Grid};

/// Downhill neighbour of every cell; `None` marks a sink.
pub fn calculate_drainage_patterns(heightmap: &Grid<f32>) -> Grid<Option<Coord>> {
    Grid::from_fn(heightmap.width, heightmap.height, |x, y| {
        let mut lowest = *heightmap.get(x, y);
        let mut target = None;
        // Neighbours come in DIR_OFFSETS order, so ties go to the first direction
        for (nx, ny) in heightmap.neighbors_8(x, y) {
            let e = *heightmap.get(nx, ny);
            if e < lowest {
                lowest = e;
                target = Some((nx, ny));
            }
        }
        target
    })
}

/// Number of cells draining through each cell, counting the cell itself.
pub fn calculate_flow_accumulation(heightmap: &Grid<f32>, flow_dir: &Grid<Option<Coord>>) -> Grid<u32> {
    let mut accumulation = Grid::new_with(heightmap.width, heightmap.height, 1u32);

    // Highest first: a cell's total is final before it is passed downstream
    let mut cells: Vec<Coord> = heightmap.coords().collect();
    cells.sort_by(|a, b| {
        heightmap
            .get(b.0, b.1)
            .partial_cmp(heightmap.get(a.0, a.1))
            .unwrap_or(Ordering::Equal)
    });

    for (x, y) in cells {
        if let Some((nx, ny)) = *flow_dir.get(x, y) {
            let upstream = *accumulation.get(x, y);
            *accumulation.get_mut(nx, ny) += upstream;
        }
    }

    accumulation
}

/// Neighbours whose flow direction points at `(x, y)`.
pub fn upstream_neighbors(flow_dir: &Grid<Option<Coord>>, x: usize, y: usize) -> Vec<Coord> {
    flow_dir
        .neighbors_8(x, y)
        .into_iter()
        .filter(|&(nx, ny)| *flow_dir.get(nx, ny) == Some((x, y)))
        .collect()
}

/// Follow flow directions from `start` to its sink. Includes both ends.
pub fn flow_path(flow_dir: &Grid<Option<Coord>>, start: Coord) -> Vec<Coord> {
    let mut path = vec![start];
    let mut current = start;
    while let Some(next) = *flow_dir.get(current.0, current.1) {
        if path.len() > flow_dir.len() {
            tracing::warn!(?start, "flow path exceeded grid size, cutting it short");
            break;
        }
        path.push(next);
        current = next;
    }
    path
}

/// Drainage basins: each cell labelled with the basin of the sink it reaches.
#[derive(Clone, Debug)]
pub struct Watersheds {
    pub labels: Grid<usize>,
    /// Sink of each basin, indexed by label.
    pub sinks: Vec<Coord>,
}

impl Watersheds {
    pub fn count(&self) -> usize {
        self.sinks.len()
    }

    pub fn label(&self, x: usize, y: usize) -> usize {
        *self.labels.get(x, y)
    }

    pub fn cells_in(&self, label: usize) -> impl Iterator<Item = Coord> + '_ {
        self.labels
            .iter()
            .filter(move |(_, _, &l)| l == label)
            .map(|(x, y, _)| (x, y))
    }
}

/// Label every cell with the sink its flow path reaches.
///
/// Each walk stops at the first already-labelled cell and back-fills the
/// label along the path it took, so every cell is visited once.
pub fn identify_watersheds(flow_dir: &Grid<Option<Coord>>) -> Watersheds {
    let mut labels: Grid<Option<usize>> = Grid::new(flow_dir.width, flow_dir.height);
    let mut sinks = Vec::new();
    let mut path = Vec::new();

    for start in flow_dir.coords() {
        if labels.get(start.0, start.1).is_some() {
            continue;
        }

        path.clear();
        let mut current = start;
        let label = loop {
            if let Some(label) = *labels.get(current.0, current.1) {
                break label;
            }
            path.push(current);
            match *flow_dir.get(current.0, current.1) {
                Some(next) if path.len() <= flow_dir.len() => current = next,
                _ => {
                    sinks.push(current);
                    break sinks.len() - 1;
                }
            }
        };

        for &(x, y) in &path {
            labels.set(x, y, Some(label));
        }
    }

    Watersheds {
        labels: labels.map(|l| l.unwrap_or(0)),
        sinks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainGenerator;

    fn bowl(size: usize) -> Grid<f32> {
        let c = (size as f32 - 1.0) / 2.0;
        Grid::from_fn(size, size, |x, y| {
            let dx = x as f32 - c;
            let dy = y as f32 - c;
            (dx * dx + dy * dy).sqrt() / size as f32
        })
    }

    #[test]
    fn test_bowl_drains_to_center() {
        let map = bowl(5);
        let flow = calculate_drainage_patterns(&map);
        assert_eq!(*flow.get(2, 2), None);
        assert_eq!(*flow.get(0, 0), Some((1, 1)));
        assert_eq!(*flow.get(2, 0), Some((2, 1)));

        let acc = calculate_flow_accumulation(&map, &flow);
        assert_eq!(*acc.get(2, 2), 25);
        assert_eq!(*acc.get(0, 0), 1);

        let sheds = identify_watersheds(&flow);
        assert_eq!(sheds.count(), 1);
        assert_eq!(sheds.sinks[0], (2, 2));
    }

    #[test]
    fn test_flat_map_is_all_sinks() {
        let map = Grid::new_with(3, 3, 0.5f32);
        let flow = calculate_drainage_patterns(&map);
        assert!(flow.iter().all(|(_, _, d)| d.is_none()));
        assert_eq!(identify_watersheds(&flow).count(), 9);
    }

    #[test]
    fn test_ties_follow_direction_order() {
        // N and E neighbours equally low; N comes first
        let map = Grid::from_fn(3, 3, |x, y| match (x, y) {
            (1, 0) | (2, 1) => 0.1,
            _ => 0.9,
        });
        let flow = calculate_drainage_patterns(&map);
        assert_eq!(*flow.get(1, 1), Some((1, 0)));
    }

    #[test]
    fn test_generated_world_drainage_properties() {
        let mut gen = TerrainGenerator::new(2024, 20, 20);
        let map = gen.generate_continental_heightmap(None);
        let flow = calculate_drainage_patterns(&map);

        // Acyclic: every path reaches a sink within width*height steps,
        // strictly descending all the way
        for start in map.coords() {
            let path = flow_path(&flow, start);
            assert!(path.len() <= map.len());
            assert!(flow.get(path[path.len() - 1].0, path[path.len() - 1].1).is_none());
            for pair in path.windows(2) {
                assert!(map.get(pair[1].0, pair[1].1) < map.get(pair[0].0, pair[0].1));
            }
        }

        // Accumulation equals the number of cells whose path passes through
        let acc = calculate_flow_accumulation(&map, &flow);
        let mut expected = Grid::new_with(20, 20, 0u32);
        for start in map.coords() {
            for (x, y) in flow_path(&flow, start) {
                *expected.get_mut(x, y) += 1;
            }
        }
        assert_eq!(acc, expected);

        // Same label exactly when the paths end in the same sink
        let sheds = identify_watersheds(&flow);
        for a in map.coords() {
            let sink = *flow_path(&flow, a).last().unwrap();
            assert_eq!(sheds.sinks[sheds.label(a.0, a.1)], sink);
        }
        let total: usize = (0..sheds.count()).map(|l| sheds.cells_in(l).count()).sum();
        assert_eq!(total, 400);
    }

    #[test]
    fn test_upstream_neighbors() {
        let map = bowl(3);
        let flow = calculate_drainage_patterns(&map);
        assert_eq!(upstream_neighbors(&flow, 1, 1).len(), 8);
        assert!(upstream_neighbors(&flow, 0, 0).is_empty());
    }
}
