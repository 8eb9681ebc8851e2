//! Voronoi tectonic plates for the continental heightmap.

use std::collections::VecDeque;

use noise::NoiseFn;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::grid::{distance, Coord, Grid};

use super::SEA_LEVEL;

/// Cells within this many steps of a plate boundary get uplift or subsidence.
const BOUNDARY_REACH: usize = 2;
/// Attempts per plate centre before settling for the best spread found.
const PLACEMENT_ATTEMPTS: usize = 100;

const SHELF_SLOPE: f32 = 0.02;
const SHELF_MAX_DROP: f32 = 0.12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PlateId(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlateType {
    /// Sits low; its interior is always open water.
    Oceanic,
    /// Sits high; its interior is always land.
    Continental,
}

#[derive(Clone, Debug)]
pub struct Plate {
    pub id: PlateId,
    pub plate_type: PlateType,
    pub center: Coord,
    pub base_elevation: f32,
}

impl Plate {
    pub fn new_with_type(id: PlateId, center: Coord, rng: &mut ChaCha8Rng, is_continental: bool) -> Self {
        let (plate_type, base_elevation) = if is_continental {
            (PlateType::Continental, rng.gen_range(0.5..0.7))
        } else {
            (PlateType::Oceanic, rng.gen_range(0.02..0.12))
        };
        Self {
            id,
            plate_type,
            center,
            base_elevation,
        }
    }
}

/// Place plate centres and assign every cell to its nearest centre.
///
/// Plate 0 is continental and plate 1 oceanic; the rest are continental
/// 40% of the time.
pub fn generate_plates(
    width: usize,
    height: usize,
    num_plates: Option<usize>,
    rng: &mut ChaCha8Rng,
) -> (Grid<PlateId>, Vec<Plate>) {
    let cells = width * height;
    let count = num_plates
        .unwrap_or_else(|| rng.gen_range(3..=6))
        .clamp(1, cells.clamp(1, 255));

    let min_separation = (width.min(height) as f64 / 3.0).max(1.0);
    let mut centers: Vec<Coord> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut best: Option<(Coord, f64)> = None;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let candidate = (rng.gen_range(0..width), rng.gen_range(0..height));
            let spread = centers
                .iter()
                .map(|&c| distance(c, candidate))
                .fold(f64::INFINITY, f64::min);
            if best.map_or(true, |(_, s)| spread > s) {
                best = Some((candidate, spread));
            }
            if spread >= min_separation {
                break;
            }
        }
        if let Some((center, _)) = best {
            centers.push(center);
        }
    }

    let plates: Vec<Plate> = centers
        .iter()
        .enumerate()
        .map(|(i, &center)| {
            let continental = match i {
                0 => true,
                1 => false,
                _ => rng.gen_bool(0.4),
            };
            Plate::new_with_type(PlateId(i as u8), center, rng, continental)
        })
        .collect();

    let plate_map = Grid::from_fn(width, height, |x, y| nearest_plate(&plates, (x, y)));

    (plate_map, plates)
}

fn nearest_plate(plates: &[Plate], cell: Coord) -> PlateId {
    let mut best = PlateId(0);
    let mut best_dist = f64::INFINITY;
    for plate in plates {
        let d = distance(plate.center, cell);
        if d < best_dist {
            best_dist = d;
            best = plate.id;
        }
    }
    best
}

/// Cells with at least one 8-neighbour on another plate.
pub fn find_boundaries(plate_map: &Grid<PlateId>) -> Grid<bool> {
    Grid::from_fn(plate_map.width, plate_map.height, |x, y| {
        let own = *plate_map.get(x, y);
        plate_map
            .neighbors_8(x, y)
            .into_iter()
            .any(|(nx, ny)| *plate_map.get(nx, ny) != own)
    })
}

/// Steps from each cell to the nearest boundary cell, by multi-source BFS.
/// `None` everywhere when there is only one plate.
pub fn boundary_distance(plate_map: &Grid<PlateId>) -> Grid<Option<usize>> {
    let boundaries = find_boundaries(plate_map);
    let mut dist: Grid<Option<usize>> = Grid::new(plate_map.width, plate_map.height);
    let mut queue = VecDeque::new();

    for (x, y, &is_boundary) in boundaries.iter() {
        if is_boundary {
            dist.set(x, y, Some(0));
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let next = dist.get(x, y).map_or(0, |d| d + 1);
        for (nx, ny) in dist.neighbors_8(x, y) {
            if dist.get(nx, ny).is_none() {
                dist.set(nx, ny, Some(next));
                queue.push_back((nx, ny));
            }
        }
    }

    dist
}

/// Sample a noise layer at a cell centre. Offsetting by half a cell keeps
/// integer coordinates off the lattice, where Perlin noise is always zero.
pub fn sample_layer(noise: &impl NoiseFn<f64, 2>, x: usize, y: usize, frequency: f64) -> f64 {
    noise.get([(x as f64 + 0.5) * frequency, (y as f64 + 0.5) * frequency])
}

/// Elevation change near a plate boundary: a mountain ridge where the
/// low-frequency detail sample is non-negative, a trench otherwise.
pub fn boundary_relief(detail: &impl NoiseFn<f64, 2>, x: usize, y: usize, boundary_dist: usize) -> f32 {
    if boundary_dist >= BOUNDARY_REACH {
        return 0.0;
    }
    let falloff = 1.0 - boundary_dist as f32 / BOUNDARY_REACH as f32;
    let s = sample_layer(detail, x, y, 0.15) as f32;
    if s >= 0.0 {
        (0.2 + 0.2 * s) * falloff
    } else {
        -(0.1 + 0.1 * -s) * falloff
    }
}

/// Coastline cells: near sea level with a sharp step to some neighbour.
pub fn find_coastline(heightmap: &Grid<f32>) -> Vec<Coord> {
    heightmap
        .iter()
        .filter(|(x, y, &e)| {
            (0.25..=0.35).contains(&e)
                && heightmap
                    .neighbors_8(*x, *y)
                    .into_iter()
                    .any(|(nx, ny)| (heightmap.get(nx, ny) - e).abs() >= 0.2)
        })
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Deepen ocean cells with distance from the coastline so the sea floor
/// slopes away from land.
pub fn apply_continental_shelf(heightmap: &mut Grid<f32>) {
    let coast = find_coastline(heightmap);
    if coast.is_empty() {
        return;
    }

    for (x, y, e) in heightmap.iter_mut() {
        if *e >= SEA_LEVEL || coast.contains(&(x, y)) {
            continue;
        }
        let d = coast
            .iter()
            .map(|&c| distance(c, (x, y)))
            .fold(f64::INFINITY, f64::min) as f32;
        let drop = (d * SHELF_SLOPE).min(SHELF_MAX_DROP);
        *e = (*e - drop).max(0.0);
    }
}
