//! Bounded 2D grid of world hexes.
//!
//! Unlike a planetary tilemap the world map does not wrap: cells on the map
//! edge simply have fewer neighbors.

/// A hex coordinate `(x, y)`.
pub type Coord = (usize, usize);

/// Neighbor offsets (dx, dy) in a fixed order: N, NE, E, SE, S, SW, W, NW.
///
/// Anything that breaks ties by "first neighbor found" relies on this order
/// staying put, since it makes generation reproducible per seed.
pub const DIR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// A dense row-major grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid by evaluating `f` at every coordinate, row by row.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Wrap row-major cells; `None` if the count does not match the size.
    pub fn from_cells(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == width * height).then_some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.in_bounds(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        y * self.width + x
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Orthogonal neighbors (up to 4).
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<Coord> {
        self.offset_neighbors(x, y, DIR_OFFSETS.iter().step_by(2))
    }

    /// All 8 surrounding cells that lie inside the grid, in `DIR_OFFSETS` order.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<Coord> {
        self.offset_neighbors(x, y, DIR_OFFSETS.iter())
    }

    fn offset_neighbors<'a>(
        &self,
        x: usize,
        y: usize,
        offsets: impl Iterator<Item = &'a (i32, i32)>,
    ) -> Vec<Coord> {
        let mut result = Vec::with_capacity(8);
        for &(dx, dy) in offsets {
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                result.push((nx as usize, ny as usize));
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width;
        (0..self.data.len()).map(move |idx| (idx % width, idx / width))
    }

    /// Map every cell into a new grid of the same shape.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

/// Euclidean distance between two coordinates.
pub fn distance(a: Coord, b: Coord) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Whether two distinct coordinates touch (8-connectivity).
pub fn is_adjacent(a: Coord, b: Coord) -> bool {
    a != b && a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

/// Zero-padded coordinate key used in save files and the location cache ("0507").
pub fn hex_key(x: usize, y: usize) -> String {
    format!("{:02}{:02}", x, y)
}

/// Inverse of [`hex_key`] for keys produced from a grid of at most 100x100.
pub fn parse_hex_key(key: &str) -> Option<Coord> {
    if key.len() != 4 || !key.is_ascii() {
        return None;
    }
    let x = key[..2].parse().ok()?;
    let y = key[2..].parse().ok()?;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_respect_edges() {
        let grid: Grid<u8> = Grid::new(5, 4);
        assert_eq!(grid.neighbors_8(0, 0).len(), 3);
        assert_eq!(grid.neighbors_8(2, 2).len(), 8);
        assert_eq!(grid.neighbors_8(4, 3).len(), 3);
        assert_eq!(grid.neighbors(0, 0), vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_single_cell_grid_has_no_neighbors() {
        let grid: Grid<f32> = Grid::new(1, 1);
        assert!(grid.neighbors_8(0, 0).is_empty());
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let grid = Grid::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(*grid.get(2, 1), 12);
        let collected: Vec<_> = grid.iter().map(|(_, _, v)| *v).collect();
        assert_eq!(collected, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_hex_key_round_trip() {
        assert_eq!(hex_key(5, 7), "0507");
        assert_eq!(parse_hex_key("0507"), Some((5, 7)));
        assert_eq!(parse_hex_key("57"), None);
    }

    #[test]
    fn test_adjacency() {
        assert!(is_adjacent((1, 1), (2, 2)));
        assert!(!is_adjacent((1, 1), (1, 1)));
        assert!(!is_adjacent((1, 1), (3, 1)));
    }
}
