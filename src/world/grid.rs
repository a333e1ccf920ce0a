//! MapGrid - bounds-checked owner of a map's tiles
//!
//! Tiles are stored row-major. Every coordinate coming from outside is
//! checked; a `TilePos` is proof that a coordinate is inside a grid with a
//! given map id and size, so writes through it cannot fail once
//! `MapGrid::owns` has accepted it.

use super::tile::Tile;

/// Error type for grid access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds {
        map_id: u32,
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::OutOfBounds { map_id, x, y, width, height } => write!(
                f,
                "tile ({}, {}) is outside map {} ({}x{})",
                x, y, map_id, width, height
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// A validated tile address inside one map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePos {
    map_id: u32,
    x: usize,
    y: usize,
    /// Size of the grid that issued the address
    width: usize,
    height: usize,
}

impl TilePos {
    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }
}

/// Rectangle of tiles, already clipped to a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Iterate coordinates column by column
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x0, y0, w, h) = (self.x, self.y, self.width, self.height);
        (x0..x0 + w).flat_map(move |x| (y0..y0 + h).map(move |y| (x, y)))
    }
}

/// Tile storage for one loaded map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGrid {
    map_id: u32,
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl MapGrid {
    /// Create a grid of empty tiles
    pub fn new(map_id: u32, width: usize, height: usize) -> Self {
        Self {
            map_id,
            width,
            height,
            tiles: vec![Tile::default(); width * height],
        }
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a signed coordinate lies inside the grid
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Validate a coordinate, producing an address usable by commands
    pub fn target(&self, x: i64, y: i64) -> Result<TilePos, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds {
                map_id: self.map_id,
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(TilePos {
            map_id: self.map_id,
            x: x as usize,
            y: y as usize,
            width: self.width,
            height: self.height,
        })
    }

    /// True if `pos` was issued by a grid with this map id and size
    pub fn owns(&self, pos: TilePos) -> bool {
        pos.map_id == self.map_id && pos.width == self.width && pos.height == self.height
    }

    /// Read a tile by coordinate
    pub fn tile(&self, x: i64, y: i64) -> Result<&Tile, GridError> {
        let pos = self.target(x, y)?;
        Ok(self.tile_at(pos))
    }

    /// Read a tile through a validated address
    pub fn tile_at(&self, pos: TilePos) -> &Tile {
        debug_assert!(self.owns(pos));
        &self.tiles[self.index(pos)]
    }

    pub(crate) fn tile_at_mut(&mut self, pos: TilePos) -> &mut Tile {
        debug_assert!(self.owns(pos));
        let idx = self.index(pos);
        &mut self.tiles[idx]
    }

    fn index(&self, pos: TilePos) -> usize {
        pos.y * self.width + pos.x
    }

    /// Intersect a signed rectangle with the grid bounds
    ///
    /// Returns `None` when nothing of the rectangle is inside the grid.
    pub fn clip(&self, x: i64, y: i64, width: usize, height: usize) -> Option<Region> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width as i64).min(self.width as i64);
        let y1 = y.saturating_add(height as i64).min(self.height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region {
            x: x0 as usize,
            y: y0 as usize,
            width: (x1 - x0) as usize,
            height: (y1 - y0) as usize,
        })
    }

    /// Iterate all tiles with their coordinates (row-major)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i % width, i / width, tile))
    }

    /// Count tiles matching a predicate
    pub fn count_where<F: Fn(&Tile) -> bool>(&self, pred: F) -> usize {
        self.tiles.iter().filter(|t| pred(t)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bounds() {
        let grid = MapGrid::new(1, 10, 5);
        assert!(grid.target(0, 0).is_ok());
        assert!(grid.target(9, 4).is_ok());
        assert!(grid.target(10, 0).is_err());
        assert!(grid.target(0, 5).is_err());
        assert!(grid.target(-1, 2).is_err());

        let err = grid.target(12, 3).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds { map_id: 1, x: 12, y: 3, width: 10, height: 5 }
        );
    }

    #[test]
    fn test_row_major_addressing() {
        let mut grid = MapGrid::new(1, 4, 3);
        let pos = grid.target(3, 1).unwrap();
        grid.tile_at_mut(pos).set_npc(9);

        assert_eq!(grid.tile(3, 1).unwrap().npc(), 9);
        assert_eq!(grid.count_where(|t| t.npc() != 0), 1);
        let found: Vec<_> = grid.iter().filter(|(_, _, t)| t.npc() == 9).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(found, vec![(3, 1)]);
    }

    #[test]
    fn test_clip() {
        let grid = MapGrid::new(1, 10, 10);

        assert_eq!(
            grid.clip(2, 3, 4, 4),
            Some(Region { x: 2, y: 3, width: 4, height: 4 })
        );
        assert_eq!(
            grid.clip(-2, 8, 5, 5),
            Some(Region { x: 0, y: 8, width: 3, height: 2 })
        );
        assert_eq!(grid.clip(10, 0, 3, 3), None);
        assert_eq!(grid.clip(-5, -5, 5, 5), None);
        assert_eq!(grid.clip(0, 0, 0, 4), None);
    }

    #[test]
    fn test_clip_extreme_origin() {
        let grid = MapGrid::new(1, 10, 10);
        assert_eq!(grid.clip(i64::MAX - 1, 0, 5, 5), None);
        assert_eq!(grid.clip(0, i64::MAX, 5, 5), None);
        assert_eq!(grid.clip(i64::MIN, 0, 5, 5), None);
    }

    #[test]
    fn test_owns_checks_id_and_size() {
        let grid = MapGrid::new(1, 4, 4);
        let pos = grid.target(2, 2).unwrap();
        assert!(grid.owns(pos));

        let larger = MapGrid::new(1, 100, 100);
        assert!(!grid.owns(larger.target(2, 2).unwrap()));
        assert!(!grid.owns(MapGrid::new(2, 4, 4).target(2, 2).unwrap()));
        assert!(MapGrid::new(1, 4, 4).owns(pos));
    }

    #[test]
    fn test_region_coords() {
        let region = Region { x: 1, y: 1, width: 2, height: 2 };
        let coords: Vec<_> = region.coords().collect();
        assert_eq!(coords, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
    }
}
