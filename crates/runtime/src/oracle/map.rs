//! In-memory map oracle.

use std::collections::HashMap;

use combat_core::{MapDimensions, MapOracle, Position, Terrain, Tile};

/// Map backed by a tile table.
///
/// Positions inside the bounds that have no explicit entry read as open
/// field, so sparse layouts only list their obstacles.
#[derive(Clone, Debug)]
pub struct StaticMap {
    dimensions: MapDimensions,
    tiles: HashMap<Position, Tile>,
    mirrored: bool,
}

impl StaticMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: MapDimensions { width, height },
            tiles: HashMap::new(),
            mirrored: false,
        }
    }

    /// Fully open field of the given size.
    pub fn open_field(width: u32, height: u32) -> Self {
        Self::new(width, height)
    }

    pub fn with_tile(mut self, position: Position, tile: Tile) -> Self {
        self.tiles.insert(position, tile);
        self
    }

    pub fn with_obstacle(self, position: Position) -> Self {
        self.with_tile(position, Tile::new(Terrain::Obstacle))
    }

    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }
}

impl MapOracle for StaticMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<Tile> {
        if !self.dimensions.contains(position) {
            return None;
        }
        Some(
            self.tiles
                .get(&position)
                .copied()
                .unwrap_or(Tile::new(Terrain::Field)),
        )
    }

    fn mirrored(&self) -> bool {
        self.mirrored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_tiles_inside_the_bounds_are_open_field() {
        let map = StaticMap::new(4, 4).with_obstacle(Position::new(1, 1));

        assert_eq!(
            map.tile(Position::new(0, 0)),
            Some(Tile::new(Terrain::Field))
        );
        assert_eq!(
            map.tile(Position::new(1, 1)),
            Some(Tile::new(Terrain::Obstacle))
        );
        assert_eq!(map.tile(Position::new(4, 0)), None);
        assert_eq!(map.tile(Position::new(-1, 0)), None);
    }
}
