use crate::state::Position;

/// Static map oracle exposing the immutable hex layout.
///
/// Occupancy is dynamic state and deliberately absent here; traversal
/// queries combine this oracle with the live
/// [`TileMap`](crate::state::TileMap) to decide where an actor may stand.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;
    fn tile(&self, position: Position) -> Option<Tile>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// True for maps authored right-to-left. Direction-sensitive consumers
    /// such as the AI's step preference mirror their horizontal choices.
    fn mirrored(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

/// Immutable descriptor for one cell of the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    terrain: Terrain,
}

impl Tile {
    pub const fn new(terrain: Terrain) -> Self {
        Self { terrain }
    }

    pub fn terrain(self) -> Terrain {
        self.terrain
    }

    pub fn is_walkable(self) -> bool {
        self.terrain.is_walkable()
    }
}

/// Canonical terrain classes for static map tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Terrain {
    /// Open ground; the only terrain ground units traverse.
    Field,
    /// Blocks ground movement, flown over by flying units.
    Obstacle,
    /// Not part of the playable board at all.
    Unavailable,
}

impl Terrain {
    pub fn is_walkable(self) -> bool {
        matches!(self, Terrain::Field)
    }
}
