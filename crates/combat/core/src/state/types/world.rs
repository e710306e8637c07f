use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::env::{MapOracle, Tile};

use super::{ActorId, Position};

type OccupantSlots = ArrayVec<ActorId, { CombatConfig::MAX_OCCUPANTS_PER_TILE }>;

/// Dynamic occupancy layered on top of the immutable map oracle.
///
/// Hex combat allows a single occupant per tile; the slot container still
/// carries the capacity explicitly so the invariant lives in one constant.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    occupancy: BTreeMap<Position, OccupantSlots>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, position: &Position) -> Option<ActorId> {
        self.occupancy
            .get(position)
            .and_then(|slots| slots.first().copied())
    }

    pub fn is_occupied(&self, position: &Position) -> bool {
        self.occupancy
            .get(position)
            .is_some_and(|slots| !slots.is_empty())
    }

    pub fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.occupancy
            .iter()
            .find(|(_, slots)| slots.contains(&actor))
            .map(|(position, _)| *position)
    }

    pub fn add_occupant(&mut self, position: Position, actor: ActorId) -> bool {
        let slots = self.occupancy.entry(position).or_default();
        if slots.contains(&actor) {
            return true;
        }
        slots.try_push(actor).is_ok()
    }

    pub fn remove_occupant(&mut self, position: &Position, actor: ActorId) -> bool {
        if let Some(slots) = self.occupancy.get_mut(position) {
            if let Some(index) = slots.iter().position(|occupant| *occupant == actor) {
                slots.swap_remove(index);
                if slots.is_empty() {
                    self.occupancy.remove(position);
                }
                return true;
            }
        }
        false
    }

    pub fn occupancy(&self) -> &BTreeMap<Position, OccupantSlots> {
        &self.occupancy
    }
}

/// Merged view of one cell: static terrain plus the live occupant.
pub struct TileView {
    position: Position,
    tile: Tile,
    occupant: Option<ActorId>,
}

impl TileView {
    /// Combines the static tile at `position` with dynamic occupancy.
    /// `None` when the position lies outside the map.
    pub fn build<M>(map: &M, occupancy: &TileMap, position: Position) -> Option<Self>
    where
        M: MapOracle + ?Sized,
    {
        let tile = map.tile(position)?;
        Some(Self {
            position,
            tile,
            occupant: occupancy.occupant(&position),
        })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }

    pub fn occupant(&self) -> Option<ActorId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Terrain admits ground movement; occupancy is a separate question.
    pub fn is_walkable(&self) -> bool {
        self.tile.is_walkable()
    }

    /// True when a ground actor may stop here.
    pub fn is_enterable(&self) -> bool {
        self.is_walkable() && !self.is_occupied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_occupant_per_tile() {
        let mut tiles = TileMap::new();
        let cell = Position::new(1, 1);

        assert!(tiles.add_occupant(cell, ActorId(1)));
        // Re-adding the same actor is a no-op success.
        assert!(tiles.add_occupant(cell, ActorId(1)));
        // A second actor does not fit.
        assert!(!tiles.add_occupant(cell, ActorId(2)));

        assert_eq!(tiles.occupant(&cell), Some(ActorId(1)));
        assert_eq!(tiles.position_of(ActorId(1)), Some(cell));
    }

    #[test]
    fn removal_clears_the_cell() {
        let mut tiles = TileMap::new();
        let cell = Position::new(0, 2);
        tiles.add_occupant(cell, ActorId(3));

        assert!(tiles.remove_occupant(&cell, ActorId(3)));
        assert!(!tiles.is_occupied(&cell));
        assert!(!tiles.remove_occupant(&cell, ActorId(3)));
    }
}
