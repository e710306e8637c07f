//! Authoritative combat state representation.
//!
//! This module owns the data structures describing actors, grid occupancy,
//! and round bookkeeping. Runtime layers clone or query this state but
//! mutate it exclusively through the engine; prediction snapshots are plain
//! clones tagged with a version by the caller.
pub mod delta;
pub mod types;

#[cfg(feature = "serde")]
mod digest;

use bounded_vector::BoundedVec;
use thiserror::Error;

use crate::config::CombatConfig;
use crate::env::MapOracle;

pub use delta::{ActorChanges, ActorFields, RoundChanges, RoundFields, StateDelta};
#[cfg(feature = "serde")]
pub use digest::compute_state_digest;
pub use types::{
    ActiveEffect, ActiveEffects, ActorBuilder, ActorId, ActorState, AttackRange, CombatStats,
    Cooldown, EffectId, Facing, OwnerId, Position, ResourceMeter, Round, RoundStatus, ShieldPool,
    SkillId, TileMap, TileView, Turn, TurnStatus,
};

/// Raised when roster or occupancy bookkeeping is violated at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("actor {0} already registered")]
    DuplicateActor(ActorId),

    #[error("actor roster is full")]
    RosterFull,

    #[error("position {0} is already occupied")]
    PositionOccupied(Position),
}

/// Canonical snapshot of the deterministic combat state.
///
/// This is the single source of truth both sides reconcile against: the
/// authority mutates it through the engine, the client clones it before
/// predicted mutations and restores the clone on divergence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    /// RNG seed fixed at combat initialization and never modified.
    /// Combined with `nonce` to derive unique seeds per random event.
    pub game_seed: u64,

    /// Event sequence number; increments once per applied event and doubles
    /// as the logical timestamp on outbound notifications.
    pub nonce: u64,

    /// Every combatant, both sides interleaved, keyed by unique id.
    pub actors: BoundedVec<ActorState, 0, { CombatConfig::MAX_ACTORS }>,

    /// Dynamic tile occupancy layered over the static map.
    pub occupancy: TileMap,

    /// The round currently being played.
    pub round: Round,
}

impl CombatState {
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            nonce: 0,
            actors: BoundedVec::new(),
            occupancy: TileMap::new(),
            round: Round::new(1),
        }
    }

    /// Registers an actor and records its tile occupancy. Initial placement
    /// demands an empty cell, flying or not.
    pub fn add_actor(&mut self, actor: ActorState) -> Result<(), StateError> {
        if self.actor(actor.id).is_some() {
            return Err(StateError::DuplicateActor(actor.id));
        }
        if self.occupancy.is_occupied(&actor.position) {
            return Err(StateError::PositionOccupied(actor.position));
        }

        let id = actor.id;
        let position = actor.position;
        self.actors
            .push(actor)
            .map_err(|_| StateError::RosterFull)?;
        self.occupancy.add_occupant(position, id);
        Ok(())
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorState> {
        self.actors.iter_mut().find(|actor| actor.id == id)
    }

    pub fn living_actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.iter().filter(|actor| actor.is_alive())
    }

    /// Living actors hostile to `owner`.
    pub fn enemies_of(&self, owner: OwnerId) -> impl Iterator<Item = &ActorState> {
        self.living_actors().filter(move |actor| actor.owner != owner)
    }

    /// The turn currently eligible for input.
    pub fn active_turn(&self) -> Option<&Turn> {
        self.round.active_turn()
    }

    /// Actor owning the currently active turn slot.
    pub fn active_actor(&self) -> Option<ActorId> {
        self.active_turn().map(|turn| turn.actor)
    }

    /// Returns a merged tile view combining static map data with occupancy.
    pub fn tile_view<M>(&self, map: &M, position: Position) -> Option<TileView>
    where
        M: MapOracle + ?Sized,
    {
        TileView::build(map, &self.occupancy, position)
    }

    /// Whether a ground actor may stop on `position`.
    pub fn can_enter<M>(&self, map: &M, position: Position) -> bool
    where
        M: MapOracle + ?Sized,
    {
        self.tile_view(map, position)
            .map(|view| view.is_enterable())
            .unwrap_or(false)
    }

    /// Distinct sides present in the roster, in first-seen order.
    pub fn sides(&self) -> Vec<OwnerId> {
        let mut sides = Vec::new();
        for actor in self.actors.iter() {
            if !sides.contains(&actor.owner) {
                sides.push(actor.owner);
            }
        }
        sides
    }

    /// True when every actor fighting for `owner` is defeated.
    pub fn is_side_defeated(&self, owner: OwnerId) -> bool {
        self.actors
            .iter()
            .filter(|actor| actor.owner == owner)
            .all(|actor| !actor.is_alive())
    }

    /// Moves an actor's occupancy footprint; position field updates are the
    /// caller's responsibility. Returns false, leaving occupancy untouched,
    /// when the source entry was missing or the destination was full.
    pub fn relocate_occupant(&mut self, actor: ActorId, from: Position, to: Position) -> bool {
        if !self.occupancy.remove_occupant(&from, actor) {
            return false;
        }
        if !self.occupancy.add_occupant(to, actor) {
            self.occupancy.add_occupant(from, actor);
            return false;
        }
        true
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new(0)
    }
}
