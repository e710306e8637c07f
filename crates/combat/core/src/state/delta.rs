//! Bitmask-based change tracking between two combat states.
//!
//! Renderers and other collaborators receive a [`StateDelta`] after every
//! applied event instead of re-diffing whole snapshots. Deltas store only
//! metadata (which fields changed, for whom); actual values are read from
//! the before/after states the surrounding event carries.

use std::collections::BTreeSet;

use bitflags::bitflags;

use super::CombatState;
use super::types::{ActorId, ActorState, Position, Round};

bitflags! {
    /// Tracks which fields of an [`ActorState`] changed during an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActorFields: u8 {
        const POSITION     = 1 << 0;
        const RESOURCES    = 1 << 1;
        const COMBAT_STATS = 1 << 2;
        const EFFECTS      = 1 << 3;
        const COOLDOWNS    = 1 << 4;
        const SHIELD       = 1 << 5;
        const FACING       = 1 << 6;
        const MOVE_RANGE   = 1 << 7;
    }
}

bitflags! {
    /// Tracks which parts of the [`Round`] changed during an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RoundFields: u8 {
        const NUMBER = 1 << 0;
        const STATUS = 1 << 1;
        const TURNS  = 1 << 2;
    }
}

/// Metadata describing which fields of an actor changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorChanges {
    pub id: ActorId,
    pub fields: ActorFields,
}

impl ActorChanges {
    /// Compares two states of the same actor. `None` when nothing changed.
    fn from_states(before: &ActorState, after: &ActorState) -> Option<Self> {
        debug_assert_eq!(
            before.id, after.id,
            "cannot compare actors with different ids"
        );

        let mut fields = ActorFields::empty();

        if before.position != after.position {
            fields |= ActorFields::POSITION;
        }
        if (before.hp, before.mp, before.stamina) != (after.hp, after.mp, after.stamina) {
            fields |= ActorFields::RESOURCES;
        }
        if before.stats != after.stats {
            fields |= ActorFields::COMBAT_STATS;
        }
        if before.effects != after.effects {
            fields |= ActorFields::EFFECTS;
        }
        if before.cooldowns != after.cooldowns {
            fields |= ActorFields::COOLDOWNS;
        }
        if before.shield != after.shield {
            fields |= ActorFields::SHIELD;
        }
        if before.facing != after.facing {
            fields |= ActorFields::FACING;
        }
        if before.move_range != after.move_range {
            fields |= ActorFields::MOVE_RANGE;
        }

        if fields.is_empty() {
            None
        } else {
            Some(Self {
                id: after.id,
                fields,
            })
        }
    }
}

/// Metadata describing how the round bookkeeping changed.
///
/// Turn activations and completions are listed explicitly since renderers
/// key camera and portrait work off them and cannot reconstruct the
/// ordering from a bitmask alone.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundChanges {
    pub fields: RoundFields,
    /// Actors whose turn became actionable during this event.
    pub activated: Vec<ActorId>,
    /// Actors whose turn finished during this event.
    pub completed: Vec<ActorId>,
}

impl RoundChanges {
    fn from_states(before: &Round, after: &Round) -> Self {
        let mut fields = RoundFields::empty();

        if before.number != after.number {
            fields |= RoundFields::NUMBER;
        }
        if before.status != after.status {
            fields |= RoundFields::STATUS;
        }
        if before.turns != after.turns {
            fields |= RoundFields::TURNS;
        }

        let mut activated = Vec::new();
        let mut completed = Vec::new();
        for turn in after.turns.iter() {
            let previous = before.turn_of(turn.actor);
            let was_actionable = previous.is_some_and(|turn| turn.status.is_actionable());
            let was_done = previous.is_some_and(|turn| turn.status == super::TurnStatus::Done);

            if turn.status.is_actionable() && !was_actionable {
                activated.push(turn.actor);
            }
            if turn.status == super::TurnStatus::Done && !was_done {
                completed.push(turn.actor);
            }
        }

        Self {
            fields,
            activated,
            completed,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.activated.is_empty() && self.completed.is_empty()
    }
}

/// Minimal description of an applied event's impact on the combat state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDelta {
    /// Event sequence number after application; doubles as the logical
    /// timestamp collaborators order notifications by.
    pub nonce: u64,

    /// Per-actor field changes; untouched actors are absent.
    pub actors: Vec<ActorChanges>,

    /// Round and turn bookkeeping changes.
    pub round: RoundChanges,

    /// Tile positions where occupancy changed.
    pub occupancy: Vec<Position>,
}

impl StateDelta {
    /// Creates a delta by comparing two combat states field by field.
    pub fn from_states(before: &CombatState, after: &CombatState) -> Self {
        let actors = after
            .actors
            .iter()
            .filter_map(|actor| {
                before
                    .actor(actor.id)
                    .and_then(|previous| ActorChanges::from_states(previous, actor))
            })
            .collect();

        Self {
            nonce: after.nonce,
            actors,
            round: RoundChanges::from_states(&before.round, &after.round),
            occupancy: diff_occupancy(before, after),
        }
    }

    /// Returns true if the event changed nothing observable.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.round.is_empty() && self.occupancy.is_empty()
    }

    /// Changes recorded for one actor, if any.
    pub fn actor(&self, id: ActorId) -> Option<&ActorChanges> {
        self.actors.iter().find(|changes| changes.id == id)
    }
}

/// Positions whose occupant set differs between the two states.
fn diff_occupancy(before: &CombatState, after: &CombatState) -> Vec<Position> {
    let mut positions = BTreeSet::new();
    positions.extend(before.occupancy.occupancy().keys().copied());
    positions.extend(after.occupancy.occupancy().keys().copied());

    positions
        .into_iter()
        .filter(|position| {
            before.occupancy.occupant(position) != after.occupancy.occupant(position)
        })
        .collect()
}
