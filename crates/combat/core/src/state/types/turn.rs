use arrayvec::ArrayVec;

use crate::config::CombatConfig;

use super::{ActorId, ActorState, SkillId};

/// Lifecycle of a single actor's turn. Transitions are strictly forward:
/// `Pending -> Active -> Acting -> Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TurnStatus {
    #[default]
    Pending,
    Active,
    /// Mid-resolution; still eligible for follow-up input such as the
    /// post-attack step.
    Acting,
    Done,
}

impl TurnStatus {
    /// States in which the owning actor may submit actions.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Active | Self::Acting)
    }
}

/// One actor's slot within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Turn {
    pub actor: ActorId,
    pub status: TurnStatus,
    pub selected_skill: Option<SkillId>,
    /// Set once the actor has attacked or cast; movement afterwards is
    /// limited to the post-attack range.
    pub acted: bool,
    /// Set when the movement budget for the current turn half is spent.
    /// Attacking clears it again so the post-attack step stays available.
    pub moved: bool,
}

impl Turn {
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            status: TurnStatus::Pending,
            selected_skill: None,
            acted: false,
            moved: false,
        }
    }

    pub fn activate(&mut self) {
        debug_assert_eq!(self.status, TurnStatus::Pending);
        self.status = TurnStatus::Active;
    }

    pub fn begin_acting(&mut self) {
        debug_assert_eq!(self.status, TurnStatus::Active);
        self.status = TurnStatus::Acting;
    }

    pub fn finish(&mut self) {
        self.status = TurnStatus::Done;
    }
}

/// Lifecycle of a whole round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
}

/// Ordered turn list for one round of combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round {
    pub number: u32,
    pub status: RoundStatus,
    pub turns: ArrayVec<Turn, { CombatConfig::MAX_ACTORS }>,
}

impl Round {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            status: RoundStatus::Pending,
            turns: ArrayVec::new(),
        }
    }

    /// Builds the turn list for round `number` from the living roster:
    /// fastest actors first, ties broken by lower id.
    pub fn ordered<'a>(number: u32, actors: impl IntoIterator<Item = &'a ActorState>) -> Self {
        let mut roster: Vec<&ActorState> = actors
            .into_iter()
            .filter(|actor| actor.is_alive())
            .collect();
        roster.sort_by_key(|actor| (std::cmp::Reverse(actor.stats.speed), actor.id));

        let mut round = Self::new(number);
        for actor in roster.into_iter().take(CombatConfig::MAX_ACTORS) {
            round.turns.push(Turn::new(actor.id));
        }
        round
    }

    /// The turn currently eligible for input, if any.
    pub fn active_turn(&self) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.status.is_actionable())
    }

    pub fn active_turn_mut(&mut self) -> Option<&mut Turn> {
        self.turns
            .iter_mut()
            .find(|turn| turn.status.is_actionable())
    }

    pub fn turn_of(&self, actor: ActorId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.actor == actor)
    }

    pub fn turn_of_mut(&mut self, actor: ActorId) -> Option<&mut Turn> {
        self.turns.iter_mut().find(|turn| turn.actor == actor)
    }

    /// Next turn still waiting its activation, in round order.
    pub fn next_pending_mut(&mut self) -> Option<&mut Turn> {
        self.turns
            .iter_mut()
            .find(|turn| turn.status == TurnStatus::Pending)
    }

    pub fn all_done(&self) -> bool {
        self.turns.iter().all(|turn| turn.status == TurnStatus::Done)
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_turn_is_first_actionable() {
        let mut round = Round::new(1);
        round.turns.push(Turn::new(ActorId(1)));
        round.turns.push(Turn::new(ActorId(2)));

        assert!(round.active_turn().is_none());

        round.turns[0].activate();
        assert_eq!(round.active_turn().unwrap().actor, ActorId(1));

        round.turns[0].begin_acting();
        assert_eq!(round.active_turn().unwrap().actor, ActorId(1));

        round.turns[0].finish();
        assert!(round.active_turn().is_none());
        assert_eq!(round.next_pending_mut().unwrap().actor, ActorId(2));
    }

    #[test]
    fn round_completion_tracks_turns() {
        let mut round = Round::new(2);
        round.turns.push(Turn::new(ActorId(1)));
        assert!(!round.all_done());

        round.turns[0].finish();
        assert!(round.all_done());
    }

    #[test]
    fn ordering_is_speed_desc_then_id_asc() {
        use crate::state::{CombatStats, OwnerId, Position};

        let contender = |id: u32, speed: u32, hp: u32| {
            ActorState::builder(ActorId(id), OwnerId(id % 2))
                .position(Position::new(id as i32, 0))
                .hp(hp)
                .stats(CombatStats {
                    speed,
                    ..CombatStats::default()
                })
                .build()
        };

        let mut fallen = contender(4, 99, 10);
        fallen.hp.deplete(10);
        let roster = [
            contender(1, 5, 10),
            contender(2, 9, 10),
            contender(3, 5, 10),
            fallen,
        ];

        let round = Round::ordered(3, roster.iter());
        let order: Vec<ActorId> = round.turns.iter().map(|turn| turn.actor).collect();

        // Fastest first, equal speeds by id, the dead excluded entirely.
        assert_eq!(order, vec![ActorId(2), ActorId(1), ActorId(3)]);
        assert_eq!(round.number, 3);
        assert_eq!(round.status, RoundStatus::Pending);
    }
}
