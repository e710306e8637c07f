use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::effect::{Attribute, EffectKind};
use crate::env::ResourceCost;

use super::{ActorId, ActiveEffects, OwnerId, Position, ResourceMeter, ShieldPool, SkillId};

/// Inclusive distance bounds for basic attacks, in hexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRange {
    pub min: u32,
    pub max: u32,
}

impl AttackRange {
    pub const MELEE: Self = Self { min: 1, max: 1 };

    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn is_melee(&self) -> bool {
        self.max <= 1
    }
}

/// Derived combat attributes.
///
/// Modifiers from buffs and debuffs mutate these in place; the owning
/// [`ActiveEffect`](super::ActiveEffect) records the exact delta so expiry
/// restores the pre-effect value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub attack: u32,
    pub defense: u32,
    pub intelligence: u32,
    pub speed: u32,
    /// Critical chance in percent.
    pub crit_rate: u32,
    /// Subtracted from the attacker's hit chance.
    pub evasion: u32,
    /// Shortens hostile periodic effects.
    pub status_resistance: u32,
}

/// Which way the actor's sprite faces; flips toward movement and targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Remaining lockout for one skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cooldown {
    pub skill: SkillId,
    pub remaining: u32,
}

/// Full per-actor combat state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: ActorId,
    pub owner: OwnerId,
    pub position: Position,
    pub move_range: u32,
    pub attack_range: AttackRange,
    pub hp: ResourceMeter,
    pub mp: ResourceMeter,
    pub stamina: ResourceMeter,
    pub stats: CombatStats,
    /// Ignores terrain and occupancy while moving.
    pub flying: bool,
    pub facing: Facing,
    pub skills: ArrayVec<SkillId, { CombatConfig::MAX_SKILLS_PER_ACTOR }>,
    pub cooldowns: ArrayVec<Cooldown, { CombatConfig::MAX_SKILLS_PER_ACTOR }>,
    pub effects: ActiveEffects,
    pub shield: ShieldPool,
}

impl ActorState {
    pub fn new(id: ActorId, owner: OwnerId, position: Position) -> Self {
        Self {
            id,
            owner,
            position,
            move_range: 0,
            attack_range: AttackRange::MELEE,
            hp: ResourceMeter::default(),
            mp: ResourceMeter::default(),
            stamina: ResourceMeter::default(),
            stats: CombatStats::default(),
            flying: false,
            facing: Facing::default(),
            skills: ArrayVec::new(),
            cooldowns: ArrayVec::new(),
            effects: ActiveEffects::new(),
            shield: ShieldPool::default(),
        }
    }

    pub fn builder(id: ActorId, owner: OwnerId) -> ActorBuilder {
        ActorBuilder::new(id, owner)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.hp.is_depleted()
    }

    pub fn is_stunned(&self) -> bool {
        self.effects.has_kind(EffectKind::Stun)
    }

    pub fn knows_skill(&self, skill: SkillId) -> bool {
        self.skills.contains(&skill)
    }

    /// Turns left before `skill` may be used again; zero when ready.
    pub fn cooldown_remaining(&self, skill: SkillId) -> u32 {
        self.cooldowns
            .iter()
            .find(|cooldown| cooldown.skill == skill)
            .map(|cooldown| cooldown.remaining)
            .unwrap_or(0)
    }

    pub fn set_cooldown(&mut self, skill: SkillId, turns: u32) {
        if let Some(entry) = self
            .cooldowns
            .iter_mut()
            .find(|cooldown| cooldown.skill == skill)
        {
            entry.remaining = turns;
        } else if turns > 0 {
            // Slot count matches the skill list, so this cannot overflow
            // for skills the actor actually knows.
            let _ = self.cooldowns.try_push(Cooldown {
                skill,
                remaining: turns,
            });
        }
    }

    /// Decrements every cooldown by one turn, dropping finished entries.
    pub fn tick_cooldowns(&mut self) {
        for cooldown in self.cooldowns.iter_mut() {
            cooldown.remaining = cooldown.remaining.saturating_sub(1);
        }
        self.cooldowns.retain(|cooldown| cooldown.remaining > 0);
    }

    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        self.hp.can_afford(cost.hp)
            && self.mp.can_afford(cost.mp)
            && self.stamina.can_afford(cost.stamina)
    }

    /// Deducts `cost` from the resource pools. Callers validate
    /// affordability first; shortfalls clamp at zero rather than panic.
    pub fn pay(&mut self, cost: &ResourceCost) {
        self.hp.deplete(cost.hp);
        self.mp.deplete(cost.mp);
        self.stamina.deplete(cost.stamina);
    }

    pub fn attribute(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Attack => self.stats.attack,
            Attribute::Defense => self.stats.defense,
            Attribute::Intelligence => self.stats.intelligence,
            Attribute::Speed => self.stats.speed,
            Attribute::CritRate => self.stats.crit_rate,
            Attribute::Evasion => self.stats.evasion,
            Attribute::MoveRange => self.move_range,
        }
    }

    /// Shifts `attribute` by `delta`, clamping at zero, and returns the
    /// delta that actually landed. Reverting with the returned value
    /// restores the previous attribute exactly.
    pub fn shift_attribute(&mut self, attribute: Attribute, delta: i32) -> i32 {
        let current = self.attribute(attribute);
        let next = (current as i64 + delta as i64).max(0) as u32;
        let slot = match attribute {
            Attribute::Attack => &mut self.stats.attack,
            Attribute::Defense => &mut self.stats.defense,
            Attribute::Intelligence => &mut self.stats.intelligence,
            Attribute::Speed => &mut self.stats.speed,
            Attribute::CritRate => &mut self.stats.crit_rate,
            Attribute::Evasion => &mut self.stats.evasion,
            Attribute::MoveRange => &mut self.move_range,
        };
        *slot = next;
        next as i32 - current as i32
    }
}

/// Convenience constructor for initial rosters and tests.
#[derive(Clone, Debug)]
pub struct ActorBuilder {
    actor: ActorState,
}

impl ActorBuilder {
    pub fn new(id: ActorId, owner: OwnerId) -> Self {
        Self {
            actor: ActorState::new(id, owner, Position::ORIGIN),
        }
    }

    pub fn position(mut self, position: Position) -> Self {
        self.actor.position = position;
        self
    }

    pub fn move_range(mut self, move_range: u32) -> Self {
        self.actor.move_range = move_range;
        self
    }

    pub fn attack_range(mut self, attack_range: AttackRange) -> Self {
        self.actor.attack_range = attack_range;
        self
    }

    pub fn hp(mut self, maximum: u32) -> Self {
        self.actor.hp = ResourceMeter::full(maximum);
        self
    }

    pub fn mp(mut self, maximum: u32) -> Self {
        self.actor.mp = ResourceMeter::full(maximum);
        self
    }

    pub fn stamina(mut self, maximum: u32) -> Self {
        self.actor.stamina = ResourceMeter::full(maximum);
        self
    }

    pub fn stats(mut self, stats: CombatStats) -> Self {
        self.actor.stats = stats;
        self
    }

    pub fn flying(mut self, flying: bool) -> Self {
        self.actor.flying = flying;
        self
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.actor.facing = facing;
        self
    }

    pub fn skill(mut self, skill: SkillId) -> Self {
        if !self.actor.skills.contains(&skill) {
            let _ = self.actor.skills.try_push(skill);
        }
        self
    }

    pub fn build(self) -> ActorState {
        self.actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_actor() -> ActorState {
        ActorState::builder(ActorId(1), OwnerId(0))
            .position(Position::new(2, 2))
            .move_range(3)
            .hp(100)
            .mp(40)
            .stamina(20)
            .stats(CombatStats {
                attack: 30,
                defense: 10,
                ..CombatStats::default()
            })
            .skill(SkillId(5))
            .build()
    }

    #[test]
    fn cooldowns_tick_down_and_clear() {
        let mut actor = sample_actor();
        actor.set_cooldown(SkillId(5), 2);
        assert_eq!(actor.cooldown_remaining(SkillId(5)), 2);

        actor.tick_cooldowns();
        assert_eq!(actor.cooldown_remaining(SkillId(5)), 1);

        actor.tick_cooldowns();
        assert_eq!(actor.cooldown_remaining(SkillId(5)), 0);
        assert!(actor.cooldowns.is_empty());
    }

    #[test]
    fn attribute_shift_reports_actual_delta() {
        let mut actor = sample_actor();

        // Clamped at zero: only -10 of the requested -25 lands.
        let applied = actor.shift_attribute(Attribute::Defense, -25);
        assert_eq!(applied, -10);
        assert_eq!(actor.stats.defense, 0);

        // Reverting the recorded delta restores the original value.
        actor.shift_attribute(Attribute::Defense, -applied);
        assert_eq!(actor.stats.defense, 10);
    }

    #[test]
    fn affordability_checks_all_pools() {
        let actor = sample_actor();
        assert!(actor.can_afford(&ResourceCost::mp(40)));
        assert!(!actor.can_afford(&ResourceCost::mp(41)));
        assert!(!actor.can_afford(&ResourceCost {
            hp: 0,
            mp: 10,
            stamina: 21,
        }));
    }
}
