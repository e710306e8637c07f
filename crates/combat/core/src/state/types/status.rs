use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::effect::{EffectKind, EffectSpec};

use super::EffectId;

/// One effect currently riding on an actor.
///
/// `remaining` counts down at the owner's turn boundary; `applied` records
/// the flat attribute delta this instance actually produced, so removal can
/// restore the original value exactly even after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub spec: EffectSpec,
    pub remaining: u32,
    pub applied: i32,
}

impl ActiveEffect {
    /// Fresh instance with the countdown primed from the authored duration.
    pub fn new(spec: EffectSpec) -> Self {
        Self {
            spec,
            remaining: spec.duration,
            applied: 0,
        }
    }

    pub fn id(&self) -> EffectId {
        self.spec.id
    }

    pub fn kind(&self) -> EffectKind {
        self.spec.kind
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Bounded set of active effects with replace-not-stack semantics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffects {
    effects: ArrayVec<ActiveEffect, { CombatConfig::MAX_STATUS_EFFECTS }>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.iter().any(|effect| effect.id() == id)
    }

    pub fn get(&self, id: EffectId) -> Option<&ActiveEffect> {
        self.effects.iter().find(|effect| effect.id() == id)
    }

    pub fn get_mut(&mut self, id: EffectId) -> Option<&mut ActiveEffect> {
        self.effects.iter_mut().find(|effect| effect.id() == id)
    }

    /// Inserts a new instance. Returns `false` when the slots are full;
    /// callers decide whether that is an error or a silent drop.
    pub fn insert(&mut self, effect: ActiveEffect) -> bool {
        self.effects.try_push(effect).is_ok()
    }

    pub fn remove(&mut self, id: EffectId) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|effect| effect.id() == id)?;
        Some(self.effects.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveEffect> {
        self.effects.iter_mut()
    }

    /// Ids in slot order; used by tick processing, which must not hold a
    /// borrow while mutating the owner.
    pub fn ids(&self) -> Vec<EffectId> {
        self.effects.iter().map(|effect| effect.id()).collect()
    }

    pub fn has_kind(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Damage-absorbing pool granted by shield effects.
///
/// The pool is capped at the largest single grant seen so far; repeated
/// small shields top the pool back up but never raise the ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShieldPool {
    pub pool: u32,
    pub cap: u32,
}

impl ShieldPool {
    pub fn grant(&mut self, value: u32) {
        self.cap = self.cap.max(value);
        self.pool = (self.pool + value).min(self.cap);
    }

    /// Soaks up to `amount`, returning how much was absorbed.
    pub fn absorb(&mut self, amount: u32) -> u32 {
        let absorbed = self.pool.min(amount);
        self.pool -= absorbed;
        absorbed
    }

    pub fn is_depleted(&self) -> bool {
        self.pool == 0
    }

    pub fn clear(&mut self) {
        self.pool = 0;
        self.cap = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectSpec;

    #[test]
    fn shield_cap_is_running_maximum() {
        let mut shield = ShieldPool::default();
        shield.grant(30);
        assert_eq!((shield.pool, shield.cap), (30, 30));

        // A smaller grant cannot push the pool past the ceiling.
        shield.grant(10);
        assert_eq!((shield.pool, shield.cap), (30, 30));

        shield.absorb(25);
        shield.grant(10);
        assert_eq!((shield.pool, shield.cap), (15, 30));

        // A bigger grant raises the ceiling.
        shield.grant(50);
        assert_eq!((shield.pool, shield.cap), (50, 50));
    }

    #[test]
    fn shield_absorbs_partially() {
        let mut shield = ShieldPool::default();
        shield.grant(20);
        assert_eq!(shield.absorb(8), 8);
        assert_eq!(shield.absorb(30), 12);
        assert!(shield.is_depleted());
    }

    #[test]
    fn effects_replace_by_id() {
        let mut effects = ActiveEffects::new();
        let dot = EffectSpec::dot(EffectId(7), 10, 3);
        assert!(effects.insert(ActiveEffect::new(dot)));
        assert!(effects.contains(EffectId(7)));
        assert_eq!(effects.len(), 1);

        let removed = effects.remove(EffectId(7)).unwrap();
        assert_eq!(removed.remaining, 3);
        assert!(effects.is_empty());
    }
}
