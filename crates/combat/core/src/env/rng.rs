//! Deterministic randomness for combat rolls.
//!
//! Prediction and authoritative resolution must agree on every roll, so the
//! generator is stateless: each call derives its output purely from a seed,
//! and seeds are derived from `(game_seed, nonce, actor, domain)`. Replaying
//! the same action sequence therefore reproduces the same crits and hit
//! rolls bit-for-bit on both sides.

use crate::state::ActorId;

/// Roll site namespace mixed into seed derivation.
///
/// Two different rolls inside the same action must never share a seed;
/// giving each site its own domain keeps them independent without
/// threading any mutable generator state around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum SeedDomain {
    /// Evasion check before damage lands.
    HitRoll = 0,
    /// Critical multiplier check.
    CritRoll = 1,
    /// AI decision for the acting NPC.
    Decision = 2,
}

/// Stateless random source keyed by an explicit seed.
///
/// Implementations must be deterministic: the same seed always yields the
/// same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    ///
    /// Common for percentage-based mechanics like crit chance.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides) + 1
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output permuted out of 64-bit LCG state. Small,
/// fast, branch-free, and passes the usual statistical batteries, which is
/// more than the combat math needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the LCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation: xorshift high bits, then rotate by the
    /// top five bits of state.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute a deterministic per-roll seed from combat state components.
///
/// # Arguments
///
/// * `game_seed` - Base seed fixed at combat start
/// * `nonce` - Event sequence number (increments once per applied event)
/// * `actor` - Actor the roll belongs to
/// * `domain` - Roll site, see [`SeedDomain`]
pub fn compute_seed(game_seed: u64, nonce: u64, actor: ActorId, domain: SeedDomain) -> u64 {
    // Mix all inputs using simple hash combiners; the constants come from
    // SplitMix64 and FxHash.
    let mut hash = game_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor.0 as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (domain as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let rng = PcgRng;
        let seed = compute_seed(42, 7, ActorId(3), SeedDomain::CritRoll);
        assert_eq!(rng.next_u32(seed), rng.next_u32(seed));
        assert_eq!(rng.roll_d100(seed), rng.roll_d100(seed));
    }

    #[test]
    fn domains_do_not_collide() {
        let hit = compute_seed(42, 7, ActorId(3), SeedDomain::HitRoll);
        let crit = compute_seed(42, 7, ActorId(3), SeedDomain::CritRoll);
        let decision = compute_seed(42, 7, ActorId(3), SeedDomain::Decision);
        assert_ne!(hit, crit);
        assert_ne!(crit, decision);
    }

    #[test]
    fn nonce_and_actor_change_the_stream() {
        let base = compute_seed(42, 7, ActorId(3), SeedDomain::HitRoll);
        assert_ne!(base, compute_seed(42, 8, ActorId(3), SeedDomain::HitRoll));
        assert_ne!(base, compute_seed(42, 7, ActorId(4), SeedDomain::HitRoll));
        assert_ne!(base, compute_seed(43, 7, ActorId(3), SeedDomain::HitRoll));
    }

    #[test]
    fn d100_stays_in_bounds() {
        let rng = PcgRng;
        for nonce in 0..200 {
            let roll = rng.roll_d100(compute_seed(1, nonce, ActorId(0), SeedDomain::HitRoll));
            assert!((1..=100).contains(&roll));
        }
    }
}
