//! State digest computation for prediction reconciliation.
//!
//! Clients that run the simulation optimistically compare this digest
//! against the authoritative one to detect divergence without shipping
//! full snapshots across the wire.

use super::CombatState;

/// Computes a 32-byte SHA-256 digest of the serialized combat state.
///
/// # Design
///
/// - Uses bincode for deterministic serialization
/// - Equal states always produce equal digests; any observable field
///   change (resources, occupancy, round bookkeeping) changes the digest
///
/// Requires the `serde` feature.
pub fn compute_state_digest(state: &CombatState) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();

    // bincode serialization is deterministic and consistent
    if let Ok(state_bytes) = bincode::serialize(state) {
        hasher.update(&state_bytes);
    }

    hasher.finalize().into()
}
