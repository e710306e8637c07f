//! Configuration oracle exposing tunable combat parameters to the engine.

use crate::config::CombatConfig;

/// Provides access to runtime configuration values.
pub trait ConfigOracle: Send + Sync {
    /// Returns the combat tuning parameters.
    fn combat_config(&self) -> &CombatConfig;
}

impl ConfigOracle for CombatConfig {
    fn combat_config(&self) -> &CombatConfig {
        self
    }
}
