//! Oracle implementations backing a session.
//!
//! The engine reads the static world through oracle traits; this module
//! provides the in-memory implementations a session is built from and the
//! bundle that groups them for cheap sharing across the worker, providers,
//! and the prediction path.

mod map;
mod skills;

pub use map::StaticMap;
pub use skills::StaticSkillBook;

use std::sync::Arc;

use combat_core::{CombatConfig, CombatEnv, Env, PcgRng};

/// Everything the engine consults during resolution.
///
/// Clones share the underlying oracles, so the authoritative worker and any
/// number of predicting clients resolve against identical data.
#[derive(Clone, Debug)]
pub struct OracleBundle {
    map: Arc<StaticMap>,
    skills: Arc<StaticSkillBook>,
    config: Arc<CombatConfig>,
    rng: PcgRng,
}

impl OracleBundle {
    pub fn new(map: StaticMap, skills: StaticSkillBook, config: CombatConfig) -> Self {
        Self {
            map: Arc::new(map),
            skills: Arc::new(skills),
            config: Arc::new(config),
            rng: PcgRng,
        }
    }

    /// Environment view over the bundle for engine calls.
    pub fn as_combat_env(&self) -> CombatEnv<'_> {
        Env::with_all(
            self.map.as_ref(),
            self.skills.as_ref(),
            self.config.as_ref(),
            &self.rng,
        )
        .into_combat_env()
    }

    pub fn map(&self) -> &StaticMap {
        &self.map
    }

    pub fn skills(&self) -> &StaticSkillBook {
        &self.skills
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }
}
