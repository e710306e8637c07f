//! Traits describing read-only combat data.
//!
//! Oracles expose the static map, authored skills, tuning parameters, and
//! the deterministic random source. The [`Env`] aggregate bundles them so
//! rules, the effect engine, and actions can reach everything they need
//! without hard coupling to concrete implementations.
mod config;
mod error;
mod map;
mod rng;
mod skill;

pub use config::ConfigOracle;
pub use error::OracleError;
pub use map::{MapDimensions, MapOracle, Terrain, Tile};
pub use rng::{PcgRng, RngOracle, SeedDomain, compute_seed};
pub use skill::{
    RangeShape, ResourceCost, SkillCategory, SkillOracle, SkillRange, SkillSpec, TriggerCondition,
};

use crate::config::CombatConfig;

/// Aggregates the read-only oracles required by rules and transitions.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, M, S, C, R>
where
    M: MapOracle + ?Sized,
    S: SkillOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    map: Option<&'a M>,
    skills: Option<&'a S>,
    config: Option<&'a C>,
    rng: Option<&'a R>,
}

pub type CombatEnv<'a> =
    Env<'a, dyn MapOracle + 'a, dyn SkillOracle + 'a, dyn ConfigOracle + 'a, dyn RngOracle + 'a>;

impl<'a, M, S, C, R> Env<'a, M, S, C, R>
where
    M: MapOracle + ?Sized,
    S: SkillOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        map: Option<&'a M>,
        skills: Option<&'a S>,
        config: Option<&'a C>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            map,
            skills,
            config,
            rng,
        }
    }

    pub fn with_all(map: &'a M, skills: &'a S, config: &'a C, rng: &'a R) -> Self {
        Self::new(Some(map), Some(skills), Some(config), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            map: None,
            skills: None,
            config: None,
            rng: None,
        }
    }

    /// Returns the MapOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::MapNotAvailable` if no map oracle was provided.
    pub fn map(&self) -> Result<&'a M, OracleError> {
        self.map.ok_or(OracleError::MapNotAvailable)
    }

    /// Returns the SkillOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SkillsNotAvailable` if no skill oracle was provided.
    pub fn skills(&self) -> Result<&'a S, OracleError> {
        self.skills.ok_or(OracleError::SkillsNotAvailable)
    }

    /// Returns the ConfigOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config oracle was provided.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Returns the combat tuning parameters from the config oracle.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config oracle was provided.
    pub fn combat_config(&self) -> Result<&'a CombatConfig, OracleError> {
        Ok(self.config()?.combat_config())
    }
}

impl<'a, M, S, C, R> Env<'a, M, S, C, R>
where
    M: MapOracle + 'a,
    S: SkillOracle + 'a,
    C: ConfigOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `CombatEnv` (consumes self).
    pub fn into_combat_env(self) -> CombatEnv<'a> {
        let map: Option<&'a dyn MapOracle> = self.map.map(|map| map as _);
        let skills: Option<&'a dyn SkillOracle> = self.skills.map(|skills| skills as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|config| config as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(map, skills, config, rng)
    }

    /// Converts this environment into a trait-object based `CombatEnv` (borrows self).
    ///
    /// Use this when you need to convert multiple times (e.g., in a loop).
    pub fn as_combat_env(&self) -> CombatEnv<'a> {
        let map: Option<&'a dyn MapOracle> = self.map.map(|map| map as _);
        let skills: Option<&'a dyn SkillOracle> = self.skills.map(|skills| skills as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|config| config as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(map, skills, config, rng)
    }
}
