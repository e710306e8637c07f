use thiserror::Error;

/// Raised when a transition needs an oracle the environment was built without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("map oracle not available")]
    MapNotAvailable,

    #[error("skill oracle not available")]
    SkillsNotAvailable,

    #[error("config oracle not available")]
    ConfigNotAvailable,

    #[error("rng oracle not available")]
    RngNotAvailable,
}
