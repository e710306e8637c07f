//! Public session API: handle, decision providers, and error types.

mod errors;
mod handle;
mod providers;

pub use errors::{Result, RuntimeError};
pub use handle::{DrainReport, SessionHandle, StepResult};
pub use providers::{DecisionProvider, PolicyProvider, ScriptProvider, StandbyProvider};
