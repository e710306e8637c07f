//! Session event bus and the payloads it carries.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{CombatEvent, Event, Topic, TurnEvent};
