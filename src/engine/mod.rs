// Transition rules: guards, stage and shift engines, session coordinator, tick, ghosts

pub mod error;
pub mod ghost;
pub mod guard;
pub mod session;
pub mod shift;
pub mod stage;
pub mod tick;
pub mod views;

pub use error::*;
pub use session::LockPolicy;
pub use shift::ShiftAction;
pub use tick::{TickMode, TickReport};
