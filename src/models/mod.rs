// Core data models for shopclock
// These structs represent the shop-floor domain: jobs, stages, owners, shift and UI session

pub mod job;
pub mod owner;
pub mod session;
pub mod shift;
pub mod stage;
pub mod state;

pub use job::*;
pub use owner::*;
pub use session::*;
pub use shift::*;
pub use stage::*;
pub use state::*;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;
