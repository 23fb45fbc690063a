pub mod duration;
pub mod format;
pub mod fuzzy;

pub use duration::*;
pub use format::*;
