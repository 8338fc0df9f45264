mod error;
mod time_grid;
mod pattern;

pub use error::*;
pub use time_grid::*;
pub use pattern::*;

/// Default step of the grid used when no grid was configured, in units of
/// 2N0 generations.
pub const DEFAULT_STEP: f64 = 0.1;
