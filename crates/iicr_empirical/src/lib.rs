pub mod curve_io;

mod error;
mod observations;
mod distribution;
mod iicr_curve;

pub use error::*;
pub use observations::*;
pub use distribution::*;
pub use iicr_curve::*;
pub use curve_io::*;

/// ms reports times in units of 4N0 generations, the IICR is expressed in
/// units of 2N0 generations.
pub const MS_TIME_SCALE: f64 = 2.0;
