//! # iicr
//!
//! Estimate the instantaneous inverse coalescence rate (IICR) from ms
//! simulations and compare it to the n-island model and to the simulated
//! demographic history.
//!
//! This crate re-exports the main functionality from its submodules and
//! adds the glue to run whole parameter files.

pub mod input_parsers;
pub mod cli_parsers;
pub mod parameters;
pub mod simulator;
pub mod pipeline;
pub mod plotting;

pub mod grid {
    pub use ::iicr_grid::*;
}

pub mod empirical {
    pub use ::iicr_empirical::*;
}

pub mod models {
    pub use ::iicr_models::*;
}
