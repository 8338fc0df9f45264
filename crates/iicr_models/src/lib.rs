/// The IICR model trait.
mod iicr_model;

/// Symmetric n-island model in closed form.
mod n_island;

/// Tokenized ms command lines.
mod command;

/// Demographic histories encoded in ms commands.
mod demography;

mod error;

pub use error::*;
pub use iicr_model::*;
pub use n_island::*;
pub use command::*;
pub use demography::*;
