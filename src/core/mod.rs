//! Invoice records, date normalization, and per-record validation.
//!
//! This module provides the record model shared by the rest of the crate,
//! the date normalizer used to derive reporting periods, and the validator
//! that checks each record alone and against the full snapshot.

mod builder;
mod dates;
mod error;
mod signature;
mod types;
mod validation;

pub use builder::*;
pub use dates::*;
pub use error::*;
pub use signature::*;
pub use types::*;
pub use validation::*;
