//! Common crate
//!
//! Shared ring model, types, and error handling for Floe.

pub mod error;
pub mod model;
pub mod ring;

pub use error::RingError;
pub use model::{KeyRestriction, Split, SubSplit, TokenRange};
pub use ring::{Interval, Partitioner, Token};
