//! Planner crate
//!
//! Plans parallel, locality-aware work units ("splits") over a partitioned,
//! replicated token-ring store: fetch the ring topology, narrow it to an
//! optional key restriction, query range owners concurrently for sub-range
//! boundaries, and assemble the results for the host batch framework.

pub mod adapter;
pub mod assemble;
pub mod config;
pub mod error;
pub mod planner;
pub mod restrict;
pub mod rpc;
pub mod split_client;
pub mod topology;

pub use adapter::SplitSource;
pub use config::{PlannerSettings, PlanningContext};
pub use error::PlannerError;
pub use planner::SplitPlanner;
