use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy of one planning invocation.
///
/// Connection failures are recoverable per endpoint, protocol rejections are
/// fatal for the unit that saw them, and exhaustion of the shared retry
/// budget is fatal for the whole invocation.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Failed to load configuration")]
    Config(#[from] config::ConfigError),

    #[error("invalid planner configuration: {0}")]
    Configuration(String),

    #[error("could not reach {endpoint}: {detail}")]
    Connection { endpoint: String, detail: String },

    #[error("request rejected by {endpoint}: {status}")]
    Protocol { endpoint: String, status: tonic::Status },

    #[error("failed connecting to all endpoints {}", .endpoints.join(","))]
    EndpointsExhausted { endpoints: Vec<String> },

    #[error("planning unit timed out after {0:?}")]
    UnitTimeout(Duration),

    #[error("could not plan splits after {retries} retries")]
    PlanningExhausted {
        retries: u32,
        #[source]
        source: Box<PlannerError>,
    },

    #[error("planner invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Ring(#[from] floe_common::RingError),
}
