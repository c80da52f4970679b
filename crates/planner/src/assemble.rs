use floe_common::model::{Split, SubSplit, TokenRange};
use floe_common::ring::{Interval, Partitioner};

use crate::error::PlannerError;

/// Maps a replica endpoint to the hostname handed to the batch framework
/// for locality scheduling.
pub trait EndpointResolver: Send + Sync {
    fn hostname(&self, endpoint: &str) -> Result<String, PlannerError>;
}

/// Pass-through resolver. Hosts that need reverse DNS supply their own
/// implementation.
pub struct IdentityResolver;

impl EndpointResolver for IdentityResolver {
    fn hostname(&self, endpoint: &str) -> Result<String, PlannerError> {
        Ok(endpoint.to_string())
    }
}

/// Turns one range's raw sub-splits into final work units: resolves the
/// hostname list once per range and unwraps sub-splits that cross the ring
/// boundary.
#[derive(Debug)]
pub struct SplitAssembler {
    hosts: Vec<String>,
    partitioner: Partitioner,
}

impl SplitAssembler {
    pub fn new(
        range: &TokenRange,
        partitioner: Partitioner,
        resolver: &dyn EndpointResolver,
    ) -> Result<Self, PlannerError> {
        if range.endpoints.len() != range.rpc_endpoints.len() {
            return Err(PlannerError::InvariantViolation(format!(
                "endpoint lists misaligned: {} internal vs {} rpc",
                range.endpoints.len(),
                range.rpc_endpoints.len()
            )));
        }
        let mut hosts = Vec::with_capacity(range.rpc_endpoints.len());
        for index in 0..range.rpc_endpoints.len() {
            hosts.push(resolver.hostname(range.effective_endpoint(index))?);
        }
        Ok(SplitAssembler { hosts, partitioner })
    }

    /// Splits come out in sub-split arrival order; a wrapping sub-split
    /// contributes its two linear halves back to back.
    pub fn assemble(&self, sub_splits: Vec<SubSplit>) -> Result<Vec<Split>, PlannerError> {
        let mut splits = Vec::new();
        for sub in sub_splits {
            let interval = Interval::new(
                self.partitioner.parse_token(&sub.start_token)?,
                self.partitioner.parse_token(&sub.end_token)?,
            );
            for piece in interval.unwrapped(&self.partitioner) {
                splits.push(Split {
                    start_token: self.partitioner.token_to_string(&piece.start),
                    end_token: self.partitioner.token_to_string(&piece.end),
                    row_estimate: sub.row_estimate,
                    hosts: self.hosts.clone(),
                });
            }
        }
        Ok(splits)
    }
}
