//! Planner-facing data model shared between Floe crates.

use serde::{Deserialize, Serialize};

/// Wildcard rpc endpoint sentinels meaning "use the internal endpoint".
const UNSET_ENDPOINT: &str = "";
const WILDCARD_ENDPOINT: &str = "0.0.0.0";

/// One contiguous ring interval and its owning replica set, in the string
/// form the store reports it.
///
/// `endpoints` are internal (gossip) addresses, `rpc_endpoints` the
/// client-facing ones; index i in both lists is the same physical replica.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRange {
    pub start_token: String,
    pub end_token: String,
    pub endpoints: Vec<String>,
    pub rpc_endpoints: Vec<String>,
}

impl TokenRange {
    /// The address to dial for replica `index`: the rpc endpoint, or the
    /// internal endpoint when the rpc entry is unset or the wildcard.
    pub fn effective_endpoint(&self, index: usize) -> &str {
        let rpc = self.rpc_endpoints[index].as_str();
        if rpc == UNSET_ENDPOINT || rpc == WILDCARD_ENDPOINT {
            self.endpoints[index].as_str()
        } else {
            rpc
        }
    }
}

/// Optional narrowing of a planning pass to a key interval. Only valid with
/// an order-preserving partitioner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRestriction {
    pub start_key: Vec<u8>,
    pub end_key: Option<Vec<u8>>,
}

/// Raw sub-range answer from one replica query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubSplit {
    pub start_token: String,
    pub end_token: String,
    pub row_estimate: u64,
}

/// Final externally-visible work unit: a non-wrapping ring interval plus the
/// candidate hosts for locality scheduling.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Split {
    pub start_token: String,
    pub end_token: String,
    pub row_estimate: u64,
    pub hosts: Vec<String>,
}
