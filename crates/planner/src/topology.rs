use floe_common::model::TokenRange;
use tracing::warn;

use crate::config::PlanningContext;
use crate::error::PlannerError;
use crate::rpc::NodeConnector;

/// Fetches the ring topology from the first reachable seed node.
pub struct TopologyClient<'a> {
    connector: &'a dyn NodeConnector,
}

impl<'a> TopologyClient<'a> {
    pub fn new(connector: &'a dyn NodeConnector) -> Self {
        TopologyClient { connector }
    }

    /// Ordered token ranges for the context's keyspace. Seeds that cannot be
    /// reached (or reject the session) are skipped; a rejected topology
    /// request itself is fatal.
    pub async fn fetch_ring(
        &self,
        seeds: &[String],
        ctx: &PlanningContext,
    ) -> Result<Vec<TokenRange>, PlannerError> {
        for seed in seeds {
            match self.connector.connect(seed, ctx).await {
                Ok(mut client) => {
                    return client.describe_ring(&ctx.keyspace).await.map_err(|status| {
                        PlannerError::Protocol {
                            endpoint: seed.clone(),
                            status,
                        }
                    });
                }
                Err(err) => {
                    warn!(seed = %seed, error = %err, "seed not reachable, trying next");
                }
            }
        }
        Err(PlannerError::Connection {
            endpoint: seeds.join(","),
            detail: "no configured seed was reachable".to_string(),
        })
    }
}
