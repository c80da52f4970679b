use floe_common::model::SubSplit;
use tonic::Code;
use tracing::debug;

use crate::config::PlanningContext;
use crate::error::PlannerError;
use crate::restrict::PlanningTask;
use crate::rpc::NodeConnector;

/// Per-range worker: asks one of the range's replicas for sub-range
/// boundaries, failing over across replicas in list order.
pub struct RangeSplitClient;

impl RangeSplitClient {
    /// Connection-level failures move on to the next replica; the planner's
    /// global retry budget covers resubmission of the whole task. Any other
    /// request-level rejection is fatal here, except the node signalling
    /// that the richer split computation is unsupported, which falls back to
    /// the boundary-token call.
    pub async fn fetch_sub_splits(
        connector: &dyn NodeConnector,
        ctx: &PlanningContext,
        task: &PlanningTask,
    ) -> Result<Vec<SubSplit>, PlannerError> {
        let range = &task.range;
        let mut attempted = Vec::with_capacity(range.rpc_endpoints.len());
        for index in 0..range.rpc_endpoints.len() {
            let endpoint = range.effective_endpoint(index);
            attempted.push(endpoint.to_string());
            let mut client = match connector.connect(endpoint, ctx).await {
                Ok(client) => client,
                Err(err @ PlannerError::Connection { .. }) => {
                    debug!(endpoint = %endpoint, error = %err, "failed to connect, trying next replica");
                    continue;
                }
                Err(err) => return Err(err),
            };
            match client
                .compute_splits(
                    &ctx.table,
                    &range.start_token,
                    &range.end_token,
                    task.split_size_rows,
                )
                .await
            {
                Ok(splits) => return Ok(splits),
                Err(status) if status.code() == Code::Unimplemented => {
                    debug!(endpoint = %endpoint, "ComputeSplits unsupported, falling back to split points");
                    let points = client
                        .describe_split_points(
                            &ctx.table,
                            &range.start_token,
                            &range.end_token,
                            task.split_size_rows,
                        )
                        .await
                        .map_err(|status| PlannerError::Protocol {
                            endpoint: endpoint.to_string(),
                            status,
                        })?;
                    return Ok(points_to_sub_splits(&points, task.split_size_rows));
                }
                Err(status) => {
                    return Err(PlannerError::Protocol {
                        endpoint: endpoint.to_string(),
                        status,
                    })
                }
            }
        }
        Err(PlannerError::EndpointsExhausted {
            endpoints: attempted,
        })
    }
}

/// Pair adjacent boundary tokens into sub-splits, assigning the requested
/// split size as the row estimate of each.
fn points_to_sub_splits(points: &[String], split_size_rows: u64) -> Vec<SubSplit> {
    points
        .windows(2)
        .map(|pair| SubSplit {
            start_token: pair[0].clone(),
            end_token: pair[1].clone(),
            row_estimate: split_size_rows,
        })
        .collect()
}
