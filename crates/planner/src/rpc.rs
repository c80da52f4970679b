//! Node-client boundary: the trait seam the planner talks through, plus its
//! gRPC-backed implementation.

use async_trait::async_trait;
use floe_api::store::store_node_client::StoreNodeClient;
use floe_api::store::{self as pb};
use floe_common::model::{SubSplit, TokenRange};
use tonic::transport::Channel;
use tonic::Status;

use crate::config::PlanningContext;
use crate::error::PlannerError;

/// One open, keyspace-selected connection to a store node.
#[async_trait]
pub trait NodeClient: Send {
    async fn describe_ring(&mut self, keyspace: &str) -> Result<Vec<TokenRange>, Status>;

    async fn compute_splits(
        &mut self,
        table: &str,
        start_token: &str,
        end_token: &str,
        split_size_rows: u64,
    ) -> Result<Vec<SubSplit>, Status>;

    async fn describe_split_points(
        &mut self,
        table: &str,
        start_token: &str,
        end_token: &str,
        split_size_rows: u64,
    ) -> Result<Vec<String>, Status>;
}

/// Opens connections to store nodes.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    /// Dial `endpoint` on the context's rpc port and select the keyspace,
    /// logging in when credentials are configured. A transport failure maps
    /// to [`PlannerError::Connection`]; a rejected session handshake maps to
    /// [`PlannerError::Protocol`].
    async fn connect(
        &self,
        endpoint: &str,
        ctx: &PlanningContext,
    ) -> Result<Box<dyn NodeClient>, PlannerError>;
}

pub struct GrpcConnector;

#[async_trait]
impl NodeConnector for GrpcConnector {
    async fn connect(
        &self,
        endpoint: &str,
        ctx: &PlanningContext,
    ) -> Result<Box<dyn NodeClient>, PlannerError> {
        let url = format!("http://{}:{}", endpoint, ctx.rpc_port);
        let mut client =
            StoreNodeClient::connect(url)
                .await
                .map_err(|e| PlannerError::Connection {
                    endpoint: endpoint.to_string(),
                    detail: e.to_string(),
                })?;
        let session = pb::OpenSessionRequest {
            keyspace: ctx.keyspace.clone(),
            credentials: ctx.credentials.as_ref().map(|c| pb::Credentials {
                username: c.username.clone(),
                password: c.password.clone(),
            }),
        };
        client
            .open_session(tonic::Request::new(session))
            .await
            .map_err(|status| PlannerError::Protocol {
                endpoint: endpoint.to_string(),
                status,
            })?;
        Ok(Box::new(GrpcNodeClient { inner: client }))
    }
}

struct GrpcNodeClient {
    inner: StoreNodeClient<Channel>,
}

#[async_trait]
impl NodeClient for GrpcNodeClient {
    async fn describe_ring(&mut self, keyspace: &str) -> Result<Vec<TokenRange>, Status> {
        let response = self
            .inner
            .describe_ring(tonic::Request::new(pb::DescribeRingRequest {
                keyspace: keyspace.to_string(),
            }))
            .await?;
        Ok(response
            .into_inner()
            .ranges
            .into_iter()
            .map(range_from_wire)
            .collect())
    }

    async fn compute_splits(
        &mut self,
        table: &str,
        start_token: &str,
        end_token: &str,
        split_size_rows: u64,
    ) -> Result<Vec<SubSplit>, Status> {
        let response = self
            .inner
            .compute_splits(tonic::Request::new(split_request(
                table,
                start_token,
                end_token,
                split_size_rows,
            )))
            .await?;
        Ok(response
            .into_inner()
            .splits
            .into_iter()
            .map(|s| SubSplit {
                start_token: s.start_token,
                end_token: s.end_token,
                row_estimate: s.row_estimate,
            })
            .collect())
    }

    async fn describe_split_points(
        &mut self,
        table: &str,
        start_token: &str,
        end_token: &str,
        split_size_rows: u64,
    ) -> Result<Vec<String>, Status> {
        let response = self
            .inner
            .describe_split_points(tonic::Request::new(split_request(
                table,
                start_token,
                end_token,
                split_size_rows,
            )))
            .await?;
        Ok(response.into_inner().split_points)
    }
}

fn split_request(
    table: &str,
    start_token: &str,
    end_token: &str,
    split_size_rows: u64,
) -> pb::ComputeSplitsRequest {
    pb::ComputeSplitsRequest {
        table: table.to_string(),
        start_token: start_token.to_string(),
        end_token: end_token.to_string(),
        split_size_rows,
    }
}

fn range_from_wire(range: pb::RingRange) -> TokenRange {
    TokenRange {
        start_token: range.start_token,
        end_token: range.end_token,
        endpoints: range.endpoints,
        rpc_endpoints: range.rpc_endpoints,
    }
}
