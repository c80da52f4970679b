//! Orchestrates one planning invocation: dispatch a planning unit per
//! restricted ring range, collect results with a shared retry budget, and
//! hand the caller a shuffled list of splits.

use std::sync::Arc;
use std::time::Duration;

use floe_common::model::Split;
use rand::seq::SliceRandom;
use rand::thread_rng;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::assemble::{EndpointResolver, IdentityResolver, SplitAssembler};
use crate::config::{PlannerSettings, PlanningContext};
use crate::error::PlannerError;
use crate::restrict::{PlanningTask, RangeRestrictor};
use crate::rpc::{GrpcConnector, NodeConnector};
use crate::split_client::RangeSplitClient;
use crate::topology::TopologyClient;

struct Unit {
    handle: JoinHandle<Result<Vec<Split>, PlannerError>>,
    task: PlanningTask,
}

pub struct SplitPlanner {
    settings: PlannerSettings,
    connector: Arc<dyn NodeConnector>,
    resolver: Arc<dyn EndpointResolver>,
}

impl SplitPlanner {
    pub fn new(settings: PlannerSettings) -> Self {
        Self::with_parts(settings, Arc::new(GrpcConnector), Arc::new(IdentityResolver))
    }

    pub fn with_parts(
        settings: PlannerSettings,
        connector: Arc<dyn NodeConnector>,
        resolver: Arc<dyn EndpointResolver>,
    ) -> Self {
        SplitPlanner {
            settings,
            connector,
            resolver,
        }
    }

    /// Plan one pass over the ring. The returned order is unspecified; the
    /// list is never empty (a topology yielding zero splits is a defect).
    pub async fn plan(&self) -> Result<Vec<Split>, PlannerError> {
        let ctx = self.settings.context()?;
        let restrictor = RangeRestrictor::from_settings(&self.settings, &ctx.partitioner)?;

        let ranges = TopologyClient::new(self.connector.as_ref())
            .fetch_ring(&self.settings.seeds, &ctx)
            .await?;
        info!(ranges = ranges.len(), "fetched ring topology");

        let tasks = restrictor.tasks(ranges, &ctx)?;
        let limiter = match self.settings.max_parallel {
            0 => None,
            bound => Some(Arc::new(Semaphore::new(bound))),
        };

        let mut pending: Vec<Unit> = tasks
            .into_iter()
            .map(|task| self.spawn_unit(task, &ctx, limiter.clone()))
            .collect();
        info!(units = pending.len(), "dispatched planning units");

        let outcome = self.collect(&mut pending, &ctx, &limiter).await;

        // Interrupt anything still outstanding, on every exit path.
        for unit in &pending {
            unit.handle.abort();
        }

        let mut splits = outcome?;
        if splits.is_empty() {
            return Err(PlannerError::InvariantViolation(
                "planning produced no splits".to_string(),
            ));
        }
        splits.shuffle(&mut thread_rng());
        Ok(splits)
    }

    /// Wait for every pending unit. A failed unit consumes one shared retry
    /// and is resubmitted as an equivalent unit for the same task; once the
    /// budget is gone the whole invocation fails with the triggering error.
    async fn collect(
        &self,
        pending: &mut Vec<Unit>,
        ctx: &PlanningContext,
        limiter: &Option<Arc<Semaphore>>,
    ) -> Result<Vec<Split>, PlannerError> {
        let mut splits = Vec::new();
        let mut retries = 0u32;
        while !pending.is_empty() {
            // Snapshot the currently pending units and wait on each in turn;
            // resubmissions land back in `pending` for the next pass.
            let mut snapshot = std::mem::take(pending).into_iter();
            while let Some(unit) = snapshot.next() {
                let failure = match unit.handle.await {
                    Ok(Ok(batch)) => {
                        splits.extend(batch);
                        continue;
                    }
                    Ok(Err(err)) => err,
                    Err(join_err) => PlannerError::InvariantViolation(format!(
                        "planning unit crashed: {join_err}"
                    )),
                };
                if retries >= self.settings.max_retries {
                    // Hand the rest of the snapshot back so the caller can
                    // cancel it.
                    pending.extend(snapshot);
                    return Err(PlannerError::PlanningExhausted {
                        retries,
                        source: Box::new(failure),
                    });
                }
                error!(
                    error = %failure,
                    start_token = %unit.task.range.start_token,
                    end_token = %unit.task.range.end_token,
                    "planning unit failed, resubmitting"
                );
                retries += 1;
                pending.push(self.spawn_unit(unit.task, ctx, limiter.clone()));
            }
        }
        Ok(splits)
    }

    fn spawn_unit(
        &self,
        task: PlanningTask,
        ctx: &PlanningContext,
        limiter: Option<Arc<Semaphore>>,
    ) -> Unit {
        let connector = Arc::clone(&self.connector);
        let resolver = Arc::clone(&self.resolver);
        let ctx = ctx.clone();
        let unit_task = task.clone();
        let deadline = self.settings.unit_timeout_secs.map(Duration::from_secs);
        let handle = tokio::spawn(async move {
            let _permit = match limiter.as_ref() {
                Some(pool) => Some(pool.acquire().await.map_err(|_| {
                    PlannerError::InvariantViolation("worker pool closed".to_string())
                })?),
                None => None,
            };
            let work = run_unit(connector.as_ref(), resolver.as_ref(), &ctx, &unit_task);
            match deadline {
                Some(limit) => tokio::time::timeout(limit, work)
                    .await
                    .map_err(|_| PlannerError::UnitTimeout(limit))?,
                None => work.await,
            }
        });
        Unit { handle, task }
    }
}

/// One planning execution unit: query the range's replicas for sub-splits
/// and assemble them into final work units.
async fn run_unit(
    connector: &dyn NodeConnector,
    resolver: &dyn EndpointResolver,
    ctx: &PlanningContext,
    task: &PlanningTask,
) -> Result<Vec<Split>, PlannerError> {
    let assembler = SplitAssembler::new(&task.range, ctx.partitioner, resolver)?;
    let sub_splits = RangeSplitClient::fetch_sub_splits(connector, ctx, task).await?;
    assembler.assemble(sub_splits)
}
