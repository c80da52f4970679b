use async_trait::async_trait;
use floe_common::model::Split;

use crate::error::PlannerError;
use crate::planner::SplitPlanner;

/// Planning surface exposed to the host batch framework. Both calling
/// conventions marshal the result of the same core entry point; neither
/// alters planning semantics.
#[async_trait]
pub trait SplitSource {
    /// Current convention: an ordered list of splits.
    async fn job_splits(&self) -> Result<Vec<Split>, PlannerError>;

    /// Legacy array convention. The caller's requested split count is a
    /// hint the planner has never honored; it is accepted and ignored.
    async fn job_splits_legacy(
        &self,
        _requested_count: usize,
    ) -> Result<Box<[Split]>, PlannerError> {
        Ok(self.job_splits().await?.into_boxed_slice())
    }
}

#[async_trait]
impl SplitSource for SplitPlanner {
    async fn job_splits(&self) -> Result<Vec<Split>, PlannerError> {
        self.plan().await
    }
}
