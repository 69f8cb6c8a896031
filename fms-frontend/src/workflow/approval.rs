use async_trait::async_trait;

use super::{StageSpec, StagedQueue, Transition};
use crate::error::WorkflowError;
use crate::models::{Decision, RecordId};
use crate::services::{ApiError, PaymentApi, QueueStage};

/// Reviewers approve or reject freshly requested payments.
pub struct Approval;

#[derive(Debug, Clone)]
pub struct ApprovalAction {
    pub decision: Decision,
    pub remarks: String,
}

#[async_trait]
impl StageSpec for Approval {
    type Action = ApprovalAction;

    const STAGE: QueueStage = QueueStage::Approval;
    const TITLE: &'static str = "Approval";

    fn transition(action: &ApprovalAction) -> Transition {
        action.decision.into()
    }

    async fn perform(
        api: &dyn PaymentApi,
        ids: &[RecordId],
        action: &ApprovalAction,
    ) -> Result<(), ApiError> {
        for id in ids {
            api.decide(id, action.decision, action.remarks.trim()).await?;
        }
        Ok(())
    }
}

pub type ApprovalStage = StagedQueue<Approval>;

impl StagedQueue<Approval> {
    pub async fn process(
        &mut self,
        id: &RecordId,
        decision: Decision,
        remarks: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        let action = ApprovalAction {
            decision,
            remarks: remarks.into(),
        };
        self.execute(std::slice::from_ref(id), action).await
    }
}
