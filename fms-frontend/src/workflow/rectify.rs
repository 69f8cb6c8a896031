use async_trait::async_trait;
use validator::Validate;

use super::{StageSpec, StagedQueue, Transition};
use crate::error::WorkflowError;
use crate::models::RecordId;
use crate::services::{ApiError, PaymentApi, QueueStage};

/// Side loop for rejected records: the requester corrects the record and
/// sends it back to audit, where it re-enters the approval queue.
pub struct Rectify;

#[derive(Debug, Clone, Validate)]
pub struct ResubmitAction {
    #[validate(length(min = 1, message = "Describe what was corrected"))]
    pub remarks: String,
}

#[async_trait]
impl StageSpec for Rectify {
    type Action = ResubmitAction;

    const STAGE: QueueStage = QueueStage::Rectify;
    const TITLE: &'static str = "Rectify";

    fn transition(_action: &ResubmitAction) -> Transition {
        Transition::Resubmit
    }

    fn validate(action: &ResubmitAction) -> Result<(), WorkflowError> {
        action.validate()?;
        Ok(())
    }

    async fn perform(
        api: &dyn PaymentApi,
        ids: &[RecordId],
        action: &ResubmitAction,
    ) -> Result<(), ApiError> {
        for id in ids {
            api.resubmit(id, &action.remarks).await?;
        }
        Ok(())
    }
}

pub type RectifyStage = StagedQueue<Rectify>;

impl StagedQueue<Rectify> {
    pub async fn resubmit(
        &mut self,
        id: &RecordId,
        remarks: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        let action = ResubmitAction {
            remarks: remarks.into().trim().to_string(),
        };
        self.execute(std::slice::from_ref(id), action).await
    }
}
