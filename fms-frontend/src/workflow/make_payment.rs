use async_trait::async_trait;

use super::{StageSpec, StagedQueue, Transition};
use crate::error::WorkflowError;
use crate::models::{PaymentType, RecordId};
use crate::services::{ApiError, PaymentApi, QueueStage};

/// Payers settle approved records.
pub struct MakePayment;

#[derive(Debug, Clone, Copy)]
pub struct PaymentAction {
    pub payment_type: PaymentType,
}

#[async_trait]
impl StageSpec for MakePayment {
    type Action = PaymentAction;

    const STAGE: QueueStage = QueueStage::MakePayment;
    const TITLE: &'static str = "Make Payment";

    fn transition(_action: &PaymentAction) -> Transition {
        Transition::Pay
    }

    async fn perform(
        api: &dyn PaymentApi,
        ids: &[RecordId],
        action: &PaymentAction,
    ) -> Result<(), ApiError> {
        for id in ids {
            api.pay(id, action.payment_type).await?;
        }
        Ok(())
    }
}

pub type MakePaymentStage = StagedQueue<MakePayment>;

impl StagedQueue<MakePayment> {
    /// Mark `id` paid. Without a selection the payment type is cash.
    pub async fn process(
        &mut self,
        id: &RecordId,
        payment_type: Option<PaymentType>,
    ) -> Result<(), WorkflowError> {
        let action = PaymentAction {
            payment_type: payment_type.unwrap_or_default(),
        };
        self.execute(std::slice::from_ref(id), action).await
    }
}
