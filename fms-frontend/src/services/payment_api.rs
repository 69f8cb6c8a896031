//! Contract with the payment FMS backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Decision, NewPayment, PaymentRecord, PaymentStatus, PaymentType, RecordId};

/// Stages that expose a pending and a history queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueStage {
    Approval,
    MakePayment,
    TallyEntry,
    Rectify,
}

impl QueueStage {
    pub fn slug(self) -> &'static str {
        match self {
            QueueStage::Approval => "approval",
            QueueStage::MakePayment => "make-payment",
            QueueStage::TallyEntry => "tally-entry",
            QueueStage::Rectify => "rectify",
        }
    }

    /// Whether a record with `status` belongs in the given queue of this stage.
    pub fn admits(self, kind: QueueKind, status: PaymentStatus) -> bool {
        use PaymentStatus::*;

        match (self, kind) {
            (QueueStage::Approval, QueueKind::Pending) => status == Pending,
            (QueueStage::Approval, QueueKind::History) => {
                matches!(status, Approved | Rejected | Paid | Processed | Rectify)
            }
            (QueueStage::MakePayment, QueueKind::Pending) => status == Approved,
            (QueueStage::MakePayment, QueueKind::History) => matches!(status, Paid | Processed),
            (QueueStage::TallyEntry, QueueKind::Pending) => status == Paid,
            (QueueStage::TallyEntry, QueueKind::History) => status == Processed,
            (QueueStage::Rectify, QueueKind::Pending) => matches!(status, Rejected | Rectify),
            // Resubmitted records continue through the pipeline under any status.
            (QueueStage::Rectify, QueueKind::History) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    Pending,
    History,
}

impl QueueKind {
    pub fn slug(self) -> &'static str {
        match self {
            QueueKind::Pending => "pending",
            QueueKind::History => "history",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("backend rejected the change: {0}")]
    Rejected(String),

    /// The list an action depends on failed to load, so the target record
    /// cannot be located.
    #[error("{0} could not be loaded")]
    Unavailable(String),
}

/// Operations the workflow stages need from the backend.
///
/// Implemented over HTTP by [`super::PaymentClient`] and in memory by
/// [`super::InMemoryPaymentApi`].
#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Every record, as shown on the request stage.
    async fn list_requests(&self) -> Result<Vec<PaymentRecord>, ApiError>;

    async fn fetch_queue(
        &self,
        stage: QueueStage,
        kind: QueueKind,
    ) -> Result<Vec<PaymentRecord>, ApiError>;

    async fn create(&self, payment: &NewPayment) -> Result<PaymentRecord, ApiError>;

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError>;

    async fn decide(&self, id: &RecordId, decision: Decision, remarks: &str)
        -> Result<(), ApiError>;

    async fn pay(&self, id: &RecordId, payment_type: PaymentType) -> Result<(), ApiError>;

    /// Mark every id processed in one call.
    async fn tally(&self, ids: &[RecordId]) -> Result<(), ApiError>;

    /// Send a rejected record back for audit.
    async fn resubmit(&self, id: &RecordId, remarks: &str) -> Result<(), ApiError>;
}
