//! Stage views of the payment pipeline.
//!
//! Each view owns its in-memory state (records, selection, notices) and talks
//! to the backend only through [`PaymentApi`](crate::services::PaymentApi).
//! Views are cheap to build; handlers create one per request.

pub mod approval;
pub mod make_payment;
pub mod queue;
pub mod rectify;
pub mod request;
pub mod search;
pub mod tally_entry;
pub mod transition;

pub use approval::{Approval, ApprovalStage};
pub use make_payment::{MakePayment, MakePaymentStage};
pub use queue::{StageSpec, StagedQueue};
pub use rectify::{Rectify, RectifyStage};
pub use request::RequestStage;
pub use tally_entry::{TallyEntry, TallyEntryStage};
pub use transition::Transition;

use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::WorkflowError;
use service_core::error::ACTION_FAILED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message for the user, e.g. a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Cancels the view it was taken from. Responses that arrive afterwards are
/// dropped without touching the view.
#[derive(Debug, Clone)]
pub struct DisposeHandle(CancellationToken);

impl DisposeHandle {
    pub fn dispose(&self) {
        self.0.cancel();
    }
}

/// State every stage view carries besides its records.
#[derive(Debug)]
pub(crate) struct ViewState {
    notices: Vec<Notice>,
    cancel: CancellationToken,
}

impl ViewState {
    pub(crate) fn new() -> Self {
        Self {
            notices: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub(crate) fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn dispose_handle(&self) -> DisposeHandle {
        DisposeHandle(self.cancel.clone())
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn ensure_live(&self) -> Result<(), WorkflowError> {
        if self.is_disposed() {
            Err(WorkflowError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Await `future` unless the view is disposed first.
    pub(crate) async fn guard<F: Future>(&self, future: F) -> Result<F::Output, WorkflowError> {
        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WorkflowError::Disposed),
            output = future => {
                if cancel.is_cancelled() {
                    Err(WorkflowError::Disposed)
                } else {
                    Ok(output)
                }
            }
        }
    }

    pub(crate) fn success(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::success(message));
    }

    pub(crate) fn failure(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::error(message));
    }

    /// Log `err` and surface it. Backend failures all read "Action failed".
    pub(crate) fn report(&mut self, stage: &'static str, err: &WorkflowError) {
        match err {
            WorkflowError::Disposed => {}
            WorkflowError::Api(api) => {
                tracing::error!(stage, error = %api, "Stage action failed");
                self.failure(ACTION_FAILED);
            }
            client_side => {
                tracing::warn!(stage, error = %client_side, "Stage action refused");
                self.failure(client_side.to_string());
            }
        }
    }
}
