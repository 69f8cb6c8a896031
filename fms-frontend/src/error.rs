use service_core::error::AppError;
use thiserror::Error;

use crate::models::{PaymentStatus, RecordId};
use crate::services::ApiError;
use crate::workflow::Transition;

/// Failure of a stage operation.
///
/// Validation failures never reach the network; everything from the API
/// collapses into [`WorkflowError::Api`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Select at least one record")]
    EmptySelection,

    #[error("Record {0} is not in the pending queue")]
    NotInQueue(RecordId),

    #[error("Cannot {transition} a record that is {from}")]
    IllegalTransition {
        from: PaymentStatus,
        transition: Transition,
    },

    #[error("Only pending records can be deleted; this one is {0}")]
    NotDeletable(PaymentStatus),

    #[error("Stage view has been disposed")]
    Disposed,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(errors) => AppError::ValidationError(errors),
            WorkflowError::EmptySelection => {
                let mut error = validator::ValidationError::new("empty_selection");
                error.message = Some(err.to_string().into());
                let mut errors = validator::ValidationErrors::new();
                errors.add("ids", error);
                AppError::ValidationError(errors)
            }
            WorkflowError::NotInQueue(_) => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            WorkflowError::IllegalTransition { .. } | WorkflowError::NotDeletable(_) => {
                AppError::Conflict(anyhow::anyhow!(err.to_string()))
            }
            WorkflowError::Disposed => AppError::ServiceUnavailable,
            WorkflowError::Api(api) => AppError::BadGateway(api.to_string()),
        }
    }
}
