use std::sync::Arc;
use validator::Validate;

use super::{DisposeHandle, Notice, ViewState};
use crate::error::WorkflowError;
use crate::models::{NewPayment, PaymentRecord, RecordId};
use crate::services::metrics::record_stage_action;
use crate::services::{ApiError, PaymentApi};
use crate::workflow::search::filter_records;

const STAGE: &str = "request";

/// Entry point of the pipeline: operators raise payment requests here.
pub struct RequestStage {
    api: Arc<dyn PaymentApi>,
    records: Vec<PaymentRecord>,
    error: Option<String>,
    form: NewPayment,
    loading: bool,
    view: ViewState,
}

impl RequestStage {
    pub fn new(api: Arc<dyn PaymentApi>) -> Self {
        Self {
            api,
            records: Vec::new(),
            error: None,
            form: NewPayment::default(),
            loading: false,
            view: ViewState::new(),
        }
    }

    pub fn records(&self) -> &[PaymentRecord] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Form contents; reset after a successful submit, kept after a failed one.
    pub fn form(&self) -> &NewPayment {
        &self.form
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notices(&self) -> &[Notice] {
        self.view.notices()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.view.take_notices()
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        self.view.dispose_handle()
    }

    /// Records matching `search`; never touches the backend.
    pub fn list(&self, search: &str) -> Vec<&PaymentRecord> {
        filter_records(&self.records, search)
    }

    pub async fn refresh(&mut self) -> Result<(), WorkflowError> {
        self.view.ensure_live()?;
        self.loading = true;

        let api = Arc::clone(&self.api);
        let fetched = self
            .view
            .guard(async move { api.list_requests().await })
            .await;
        self.loading = false;
        let result = fetched?;

        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(stage = STAGE, error = %e, "Failed to load payment requests");
                let message = "Failed to load payment requests".to_string();
                self.error = Some(message.clone());
                self.view.failure(message);
            }
        }
        Ok(())
    }

    /// Validate and create a record, then reload the list.
    ///
    /// Invalid input is reported without calling the backend.
    pub async fn submit(&mut self, form: NewPayment) -> Result<PaymentRecord, WorkflowError> {
        let result = self.try_submit(form).await;
        record_stage_action(STAGE, "submit", result.is_ok());
        if let Err(e) = &result {
            self.view.report(STAGE, e);
        }
        result
    }

    async fn try_submit(&mut self, form: NewPayment) -> Result<PaymentRecord, WorkflowError> {
        self.view.ensure_live()?;
        self.form = form.normalized();
        self.form.validate()?;

        let created = self.api.create(&self.form).await?;

        tracing::info!(
            stage = STAGE,
            record_id = %created.id,
            unique_no = %created.unique_no,
            amount = created.amount,
            "Payment request created"
        );
        self.form = NewPayment::default();
        self.view
            .success(format!("Payment request {} created", created.unique_no));

        match self.refresh().await {
            Err(WorkflowError::Disposed) | Ok(()) => Ok(created),
            Err(e) => Err(e),
        }
    }

    /// Delete a pending record and drop it from the list without refetching.
    pub async fn remove(&mut self, id: &RecordId) -> Result<(), WorkflowError> {
        let result = self.try_remove(id).await;
        record_stage_action(STAGE, "delete", result.is_ok());
        if let Err(e) = &result {
            self.view.report(STAGE, e);
        }
        result
    }

    async fn try_remove(&mut self, id: &RecordId) -> Result<(), WorkflowError> {
        self.view.ensure_live()?;
        let record = self
            .records
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| match self.error {
                Some(_) => {
                    WorkflowError::Api(ApiError::Unavailable("payment request list".to_string()))
                }
                None => WorkflowError::NotInQueue(id.clone()),
            })?;
        if !record.status.is_deletable() {
            return Err(WorkflowError::NotDeletable(record.status));
        }

        let api = Arc::clone(&self.api);
        let target = id.clone();
        self.view
            .guard(async move { api.delete(&target).await })
            .await??;

        tracing::info!(stage = STAGE, record_id = %id, "Payment request deleted");
        self.records.retain(|r| &r.id != id);
        self.view.success("Payment request deleted");
        Ok(())
    }
}
