//! The pending/history queue shared by approval, make-payment, tally-entry
//! and rectify. A [`StageSpec`] supplies what differs between them: which
//! queues to query and which backend call moves a record on.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DisposeHandle, Notice, Transition, ViewState};
use crate::error::WorkflowError;
use crate::models::{PaymentRecord, RecordId};
use crate::services::metrics::record_stage_action;
use crate::services::{ApiError, PaymentApi, QueueKind, QueueStage};
use crate::workflow::search::filter_records;

#[async_trait]
pub trait StageSpec: Send + Sync + 'static {
    /// User input that accompanies the transition (decision, payment type...).
    type Action: Send + Sync;

    const STAGE: QueueStage;
    const TITLE: &'static str;

    fn transition(action: &Self::Action) -> Transition;

    /// Client-side checks run before any network call.
    fn validate(_action: &Self::Action) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn perform(
        api: &dyn PaymentApi,
        ids: &[RecordId],
        action: &Self::Action,
    ) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Default)]
struct QueueState {
    records: Vec<PaymentRecord>,
    error: Option<String>,
}

pub struct StagedQueue<S: StageSpec> {
    api: Arc<dyn PaymentApi>,
    pending: QueueState,
    history: QueueState,
    loading: bool,
    view: ViewState,
    _stage: PhantomData<fn() -> S>,
}

impl<S: StageSpec> StagedQueue<S> {
    pub fn new(api: Arc<dyn PaymentApi>) -> Self {
        Self {
            api,
            pending: QueueState::default(),
            history: QueueState::default(),
            loading: false,
            view: ViewState::new(),
            _stage: PhantomData,
        }
    }

    pub fn pending(&self) -> &[PaymentRecord] {
        &self.pending.records
    }

    pub fn history(&self) -> &[PaymentRecord] {
        &self.history.records
    }

    pub fn pending_error(&self) -> Option<&str> {
        self.pending.error.as_deref()
    }

    pub fn history_error(&self) -> Option<&str> {
        self.history.error.as_deref()
    }

    pub fn search_pending(&self, term: &str) -> Vec<&PaymentRecord> {
        filter_records(&self.pending.records, term)
    }

    pub fn search_history(&self, term: &str) -> Vec<&PaymentRecord> {
        filter_records(&self.history.records, term)
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

    pub fn is_disposed(&self) -> bool {
        self.view.is_disposed()
    }

    pub fn find_pending(&self, id: &RecordId) -> Option<&PaymentRecord> {
        self.pending.records.iter().find(|r| &r.id == id)
    }

    /// Error for an id absent from the pending queue. When the queue itself
    /// failed to load this is a backend failure, not a missing record.
    pub(crate) fn missing_pending(&self, id: &RecordId) -> WorkflowError {
        if self.pending.error.is_some() {
            WorkflowError::Api(ApiError::Unavailable(format!(
                "{} pending queue",
                S::STAGE.slug()
            )))
        } else {
            WorkflowError::NotInQueue(id.clone())
        }
    }

    /// Fetch both queues concurrently.
    ///
    /// A failed queue keeps its previous records and gets an error message;
    /// the other queue is still updated. Returns `Disposed` (and changes
    /// nothing) if the view is disposed before the responses arrive.
    pub async fn refresh(&mut self) -> Result<(), WorkflowError> {
        self.view.ensure_live()?;
        self.loading = true;

        let api = Arc::clone(&self.api);
        let fetched = self
            .view
            .guard(async move {
                tokio::join!(
                    api.fetch_queue(S::STAGE, QueueKind::Pending),
                    api.fetch_queue(S::STAGE, QueueKind::History),
                )
            })
            .await;
        self.loading = false;

        let (pending, history) = fetched.inspect_err(|_| {
            tracing::debug!(stage = S::STAGE.slug(), "View disposed, dropping queue responses");
        })?;

        self.apply(QueueKind::Pending, pending);
        self.apply(QueueKind::History, history);
        Ok(())
    }

    fn apply(&mut self, kind: QueueKind, result: Result<Vec<PaymentRecord>, ApiError>) {
        let queue = match kind {
            QueueKind::Pending => &mut self.pending,
            QueueKind::History => &mut self.history,
        };

        match result {
            Ok(records) => {
                let fetched = records.len();
                queue.records = records
                    .into_iter()
                    .filter(|record| S::STAGE.admits(kind, record.status))
                    .collect();
                queue.error = None;

                if queue.records.len() != fetched {
                    tracing::warn!(
                        stage = S::STAGE.slug(),
                        queue = kind.slug(),
                        dropped = fetched - queue.records.len(),
                        "Backend returned records outside this queue"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    stage = S::STAGE.slug(),
                    queue = kind.slug(),
                    error = %e,
                    "Failed to load queue"
                );
                let message = format!("Failed to load {} records", kind.slug());
                queue.error = Some(message.clone());
                self.view.failure(message);
            }
        }
    }

    /// Move `ids` through the stage's transition, then refetch both queues.
    ///
    /// Every id must currently sit in the pending queue with a status the
    /// transition accepts; otherwise nothing is sent.
    pub async fn execute(&mut self, ids: &[RecordId], action: S::Action) -> Result<(), WorkflowError> {
        let transition = S::transition(&action);
        let result = self.try_execute(ids, &action, transition).await;

        if !matches!(result, Err(WorkflowError::Disposed)) {
            record_stage_action(S::STAGE.slug(), transition.as_str(), result.is_ok());
        }
        if let Err(e) = &result {
            self.view.report(S::STAGE.slug(), e);
        }
        result
    }

    async fn try_execute(
        &mut self,
        ids: &[RecordId],
        action: &S::Action,
        transition: Transition,
    ) -> Result<(), WorkflowError> {
        self.view.ensure_live()?;
        if ids.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }
        S::validate(action)?;

        for id in ids {
            let record = self
                .find_pending(id)
                .ok_or_else(|| self.missing_pending(id))?;
            record.status.apply(transition)?;
        }

        S::perform(self.api.as_ref(), ids, action).await?;

        tracing::info!(
            stage = S::STAGE.slug(),
            transition = transition.as_str(),
            count = ids.len(),
            "Records moved to {}",
            transition.target()
        );
        self.view.success(format!(
            "{} record(s) marked {}",
            ids.len(),
            transition.target()
        ));

        // The change is committed on the backend; a view disposed meanwhile
        // simply skips the refetch.
        match self.refresh().await {
            Err(WorkflowError::Disposed) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
