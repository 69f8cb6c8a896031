use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{DisposeHandle, StageSpec, StagedQueue, Transition};
use crate::error::WorkflowError;
use crate::models::RecordId;
use crate::services::{ApiError, PaymentApi, QueueStage};

/// Accountants book paid records into the ledger in batches.
pub struct TallyEntry;

#[async_trait]
impl StageSpec for TallyEntry {
    type Action = ();

    const STAGE: QueueStage = QueueStage::TallyEntry;
    const TITLE: &'static str = "Tally Entry";

    fn transition(_action: &()) -> Transition {
        Transition::Tally
    }

    async fn perform(api: &dyn PaymentApi, ids: &[RecordId], _action: &()) -> Result<(), ApiError> {
        api.tally(ids).await
    }
}

/// Tally-entry queue plus the checkbox selection over its pending records.
pub struct TallyEntryStage {
    queue: StagedQueue<TallyEntry>,
    selected: BTreeSet<RecordId>,
}

impl TallyEntryStage {
    pub fn new(api: Arc<dyn PaymentApi>) -> Self {
        Self {
            queue: StagedQueue::new(api),
            selected: BTreeSet::new(),
        }
    }

    pub fn queue(&self) -> &StagedQueue<TallyEntry> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut StagedQueue<TallyEntry> {
        &mut self.queue
    }

    pub fn dispose_handle(&self) -> DisposeHandle {
        self.queue.dispose_handle()
    }

    pub fn selected(&self) -> &BTreeSet<RecordId> {
        &self.selected
    }

    pub fn is_all_selected(&self) -> bool {
        !self.queue.pending().is_empty() && self.selected.len() == self.queue.pending().len()
    }

    /// Refetch both queues, dropping selected ids that left the pending queue.
    pub async fn refresh(&mut self) -> Result<(), WorkflowError> {
        self.queue.refresh().await?;
        self.prune_selection();
        Ok(())
    }

    pub fn select_all(&mut self, checked: bool) {
        if checked {
            self.selected = self.queue.pending().iter().map(|r| r.id.clone()).collect();
        } else {
            self.selected.clear();
        }
    }

    /// Returns false when `id` is not in the pending queue.
    pub fn select_one(&mut self, id: &RecordId, checked: bool) -> bool {
        if !checked {
            self.selected.remove(id);
            return true;
        }

        if self.queue.find_pending(id).is_none() {
            return false;
        }
        self.selected.insert(id.clone());
        true
    }

    /// Mark every selected record processed in one backend call.
    pub async fn submit_batch(&mut self) -> Result<(), WorkflowError> {
        let ids: Vec<RecordId> = self.selected.iter().cloned().collect();
        self.queue.execute(&ids, ()).await?;
        self.selected.clear();
        Ok(())
    }

    fn prune_selection(&mut self) {
        let pending: BTreeSet<&RecordId> = self.queue.pending().iter().map(|r| &r.id).collect();
        self.selected.retain(|id| pending.contains(id));
    }
}
