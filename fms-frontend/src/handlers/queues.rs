use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use super::layout::PageConfig;
use super::SearchParams;
use crate::models::{Decision, PaymentRecord, PaymentType, RecordId};
use crate::workflow::{
    Approval, MakePayment, Notice, Rectify, StageSpec, StagedQueue, TallyEntryStage,
};
use crate::AppState;

/// JSON snapshot of a stage view after a load or an action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub page: PageConfig,
    pub pending: Vec<PaymentRecord>,
    pub history: Vec<PaymentRecord>,
    pub pending_error: Option<String>,
    pub history_error: Option<String>,
    pub notices: Vec<Notice>,
}

impl QueueView {
    pub fn from_queue<S: StageSpec>(queue: &mut StagedQueue<S>, search: &str) -> Self {
        Self {
            page: PageConfig::for_stage::<S>(),
            pending: queue.search_pending(search).into_iter().cloned().collect(),
            history: queue.search_history(search).into_iter().cloned().collect(),
            pending_error: queue.pending_error().map(str::to_string),
            history_error: queue.history_error().map(str::to_string),
            notices: queue.take_notices(),
        }
    }
}

pub async fn list_queue<S: StageSpec>(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<QueueView>, AppError> {
    let mut queue = StagedQueue::<S>::new(state.api.clone());
    queue.refresh().await?;
    Ok(Json(QueueView::from_queue(&mut queue, &params.search)))
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub decision: Decision,
    #[serde(default)]
    pub remarks: String,
}

pub async fn decide(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<QueueView>, AppError> {
    let mut queue = StagedQueue::<Approval>::new(state.api.clone());
    queue.refresh().await?;
    queue
        .process(&RecordId::from(id), body.decision, body.remarks)
        .await?;
    Ok(Json(QueueView::from_queue(&mut queue, "")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}

pub async fn pay(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PaymentBody>,
) -> Result<Json<QueueView>, AppError> {
    let mut queue = StagedQueue::<MakePayment>::new(state.api.clone());
    queue.refresh().await?;
    queue
        .process(&RecordId::from(id), body.payment_type)
        .await?;
    Ok(Json(QueueView::from_queue(&mut queue, "")))
}

#[derive(Debug, Deserialize)]
pub struct TallyBody {
    #[serde(default)]
    pub ids: Vec<RecordId>,
}

/// Select the given ids and book them in one batch.
pub async fn tally(
    State(state): State<AppState>,
    Json(body): Json<TallyBody>,
) -> Result<Json<QueueView>, AppError> {
    let mut stage = TallyEntryStage::new(state.api.clone());
    stage.refresh().await?;

    for id in &body.ids {
        if !stage.select_one(id, true) {
            tracing::warn!(record_id = %id, "Tally selection outside the pending queue");
            return Err(stage.queue().missing_pending(id).into());
        }
    }

    stage.submit_batch().await?;
    Ok(Json(QueueView::from_queue(stage.queue_mut(), "")))
}

#[derive(Debug, Deserialize)]
pub struct ResubmitBody {
    #[serde(default)]
    pub remarks: String,
}

pub async fn resubmit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ResubmitBody>,
) -> Result<Json<QueueView>, AppError> {
    let mut queue = StagedQueue::<Rectify>::new(state.api.clone());
    queue.refresh().await?;
    queue.resubmit(&RecordId::from(id), body.remarks).await?;
    Ok(Json(QueueView::from_queue(&mut queue, "")))
}
