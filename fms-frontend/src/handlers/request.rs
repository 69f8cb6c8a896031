use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

use super::layout::PageConfig;
use super::SearchParams;
use crate::models::{NewPayment, PaymentRecord, RecordId};
use crate::workflow::{Notice, RequestStage};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub page: PageConfig,
    pub records: Vec<PaymentRecord>,
    pub error: Option<String>,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<PaymentRecord>,
}

impl RequestView {
    fn build(stage: &mut RequestStage, search: &str, created: Option<PaymentRecord>) -> Self {
        Self {
            page: PageConfig::request(),
            records: stage.list(search).into_iter().cloned().collect(),
            error: stage.error().map(str::to_string),
            notices: stage.take_notices(),
            created,
        }
    }
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RequestView>, AppError> {
    let mut stage = RequestStage::new(state.api.clone());
    stage.refresh().await?;
    Ok(Json(RequestView::build(&mut stage, &params.search, None)))
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(form): Json<NewPayment>,
) -> Result<(StatusCode, Json<RequestView>), AppError> {
    let mut stage = RequestStage::new(state.api.clone());
    let created = stage.submit(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestView::build(&mut stage, "", Some(created))),
    ))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestView>, AppError> {
    let mut stage = RequestStage::new(state.api.clone());
    stage.refresh().await?;
    stage.remove(&RecordId::from(id)).await?;
    Ok(Json(RequestView::build(&mut stage, "", None)))
}
