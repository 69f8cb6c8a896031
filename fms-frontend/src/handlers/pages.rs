use askama::Template;
use axum::extract::{Query, State};
use service_core::error::AppError;

use super::layout::PageConfig;
use super::SearchParams;
use crate::models::PaymentRecord;
use crate::workflow::{Notice, NoticeLevel, RequestStage, StageSpec, StagedQueue};
use crate::AppState;

/// One table row, pre-formatted for display.
pub struct RecordRow {
    pub id: String,
    pub unique_no: String,
    pub fms_name: String,
    pub pay_to: String,
    pub amount: String,
    pub status: &'static str,
    pub payment_type: &'static str,
    pub remarks: String,
    pub created_at: String,
}

impl From<&PaymentRecord> for RecordRow {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            unique_no: record.unique_no.clone(),
            fms_name: record.fms_name.clone(),
            pay_to: record.pay_to.clone(),
            amount: record.formatted_amount(),
            status: record.status.as_str(),
            payment_type: record.payment_type.map(|t| t.as_str()).unwrap_or(""),
            remarks: record
                .stage_remarks
                .clone()
                .or_else(|| record.remarks.clone())
                .unwrap_or_default(),
            created_at: record.created_at.format("%d %b %Y %H:%M").to_string(),
        }
    }
}

pub struct TableSection {
    pub heading: &'static str,
    /// Empty when the queue loaded.
    pub error: String,
    pub rows: Vec<RecordRow>,
}

impl TableSection {
    fn new(heading: &'static str, error: Option<&str>, records: Vec<&PaymentRecord>) -> Self {
        Self {
            heading,
            error: error.unwrap_or_default().to_string(),
            rows: records.into_iter().map(RecordRow::from).collect(),
        }
    }
}

pub struct Flash {
    pub class: &'static str,
    pub message: String,
}

impl From<Notice> for Flash {
    fn from(notice: Notice) -> Self {
        let class = match notice.level {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Error => "notice-error",
        };
        Self {
            class,
            message: notice.message,
        }
    }
}

#[derive(Template)]
#[template(path = "stage.html")]
pub struct StageTemplate {
    pub page: PageConfig,
    pub search: String,
    pub show_form: bool,
    pub notices: Vec<Flash>,
    pub sections: Vec<TableSection>,
}

pub async fn request_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<StageTemplate, AppError> {
    let mut stage = RequestStage::new(state.api.clone());
    stage.refresh().await?;

    let sections = vec![TableSection::new(
        "Requests",
        stage.error(),
        stage.list(&params.search),
    )];

    Ok(StageTemplate {
        page: PageConfig::request(),
        search: params.search,
        show_form: true,
        notices: stage.take_notices().into_iter().map(Flash::from).collect(),
        sections,
    })
}

pub async fn stage_page<S: StageSpec>(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<StageTemplate, AppError> {
    let mut queue = StagedQueue::<S>::new(state.api.clone());
    queue.refresh().await?;

    let sections = vec![
        TableSection::new(
            "Pending",
            queue.pending_error(),
            queue.search_pending(&params.search),
        ),
        TableSection::new(
            "History",
            queue.history_error(),
            queue.search_history(&params.search),
        ),
    ];

    Ok(StageTemplate {
        page: PageConfig::for_stage::<S>(),
        search: params.search,
        show_form: false,
        notices: queue.take_notices().into_iter().map(Flash::from).collect(),
        sections,
    })
}
