use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::observability::REQUEST_ID_HEADER;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::{health_check, index},
    metrics::metrics,
    pages::{request_page, stage_page},
    queues::{decide, list_queue, pay, resubmit, tally},
    request::{create_request, delete_request, list_requests},
};
use crate::workflow::{Approval, MakePayment, Rectify, TallyEntry};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        // Stage pages
        .route("/request", get(request_page))
        .route("/approval", get(stage_page::<Approval>))
        .route("/make-payment", get(stage_page::<MakePayment>))
        .route("/tally-entry", get(stage_page::<TallyEntry>))
        .route("/rectify", get(stage_page::<Rectify>))
        // Stage actions
        .route("/api/request", get(list_requests).post(create_request))
        .route("/api/request/:id", delete(delete_request))
        .route("/api/approval", get(list_queue::<Approval>))
        .route("/api/approval/:id", post(decide))
        .route("/api/make-payment", get(list_queue::<MakePayment>))
        .route("/api/make-payment/:id", post(pay))
        .route("/api/tally-entry", get(list_queue::<TallyEntry>).post(tally))
        .route("/api/rectify", get(list_queue::<Rectify>))
        .route("/api/rectify/:id", post(resubmit))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
