mod common;

use common::{RecordingApi, TestApp};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn queue_ids(body: &Value, queue: &str) -> Vec<String> {
    body[queue]
        .as_array()
        .expect("queue is not an array")
        .iter()
        .map(|record| record["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Health and pages
// =============================================================================

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fms-frontend");
}

#[tokio::test]
async fn index_redirects_to_request_stage() {
    let app = TestApp::spawn().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client.get(app.url("/")).send().await.unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/request");
}

#[tokio::test]
async fn stage_page_renders_its_own_title_and_queues() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .get(app.url("/make-payment"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = response.text().await.unwrap();
    assert!(html.contains("<title>Make Payment | Payment FMS</title>"));
    assert!(html.contains(r#"class="active">Make Payment</a>"#));
    assert!(html.contains("PAY-003"));
    assert!(html.contains("Pending (1)"));
}

#[tokio::test]
async fn request_page_applies_search() {
    let app = TestApp::spawn().await;

    let html = Client::new()
        .get(app.url("/request?search=zoho"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("PAY-004"));
    assert!(!html.contains("PAY-001"));
    assert!(html.contains(r#"id="new-payment""#));
}

// =============================================================================
// Request stage
// =============================================================================

#[tokio::test]
async fn create_request_returns_created_record() {
    let app = TestApp::spawn_with(RecordingApi::empty()).await;

    let response = Client::new()
        .post(app.url("/api/request"))
        .json(&json!({
            "uniqueNo": "PAY-100",
            "fmsName": "Store",
            "payTo": "Acme Supplies",
            "amount": 1500.0,
            "attachment": "invoice.pdf"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["created"]["uniqueNo"], "PAY-100");
    assert_eq!(body["created"]["status"], "Pending");
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
    assert_eq!(body["notices"][0]["level"], "success");
}

#[tokio::test]
async fn invalid_request_is_unprocessable() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .post(app.url("/api/request"))
        .json(&json!({ "uniqueNo": "PAY-200", "fmsName": "Store", "payTo": "", "amount": -5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation error");
    assert!(!app.api.called("create"));
}

#[tokio::test]
async fn deleting_an_approved_request_conflicts() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .delete(app.url("/api/request/seed-3"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(!app.api.called("delete"));
}

#[tokio::test]
async fn deleting_a_pending_request_removes_it() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .delete(app.url("/api/request/seed-2"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(!queue_ids(&body, "records").contains(&"seed-2".to_string()));
    assert!(app.api.record("seed-2").await.is_none());
}

// =============================================================================
// Queue stages
// =============================================================================

#[tokio::test]
async fn approving_moves_record_to_payment_queue() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(app.url("/api/approval/seed-1"))
        .json(&json!({ "decision": "Approved", "remarks": "ok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(!queue_ids(&body, "pending").contains(&"seed-1".to_string()));
    assert!(queue_ids(&body, "history").contains(&"seed-1".to_string()));
    assert_eq!(body["page"]["slug"], "approval");

    let body: Value = client
        .get(app.url("/api/make-payment"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let pending = queue_ids(&body, "pending");
    assert!(pending.contains(&"seed-1".to_string()));
    assert!(pending.contains(&"seed-3".to_string()));
}

#[tokio::test]
async fn paying_a_record_outside_the_queue_is_not_found() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .post(app.url("/api/make-payment/seed-1"))
        .json(&json!({ "paymentType": "UPI" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!app.api.called("pay"));
}

#[tokio::test]
async fn tally_books_the_selected_batch() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .post(app.url("/api/tally-entry"))
        .json(&json!({ "ids": ["seed-4"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(queue_ids(&body, "pending").is_empty());
    assert!(queue_ids(&body, "history").contains(&"seed-4".to_string()));
}

#[tokio::test]
async fn empty_tally_batch_is_unprocessable() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .post(app.url("/api/tally-entry"))
        .json(&json!({ "ids": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!app.api.called("tally"));
}

#[tokio::test]
async fn rectify_resubmits_with_remarks() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let refused = client
        .post(app.url("/api/rectify/seed-6"))
        .json(&json!({ "remarks": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(app.url("/api/rectify/seed-6"))
        .json(&json!({ "remarks": "corrected payee" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(queue_ids(&body, "history").contains(&"seed-6".to_string()));
}

#[tokio::test]
async fn backend_failure_is_reported_as_action_failed() {
    let api = RecordingApi::seeded();
    api.fail_on("decide");
    let app = TestApp::spawn_with(api).await;

    let response = Client::new()
        .post(app.url("/api/approval/seed-1"))
        .json(&json!({ "decision": "Rejected" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Action failed");
}

#[tokio::test]
async fn queue_errors_are_reported_per_queue() {
    let api = RecordingApi::seeded();
    api.fail_on("fetch_queue:tally-entry/pending");
    let app = TestApp::spawn_with(api).await;

    let response = Client::new()
        .get(app.url("/api/tally-entry"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["pendingError"].is_string());
    assert!(body["historyError"].is_null());
    assert_eq!(queue_ids(&body, "history"), vec!["seed-5".to_string()]);
}

#[tokio::test]
async fn action_on_an_unloaded_queue_is_action_failed() {
    let api = RecordingApi::seeded();
    api.fail_on("fetch_queue:approval/pending");
    let app = TestApp::spawn_with(api).await;

    let response = Client::new()
        .post(app.url("/api/approval/seed-1"))
        .json(&json!({ "decision": "Approved", "remarks": "ok" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Action failed");
    assert!(!app.api.called("decide"));
}

#[tokio::test]
async fn tally_on_an_unloaded_queue_is_action_failed() {
    let api = RecordingApi::seeded();
    api.fail_on("fetch_queue:tally-entry/pending");
    let app = TestApp::spawn_with(api).await;

    let response = Client::new()
        .post(app.url("/api/tally-entry"))
        .json(&json!({ "ids": ["seed-4"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!app.api.called("tally"));
}

#[tokio::test]
async fn delete_on_an_unloaded_request_list_is_action_failed() {
    let api = RecordingApi::seeded();
    api.fail_on("list_requests");
    let app = TestApp::spawn_with(api).await;

    let response = Client::new()
        .delete(app.url("/api/request/seed-1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Action failed");
    assert!(!app.api.called("delete"));
}
