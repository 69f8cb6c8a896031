#![allow(dead_code)]

use async_trait::async_trait;
use fms_frontend::models::{Decision, NewPayment, PaymentRecord, PaymentType, RecordId};
use fms_frontend::services::{ApiError, InMemoryPaymentApi, PaymentApi, QueueKind, QueueStage};
use fms_frontend::startup::build_router;
use fms_frontend::AppState;
use service_core::observability::init_test_tracing;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory backend that records every call and can be told to fail or
/// stall. Calls are logged by key: `create`, `decide`, `pay`, `tally`,
/// `resubmit`, `delete`, `list_requests` and `fetch_queue:<stage>/<kind>`.
pub struct RecordingApi {
    inner: InMemoryPaymentApi,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingApi {
    pub fn new(inner: InMemoryPaymentApi) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn seeded() -> Self {
        Self::new(InMemoryPaymentApi::seeded())
    }

    pub fn empty() -> Self {
        Self::new(InMemoryPaymentApi::new())
    }

    pub fn fail_on(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn stall(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, key: &str) -> bool {
        self.calls().iter().any(|call| call == key)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub async fn record(&self, id: &str) -> Option<PaymentRecord> {
        self.inner
            .snapshot()
            .await
            .into_iter()
            .find(|r| r.id.as_str() == id)
    }

    async fn enter(&self, key: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(key.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&key) {
            return Err(ApiError::Status {
                method: "TEST",
                url: key,
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentApi for RecordingApi {
    async fn list_requests(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        self.enter("list_requests".to_string()).await?;
        self.inner.list_requests().await
    }

    async fn fetch_queue(
        &self,
        stage: QueueStage,
        kind: QueueKind,
    ) -> Result<Vec<PaymentRecord>, ApiError> {
        self.enter(format!("fetch_queue:{}/{}", stage.slug(), kind.slug()))
            .await?;
        self.inner.fetch_queue(stage, kind).await
    }

    async fn create(&self, payment: &NewPayment) -> Result<PaymentRecord, ApiError> {
        self.enter("create".to_string()).await?;
        self.inner.create(payment).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.enter("delete".to_string()).await?;
        self.inner.delete(id).await
    }

    async fn decide(
        &self,
        id: &RecordId,
        decision: Decision,
        remarks: &str,
    ) -> Result<(), ApiError> {
        self.enter("decide".to_string()).await?;
        self.inner.decide(id, decision, remarks).await
    }

    async fn pay(&self, id: &RecordId, payment_type: PaymentType) -> Result<(), ApiError> {
        self.enter("pay".to_string()).await?;
        self.inner.pay(id, payment_type).await
    }

    async fn tally(&self, ids: &[RecordId]) -> Result<(), ApiError> {
        self.enter("tally".to_string()).await?;
        self.inner.tally(ids).await
    }

    async fn resubmit(&self, id: &RecordId, remarks: &str) -> Result<(), ApiError> {
        self.enter("resubmit".to_string()).await?;
        self.inner.resubmit(id, remarks).await
    }
}

pub fn new_payment(unique_no: &str, amount: f64) -> NewPayment {
    NewPayment {
        unique_no: unique_no.to_string(),
        fms_name: "Store".to_string(),
        pay_to: "Acme Supplies".to_string(),
        amount,
        remarks: Some("monthly stock".to_string()),
        attachment: None,
    }
}

pub fn ids(records: &[PaymentRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

pub struct TestApp {
    pub address: String,
    pub api: Arc<RecordingApi>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(RecordingApi::seeded()).await
    }

    pub async fn spawn_with(api: RecordingApi) -> Self {
        init_test_tracing();

        let api = Arc::new(api);
        let app = build_router(AppState::new(api.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().expect("No local address").port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            api,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
