//! HTTP client for the payment FMS backend.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::Duration;

use super::payment_api::{ApiError, PaymentApi, QueueKind, QueueStage};
use crate::config::ApiSettings;
use crate::models::{
    transform_payment_fms, Decision, NewPayment, PaymentRecord, PaymentType, RawPaymentRecord,
    RecordId, RecordList,
};

const COLLECTION: &str = "/payment-fms";

pub struct PaymentClient {
    client: Client,
    base_url: String,
}

impl PaymentClient {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build payment API client: {}", e))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, COLLECTION, path)
    }

    fn record_url(&self, id: &RecordId, action: &str) -> String {
        self.url(&format!("/{}{}", id, action))
    }

    async fn send(
        &self,
        method: &'static str,
        url: String,
        request: TracedRequest,
    ) -> Result<(String, Response), ApiError> {
        tracing::debug!(method, url = %url, "Calling payment API");

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send {} request to {}: {}", method, url, e);
            ApiError::Transport {
                url: url.clone(),
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(method, url = %url, status = status.as_u16(), "Payment API error");
            return Err(ApiError::Status {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok((url, response))
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
        let body = response.text().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Undecodable payment API response");
            ApiError::Decode {
                url: url.to_string(),
                source: e,
            }
        })
    }

    async fn get_list(&self, url: String) -> Result<Vec<PaymentRecord>, ApiError> {
        let request = self.client.traced_get(&url);
        let (url, response) = self.send("GET", url, request).await?;
        let list: RecordList = Self::decode(&url, response).await?;
        Ok(list.into_records())
    }
}

#[async_trait]
impl PaymentApi for PaymentClient {
    async fn list_requests(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        self.get_list(self.url("")).await
    }

    async fn fetch_queue(
        &self,
        stage: QueueStage,
        kind: QueueKind,
    ) -> Result<Vec<PaymentRecord>, ApiError> {
        self.get_list(self.url(&format!("/{}/{}", stage.slug(), kind.slug())))
            .await
    }

    async fn create(&self, payment: &NewPayment) -> Result<PaymentRecord, ApiError> {
        let url = self.url("");
        let request = self.client.traced_post(&url).json(payment);
        let (url, response) = self.send("POST", url, request).await?;

        let body = response.text().await.map_err(|e| ApiError::Transport {
            url: url.clone(),
            source: e,
        })?;

        // Some deployments answer 201 with an empty body.
        if body.trim().is_empty() {
            let echoed = serde_json::to_value(payment).unwrap_or_default();
            return Ok(transform_payment_fms(&RawPaymentRecord::from(echoed)));
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode { url, source: e })?;

        // Either the record itself or `{ "data": record }`.
        let record = match value {
            serde_json::Value::Object(mut map) if map.get("data").is_some_and(|d| d.is_object()) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };

        Ok(transform_payment_fms(&RawPaymentRecord::from(record)))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let url = self.record_url(id, "");
        let request = self.client.traced_delete(&url);
        self.send("DELETE", url, request).await?;
        Ok(())
    }

    async fn decide(
        &self,
        id: &RecordId,
        decision: Decision,
        remarks: &str,
    ) -> Result<(), ApiError> {
        let url = self.record_url(id, "/approval");
        let request = self
            .client
            .traced_patch(&url)
            .json(&json!({ "status": decision, "remarks": remarks }));
        self.send("PATCH", url, request).await?;
        Ok(())
    }

    async fn pay(&self, id: &RecordId, payment_type: PaymentType) -> Result<(), ApiError> {
        let url = self.record_url(id, "/payment");
        let request = self
            .client
            .traced_patch(&url)
            .json(&json!({ "paymentType": payment_type }));
        self.send("PATCH", url, request).await?;
        Ok(())
    }

    async fn tally(&self, ids: &[RecordId]) -> Result<(), ApiError> {
        let url = self.url("/tally-entry");
        let request = self.client.traced_post(&url).json(&json!({ "ids": ids }));
        self.send("POST", url, request).await?;
        Ok(())
    }

    async fn resubmit(&self, id: &RecordId, remarks: &str) -> Result<(), ApiError> {
        let url = self.record_url(id, "/resubmit");
        let request = self
            .client
            .traced_post(&url)
            .json(&json!({ "remarks": remarks }));
        self.send("POST", url, request).await?;
        Ok(())
    }
}
