pub mod memory;
pub mod metrics;
pub mod payment_api;
pub mod payment_client;

pub use memory::InMemoryPaymentApi;
pub use payment_api::{ApiError, PaymentApi, QueueKind, QueueStage};
pub use payment_client::PaymentClient;

use std::sync::Arc;

use crate::config::{ApiBackend, ApiSettings};

/// Build the backend selected by configuration.
pub fn build_api(settings: &ApiSettings) -> anyhow::Result<Arc<dyn PaymentApi>> {
    match settings.backend {
        ApiBackend::Http => {
            let client = PaymentClient::new(settings)?;
            tracing::info!(base_url = %client.base_url(), "Using payment API over HTTP");
            Ok(Arc::new(client))
        }
        ApiBackend::Memory => {
            tracing::warn!("Using in-memory payment backend with seeded sample data");
            Ok(Arc::new(InMemoryPaymentApi::seeded()))
        }
    }
}
