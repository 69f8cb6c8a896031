pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod workflow;

use services::PaymentApi;
use std::sync::Arc;

/// Shared application state: the backend every stage view talks to.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn PaymentApi>,
}

impl AppState {
    pub fn new(api: Arc<dyn PaymentApi>) -> Self {
        Self { api }
    }
}
