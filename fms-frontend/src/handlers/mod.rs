pub mod app;
pub mod layout;
pub mod metrics;
pub mod pages;
pub mod queues;
pub mod request;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}
