//! service-core: shared infrastructure for the FMS front-end services.
pub mod error;
pub mod middleware;
pub mod observability;
