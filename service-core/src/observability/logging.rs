use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TEST_INIT: Once = Once::new();

/// Install the global subscriber: env filter, JSON fmt layer and, when an
/// OTLP endpoint is configured, an OpenTelemetry export layer.
///
/// A tracer that fails to build is reported on stderr and the service keeps
/// running with local logs only.
pub fn init_tracing(service_name: &str, log_level: &str, otlp_endpoint: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let tracer = otlp_endpoint.and_then(|endpoint| {
        let otlp_exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint);

        match opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(otlp_exporter)
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", service_name.to_string()),
            ])))
            .install_batch(runtime::Tokio)
        {
            Ok(tracer) => Some(tracer),
            Err(e) => {
                eprintln!(
                    "Failed to initialize OTLP tracer for service '{}' at endpoint '{}': {}",
                    service_name, endpoint, e
                );
                None
            }
        }
    });

    let telemetry = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}

/// Plain-text subscriber routed through the test harness writer. Safe to
/// call from every test.
pub fn init_test_tracing() {
    TEST_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,fms_frontend=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
