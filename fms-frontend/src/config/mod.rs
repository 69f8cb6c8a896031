use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiBackend {
    #[default]
    Http,
    /// Seeded in-process backend, for demos without a payment API.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Payment API root, e.g. `http://payments.internal/api`.
    pub base_url: String,
    #[serde(default)]
    pub backend: ApiBackend,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            backend: ApiBackend::default(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    /// OTLP gRPC endpoint; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Defaults every deployment starts from. The only setting that normally
/// needs overriding is `APP_API__BASE_URL`.
fn default_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
{
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080_i64)?
        .set_default("api.base_url", DEFAULT_API_BASE_URL)?
        .set_default("api.backend", "http")?
        .set_default("api.connect_timeout_seconds", default_connect_timeout() as i64)?
        .set_default("telemetry.log_level", "info")
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Run either from the workspace root or from inside fms-frontend/.
    let configuration_directory = if base_path.ends_with("fms-frontend") {
        base_path.join("config")
    } else {
        base_path.join("fms-frontend").join("config")
    };

    let settings = default_builder()?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
