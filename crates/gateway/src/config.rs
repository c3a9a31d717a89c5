use inference::InferenceConfig;
use inference::config::parse_var;
use std::env;
use std::net::{IpAddr, SocketAddr};

pub use common::Environment;

/// Default multipart upload ceiling (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub otel_endpoint: Option<String>,
    pub inference: InferenceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let host: IpAddr = parse_var("HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_var("PORT", 5000)?;
        let max_upload_bytes: usize = parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let inference = InferenceConfig::from_env()?;

        Ok(Self {
            environment,
            host,
            port,
            max_upload_bytes,
            otel_endpoint,
            inference,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
