use crate::config::GatewayConfig;
use common::TelemetryGuard;

/// Install the tracing subscriber, exporting over OTLP when an endpoint is configured.
///
/// The returned guard must live as long as the server.
pub fn setup_logging(config: &GatewayConfig) -> anyhow::Result<Option<TelemetryGuard>> {
    match &config.otel_endpoint {
        Some(endpoint) => {
            TelemetryGuard::init("asset-inspector", endpoint, config.environment).map(Some)
        }
        None => {
            common::setup_logging(config.environment);
            Ok(None)
        }
    }
}
