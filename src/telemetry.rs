use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::AppError;

pub const MUTATIONS_TOTAL: &str = "staffing_mutations_total";
pub const REQUEST_DURATION_SECONDS: &str = "staffing_request_duration_seconds";
pub const CACHE_HITS_TOTAL: &str = "staffing_cache_hits_total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the built-in filter. Returns an error if a subscriber
/// is already installed, so embedding shells can call this unconditionally.
pub fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,catering_staffing=debug".into());

    let result = match format {
        // Structured JSON logging for production
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        // Human-readable for development
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    result.map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {}", e)))
}

/// Install the Prometheus recorder behind the `metrics` facade and hand back
/// the handle the shell renders from.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        )
        .map_err(|e| AppError::Internal(format!("Failed to set histogram buckets: {}", e)))?
        .install_recorder()
        .map_err(|e| AppError::Internal(format!("Failed to install Prometheus recorder: {}", e)))
}
