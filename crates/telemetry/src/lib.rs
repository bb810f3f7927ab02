//! telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 授权决策计数器
pub const AUTHORIZATION_DECISIONS_TOTAL: &str = "authorization_decisions_total";

/// 成功写入计数器
pub const RECORDS_WRITTEN_TOTAL: &str = "records_written_total";

/// 初始化 tracing
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        AUTHORIZATION_DECISIONS_TOTAL,
        "Authorization policy decisions by resource kind, action and outcome"
    );
    metrics::describe_counter!(
        RECORDS_WRITTEN_TOTAL,
        "Successful record writes by resource kind and operation"
    );

    Ok(handle)
}
