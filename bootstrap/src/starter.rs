//! 服务启动器
//!
//! 提供统一的 HTTP 服务启动模式

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, routing::get};
use edu_config::AppConfig;
use edu_errors::AppResult;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 1. 加载 `.env` 与配置
/// 2. 初始化日志与 Prometheus recorder
/// 3. 创建基础设施（数据库连接池、TokenService）
/// 4. 调用闭包构建业务路由，挂载 `/metrics`、Trace 与 CORS 层
/// 5. 启动服务器并处理 graceful shutdown
pub async fn run_http<F, Fut>(config_dir: &str, router_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics_handle = edu_telemetry::init_metrics()?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let cors = cors_layer(&config);

    let infra = Infrastructure::from_config(config).await?;
    let app = router_builder(infra)
        .await?
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");

    Ok(())
}

/// 根据配置构建 CORS 层；未配置来源时全部放行
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
