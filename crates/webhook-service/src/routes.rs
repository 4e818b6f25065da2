//! 路由配置

use axum::{
    Router, middleware,
    routing::{any, get},
};
use draft_sync_shared::config::WebhookConfig;
use draft_sync_shared::observability::middleware as obs_middleware;

use crate::handlers;
use crate::state::AppState;

/// 路由参数
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// webhook 挂载路径
    pub webhook_path: String,
    pub max_body_bytes: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            webhook_path: "/webhooks/orders/create".to_string(),
            max_body_bytes: AppState::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<&WebhookConfig> for RouteConfig {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            webhook_path: config.path.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// 构建完整的应用路由
///
/// webhook 路径接受任意方法：非 POST 由处理器直接确认，不返回 405。
/// 请求体由处理器自行读取并限长，框架层不会产生 413。
pub fn build_router(state: AppState, config: &RouteConfig) -> Router {
    let state = state.with_max_body_bytes(config.max_body_bytes);

    Router::new()
        .route(&config.webhook_path, any(handlers::order_webhook))
        .route("/health", get(handlers::health_check))
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
