//! 草稿订单属性同步服务入口

use std::sync::Arc;

use draft_sync_shared::{config::AppConfig, crypto::WebhookVerifier, observability};
use draft_sync_webhook::{
    EligibilityPolicy, Reconciler, ShopifyClient, TracingRecorder,
    routes::{self, RouteConfig},
    state::AppState,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "draft-sync-webhook";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 本地开发从 .env 读取 Shopify 凭据，文件不存在时忽略
    dotenvy::dotenv().ok();

    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    config.validate()?;

    info!(
        environment = %config.environment,
        shop_domain = %config.shopify.shop_domain,
        api_version = %config.shopify.api_version,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let verifier = WebhookVerifier::new(config.webhook.secret.as_deref());
    if !verifier.is_configured() {
        // 密钥缺失不阻止启动，所有投递都会被 401 拒绝
        if config.is_production() {
            error!("SHOPIFY_WEBHOOK_SECRET 未配置，所有 webhook 请求将被拒绝");
        } else {
            warn!("SHOPIFY_WEBHOOK_SECRET 未配置，所有 webhook 请求将被拒绝");
        }
    }
    if config.shopify.access_token.trim().is_empty() {
        warn!("SHOPIFY_ACCESS_TOKEN 未配置，Admin API 调用将失败");
    }

    let eligibility = EligibilityPolicy::from_marker(config.webhook.tag_marker.as_deref());
    info!(policy = ?eligibility, "订单资格策略");

    let client = ShopifyClient::new(&config.shopify)?;
    let reconciler = Reconciler::new(Arc::new(client), verifier, eligibility);
    let state = AppState::new(Arc::new(reconciler), Arc::new(TracingRecorder));

    let app = routes::build_router(state, &RouteConfig::from(&config.webhook));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!(
        path = %config.webhook.path,
        "Listening on {}",
        config.server_addr()
    );

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接，等待进行中的请求完成
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 信号处理器注册失败时只记录错误，该分支永不完成。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
