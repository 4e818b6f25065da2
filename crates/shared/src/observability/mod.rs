//! 统一可观测性模块
//!
//! 日志、追踪、指标在进程启动时一次性初始化，返回的 guard 需存活到进程退出。

pub mod metrics;
pub mod middleware;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置（配置文件 `[observability]` 段）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 追踪资源与指标标签中的服务名
    pub service_name: String,

    /// OTLP gRPC 端点，未配置或为空时不导出 span
    pub otlp_endpoint: Option<String>,

    pub metrics_enabled: bool,
    pub metrics_port: u16,

    /// 日志级别，RUST_LOG 存在时以其为准
    pub log_level: String,

    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            otlp_endpoint: None,
            metrics_enabled: true,
            metrics_port: 9090,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名（配置文件中通常不单独声明）
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    /// 有效的 OTLP 端点，空白字符串视为未配置
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }
}

/// 可观测性资源守卫
///
/// drop 时关闭 TracerProvider 并刷新未导出的 span，指标服务随之停止。
pub struct ObservabilityGuard {
    metrics: Option<metrics::MetricsHandle>,
    tracing: Option<tracing::TracingGuard>,
}

impl ObservabilityGuard {
    /// 不持有任何资源的 guard，用于测试
    pub fn empty() -> Self {
        Self {
            metrics: None,
            tracing: None,
        }
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if self.tracing.is_some() {
            info!("Shutting down observability...");
        }
        if let Some(handle) = self.metrics.take() {
            handle.shutdown();
        }
    }
}

/// 统一初始化可观测性
///
/// 先安装 tracing subscriber，后续指标服务的启动日志才能输出。
///
/// # Example
///
/// ```ignore
/// use draft_sync_shared::observability::{init, ObservabilityConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ObservabilityConfig::default().with_service_name("draft-sync-webhook");
///     let _guard = init(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    let tracing_guard = tracing::init(config)?;

    let metrics_handle = match config.metrics_enabled {
        true => Some(metrics::init(config).await?),
        false => None,
    };

    info!(
        service = %config.service_name,
        metrics_port = metrics_handle.as_ref().map(|_| config.metrics_port),
        otlp_endpoint = config.otlp_endpoint(),
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        metrics: metrics_handle,
        tracing: Some(tracing_guard),
    })
}
