//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SyncError};
use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Shopify Admin API 配置
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    /// 店铺域名，如 `example.myshopify.com`
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: String,
    /// 未设置时沿用 HTTP 客户端默认行为
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            shop_domain: String::new(),
            access_token: String::new(),
            api_version: "2024-01".to_string(),
            request_timeout_seconds: None,
        }
    }
}

// access_token 不进入日志
impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop_domain", &self.shop_domain)
            .field("access_token", &"***")
            .field("api_version", &self.api_version)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl ShopifyConfig {
    /// Admin REST API 基础地址
    ///
    /// 未带协议的域名默认补全为 https。
    pub fn base_url(&self) -> String {
        let domain = self.shop_domain.trim().trim_end_matches('/');
        let origin = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        };
        format!("{}/admin/api/{}", origin, self.api_version)
    }
}

/// Webhook 入口配置
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// 共享签名密钥，缺失时所有请求按认证失败处理
    pub secret: Option<String>,
    pub path: String,
    /// 订单标签标记，设置后只处理标签中包含该标记的订单
    pub tag_marker: Option<String>,
    /// 单次投递读取的请求体上限，超出时按请求体不可读返回 400
    pub max_body_bytes: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            path: "/webhooks/orders/create".to_string(),
            tag_marker: None,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("path", &self.path)
            .field("tag_marker", &self.tag_marker)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub shopify: ShopifyConfig,
    pub webhook: WebhookConfig,
    pub observability: ObservabilityConfig,
}

fn invalid(message: String) -> SyncError {
    SyncError::Config(ConfigError::Message(message))
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（DRAFT_SYNC_ 前缀，`__` 分隔层级，如 DRAFT_SYNC_SHOPIFY__SHOP_DOMAIN）
    /// 5. 平台约定的环境变量（SHOPIFY_WEBHOOK_SECRET 等）
    pub fn load(service_name: &str) -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("DRAFT_SYNC_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("DRAFT_SYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// 应用平台约定的环境变量
    ///
    /// 与 Shopify 应用模板保持一致的变量名优先级最高，空值忽略。
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(secret) = lookup("SHOPIFY_WEBHOOK_SECRET") {
            self.webhook.secret = Some(secret);
        }
        if let Some(domain) = lookup("SHOPIFY_SHOP_DOMAIN") {
            self.shopify.shop_domain = domain;
        }
        if let Some(token) = lookup("SHOPIFY_ACCESS_TOKEN") {
            self.shopify.access_token = token;
        }
        if let Some(version) = lookup("SHOPIFY_API_VERSION") {
            self.shopify.api_version = version;
        }
        if let Some(port) = lookup("DRAFT_SYNC_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    /// 校验启动必需的配置项
    ///
    /// 签名密钥缺失不在此处拒绝：服务仍可启动，所有 webhook 请求返回 401。
    pub fn validate(&self) -> Result<()> {
        if self.shopify.shop_domain.trim().is_empty() {
            return Err(invalid("shopify.shop_domain 未配置（SHOPIFY_SHOP_DOMAIN）".to_string()));
        }
        if self.shopify.api_version.trim().is_empty() {
            return Err(invalid("shopify.api_version 不能为空".to_string()));
        }
        if !self.webhook.path.starts_with('/') {
            return Err(invalid(format!(
                "webhook.path 必须以 / 开头: {}",
                self.webhook.path
            )));
        }
        if self.webhook.max_body_bytes == 0 {
            return Err(invalid("webhook.max_body_bytes 必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
