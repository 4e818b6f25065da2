//! Shopify Admin REST API 客户端
//!
//! 通过 `OrderApi` trait 抽象订单/草稿订单的读写，便于测试时注入 mock 实现。
//! 所有调用均不重试：失败直接以错误返回，由调用方决定如何记录。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use draft_sync_shared::config::ShopifyConfig;
use draft_sync_shared::error::{Result, SyncError};
use draft_sync_shared::observability::metrics;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::{
    DraftOrder, DraftOrderEnvelope, NoteAttribute, Order, OrderEnvelope, OrderUpdateEnvelope,
    ResourceId,
};

/// Admin API 访问令牌请求头
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const SERVICE_NAME: &str = "shopify";

/// 订单相关的远端 API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `GET /orders/{id}.json`
    async fn get_order(&self, order_id: &ResourceId) -> Result<Order>;

    /// `GET /draft_orders/{id}.json`
    async fn get_draft_order(&self, draft_order_id: &ResourceId) -> Result<DraftOrder>;

    /// `PUT /orders/{id}.json`，以完整列表替换订单的 note_attributes
    async fn update_note_attributes(
        &self,
        order_id: &ResourceId,
        attributes: &[NoteAttribute],
    ) -> Result<()>;
}

/// 基于 reqwest 的 Shopify 客户端
///
/// reqwest::Client 内部带连接池，clone 是廉价操作。
#[derive(Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| SyncError::ExternalService {
            service: SERVICE_NAME.to_string(),
            message: format!("HTTP 客户端创建失败: {e}"),
        })?;

        let base_url = config.base_url();
        info!(base_url = %base_url, "Shopify 客户端已初始化");

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// 发送请求并校验状态码，同时记录调用指标
    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let start = Instant::now();
        let result = request.send().await;
        let elapsed = start.elapsed().as_secs_f64();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_shopify_request(operation, "error", elapsed);
                return Err(transport_error(operation, e));
            }
        };

        let status = response.status();
        metrics::record_shopify_request(operation, status.as_str(), elapsed);
        debug!(operation, status = status.as_u16(), elapsed_secs = elapsed, "Shopify API 响应");

        ensure_success(operation, status)?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> Result<T> {
        let response = self
            .send(operation, self.request(reqwest::Method::GET, path))
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(operation, e))?;
        // 结构不符按无效负载处理（INVALID_PAYLOAD）
        Ok(serde_json::from_slice(&body)?)
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> SyncError {
    SyncError::ExternalService {
        service: SERVICE_NAME.to_string(),
        message: format!("{operation} 请求失败: {err}"),
    }
}

fn ensure_success(operation: &str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SyncError::UnexpectedStatus {
            resource: operation.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl OrderApi for ShopifyClient {
    async fn get_order(&self, order_id: &ResourceId) -> Result<Order> {
        let envelope: OrderEnvelope = self
            .get_json("get_order", &format!("orders/{order_id}.json"))
            .await?;
        Ok(envelope.order)
    }

    async fn get_draft_order(&self, draft_order_id: &ResourceId) -> Result<DraftOrder> {
        let envelope: DraftOrderEnvelope = self
            .get_json("get_draft_order", &format!("draft_orders/{draft_order_id}.json"))
            .await?;
        Ok(envelope.draft_order)
    }

    async fn update_note_attributes(
        &self,
        order_id: &ResourceId,
        attributes: &[NoteAttribute],
    ) -> Result<()> {
        let body = OrderUpdateEnvelope::new(order_id, attributes);
        let request = self
            .request(reqwest::Method::PUT, &format!("orders/{order_id}.json"))
            .json(&body);
        // 响应体不参与后续逻辑
        self.send("update_order", request).await?;
        Ok(())
    }
}
