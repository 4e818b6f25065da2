//! HTTP 请求处理器

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use draft_sync_shared::crypto::SHOPIFY_HMAC_HEADER;
use draft_sync_shared::observability::tracing::current_trace_id;
use serde_json::json;
use tracing::{Instrument, info_span};

use crate::error::WebhookError;
use crate::outcome::{Outcome, OutcomeEvent};
use crate::state::AppState;

/// Shopify 附带的投递上下文头，只用于日志关联
const TOPIC_HEADER: &str = "x-shopify-topic";
const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";
const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// 读取原始请求体
///
/// 非 POST 请求不读取请求体，直接交由处理流程确认。
/// 超出上限或读取中断都视为请求体不可用（400），不返回其他状态码。
async fn read_body(method: &Method, body: Body, limit: usize) -> Result<Bytes, WebhookError> {
    if method != Method::POST {
        return Ok(Bytes::new());
    }

    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| WebhookError::MalformedBody(format!("请求体读取失败: {e}")))
}

/// orders/create webhook 入口
///
/// 请求体以原始字节接收，签名校验必须基于未经解析的内容。
pub async fn order_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let span = info_span!(
        "order_webhook",
        topic = header_str(&headers, TOPIC_HEADER),
        shop_domain = header_str(&headers, SHOP_DOMAIN_HEADER),
        webhook_id = header_str(&headers, WEBHOOK_ID_HEADER),
    );

    let signature = headers
        .get(SHOPIFY_HMAC_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = async {
        match read_body(&method, body, state.max_body_bytes).await {
            Ok(bytes) => state.reconciler.handle(&method, signature, &bytes).await,
            Err(err) => OutcomeEvent::new(Outcome::Rejected(err)),
        }
    }
    .instrument(span.clone())
    .await;

    let trace_id = span.in_scope(|| {
        state.recorder.record(&event);
        current_trace_id()
    });

    outcome_response(event.outcome, trace_id)
}

/// 将处理结果转换为 HTTP 响应
fn outcome_response(outcome: Outcome, trace_id: Option<String>) -> Response {
    match outcome {
        Outcome::Rejected(err) => err.into_response(),
        other => {
            let mut body = json!({
                "status": other.kind(),
                "reason": other.reason(),
            });
            if let Some(trace_id) = trace_id {
                body["trace_id"] = json!(trace_id);
            }
            (other.status_code(), Json(body)).into_response()
        }
    }
}

/// 存活探针：服务进程正常即返回 ok
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}
