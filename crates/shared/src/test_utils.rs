//! 测试工具模块
//!
//! 提供集成测试所需的签名辅助函数和 Shopify 资源 JSON 生成器。
//! 用于简化测试代码编写，提高测试的可重复性。

use serde_json::{Value, json};

use crate::crypto::sign_payload;

/// 测试用 webhook 签名密钥
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

// ==================== 签名辅助 ====================

/// 使用测试密钥为请求体生成签名头的值
pub fn sign_with_test_secret(body: &[u8]) -> String {
    sign_payload(TEST_WEBHOOK_SECRET.as_bytes(), body)
        .unwrap_or_else(|e| panic!("测试签名生成失败: {e}"))
}

/// 序列化 JSON 并返回 (请求体, 签名)
pub fn signed_json_body(value: &Value) -> (Vec<u8>, String) {
    let body = serde_json::to_vec(value).unwrap_or_else(|e| panic!("测试请求体序列化失败: {e}"));
    let signature = sign_with_test_secret(&body);
    (body, signature)
}

// ==================== Shopify 资源生成器 ====================

/// 构造 note_attributes 数组
pub fn note_attributes(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect(),
    )
}

/// orders/create webhook 请求体
pub fn order_created_event(order_id: u64) -> Value {
    json!({
        "id": order_id,
        "name": format!("#{}", order_id % 10_000),
        "email": "buyer@example.com",
        "financial_status": "paid",
    })
}

/// `GET /orders/{id}.json` 响应体
pub fn order_response(
    order_id: u64,
    draft_order_id: Option<u64>,
    tags: &str,
    attributes: &[(&str, &str)],
) -> Value {
    json!({
        "order": {
            "id": order_id,
            "draft_order_id": draft_order_id,
            "tags": tags,
            "note_attributes": note_attributes(attributes),
        }
    })
}

/// `GET /draft_orders/{id}.json` 响应体
pub fn draft_order_response(draft_order_id: u64, attributes: &[(&str, &str)]) -> Value {
    json!({
        "draft_order": {
            "id": draft_order_id,
            "note_attributes": note_attributes(attributes),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::WebhookVerifier;

    #[test]
    fn test_signed_json_body_verifies() {
        let (body, signature) = signed_json_body(&order_created_event(1001));
        let verifier = WebhookVerifier::new(Some(TEST_WEBHOOK_SECRET));
        assert!(verifier.verify(&body, Some(&signature)).is_ok());
    }

    #[test]
    fn test_order_response_shape() {
        let value = order_response(1001, None, "retail", &[("Gift", "yes")]);
        assert_eq!(value["order"]["id"], 1001);
        assert!(value["order"]["draft_order_id"].is_null());
        assert_eq!(value["order"]["note_attributes"][0]["name"], "Gift");
    }

    #[test]
    fn test_draft_order_response_shape() {
        let value = draft_order_response(77, &[("Delivery-Date", "2024-05-01")]);
        assert_eq!(value["draft_order"]["id"], 77);
        assert_eq!(
            value["draft_order"]["note_attributes"][0]["value"],
            "2024-05-01"
        );
    }
}
