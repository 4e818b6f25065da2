//! Webhook 签名校验模块
//!
//! 基于 HMAC-SHA256 校验 Shopify webhook 请求体的完整性与来源。
//!
//! ## 设计决策
//!
//! - **原始字节**：签名针对未解析的请求体计算，任何重新序列化都会破坏校验
//! - **Base64 签名头**：`x-shopify-hmac-sha256` 为 MAC 的标准 base64 编码
//! - **常量时间比较**：使用 `subtle` 比较字节，长度不一致直接拒绝
//! - **未配置密钥即拒绝**：不存在"跳过校验"的运行模式

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Result, SyncError};

type HmacSha256 = Hmac<Sha256>;

/// Shopify 签名头名称
pub const SHOPIFY_HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// HMAC-SHA256 webhook 签名校验器
///
/// 持有共享密钥；密钥缺失时 `verify` 始终返回 `SecretNotConfigured`。
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<Vec<u8>>,
}

// 编译期验证 Send + Sync，确保可安全注入到 Axum 的 Arc 状态中
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<WebhookVerifier>();
    }
};

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl WebhookVerifier {
    /// 创建校验器，空字符串视为未配置
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    /// 是否已配置密钥
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// 校验请求体与签名头
    ///
    /// 检查顺序：密钥 -> 签名头存在 -> base64 解码 -> 长度 -> 常量时间比较。
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<()> {
        let secret = self.secret.as_deref().ok_or(SyncError::SecretNotConfigured)?;

        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::SignatureMissing {
                header: SHOPIFY_HMAC_HEADER.to_string(),
            })?;

        let provided = BASE64
            .decode(signature)
            .map_err(|e| SyncError::SignatureInvalid(format!("base64 解码失败: {e}")))?;

        let expected = compute_mac(secret, payload)?;

        if constant_time_eq(&expected, &provided) {
            Ok(())
        } else {
            Err(SyncError::SignatureMismatch)
        }
    }
}

/// 计算请求体的 base64 编码签名
///
/// 与发送方的签名方式一致，测试和本地调试时用于构造合法请求。
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Result<String> {
    Ok(BASE64.encode(compute_mac(secret, payload)?))
}

fn compute_mac(secret: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SyncError::Internal(format!("HMAC 初始化失败: {e}")))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// 长度不一致时直接返回 false，不进入逐字节比较
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
