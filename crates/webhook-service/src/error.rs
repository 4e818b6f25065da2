//! webhook 请求级错误类型
//!
//! 只有认证失败与请求体格式错误会以非 200 状态返回给调用方，
//! 其余情况（远端失败、无需处理等）都不属于错误，而是 `Outcome` 的一种。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use draft_sync_shared::error::SyncError;
use serde_json::json;

/// 拒绝处理的 webhook 请求
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// 密钥缺失、签名头缺失或签名不匹配
    #[error("webhook 签名校验失败: {code}")]
    Unauthorized { code: &'static str },

    /// 签名通过但请求体不是合法 JSON
    #[error("请求体不是合法 JSON: {0}")]
    MalformedBody(String),
}

impl WebhookError {
    /// 由签名校验错误构造，保留共享错误码
    pub fn unauthorized(err: &SyncError) -> Self {
        Self::Unauthorized { code: err.code() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::MalformedBody(_) => "MALFORMED_BODY",
        }
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedBody(err.to_string())
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 认证失败不回显具体原因，避免给探测方提供信息
        let message = match &self {
            Self::Unauthorized { .. } => "unauthorized".to_string(),
            Self::MalformedBody(_) => self.to_string(),
        };

        let body = json!({
            "status": "rejected",
            "code": self.error_code(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
