//! 统一错误处理模块
//!
//! 定义系统中所有共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum SyncError {
    // ==================== 签名校验错误 ====================
    #[error("缺少签名头: {header}")]
    SignatureMissing { header: String },

    #[error("未配置 webhook 签名密钥")]
    SecretNotConfigured,

    #[error("签名格式无效: {0}")]
    SignatureInvalid(String),

    #[error("签名不匹配")]
    SignatureMismatch,

    // ==================== 请求体错误 ====================
    #[error("请求体解析失败: {0}")]
    InvalidPayload(String),

    // ==================== 外部服务错误 ====================
    #[error("外部服务错误: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("外部服务返回异常状态: {resource} status={status}")]
    UnexpectedStatus { resource: String, status: u16 },

    // ==================== 通用错误 ====================
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::SignatureMissing { .. } => "SIGNATURE_MISSING",
            Self::SecretNotConfigured => "SECRET_NOT_CONFIGURED",
            Self::SignatureInvalid(_) => "SIGNATURE_INVALID",
            Self::SignatureMismatch => "SIGNATURE_MISMATCH",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}
