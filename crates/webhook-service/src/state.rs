//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use crate::outcome::OutcomeRecorder;
use crate::reconciler::Reconciler;

/// Axum 应用共享状态
///
/// 只包含不可变依赖，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub recorder: Arc<dyn OutcomeRecorder>,
    /// webhook 请求体读取上限
    pub max_body_bytes: usize,
}

impl AppState {
    /// 默认请求体上限 16 MiB
    pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

    pub fn new(reconciler: Arc<Reconciler>, recorder: Arc<dyn OutcomeRecorder>) -> Self {
        Self {
            reconciler,
            recorder,
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
