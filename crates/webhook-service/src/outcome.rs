//! webhook 处理结果与结构化事件
//!
//! 每次请求都以一个 `OutcomeEvent` 结束：HTTP 响应由其中的 `Outcome` 决定，
//! 运维侧通过 `OutcomeRecorder` 获得同一事件（日志 + 指标），测试中可替换为内存记录器。

use axum::http::StatusCode;
use draft_sync_shared::error::SyncError;
use draft_sync_shared::observability::metrics;
use tracing::{debug, error, info, warn};

use crate::error::WebhookError;
use crate::models::ResourceId;

/// 提前结束且向调用方确认收到（200）的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// 事件中没有订单 ID
    MissingOrderId,
    /// 拉取订单失败
    OrderFetchFailed,
    /// 订单标签不满足资格策略
    NotEligible,
    /// 订单不是由草稿订单转化而来
    NoDraftOrder,
    /// 拉取草稿订单失败
    DraftFetchFailed,
    /// 草稿订单上没有需要同步的属性
    NoRelevantAttributes,
    /// 合并结果与订单现有属性完全一致
    AlreadyInSync,
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingOrderId => "missing_order_id",
            Self::OrderFetchFailed => "order_fetch_failed",
            Self::NotEligible => "not_eligible",
            Self::NoDraftOrder => "no_draft_order",
            Self::DraftFetchFailed => "draft_fetch_failed",
            Self::NoRelevantAttributes => "no_relevant_attributes",
            Self::AlreadyInSync => "already_in_sync",
        }
    }

    /// 远端调用失败导致的跳过
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::OrderFetchFailed | Self::DraftFetchFailed)
    }
}

/// 单次 webhook 请求的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 非 POST 请求，无副作用
    Ignored,
    /// 认证或请求体错误
    Rejected(WebhookError),
    Skipped(SkipReason),
    /// 已回写订单属性
    Updated { attributes: usize },
    /// 回写失败，只记录不上报
    UpdateFailed,
}

impl Outcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(err) => err.status_code(),
            _ => StatusCode::OK,
        }
    }

    /// 指标与日志中的结果类别
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Rejected(_) => "rejected",
            Self::Skipped(_) => "skipped",
            Self::Updated { .. } => "updated",
            Self::UpdateFailed => "update_failed",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Ignored => "method_not_post",
            Self::Rejected(WebhookError::Unauthorized { .. }) => "unauthorized",
            Self::Rejected(WebhookError::MalformedBody(_)) => "malformed_body",
            Self::Skipped(reason) => reason.code(),
            Self::Updated { .. } => "attributes_synced",
            Self::UpdateFailed => "update_failed",
        }
    }
}

/// 带上下文的结果事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEvent {
    pub outcome: Outcome,
    pub order_id: Option<ResourceId>,
    pub draft_order_id: Option<ResourceId>,
    /// 远端调用失败时的错误码与描述
    pub error_code: Option<&'static str>,
    pub error: Option<String>,
}

impl OutcomeEvent {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            order_id: None,
            draft_order_id: None,
            error_code: None,
            error: None,
        }
    }

    pub fn with_order(mut self, order_id: &ResourceId) -> Self {
        self.order_id = Some(order_id.clone());
        self
    }

    pub fn with_draft_order(mut self, draft_order_id: &ResourceId) -> Self {
        self.draft_order_id = Some(draft_order_id.clone());
        self
    }

    pub fn with_error(mut self, err: &SyncError) -> Self {
        self.error_code = Some(err.code());
        self.error = Some(err.to_string());
        self
    }
}

/// 结果事件的输出端
pub trait OutcomeRecorder: Send + Sync {
    fn record(&self, event: &OutcomeEvent);
}

/// 生产环境记录器：写 tracing 事件并累加 `webhook_outcomes_total`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl OutcomeRecorder for TracingRecorder {
    fn record(&self, event: &OutcomeEvent) {
        let kind = event.outcome.kind();
        let reason = event.outcome.reason();
        let order_id = event.order_id.as_ref().map(ResourceId::as_str).unwrap_or("");
        let draft_order_id = event
            .draft_order_id
            .as_ref()
            .map(ResourceId::as_str)
            .unwrap_or("");
        let error_code = event.error_code.unwrap_or("");
        let error = event.error.as_deref().unwrap_or("");

        metrics::record_webhook_outcome(kind, reason);

        match &event.outcome {
            Outcome::Ignored => {
                debug!(outcome = kind, reason, "非 POST 请求，忽略");
            }
            Outcome::Rejected(err) => {
                warn!(outcome = kind, reason, error = %err, "webhook 请求被拒绝");
            }
            Outcome::Skipped(skip) if skip.is_remote_failure() => {
                warn!(
                    outcome = kind,
                    reason,
                    order_id,
                    draft_order_id,
                    error_code,
                    error,
                    "远端资源获取失败，已确认收到且不重试"
                );
            }
            Outcome::Skipped(_) => {
                debug!(outcome = kind, reason, order_id, draft_order_id, "无需同步");
            }
            Outcome::Updated { attributes } => {
                info!(
                    outcome = kind,
                    reason,
                    order_id,
                    draft_order_id,
                    attributes,
                    "订单属性已同步"
                );
            }
            Outcome::UpdateFailed => {
                error!(
                    outcome = kind,
                    reason,
                    order_id,
                    draft_order_id,
                    error_code,
                    error,
                    "订单属性回写失败"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Outcome::Ignored.status_code(), StatusCode::OK);
        assert_eq!(
            Outcome::Skipped(SkipReason::OrderFetchFailed).status_code(),
            StatusCode::OK
        );
        assert_eq!(Outcome::UpdateFailed.status_code(), StatusCode::OK);
        assert_eq!(
            Outcome::Rejected(WebhookError::Unauthorized {
                code: "SIGNATURE_MISMATCH"
            })
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Outcome::Rejected(WebhookError::MalformedBody("eof".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(Outcome::Ignored.reason(), "method_not_post");
        assert_eq!(
            Outcome::Skipped(SkipReason::NoDraftOrder).reason(),
            "no_draft_order"
        );
        assert_eq!(Outcome::Updated { attributes: 2 }.kind(), "updated");
    }

    #[test]
    fn test_event_builder() {
        let order_id = ResourceId::new("1001").unwrap();
        let draft_id = ResourceId::new("77").unwrap();
        let event = OutcomeEvent::new(Outcome::UpdateFailed)
            .with_order(&order_id)
            .with_draft_order(&draft_id)
            .with_error(&SyncError::UnexpectedStatus {
                resource: "update_order".to_string(),
                status: 422,
            });

        assert_eq!(event.order_id, Some(order_id));
        assert_eq!(event.draft_order_id, Some(draft_id));
        assert_eq!(event.error_code, Some("UNEXPECTED_STATUS"));
        assert!(event.error.unwrap().contains("422"));
    }

    /// 收集事件级别的测试 layer
    #[derive(Clone, Default)]
    struct LevelCapture(std::sync::Arc<parking_lot::Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LevelCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.lock().push(*event.metadata().level());
        }
    }

    fn recorded_levels(outcome: Outcome) -> Vec<tracing::Level> {
        use tracing_subscriber::layer::SubscriberExt;

        let capture = LevelCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, || {
            TracingRecorder.record(&OutcomeEvent::new(outcome));
        });
        let levels = capture.0.lock().clone();
        levels
    }

    #[test]
    fn test_log_levels_follow_severity() {
        use tracing::Level;

        for skip in [
            SkipReason::MissingOrderId,
            SkipReason::NotEligible,
            SkipReason::NoDraftOrder,
            SkipReason::NoRelevantAttributes,
            SkipReason::AlreadyInSync,
        ] {
            assert_eq!(recorded_levels(Outcome::Skipped(skip)), vec![Level::DEBUG]);
        }
        assert_eq!(recorded_levels(Outcome::Ignored), vec![Level::DEBUG]);
        assert_eq!(
            recorded_levels(Outcome::Skipped(SkipReason::OrderFetchFailed)),
            vec![Level::WARN]
        );
        assert_eq!(
            recorded_levels(Outcome::Rejected(WebhookError::MalformedBody("eof".into()))),
            vec![Level::WARN]
        );
        assert_eq!(
            recorded_levels(Outcome::Updated { attributes: 1 }),
            vec![Level::INFO]
        );
        assert_eq!(recorded_levels(Outcome::UpdateFailed), vec![Level::ERROR]);
    }

    #[test]
    fn test_tracing_recorder_does_not_panic() {
        let recorder = TracingRecorder;
        recorder.record(&OutcomeEvent::new(Outcome::Ignored));
        recorder.record(&OutcomeEvent::new(Outcome::Skipped(SkipReason::DraftFetchFailed)));
        recorder.record(&OutcomeEvent::new(Outcome::Updated { attributes: 3 }));
    }
}
