//! 草稿订单属性同步处理器
//!
//! 单条 orders/create webhook 的完整处理流程，线性执行、任一步骤可提前结束：
//! 1. 非 POST 直接确认
//! 2. HMAC 签名校验（失败 401）
//! 3. 解析 JSON（失败 400）
//! 4. 提取订单 ID -> 拉取订单 -> 资格判定 -> 拉取草稿订单
//! 5. 筛选白名单属性 -> 合并 -> 有变化才回写
//!
//! 认证与格式之外的所有失败都以 200 确认，发送方重试不会改变结果。

use std::sync::Arc;

use axum::http::Method;
use draft_sync_shared::crypto::WebhookVerifier;
use tracing::debug;

use crate::attributes::{filter_synced, merge_note_attributes};
use crate::eligibility::EligibilityPolicy;
use crate::error::WebhookError;
use crate::models::{OrderCreatedEvent, ResourceId};
use crate::outcome::{Outcome, OutcomeEvent, SkipReason};
use crate::shopify_client::OrderApi;

/// webhook 处理器
///
/// 依赖全部在构造时注入，处理过程中不读取环境变量。
pub struct Reconciler {
    api: Arc<dyn OrderApi>,
    verifier: WebhookVerifier,
    eligibility: EligibilityPolicy,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn OrderApi>,
        verifier: WebhookVerifier,
        eligibility: EligibilityPolicy,
    ) -> Self {
        Self {
            api,
            verifier,
            eligibility,
        }
    }

    /// 处理一次 webhook 投递
    pub async fn handle(
        &self,
        method: &Method,
        signature: Option<&str>,
        body: &[u8],
    ) -> OutcomeEvent {
        if method != Method::POST {
            return OutcomeEvent::new(Outcome::Ignored);
        }

        if let Err(err) = self.verifier.verify(body, signature) {
            return OutcomeEvent::new(Outcome::Rejected(WebhookError::unauthorized(&err)))
                .with_error(&err);
        }

        let event = match OrderCreatedEvent::parse(body) {
            Ok(event) => event,
            Err(err) => return OutcomeEvent::new(Outcome::Rejected(WebhookError::from(err))),
        };

        let Some(order_id) = event.order_id else {
            return OutcomeEvent::new(Outcome::Skipped(SkipReason::MissingOrderId));
        };

        self.sync_order(&order_id).await
    }

    /// 从草稿订单同步属性到订单
    async fn sync_order(&self, order_id: &ResourceId) -> OutcomeEvent {
        let skipped = |reason| OutcomeEvent::new(Outcome::Skipped(reason)).with_order(order_id);

        let order = match self.api.get_order(order_id).await {
            Ok(order) => order,
            Err(err) => return skipped(SkipReason::OrderFetchFailed).with_error(&err),
        };

        if !self.eligibility.is_eligible(&order) {
            return skipped(SkipReason::NotEligible);
        }

        let Some(draft_order_id) = order.draft_order_id.as_ref() else {
            return skipped(SkipReason::NoDraftOrder);
        };

        let draft_order = match self.api.get_draft_order(draft_order_id).await {
            Ok(draft_order) => draft_order,
            Err(err) => {
                return skipped(SkipReason::DraftFetchFailed)
                    .with_draft_order(draft_order_id)
                    .with_error(&err);
            }
        };

        let incoming = filter_synced(&draft_order.note_attributes);
        if incoming.is_empty() {
            return skipped(SkipReason::NoRelevantAttributes).with_draft_order(draft_order_id);
        }

        let merged = merge_note_attributes(&order.note_attributes, &incoming);
        // 与归一化后的现有列表比较：仅清理无名或重复属性不构成回写理由
        let current = merge_note_attributes(&order.note_attributes, &[]);
        if merged == current {
            return skipped(SkipReason::AlreadyInSync).with_draft_order(draft_order_id);
        }

        debug!(
            order_id = %order_id,
            draft_order_id = %draft_order_id,
            before = order.note_attributes.len(),
            after = merged.len(),
            "回写订单属性"
        );

        let outcome = match self.api.update_note_attributes(order_id, &merged).await {
            Ok(()) => OutcomeEvent::new(Outcome::Updated {
                attributes: merged.len(),
            }),
            Err(err) => OutcomeEvent::new(Outcome::UpdateFailed).with_error(&err),
        };

        outcome
            .with_order(order_id)
            .with_draft_order(draft_order_id)
    }
}
