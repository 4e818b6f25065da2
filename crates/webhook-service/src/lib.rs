//! 草稿订单属性同步 webhook 服务
//!
//! 接收 Shopify `orders/create` 事件，校验签名后把草稿订单上的配送类附加属性
//! 合并回新建订单。除签名失败（401）和请求体非法（400）外，所有结果都以 200 确认，
//! 避免 Shopify 重试投递。

pub mod attributes;
pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod models;
pub mod outcome;
pub mod reconciler;
pub mod routes;
pub mod shopify_client;
pub mod state;

pub use eligibility::EligibilityPolicy;
pub use error::WebhookError;
pub use outcome::{Outcome, OutcomeEvent, OutcomeRecorder, SkipReason, TracingRecorder};
pub use reconciler::Reconciler;
pub use shopify_client::{OrderApi, ShopifyClient};
pub use state::AppState;
