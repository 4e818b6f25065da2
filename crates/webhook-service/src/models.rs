//! Shopify 资源模型
//!
//! 入站事件与 Admin API 资源的显式结构。远端 JSON 的可缺省字段统一建模为 `Option`，
//! 缺失、`null`、空字符串在反序列化阶段即归一为 `None`，业务代码只需匹配类型。

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 远端资源 ID
///
/// Shopify 以 JSON 数字下发 ID，但部分场景（测试工具、代理转发）会传字符串，
/// 内部统一保存为字符串；序列化时只有规范十进制形式（如 `42`，不含 `0042`）
/// 还原为 JSON 数字，保证请求体与 URL 路径中的 ID 一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// 去除首尾空白后为空则返回 None
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从任意 JSON 值提取 ID，只接受整数和非空字符串
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_u64() || n.is_i64() => Some(Self(n.to_string())),
            Value::String(s) => Self::new(s),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(ResourceId::from_json))
}

/// 标量统一转为字符串，null 视为空串
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 订单附加属性（name/value 对）
///
/// 以 name 作为身份标识；空 name 表示无名属性，合并时丢弃。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttribute {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl NoteAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

/// 订单资源（`GET /orders/{id}.json` 中的 `order`）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Order {
    /// 由草稿订单转化而来时才存在
    #[serde(default, deserialize_with = "optional_id")]
    pub draft_order_id: Option<ResourceId>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note_attributes: Vec<NoteAttribute>,
}

/// 草稿订单资源，本流程只读
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftOrder {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note_attributes: Vec<NoteAttribute>,
}

#[derive(Debug, Deserialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct DraftOrderEnvelope {
    pub draft_order: DraftOrder,
}

/// 回写请求体 `{ "order": { "id", "note_attributes" } }`
#[derive(Debug, Serialize)]
pub struct OrderUpdateEnvelope<'a> {
    pub order: OrderUpdate<'a>,
}

#[derive(Debug, Serialize)]
pub struct OrderUpdate<'a> {
    pub id: &'a ResourceId,
    pub note_attributes: &'a [NoteAttribute],
}

impl<'a> OrderUpdateEnvelope<'a> {
    pub fn new(id: &'a ResourceId, note_attributes: &'a [NoteAttribute]) -> Self {
        Self {
            order: OrderUpdate {
                id,
                note_attributes,
            },
        }
    }
}

/// orders/create 入站事件
///
/// 只关心订单 ID；请求体须为合法 JSON，但不要求是对象。
#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order_id: Option<ResourceId>,
}

impl OrderCreatedEvent {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self {
            order_id: value.get("id").and_then(ResourceId::from_json),
        })
    }
}
