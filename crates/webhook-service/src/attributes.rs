//! 订单附加属性的筛选与合并

use crate::models::NoteAttribute;

/// 允许从草稿订单同步到订单的属性名
pub const SYNCED_ATTRIBUTE_NAMES: [&str; 3] =
    ["Delivery-Location-Id", "Delivery-Date", "Checkout-Method"];

/// 属性名是否在同步白名单内（区分大小写）
pub fn is_synced_attribute(name: &str) -> bool {
    SYNCED_ATTRIBUTE_NAMES.contains(&name)
}

/// 只保留白名单内的属性，保持原有顺序
pub fn filter_synced(attributes: &[NoteAttribute]) -> Vec<NoteAttribute> {
    attributes
        .iter()
        .filter(|attr| is_synced_attribute(&attr.name))
        .cloned()
        .collect()
}

/// 按 name 合并属性列表
///
/// - `existing` 中的属性保留原位置与相对顺序
/// - `incoming` 中同名属性原地覆盖 value，新名称追加到末尾
/// - 无名属性在两侧均被丢弃
/// - `existing` 内部重名时保留首次出现的位置，取最后一次的 value
pub fn merge_note_attributes(
    existing: &[NoteAttribute],
    incoming: &[NoteAttribute],
) -> Vec<NoteAttribute> {
    let mut merged: Vec<NoteAttribute> = Vec::with_capacity(existing.len() + incoming.len());

    for attr in existing.iter().chain(incoming) {
        if !attr.has_name() {
            continue;
        }
        match merged.iter_mut().find(|m| m.name == attr.name) {
            Some(slot) => slot.value.clone_from(&attr.value),
            None => merged.push(attr.clone()),
        }
    }

    merged
}
