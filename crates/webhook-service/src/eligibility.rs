//! 订单处理资格判定
//!
//! 部分店铺只需同步特定业务线（如批发）的订单，通过订单标签中的标记识别。

use crate::models::Order;

/// 订单资格策略
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EligibilityPolicy {
    /// 所有订单均处理
    #[default]
    AllOrders,
    /// 标签（小写后）包含该标记的订单才处理，标记在构造时已转为小写
    TagContains(String),
}

impl EligibilityPolicy {
    /// 根据配置的标记构造策略，空标记等同于不过滤
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker.map(str::trim).filter(|m| !m.is_empty()) {
            Some(marker) => Self::TagContains(marker.to_lowercase()),
            None => Self::AllOrders,
        }
    }

    pub fn is_eligible(&self, order: &Order) -> bool {
        match self {
            Self::AllOrders => true,
            Self::TagContains(marker) => order
                .tags
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(marker.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_tags(tags: Option<&str>) -> Order {
        Order {
            tags: tags.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_orders() {
        let policy = EligibilityPolicy::from_marker(None);
        assert_eq!(policy, EligibilityPolicy::AllOrders);
        assert!(policy.is_eligible(&order_with_tags(None)));
        assert!(policy.is_eligible(&order_with_tags(Some("retail"))));
    }

    #[test]
    fn test_blank_marker_is_unfiltered() {
        assert_eq!(
            EligibilityPolicy::from_marker(Some("  ")),
            EligibilityPolicy::AllOrders
        );
    }

    #[test]
    fn test_tag_marker_case_insensitive() {
        let policy = EligibilityPolicy::from_marker(Some("SAMITA-Wholesale"));
        assert_eq!(
            policy,
            EligibilityPolicy::TagContains("samita-wholesale".to_string())
        );

        assert!(policy.is_eligible(&order_with_tags(Some("Wholesale, SAMITA-Wholesale"))));
        assert!(policy.is_eligible(&order_with_tags(Some("vip samita-wholesale"))));
        assert!(!policy.is_eligible(&order_with_tags(Some("retail"))));
        assert!(!policy.is_eligible(&order_with_tags(Some(""))));
        assert!(!policy.is_eligible(&order_with_tags(None)));
    }

    #[test]
    fn test_marker_is_substring_match() {
        let policy = EligibilityPolicy::from_marker(Some("wholesale"));
        assert!(policy.is_eligible(&order_with_tags(Some("Wholesale, SAMITA-Wholesale"))));
        assert!(policy.is_eligible(&order_with_tags(Some("wholesale-2024"))));
    }
}
