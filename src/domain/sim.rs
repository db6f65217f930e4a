// ==========================================
// IMS 配置覆写服务 - SIM 目标与描述
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// "全部活动订阅" 的原始哨兵值
pub const ALL_SUBSCRIPTIONS: i32 = -1;

// ==========================================
// SimTarget - 应用目标
// ==========================================
// 说明: AllActive 在应用时才展开为具体订阅 id，且每次都重新查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimTarget {
    Subscription(i32),
    AllActive,
}

impl SimTarget {
    /// 从原始 id 构造（-1 表示全部活动订阅，其余原样透传，不做存在性校验）
    pub fn from_raw(raw: i32) -> Self {
        if raw == ALL_SUBSCRIPTIONS {
            SimTarget::AllActive
        } else {
            SimTarget::Subscription(raw)
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            SimTarget::Subscription(id) => *id,
            SimTarget::AllActive => ALL_SUBSCRIPTIONS,
        }
    }
}

impl fmt::Display for SimTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimTarget::Subscription(id) => write!(f, "subId={}", id),
            SimTarget::AllActive => write!(f, "all"),
        }
    }
}

// ==========================================
// SimDescriptor - 活动 SIM 描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimDescriptor {
    pub sub_id: i32,
    pub display_name: String,
    pub carrier_name: String,
    pub sim_slot_index: i32,
    #[serde(default)]
    pub country_iso: String,
    #[serde(default)]
    pub mcc: String,
    #[serde(default)]
    pub mnc: String,
}

impl SimDescriptor {
    pub fn new(
        sub_id: i32,
        display_name: impl Into<String>,
        carrier_name: impl Into<String>,
        sim_slot_index: i32,
    ) -> Self {
        Self {
            sub_id,
            display_name: display_name.into(),
            carrier_name: carrier_name.into(),
            sim_slot_index,
            country_iso: String::new(),
            mcc: String::new(),
            mnc: String::new(),
        }
    }

    /// 展示标题，例如 `SIM 1: 中国移动 (CMCC)`
    pub fn show_title(&self) -> String {
        format!(
            "SIM {}: {} ({})",
            self.sim_slot_index + 1,
            self.display_name,
            self.carrier_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_maps_to_all() {
        assert_eq!(SimTarget::from_raw(-1), SimTarget::AllActive);
        assert_eq!(SimTarget::from_raw(3), SimTarget::Subscription(3));
        assert_eq!(SimTarget::AllActive.as_raw(), -1);
    }

    #[test]
    fn test_show_title_uses_one_based_slot() {
        let sim = SimDescriptor::new(2, "Work", "CMCC", 1);
        assert_eq!(sim.show_title(), "SIM 2: Work (CMCC)");
    }
}
