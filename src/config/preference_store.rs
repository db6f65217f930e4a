// ==========================================
// IMS 配置覆写服务 - 偏好存储 Trait
// ==========================================
// 职责: 定义功能开关选择的持久化接口（不包含实现）
// 命名空间:
// - "ims_config": 全局默认选择
// - "sim_config_<subId>": 每个 SIM 的已保存选择
// 键: 功能开关的持久化名称（FeatureFlag::as_str）
// ==========================================

use async_trait::async_trait;

use crate::domain::selection::ConfigSelection;
use crate::repository::error::StoreResult;

/// 全局默认选择的命名空间
pub const DEFAULT_NAMESPACE: &str = "ims_config";

/// 每个 SIM 命名空间的前缀
pub const SIM_NAMESPACE_PREFIX: &str = "sim_config_";

/// SIM 命名空间名称
pub fn sim_namespace(sub_id: i32) -> String {
    format!("{}{}", SIM_NAMESPACE_PREFIX, sub_id)
}

/// 从命名空间名称解析订阅 id
pub fn parse_sim_namespace(namespace: &str) -> Option<i32> {
    namespace.strip_prefix(SIM_NAMESPACE_PREFIX)?.parse().ok()
}

// ==========================================
// PreferenceStore Trait
// ==========================================
// 实现者: SqlitePreferenceStore（config_kv 表，scope_id = 命名空间）
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// 保存 SIM 的选择（先清空该命名空间，再写入全部开关）
    async fn save_selection(&self, sub_id: i32, selection: &ConfigSelection) -> StoreResult<()>;

    /// 读取 SIM 的已保存选择
    ///
    /// # 返回
    /// - None: 该 SIM 没有保存过选择
    /// - Some: 只包含已保存的开关，缺失开关按默认值读取
    async fn load_selection(&self, sub_id: i32) -> StoreResult<Option<ConfigSelection>>;

    /// 清除 SIM 的已保存选择
    async fn clear_selection(&self, sub_id: i32) -> StoreResult<()>;

    /// 有已保存选择的订阅 id（升序）
    async fn saved_sub_ids(&self) -> StoreResult<Vec<i32>>;

    /// 全局默认选择；未保存时为全部默认值
    async fn load_default_selection(&self) -> StoreResult<ConfigSelection>;

    /// 保存全局默认选择
    async fn save_default_selection(&self, selection: &ConfigSelection) -> StoreResult<()>;
}
