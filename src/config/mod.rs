// ==========================================
// IMS 配置覆写服务 - 配置层
// ==========================================
// 职责: 服务运行参数管理、偏好存储接口
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod preference_store;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ServiceConfig, GLOBAL_SCOPE};
pub use preference_store::{sim_namespace, PreferenceStore, DEFAULT_NAMESPACE};
