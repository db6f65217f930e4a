// ==========================================
// IMS 配置覆写服务 - 引擎层
// ==========================================
// 职责: 功能开关与平台配置键之间的纯转换规则
// 红线: Engine 不调用平台服务，不记录状态
// ==========================================

pub mod bundle_builder;
pub mod config_mapper;

// 重导出核心引擎
pub use bundle_builder::{
    normalize_country_iso, BuildOutput, ConfigBundleBuilder, FIVE_G_SSRSRP_THRESHOLDS,
};
pub use config_mapper::{ConfigMapper, READ_KEYS};
