// ==========================================
// IMS 配置覆写服务 - API 层
// ==========================================
// 职责: 提供面向界面协作方的业务接口
// ==========================================

pub mod error;
pub mod ims_config_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use ims_config_api::{ImsConfigApi, RestoreSummary};
