// ==========================================
// IMS 配置覆写服务 - 应用层
// ==========================================
// 职责: 组件装配，连接平台句柄、存储与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
