// ==========================================
// IMS 配置覆写服务 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 偏好存储的 SQLite 实现，屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod preference_repo;

// 重导出核心仓储
pub use error::{StoreError, StoreResult};
pub use preference_repo::SqlitePreferenceStore;
