// ==========================================
// IMS 配置覆写服务 - 核心库
// ==========================================
// 技术栈: Rust + tokio + SQLite
// 系统定位: 通过特权代理覆写 IMS/VoLTE/VoWiFi/5G 运营商配置
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 功能开关、SIM 目标、载荷
pub mod domain;

// 平台边界层 - Bundle、配置键、能力判定、服务接口
pub mod platform;

// 引擎层 - 载荷构建与读回映射
pub mod engine;

// 特权层 - 委托身份、覆写、订阅解析、读取
pub mod privileged;

// 配置层 - 服务参数与偏好存储接口
pub mod config;

// 数据仓储层 - 偏好存储实现
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ApplyResult, ConfigSelection, FeatureFlag, FeatureValue, FeatureValueType, OverridePayload,
    SimDescriptor, SimTarget,
};

// 平台
pub use platform::{PlatformCapabilities, PlatformHandles};

// 引擎
pub use engine::{ConfigBundleBuilder, ConfigMapper};

// 特权层
pub use privileged::{PrivilegedError, PrivilegedHost};

// API
pub use api::{ApiError, ImsConfigApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "ims-override";
