// ==========================================
// IMS 配置覆写服务 - 领域层
// ==========================================
// 职责: 功能开关模型、SIM 目标、覆写载荷与应用结果
// 红线: 领域层不访问平台服务
// ==========================================

pub mod payload;
pub mod selection;
pub mod sim;
pub mod types;

pub use payload::{ApplyResult, ApplyResultError, OverridePayload};
pub use selection::{ConfigSelection, SelectionTypeError};
pub use sim::{SimDescriptor, SimTarget, ALL_SUBSCRIPTIONS};
pub use types::{FeatureFlag, FeatureValue, FeatureValueType};
