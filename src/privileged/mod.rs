// ==========================================
// IMS 配置覆写服务 - 特权层
// ==========================================
// 职责: 在特权代理的委托身份下执行覆写、读取与 IMS 控制
// 红线: 平台调用只在 DelegationGuard 存活期间发生
// ==========================================

pub mod applier;
pub mod error;
pub mod executor;
pub mod host;
pub mod protocol;
pub mod reader;
pub mod subscriptions;

pub use applier::{OverrideApplier, OverrideShape, OverrideStrategy, ThreeArgOverride, TwoArgOverride};
pub use error::{
    FallbackFailure, OverrideError, PrivilegedError, PrivilegedResult, SubscriptionQueryError,
};
pub use executor::{BinderWait, DelegationGuard, PrivilegedExecutor};
pub use host::{HostSettings, PrivilegedHost};
pub use protocol::{decode_result, encode_result, OverrideRequest, EMPTY_RESULT_MESSAGE};
pub use reader::ConfigReader;
pub use subscriptions::SubscriptionResolver;
