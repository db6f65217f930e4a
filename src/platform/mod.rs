// ==========================================
// IMS 配置覆写服务 - 平台边界层
// ==========================================
// 职责: 键值包模型、配置键常量、能力判定、平台服务接口
// ==========================================

pub mod bundle;
pub mod capabilities;
pub mod carrier_keys;
pub mod error;
pub mod services;

pub use bundle::{Bundle, BundleValue, PersistableBundle, PersistableValue};
pub use capabilities::{sdk, PlatformCapabilities};
pub use error::{CallError, CallFailure, CallResult};
pub use services::{
    BrokerChannel, CarrierConfigService, DefaultSubscriptions, ImsService, PlatformHandles,
    SubscriptionService,
};
