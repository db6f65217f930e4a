// ==========================================
// IMS 配置覆写服务 - 平台服务接口
// ==========================================
// 职责: 定义特权通道与平台系统服务的接口（不包含实现）
// 说明: 设备侧由宿主注入真实实现，测试注入内存实现
// 红线: 接口均为同步调用（binder 调用语义），由上层决定调度方式
// ==========================================

use std::sync::Arc;

use crate::domain::sim::SimDescriptor;
use crate::platform::bundle::PersistableBundle;
use crate::platform::capabilities::PlatformCapabilities;
use crate::platform::error::{CallFailure, CallResult};

// ==========================================
// BrokerChannel - 特权代理通道
// ==========================================

/// 特权代理通道（例如 Shizuku binder）
///
/// 负责就绪探测与 shell 权限身份委托。
pub trait BrokerChannel: Send + Sync {
    /// 代理 binder 是否已就绪
    fn ping_binder(&self) -> bool;

    /// 当前进程 uid（委托目标）
    fn caller_uid(&self) -> u32;

    /// 开始 shell 权限身份委托
    fn start_delegate_shell_permission_identity(&self, uid: u32) -> Result<(), CallFailure>;

    /// 结束 shell 权限身份委托
    fn stop_delegate_shell_permission_identity(&self) -> Result<(), CallFailure>;
}

// ==========================================
// CarrierConfigService - 运营商配置服务
// ==========================================
pub trait CarrierConfigService: Send + Sync {
    /// 探测三参数覆写方法 `overrideConfig(int, PersistableBundle, boolean)` 是否存在
    fn has_persistent_override(&self) -> bool;

    /// 两参数覆写（非持久化）
    ///
    /// `values = None` 表示清除覆写、恢复平台默认值。
    fn override_config(&self, sub_id: i32, values: Option<PersistableBundle>) -> CallResult<()>;

    /// 三参数覆写
    fn override_config_persistent(
        &self,
        sub_id: i32,
        values: Option<PersistableBundle>,
        persistent: bool,
    ) -> CallResult<()>;

    /// 读取订阅当前生效配置；订阅无配置时返回 None
    fn config_for_sub_id(&self, sub_id: i32) -> Result<Option<PersistableBundle>, CallFailure>;
}

// ==========================================
// SubscriptionService - 订阅服务
// ==========================================

/// 系统默认订阅（数据 / 语音 / 短信）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultSubscriptions {
    pub data: Option<i32>,
    pub voice: Option<i32>,
    pub sms: Option<i32>,
}

impl DefaultSubscriptions {
    /// 主订阅：数据 > 语音 > 短信
    pub fn primary(&self) -> Option<i32> {
        self.data.or(self.voice).or(self.sms)
    }
}

pub trait SubscriptionService: Send + Sync {
    /// 当前活动订阅 id 列表
    fn active_subscription_ids(&self) -> Result<Vec<i32>, CallFailure>;

    /// 通过订阅系统服务读取活动 SIM 信息；服务句柄不可用时返回 Ok(None)
    fn active_subscriptions_via_service(&self) -> Result<Option<Vec<SimDescriptor>>, CallFailure>;

    /// 通过 SubscriptionManager 读取活动 SIM 信息
    fn active_subscriptions_via_manager(&self) -> Result<Vec<SimDescriptor>, CallFailure>;

    /// 系统默认订阅
    fn default_subscriptions(&self) -> DefaultSubscriptions;
}

// ==========================================
// ImsService - IMS 控制服务
// ==========================================
pub trait ImsService: Send + Sync {
    /// 订阅所在卡槽
    fn slot_index(&self, sub_id: i32) -> Result<i32, CallFailure>;

    /// 重置卡槽上的 IMS（触发重新注册）
    fn reset_ims(&self, slot_index: i32) -> Result<(), CallFailure>;

    /// IMS 是否已注册
    fn is_ims_registered(&self, sub_id: i32) -> Result<bool, CallFailure>;
}

// ==========================================
// PlatformHandles - 平台句柄集合
// ==========================================

/// 平台句柄集合
///
/// 聚合特权宿主所需的全部平台依赖，进程内构造一次后注入。
#[derive(Clone)]
pub struct PlatformHandles {
    pub broker: Arc<dyn BrokerChannel>,
    pub carrier_config: Arc<dyn CarrierConfigService>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    pub ims: Arc<dyn ImsService>,
    pub capabilities: PlatformCapabilities,
}

impl PlatformHandles {
    pub fn new(
        broker: Arc<dyn BrokerChannel>,
        carrier_config: Arc<dyn CarrierConfigService>,
        subscriptions: Arc<dyn SubscriptionService>,
        ims: Arc<dyn ImsService>,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            broker,
            carrier_config,
            subscriptions,
            ims,
            capabilities,
        }
    }
}
