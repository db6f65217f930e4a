// ==========================================
// IMS 配置覆写服务 - 特权宿主
// ==========================================
// 职责: 特权侧服务门面（进程内构造一次，Arc 共享）
// 流程: 获取委托身份 → 解析订阅 → 覆写/读取/IMS 控制 → 释放委托身份
// 红线: 委托身份由 DelegationGuard 作用域管理，所有退出路径都会释放
// ==========================================

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::domain::payload::ApplyResult;
use crate::domain::selection::ConfigSelection;
use crate::domain::sim::{SimDescriptor, SimTarget};
use crate::engine::config_mapper::ConfigMapper;
use crate::platform::bundle::{Bundle, PersistableBundle};
use crate::platform::capabilities::PlatformCapabilities;
use crate::platform::services::{ImsService, PlatformHandles};
use crate::privileged::applier::{OverrideApplier, OverrideShape};
use crate::privileged::error::{PrivilegedError, PrivilegedResult, SubscriptionQueryError};
use crate::privileged::executor::{BinderWait, DelegationGuard, PrivilegedExecutor};
use crate::privileged::protocol::{encode_result, OverrideRequest};
use crate::privileged::reader::ConfigReader;
use crate::privileged::subscriptions::SubscriptionResolver;

/// 宿主运行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSettings {
    pub apply_wait: BinderWait,
    pub read_wait: BinderWait,
    pub log_payloads: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            apply_wait: BinderWait::APPLY,
            read_wait: BinderWait::READ,
            log_payloads: false,
        }
    }
}

// ==========================================
// PrivilegedHost
// ==========================================
pub struct PrivilegedHost {
    executor: PrivilegedExecutor,
    applier: OverrideApplier,
    resolver: SubscriptionResolver,
    reader: ConfigReader,
    ims: Arc<dyn ImsService>,
    capabilities: PlatformCapabilities,
    settings: HostSettings,
}

impl PrivilegedHost {
    pub fn new(handles: PlatformHandles, settings: HostSettings) -> Self {
        let PlatformHandles {
            broker,
            carrier_config,
            subscriptions,
            ims,
            capabilities,
        } = handles;

        Self {
            executor: PrivilegedExecutor::new(broker),
            applier: OverrideApplier::new(carrier_config.clone())
                .with_payload_logging(settings.log_payloads),
            resolver: SubscriptionResolver::new(subscriptions),
            reader: ConfigReader::new(carrier_config, ConfigMapper::new(capabilities)),
            ims,
            capabilities,
            settings,
        }
    }

    pub fn executor(&self) -> &PrivilegedExecutor {
        &self.executor
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn settings(&self) -> HostSettings {
        self.settings
    }

    /// 当前使用的覆写形态
    pub fn override_shape(&self) -> OverrideShape {
        self.applier.shape()
    }

    // ==========================================
    // 覆写
    // ==========================================

    /// 处理请求 Bundle，返回响应 Bundle
    pub async fn handle_override(&self, request: Bundle) -> Bundle {
        let request = OverrideRequest::from_bundle(request);
        let result = match self.override_config(&request).await {
            Ok(_) => ApplyResult::ok(),
            Err(e) => ApplyResult::failed(e.user_message()),
        };
        encode_result(&result)
    }

    /// 应用覆写请求，返回已应用的订阅数
    #[instrument(skip(self, request), fields(target = %request.target, reset = request.payload.is_reset()))]
    pub async fn override_config(&self, request: &OverrideRequest) -> PrivilegedResult<usize> {
        let guard = self.executor.acquire(self.settings.apply_wait).await?;

        let outcome = self
            .resolver
            .resolve(request.target)
            .map_err(PrivilegedError::from)
            .and_then(|sub_ids| {
                self.applier
                    .apply_each(&sub_ids, request.payload.values(), request.prefer_persistent)
                    .map_err(PrivilegedError::from)
            });

        match &outcome {
            Ok(applied) => info!(
                operation_id = guard.operation_id(),
                applied, "overrideConfig success"
            ),
            Err(e) => error!(
                operation_id = guard.operation_id(),
                error = %e,
                "failed to override config"
            ),
        }
        outcome
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 读取并解码当前生效配置
    pub async fn read_current(&self, sub_id: i32) -> Option<ConfigSelection> {
        let _guard = self.acquire_for_read(sub_id).await?;
        self.reader.read_current(sub_id)
    }

    /// 读取指定键的原始值
    pub async fn read_config(&self, sub_id: i32, keys: &[&str]) -> Option<PersistableBundle> {
        let _guard = self.acquire_for_read(sub_id).await?;
        self.reader.read_values(sub_id, keys)
    }

    /// 完整配置转储
    pub async fn dump_config(&self, sub_id: i32) -> Option<String> {
        let _guard = self.acquire_for_read(sub_id).await?;
        self.reader.dump(sub_id)
    }

    /// 活动 SIM 描述列表（主订阅在前）
    pub async fn list_active_sims(&self) -> PrivilegedResult<Vec<SimDescriptor>> {
        let _guard = self.executor.acquire(self.settings.read_wait).await?;
        self.resolver
            .list_active_sims()
            .map_err(|e| PrivilegedError::SubscriptionQuery(SubscriptionQueryError::new(e)))
    }

    async fn acquire_for_read(&self, sub_id: i32) -> Option<DelegationGuard<'_>> {
        if sub_id < 0 {
            return None;
        }
        match self.executor.acquire(self.settings.read_wait).await {
            Ok(guard) => Some(guard),
            Err(e) => {
                error!(sub_id, error = %e, "read config failed");
                None
            }
        }
    }

    // ==========================================
    // IMS 控制
    // ==========================================

    /// 重置目标订阅所在卡槽的 IMS
    pub async fn restart_ims(&self, target: SimTarget) -> PrivilegedResult<()> {
        let _guard = self.executor.acquire(self.settings.apply_wait).await?;
        let sub_ids = self.resolver.resolve(target)?;
        for sub_id in sub_ids {
            let slot_index = self.ims.slot_index(sub_id).map_err(PrivilegedError::Ims)?;
            info!(sub_id, slot_index, "resetIms");
            self.ims.reset_ims(slot_index).map_err(PrivilegedError::Ims)?;
        }
        Ok(())
    }

    /// IMS 注册状态；id 为负或读取失败时返回 None
    pub async fn ims_registration_status(&self, sub_id: i32) -> Option<bool> {
        let _guard = self.acquire_for_read(sub_id).await?;
        match self.ims.is_ims_registered(sub_id) {
            Ok(registered) => Some(registered),
            Err(e) => {
                error!(sub_id, error = %e, "read ims registration status failed");
                None
            }
        }
    }
}
