// ==========================================
// IMS 配置覆写服务 - IMS 配置 API
// ==========================================
// 职责: 面向界面协作方的入口（应用/重置/读取/SIM 列表/IMS 控制/开机恢复）
// 流程: 选择 → 构建载荷 → 请求 Bundle → 特权宿主 → 响应 Bundle → ApplyResult
// 红线:
// - 只有应用成功后才保存选择，避免本地状态与系统状态不一致
// - 宿主调用有结果时限，超时按 "failed with empty result" 处理
// ==========================================

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ServiceConfig;
use crate::config::preference_store::PreferenceStore;
use crate::domain::payload::{ApplyResult, OverridePayload};
use crate::domain::selection::ConfigSelection;
use crate::domain::sim::{SimDescriptor, SimTarget};
use crate::domain::types::FeatureFlag;
use crate::engine::bundle_builder::ConfigBundleBuilder;
use crate::privileged::host::PrivilegedHost;
use crate::privileged::protocol::{decode_result, OverrideRequest};

/// 开机恢复结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// ==========================================
// ImsConfigApi
// ==========================================

/// IMS 配置 API
///
/// 职责：
/// 1. 应用 / 重置覆写，并维护每个 SIM 的已保存选择
/// 2. 读取当前生效配置、配置转储、活动 SIM 列表
/// 3. IMS 重新注册与注册状态
/// 4. 开机后恢复已保存的选择
pub struct ImsConfigApi {
    host: Arc<PrivilegedHost>,
    store: Arc<dyn PreferenceStore>,
    builder: ConfigBundleBuilder,
    config: ServiceConfig,
}

impl ImsConfigApi {
    pub fn new(
        host: Arc<PrivilegedHost>,
        store: Arc<dyn PreferenceStore>,
        config: ServiceConfig,
    ) -> Self {
        let builder = ConfigBundleBuilder::new(host.capabilities());
        Self {
            host,
            store,
            builder,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ==========================================
    // 应用 / 重置
    // ==========================================

    /// 应用功能开关选择
    ///
    /// # 参数
    /// - target: 具体订阅或全部活动订阅
    /// - selection: 功能开关选择（缺失开关按默认值）
    /// - prefer_persistent: 是否优先请求持久化覆写
    ///
    /// # 说明
    /// - 国家码只对具体订阅下发
    /// - 成功后保存选择: 具体订阅存入 sim_config_<subId>，全部订阅存入默认命名空间
    pub async fn apply_configuration(
        &self,
        target: SimTarget,
        selection: &ConfigSelection,
        prefer_persistent: bool,
    ) -> ApplyResult {
        let carrier_name = selection.text_value(FeatureFlag::CarrierName);
        let country_iso = match target {
            SimTarget::Subscription(_) => Some(selection.text_value(FeatureFlag::CountryIso)),
            SimTarget::AllActive => None,
        };

        let output = self
            .builder
            .build_with_report(Some(carrier_name), country_iso, selection);
        if !output.skipped.is_empty() {
            warn!(
                target = %target,
                skipped = ?output.skipped,
                sdk_int = self.builder.capabilities().sdk_int,
                "平台版本不支持部分开关，已跳过"
            );
        }

        let result = self
            .submit(OverrideRequest::new(target, output.payload, prefer_persistent))
            .await;

        if result.is_success() {
            let saved = match target {
                SimTarget::Subscription(sub_id) => {
                    self.store.save_selection(sub_id, selection).await
                }
                SimTarget::AllActive => self.store.save_default_selection(selection).await,
            };
            if let Err(e) = saved {
                warn!(target = %target, error = %e, "配置已应用，但保存选择失败");
            }
        }
        result
    }

    /// 重置为平台默认配置
    ///
    /// 成功后清除已保存选择，避免开机恢复把重置撤销:
    /// 具体订阅清除该 SIM 的选择，全部订阅清除所有 SIM 的选择。
    pub async fn reset_configuration(&self, target: SimTarget) -> ApplyResult {
        let result = self
            .submit(OverrideRequest::new(
                target,
                self.builder.build_reset(),
                self.config.prefer_persistent,
            ))
            .await;

        if result.is_success() {
            let cleared = match target {
                SimTarget::Subscription(sub_id) => self.clear_saved(sub_id).await,
                SimTarget::AllActive => self.clear_all_saved().await,
            };
            if let Err(e) = cleared {
                warn!(target = %target, error = %e, "配置已重置，但清除已保存选择失败");
            }
        }
        result
    }

    async fn clear_saved(&self, sub_id: i32) -> ApiResult<()> {
        Ok(self.store.clear_selection(sub_id).await?)
    }

    async fn clear_all_saved(&self) -> ApiResult<()> {
        for sub_id in self.store.saved_sub_ids().await? {
            self.clear_saved(sub_id).await?;
        }
        Ok(())
    }

    /// 单键布尔覆写
    pub async fn update_config_boolean(&self, sub_id: i32, key: &str, value: bool) -> ApplyResult {
        if key.trim().is_empty() {
            return ApplyResult::failed(ApiError::InvalidInput("empty key".into()).user_message());
        }
        let payload = self.builder.build_single_boolean(key, value);
        self.submit(OverrideRequest::new(
            SimTarget::Subscription(sub_id),
            payload,
            self.config.prefer_persistent,
        ))
        .await
    }

    async fn submit(&self, request: OverrideRequest) -> ApplyResult {
        let target = request.target;
        let reset = matches!(request.payload, OverridePayload::Reset);
        let response = self
            .bounded("override", self.host.handle_override(request.into_bundle()))
            .await
            .ok();

        let result = decode_result(response.as_ref());
        match result.message() {
            None => info!(target = %target, reset, "覆写成功"),
            Some(msg) => warn!(target = %target, reset, message = msg, "覆写失败"),
        }
        result
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 当前生效配置（解码为功能开关）
    pub async fn read_current_configuration(&self, sub_id: i32) -> Option<ConfigSelection> {
        self.bounded("read_config", self.host.read_current(sub_id))
            .await
            .ok()
            .flatten()
    }

    /// 完整配置转储
    pub async fn dump_carrier_config(&self, sub_id: i32) -> Option<String> {
        self.bounded("dump_config", self.host.dump_config(sub_id))
            .await
            .ok()
            .flatten()
    }

    /// 活动 SIM 列表；为空时按配置重试，失败时返回空列表
    pub async fn list_active_sims(&self) -> Vec<SimDescriptor> {
        let attempts = self.config.sim_list_retries.max(1);
        for attempt in 0..attempts {
            match self.try_list_active_sims().await {
                Ok(sims) if !sims.is_empty() => return sims,
                Ok(_) => info!(attempt, "活动 SIM 列表为空"),
                Err(e) => warn!(attempt, error = %e, "读取活动 SIM 列表失败"),
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(self.config.sim_list_retry_delay).await;
            }
        }
        Vec::new()
    }

    async fn try_list_active_sims(&self) -> ApiResult<Vec<SimDescriptor>> {
        Ok(self
            .bounded("list_sims", self.host.list_active_sims())
            .await??)
    }

    // ==========================================
    // IMS 控制
    // ==========================================

    /// 触发 IMS 重新注册
    pub async fn restart_ims_registration(&self, target: SimTarget) -> ApplyResult {
        match self.bounded("restart_ims", self.host.restart_ims(target)).await {
            Ok(Ok(())) => ApplyResult::ok(),
            Ok(Err(e)) => ApplyResult::failed(e.user_message()),
            Err(e) => ApplyResult::failed(e.user_message()),
        }
    }

    /// IMS 注册状态
    pub async fn read_ims_registration_status(&self, sub_id: i32) -> Option<bool> {
        self.bounded("ims_status", self.host.ims_registration_status(sub_id))
            .await
            .ok()
            .flatten()
    }

    // ==========================================
    // 已保存选择
    // ==========================================

    /// 全局默认选择
    pub async fn load_default_selection(&self) -> ApiResult<ConfigSelection> {
        Ok(self.store.load_default_selection().await?)
    }

    /// SIM 的已保存选择
    pub async fn load_saved_selection(&self, sub_id: i32) -> ApiResult<Option<ConfigSelection>> {
        Ok(self.store.load_selection(sub_id).await?)
    }

    /// 开机后恢复: 对每个有已保存选择的活动 SIM 重新应用
    pub async fn restore_saved_configurations(&self) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        for sim in self.list_active_sims().await {
            if sim.sub_id < 0 {
                continue;
            }
            let saved = match self.store.load_selection(sim.sub_id).await {
                Ok(Some(saved)) => saved,
                Ok(None) => continue,
                Err(e) => {
                    warn!(sub_id = sim.sub_id, error = %e, "读取已保存选择失败，跳过");
                    continue;
                }
            };

            summary.attempted += 1;
            let result = self
                .apply_configuration(
                    SimTarget::Subscription(sim.sub_id),
                    &saved,
                    self.config.prefer_persistent,
                )
                .await;
            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                warn!(
                    sub_id = sim.sub_id,
                    message = result.message().unwrap_or_default(),
                    "auto restore saved config failed"
                );
            }
        }

        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "auto restore saved config finished"
        );
        summary
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 对宿主调用施加结果时限
    async fn bounded<F, T>(&self, operation: &'static str, fut: F) -> ApiResult<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.config.result_timeout, fut)
            .await
            .map_err(|_| {
                warn!(operation, "failed with empty result");
                ApiError::Timeout { operation }
            })
    }
}
