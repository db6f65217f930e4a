// ==========================================
// IMS 配置覆写服务 - 订阅解析
// ==========================================
// 职责: SimTarget → 具体订阅 id 列表；活动 SIM 描述列表
// 红线:
// - 具体 id 原样透传，不做存在性校验
// - "全部" 每次实时查询，查询失败向上传播（不回退为空列表）
// ==========================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::sim::{SimDescriptor, SimTarget};
use crate::platform::error::CallFailure;
use crate::platform::services::SubscriptionService;
use crate::privileged::error::SubscriptionQueryError;

pub struct SubscriptionResolver {
    service: Arc<dyn SubscriptionService>,
}

impl SubscriptionResolver {
    pub fn new(service: Arc<dyn SubscriptionService>) -> Self {
        Self { service }
    }

    /// 解析应用目标
    pub fn resolve(&self, target: SimTarget) -> Result<Vec<i32>, SubscriptionQueryError> {
        match target {
            SimTarget::Subscription(id) => Ok(vec![id]),
            SimTarget::AllActive => {
                let ids = self
                    .service
                    .active_subscription_ids()
                    .map_err(SubscriptionQueryError::new)?;
                debug!(?ids, "活动订阅列表");
                Ok(ids)
            }
        }
    }

    /// 活动 SIM 描述列表
    ///
    /// 优先走订阅系统服务，失败或不可用时回退到 SubscriptionManager。
    /// 排序: 主订阅（数据 > 语音 > 短信）在前，其后按卡槽、订阅 id。
    pub fn list_active_sims(&self) -> Result<Vec<SimDescriptor>, CallFailure> {
        let sims = match self.service.active_subscriptions_via_service() {
            Ok(Some(sims)) => sims,
            Ok(None) => self.service.active_subscriptions_via_manager()?,
            Err(e) => {
                warn!(error = %e, "readByISub failed, fallback to SubscriptionManager");
                self.service.active_subscriptions_via_manager()?
            }
        };

        let primary = self.service.default_subscriptions().primary();
        Ok(sort_sims(sims, primary))
    }
}

/// 按主订阅、卡槽、订阅 id 排序
pub fn sort_sims(mut sims: Vec<SimDescriptor>, primary: Option<i32>) -> Vec<SimDescriptor> {
    sims.sort_by_key(|sim| (Some(sim.sub_id) != primary, sim.sim_slot_index, sim.sub_id));
    sims
}
