// ==========================================
// IMS 配置覆写服务 - 覆写应用器
// ==========================================
// 职责: 按订阅调用平台覆写接口，处理持久化 → 非持久化回退
// 说明:
// - 两种调用形态: 两参数 (sub_id, values) / 三参数 (sub_id, values, persistent)
// - 形态只探测一次并缓存；调用时遇到"方法不存在"也会降级为两参数
// 红线:
// - 能力降级不是错误，不按失败记录日志
// - 多订阅时首个失败即中止，已应用的订阅不回滚
// ==========================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::platform::bundle::PersistableBundle;
use crate::platform::error::{CallError, CallFailure};
use crate::platform::services::CarrierConfigService;
use crate::privileged::error::{FallbackFailure, OverrideError};

/// 平台覆写调用形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideShape {
    /// overrideConfig(int, PersistableBundle)
    TwoArg,
    /// overrideConfig(int, PersistableBundle, boolean)
    ThreeArg,
}

/// 单次覆写尝试的结果
///
/// Degraded 表示当前形态在运行平台上不存在，需要改用两参数形态重试。
#[derive(Debug)]
pub enum AttemptError {
    Degraded { method: String },
    Rejected(OverrideError),
}

// ==========================================
// OverrideStrategy - 调用形态策略
// ==========================================
pub trait OverrideStrategy: Send + Sync {
    fn shape(&self) -> OverrideShape;

    fn apply(
        &self,
        service: &dyn CarrierConfigService,
        sub_id: i32,
        values: Option<&PersistableBundle>,
        prefer_persistent: bool,
    ) -> Result<(), AttemptError>;
}

fn rejected(sub_id: i32, cause: CallFailure) -> AttemptError {
    AttemptError::Rejected(OverrideError::Failed { sub_id, cause })
}

/// 两参数形态（总是非持久化）
#[derive(Debug, Default)]
pub struct TwoArgOverride;

impl OverrideStrategy for TwoArgOverride {
    fn shape(&self) -> OverrideShape {
        OverrideShape::TwoArg
    }

    fn apply(
        &self,
        service: &dyn CarrierConfigService,
        sub_id: i32,
        values: Option<&PersistableBundle>,
        _prefer_persistent: bool,
    ) -> Result<(), AttemptError> {
        // 两参数形态不存在时没有更低的后备
        service
            .override_config(sub_id, values.cloned())
            .map_err(|e| rejected(sub_id, e.into_failure()))
    }
}

/// 三参数形态
#[derive(Debug, Default)]
pub struct ThreeArgOverride;

impl OverrideStrategy for ThreeArgOverride {
    fn shape(&self) -> OverrideShape {
        OverrideShape::ThreeArg
    }

    fn apply(
        &self,
        service: &dyn CarrierConfigService,
        sub_id: i32,
        values: Option<&PersistableBundle>,
        prefer_persistent: bool,
    ) -> Result<(), AttemptError> {
        if !prefer_persistent {
            return match service.override_config_persistent(sub_id, values.cloned(), false) {
                Ok(()) => Ok(()),
                Err(CallError::MethodNotFound { method }) => Err(AttemptError::Degraded { method }),
                Err(CallError::Failed(cause)) => Err(rejected(sub_id, cause)),
            };
        }

        let persistent = match service.override_config_persistent(sub_id, values.cloned(), true) {
            Ok(()) => return Ok(()),
            Err(CallError::MethodNotFound { method }) => {
                return Err(AttemptError::Degraded { method })
            }
            Err(CallError::Failed(cause)) => cause,
        };

        warn!(
            sub_id,
            error = %persistent,
            "持久化覆写失败，回退为非持久化覆写"
        );

        match service.override_config_persistent(sub_id, values.cloned(), false) {
            Ok(()) => Ok(()),
            Err(e) => Err(AttemptError::Rejected(OverrideError::PersistentFallbackFailed {
                sub_id,
                failure: FallbackFailure {
                    fallback: e.into_failure(),
                    persistent,
                },
            })),
        }
    }
}

static TWO_ARG: TwoArgOverride = TwoArgOverride;
static THREE_ARG: ThreeArgOverride = ThreeArgOverride;

// ==========================================
// OverrideApplier
// ==========================================
pub struct OverrideApplier {
    service: Arc<dyn CarrierConfigService>,
    shape: OnceLock<OverrideShape>,
    degraded: AtomicBool,
    log_payloads: bool,
}

impl OverrideApplier {
    pub fn new(service: Arc<dyn CarrierConfigService>) -> Self {
        Self {
            service,
            shape: OnceLock::new(),
            degraded: AtomicBool::new(false),
            log_payloads: false,
        }
    }

    /// 是否在 info 日志中输出载荷内容
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// 当前生效的调用形态（首次调用时探测）
    pub fn shape(&self) -> OverrideShape {
        if self.degraded.load(Ordering::Acquire) {
            return OverrideShape::TwoArg;
        }
        *self.shape.get_or_init(|| {
            let shape = if self.service.has_persistent_override() {
                OverrideShape::ThreeArg
            } else {
                OverrideShape::TwoArg
            };
            debug!(?shape, "探测覆写调用形态");
            shape
        })
    }

    fn strategy(&self) -> &'static dyn OverrideStrategy {
        match self.shape() {
            OverrideShape::TwoArg => &TWO_ARG,
            OverrideShape::ThreeArg => &THREE_ARG,
        }
    }

    /// 对单个订阅应用覆写
    ///
    /// `values = None` 表示重置（平台收到空配置）。
    pub fn apply(
        &self,
        sub_id: i32,
        values: Option<&PersistableBundle>,
        prefer_persistent: bool,
    ) -> Result<(), OverrideError> {
        match values {
            Some(v) if self.log_payloads => {
                info!(sub_id, values = ?v, "overrideConfig")
            }
            Some(v) => debug!(sub_id, keys = v.len(), "overrideConfig"),
            None => debug!(sub_id, "overrideConfig (reset)"),
        }

        let strategy = self.strategy();
        match strategy.apply(self.service.as_ref(), sub_id, values, prefer_persistent) {
            Ok(()) => Ok(()),
            Err(AttemptError::Rejected(e)) => Err(e),
            Err(AttemptError::Degraded { method }) => {
                debug!(sub_id, method = %method, "三参数覆写不可用，改用两参数形态");
                self.degraded.store(true, Ordering::Release);
                match TWO_ARG.apply(self.service.as_ref(), sub_id, values, prefer_persistent) {
                    Ok(()) => Ok(()),
                    Err(AttemptError::Rejected(e)) => Err(e),
                    Err(AttemptError::Degraded { method }) => Err(OverrideError::Failed {
                        sub_id,
                        cause: CallError::method_not_found(method).into_failure(),
                    }),
                }
            }
        }
    }

    /// 依次对多个订阅应用覆写，首个失败即中止
    pub fn apply_each(
        &self,
        sub_ids: &[i32],
        values: Option<&PersistableBundle>,
        prefer_persistent: bool,
    ) -> Result<usize, OverrideError> {
        for (applied, sub_id) in sub_ids.iter().enumerate() {
            if let Err(e) = self.apply(*sub_id, values, prefer_persistent) {
                warn!(sub_id, applied, error = %e, "覆写中止，已应用的订阅不回滚");
                return Err(e);
            }
        }
        Ok(sub_ids.len())
    }
}
