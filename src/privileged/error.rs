// ==========================================
// IMS 配置覆写服务 - 特权层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线:
// - 能力降级（方法不存在）不是错误，不出现在本文件
// - 持久化回退失败时，两次失败原因都必须可通过 source() 追溯
// ==========================================

use thiserror::Error;

use crate::platform::error::CallFailure;

/// 订阅查询失败（"应用到全部 SIM" 时在任何覆写调用之前中止）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("查询活动订阅失败: {cause}")]
pub struct SubscriptionQueryError {
    #[source]
    pub cause: CallFailure,
}

impl SubscriptionQueryError {
    pub fn new(cause: CallFailure) -> Self {
        Self { cause }
    }
}

/// 持久化覆写失败后，非持久化回退也失败
///
/// Display 为回退失败的消息；持久化失败作为被抑制的原因挂在 source() 上，
/// 用户诊断文本以 `(persistent: ...)` 后缀附带。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{fallback}")]
pub struct FallbackFailure {
    pub fallback: CallFailure,
    #[source]
    pub persistent: CallFailure,
}

/// 覆写错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    #[error("覆写失败 (sub_id={sub_id}): {cause}")]
    Failed {
        sub_id: i32,
        #[source]
        cause: CallFailure,
    },

    #[error("覆写失败 (sub_id={sub_id}): 持久化={}, 回退={}", .failure.persistent, .failure.fallback)]
    PersistentFallbackFailed {
        sub_id: i32,
        #[source]
        failure: FallbackFailure,
    },
}

impl OverrideError {
    pub fn sub_id(&self) -> i32 {
        match self {
            OverrideError::Failed { sub_id, .. } => *sub_id,
            OverrideError::PersistentFallbackFailed { sub_id, .. } => *sub_id,
        }
    }

    /// 最终（最外层）失败
    pub fn primary_failure(&self) -> &CallFailure {
        match self {
            OverrideError::Failed { cause, .. } => cause,
            OverrideError::PersistentFallbackFailed { failure, .. } => &failure.fallback,
        }
    }
}

/// 特权层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrivilegedError {
    #[error("shizuku binder is not ready (attempts={attempts}, interrupted={interrupted})")]
    BrokerUnavailable { attempts: u32, interrupted: bool },

    #[error("权限委托失败: {0}")]
    DelegationFailure(#[source] CallFailure),

    #[error(transparent)]
    SubscriptionQuery(#[from] SubscriptionQueryError),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error("IMS 调用失败: {0}")]
    Ims(#[source] CallFailure),
}

impl PrivilegedError {
    /// 面向用户的单行诊断文本
    ///
    /// 平台失败优先取异常消息，消息缺失时取异常类名。
    /// 持久化回退失败时两次失败都列出，回退在前。
    pub fn user_message(&self) -> String {
        match self {
            PrivilegedError::BrokerUnavailable { .. } => "shizuku binder is not ready".to_string(),
            PrivilegedError::DelegationFailure(f) | PrivilegedError::Ims(f) => {
                f.display_message().to_string()
            }
            PrivilegedError::SubscriptionQuery(e) => e.cause.display_message().to_string(),
            PrivilegedError::Override(OverrideError::PersistentFallbackFailed {
                failure, ..
            }) => format!(
                "{} (persistent: {})",
                failure.fallback.display_message(),
                failure.persistent.display_message()
            ),
            PrivilegedError::Override(e) => e.primary_failure().display_message().to_string(),
        }
    }
}

/// Result 类型别名
pub type PrivilegedResult<T> = Result<T, PrivilegedError>;
