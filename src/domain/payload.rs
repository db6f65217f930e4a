// ==========================================
// IMS 配置覆写服务 - 覆写载荷 / 应用结果
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::bundle::PersistableBundle;

// ==========================================
// OverridePayload - 覆写载荷
// ==========================================
// 所有权: 每次应用新建，按值交给覆写器，构造后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverridePayload {
    /// 覆写指定键
    Values(PersistableBundle),
    /// 清除覆写，恢复平台默认值（平台调用收到空配置）
    Reset,
}

impl OverridePayload {
    pub fn is_reset(&self) -> bool {
        matches!(self, OverridePayload::Reset)
    }

    /// 交给平台调用的配置；重置载荷为 None
    pub fn values(&self) -> Option<&PersistableBundle> {
        match self {
            OverridePayload::Values(values) => Some(values),
            OverridePayload::Reset => None,
        }
    }

    pub fn into_values(self) -> Option<PersistableBundle> {
        match self {
            OverridePayload::Values(values) => Some(values),
            OverridePayload::Reset => None,
        }
    }
}

// ==========================================
// ApplyResult - 应用结果
// ==========================================
// 红线: 成功时无消息；失败时消息非空（反序列化同样校验）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawApplyResult")]
pub struct ApplyResult {
    success: bool,
    message: Option<String>,
}

/// 未校验的结果字段（仅用于反序列化）
#[derive(Debug, Deserialize)]
pub struct RawApplyResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// 成功/消息组合不一致
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyResultError {
    #[error("成功结果不应携带消息: {0}")]
    SuccessWithMessage(String),

    #[error("失败结果缺少消息")]
    FailureWithoutMessage,
}

impl TryFrom<RawApplyResult> for ApplyResult {
    type Error = ApplyResultError;

    fn try_from(raw: RawApplyResult) -> Result<Self, Self::Error> {
        match (raw.success, raw.message) {
            (true, None) => Ok(ApplyResult::ok()),
            (true, Some(message)) => Err(ApplyResultError::SuccessWithMessage(message)),
            (false, Some(message)) if !message.trim().is_empty() => {
                Ok(ApplyResult::failed(message))
            }
            (false, _) => Err(ApplyResultError::FailureWithoutMessage),
        }
    }
}

impl ApplyResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// 失败结果；空消息被替换为 "unknown error"
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown error".to_string()
        } else {
            message
        };
        Self {
            success: false,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
