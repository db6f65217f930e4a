// ==========================================
// IMS 配置覆写服务 - 平台调用错误
// ==========================================
// 职责: 区分"方法不存在"（能力降级）与"调用失败"（真实错误）
// 红线: 两类结果必须是不同的变体，不能合并为一个"调用失败"
// ==========================================

use thiserror::Error;

/// 平台调用失败
///
/// 保留平台异常的类名与消息；对外展示时优先使用消息，消息缺失时使用类名。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.display_message())]
pub struct CallFailure {
    pub class_name: String,
    pub message: Option<String>,
}

impl CallFailure {
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: Some(message.into()),
        }
    }

    /// 没有消息的异常（例如 NullPointerException）
    pub fn without_message(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
        }
    }

    /// 对外展示的诊断文本
    pub fn display_message(&self) -> &str {
        match self.message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg,
            _ => &self.class_name,
        }
    }
}

/// 平台方法调用结果
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// 运行平台上不存在该方法签名（能力降级，不是失败）
    #[error("平台方法不存在: {method}")]
    MethodNotFound { method: String },

    /// 方法存在但调用抛出异常
    #[error(transparent)]
    Failed(#[from] CallFailure),
}

impl CallError {
    pub fn method_not_found(method: impl Into<String>) -> Self {
        CallError::MethodNotFound {
            method: method.into(),
        }
    }

    /// 降级为 CallFailure（用于没有后备签名可用的场景）
    pub fn into_failure(self) -> CallFailure {
        match self {
            CallError::MethodNotFound { method } => {
                CallFailure::new("NoSuchMethodException", method)
            }
            CallError::Failed(failure) => failure,
        }
    }
}

/// Result 类型别名
pub type CallResult<T> = Result<T, CallError>;
