// ==========================================
// IMS 配置覆写服务 - API层错误类型
// ==========================================
// 职责: 汇总特权层/存储层错误，转换为面向用户的单行诊断文本
// ==========================================

use thiserror::Error;

use crate::privileged::error::PrivilegedError;
use crate::privileged::protocol::EMPTY_RESULT_MESSAGE;
use crate::repository::error::StoreError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Privileged(#[from] PrivilegedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// 特权宿主在时限内未返回结果
    #[error("特权调用超时: operation={operation}")]
    Timeout { operation: &'static str },

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// 面向用户的单行诊断文本
    ///
    /// 平台失败取异常消息，消息缺失时取异常类名。
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Privileged(e) => e.user_message(),
            ApiError::Timeout { .. } => EMPTY_RESULT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
