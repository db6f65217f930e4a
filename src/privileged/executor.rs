// ==========================================
// IMS 配置覆写服务 - 特权执行器
// ==========================================
// 职责: 等待特权代理就绪，开启 shell 权限身份委托，保证在所有退出路径上释放
// 红线:
// - 进程内同一时刻只允许一个委托身份（异步互斥锁串行化）
// - 释放失败只记录 warn，不影响操作结果
// - 代理未就绪时绝不开启委托
// ==========================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard, Notify};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::platform::services::BrokerChannel;
use crate::privileged::error::{PrivilegedError, PrivilegedResult};

// ==========================================
// BinderWait - 就绪等待策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderWait {
    /// 最大重试次数（首次探测之外）
    pub max_retries: u32,
    /// 探测间隔
    pub interval: Duration,
}

impl BinderWait {
    /// 应用 / 重置路径: 20 × 100ms
    pub const APPLY: BinderWait = BinderWait {
        max_retries: 20,
        interval: Duration::from_millis(100),
    };

    /// 读取路径: 50 × 100ms
    pub const READ: BinderWait = BinderWait {
        max_retries: 50,
        interval: Duration::from_millis(100),
    };

    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
        }
    }
}

// ==========================================
// PrivilegedExecutor
// ==========================================
pub struct PrivilegedExecutor {
    broker: Arc<dyn BrokerChannel>,
    gate: Mutex<()>,
    interrupt: Notify,
}

impl PrivilegedExecutor {
    pub fn new(broker: Arc<dyn BrokerChannel>) -> Self {
        Self {
            broker,
            gate: Mutex::new(()),
            interrupt: Notify::new(),
        }
    }

    /// 获取委托身份
    ///
    /// # 流程
    /// 1. 获取进程内互斥锁（排队等待前一个委托释放）
    /// 2. 按策略轮询代理就绪
    /// 3. 开启 shell 权限身份委托
    ///
    /// # 返回
    /// - Ok(DelegationGuard): 委托已开启，guard 离开作用域时释放
    /// - Err(BrokerUnavailable): 代理未就绪或等待被中断
    /// - Err(DelegationFailure): 开启委托失败
    pub async fn acquire(&self, wait: BinderWait) -> PrivilegedResult<DelegationGuard<'_>> {
        let permit = self.gate.lock().await;
        let operation_id = Uuid::new_v4().to_string();

        self.wait_for_binder(wait, &operation_id).await?;

        let uid = self.broker.caller_uid();
        info!(operation_id = %operation_id, uid, "开启 shell 权限委托");
        self.broker
            .start_delegate_shell_permission_identity(uid)
            .map_err(PrivilegedError::DelegationFailure)?;

        Ok(DelegationGuard {
            broker: self.broker.as_ref(),
            operation_id,
            started_at: Instant::now(),
            _permit: permit,
        })
    }

    /// 中断当前正在等待代理就绪的调用
    ///
    /// 只影响已经在等待的调用；等待方以 BrokerUnavailable 结束。
    pub fn interrupt(&self) {
        self.interrupt.notify_waiters();
    }

    async fn wait_for_binder(&self, wait: BinderWait, operation_id: &str) -> PrivilegedResult<()> {
        let interrupted = self.interrupt.notified();
        tokio::pin!(interrupted);

        let mut retries: u32 = 0;
        while !self.broker.ping_binder() {
            retries += 1;
            if retries > wait.max_retries {
                warn!(operation_id, retries, "shizuku binder is not ready");
                return Err(PrivilegedError::BrokerUnavailable {
                    attempts: retries,
                    interrupted: false,
                });
            }
            debug!(operation_id, retries, "wait for shizuku binder ready");
            tokio::select! {
                _ = tokio::time::sleep(wait.interval) => {}
                _ = &mut interrupted => {
                    warn!(operation_id, retries, "等待代理就绪被中断");
                    return Err(PrivilegedError::BrokerUnavailable {
                        attempts: retries,
                        interrupted: true,
                    });
                }
            }
        }
        debug!(operation_id, retries, "shizuku binder is ready");
        Ok(())
    }
}

// ==========================================
// DelegationGuard - 委托身份作用域
// ==========================================

/// 委托身份作用域
///
/// 持有执行器互斥锁；Drop 时结束委托再释放锁。
pub struct DelegationGuard<'a> {
    broker: &'a dyn BrokerChannel,
    operation_id: String,
    started_at: Instant,
    _permit: MutexGuard<'a, ()>,
}

impl DelegationGuard<'_> {
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }
}

impl Drop for DelegationGuard<'_> {
    fn drop(&mut self) {
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        match self.broker.stop_delegate_shell_permission_identity() {
            Ok(()) => info!(
                operation_id = %self.operation_id,
                elapsed_ms,
                "stopped shell permission delegation"
            ),
            Err(e) => warn!(
                operation_id = %self.operation_id,
                error = %e,
                "结束 shell 权限委托失败"
            ),
        }
    }
}
