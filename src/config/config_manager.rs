// ==========================================
// IMS 配置覆写服务 - 配置管理器
// ==========================================
// 职责: 服务运行参数加载、查询、覆写管理
// 存储: config_kv 表 (scope_id='global')
// 说明: 每个键独立回退默认值；无法解析的值记录 warn 后使用默认值
// ==========================================

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::open_sqlite_connection;
use crate::privileged::executor::BinderWait;
use crate::privileged::host::HostSettings;
use crate::repository::error::StoreResult;

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ServiceConfig - 服务运行参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 应用/重置路径的代理就绪等待
    pub apply_wait_retries: u32,
    pub apply_wait_interval: Duration,
    /// 读取路径的代理就绪等待
    pub read_wait_retries: u32,
    pub read_wait_interval: Duration,
    /// 特权宿主结果等待上限
    pub result_timeout: Duration,
    /// SIM 列表为空时的重试次数与间隔
    pub sim_list_retries: u32,
    pub sim_list_retry_delay: Duration,
    /// 默认是否请求持久化覆写
    pub prefer_persistent: bool,
    /// info 日志是否输出覆写载荷内容
    pub log_payloads: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            apply_wait_retries: BinderWait::APPLY.max_retries,
            apply_wait_interval: BinderWait::APPLY.interval,
            read_wait_retries: BinderWait::READ.max_retries,
            read_wait_interval: BinderWait::READ.interval,
            result_timeout: Duration::from_secs(15),
            sim_list_retries: 3,
            sim_list_retry_delay: Duration::from_millis(250),
            prefer_persistent: false,
            log_payloads: false,
        }
    }
}

impl ServiceConfig {
    pub fn apply_wait(&self) -> BinderWait {
        BinderWait::new(self.apply_wait_retries, self.apply_wait_interval)
    }

    pub fn read_wait(&self) -> BinderWait {
        BinderWait::new(self.read_wait_retries, self.read_wait_interval)
    }

    /// 特权宿主参数
    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            apply_wait: self.apply_wait(),
            read_wait: self.read_wait(),
            log_payloads: self.log_payloads,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> StoreResult<Self> {
        {
            let conn_guard = conn.lock()?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
            params![GLOBAL_SCOPE, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 加载服务运行参数
    ///
    /// 缺失的键取默认值；格式错误的键记录 warn 后取默认值。
    pub fn load_service_config(&self) -> StoreResult<ServiceConfig> {
        let defaults = ServiceConfig::default();

        Ok(ServiceConfig {
            apply_wait_retries: self.parsed_or(
                config_keys::APPLY_WAIT_RETRIES,
                defaults.apply_wait_retries,
            )?,
            apply_wait_interval: self
                .millis_or(config_keys::APPLY_WAIT_INTERVAL_MS, defaults.apply_wait_interval)?,
            read_wait_retries: self
                .parsed_or(config_keys::READ_WAIT_RETRIES, defaults.read_wait_retries)?,
            read_wait_interval: self
                .millis_or(config_keys::READ_WAIT_INTERVAL_MS, defaults.read_wait_interval)?,
            result_timeout: self
                .millis_or(config_keys::RESULT_TIMEOUT_MS, defaults.result_timeout)?,
            sim_list_retries: self
                .parsed_or(config_keys::SIM_LIST_RETRIES, defaults.sim_list_retries)?,
            sim_list_retry_delay: self.millis_or(
                config_keys::SIM_LIST_RETRY_DELAY_MS,
                defaults.sim_list_retry_delay,
            )?,
            prefer_persistent: self
                .parsed_or(config_keys::PREFER_PERSISTENT, defaults.prefer_persistent)?,
            log_payloads: self.parsed_or(config_keys::LOG_PAYLOADS, defaults.log_payloads)?,
        })
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> StoreResult<T>
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = ?default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    fn millis_or(&self, key: &str, default: Duration) -> StoreResult<Duration> {
        let default_ms = default.as_millis() as u64;
        Ok(Duration::from_millis(self.parsed_or(key, default_ms)?))
    }

    /// 共享连接（供偏好存储复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // ===== 代理就绪等待 =====
    pub const APPLY_WAIT_RETRIES: &str = "apply_wait_retries";
    pub const APPLY_WAIT_INTERVAL_MS: &str = "apply_wait_interval_ms";
    pub const READ_WAIT_RETRIES: &str = "read_wait_retries";
    pub const READ_WAIT_INTERVAL_MS: &str = "read_wait_interval_ms";

    // ===== 宿主调用 =====
    pub const RESULT_TIMEOUT_MS: &str = "result_timeout_ms";

    // ===== SIM 列表 =====
    pub const SIM_LIST_RETRIES: &str = "sim_list_retries";
    pub const SIM_LIST_RETRY_DELAY_MS: &str = "sim_list_retry_delay_ms";

    // ===== 覆写行为 =====
    pub const PREFER_PERSISTENT: &str = "prefer_persistent";
    pub const LOG_PAYLOADS: &str = "log_payloads";
}
