// ==========================================
// IMS 配置覆写服务 - 应用状态
// ==========================================
// 职责: 装配特权宿主、偏好存储与 API 实例（进程内构造一次）
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::ImsConfigApi;
use crate::config::config_manager::{ConfigManager, ServiceConfig};
use crate::db::open_sqlite_connection;
use crate::platform::services::PlatformHandles;
use crate::privileged::host::PrivilegedHost;
use crate::repository::error::StoreResult;
use crate::repository::preference_repo::SqlitePreferenceStore;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "IMS_OVERRIDE_DB_PATH";

const DB_FILE_NAME: &str = "ims_override.db";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 服务运行参数（启动时从 config_kv 加载）
    pub service_config: ServiceConfig,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 特权宿主
    pub host: Arc<PrivilegedHost>,

    /// 偏好存储
    pub preferences: Arc<SqlitePreferenceStore>,

    /// IMS 配置 API
    pub ims_config_api: Arc<ImsConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - handles: 平台句柄（由宿主注入）
    pub fn new(db_path: String, handles: PlatformHandles) -> StoreResult<Self> {
        tracing::info!(db_path = %db_path, sdk_int = handles.capabilities.sdk_int, "初始化AppState");

        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let service_config = config_manager.load_service_config()?;
        tracing::debug!(?service_config, "服务运行参数");

        let host = Arc::new(PrivilegedHost::new(handles, service_config.host_settings()));
        let preferences = Arc::new(SqlitePreferenceStore::from_connection(conn));
        let ims_config_api = Arc::new(ImsConfigApi::new(
            host.clone(),
            preferences.clone(),
            service_config.clone(),
        ));

        Ok(Self {
            db_path,
            service_config,
            config_manager,
            host,
            preferences,
            ims_config_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先使用环境变量 IMS_OVERRIDE_DB_PATH，其次为用户数据目录，最后回退到当前目录。
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("ims-override");
        // 目录创建失败时沿用当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
