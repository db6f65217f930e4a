// ==========================================
// IMS 配置覆写服务 - SQLite 偏好存储
// ==========================================
// 存储: config_kv 表，scope_id = 命名空间，key = 开关名称，value = JSON 值
// 说明: 无法识别的开关名称或类型不符的值被跳过并记录 warn
// ==========================================

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::config::preference_store::{
    parse_sim_namespace, sim_namespace, PreferenceStore, DEFAULT_NAMESPACE, SIM_NAMESPACE_PREFIX,
};
use crate::db::open_sqlite_connection;
use crate::domain::selection::ConfigSelection;
use crate::domain::types::{FeatureFlag, FeatureValue};
use crate::repository::error::StoreResult;

pub struct SqlitePreferenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePreferenceStore {
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 复用已有连接（表结构由调用方保证）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn write_namespace(&self, namespace: &str, selection: &ConfigSelection) -> StoreResult<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM config_kv WHERE scope_id = ?1", params![namespace])?;
        let now = Utc::now().to_rfc3339();
        for (flag, value) in selection.iter() {
            tx.execute(
                "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![namespace, flag.as_str(), serde_json::to_string(value)?, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn read_namespace(&self, namespace: &str) -> StoreResult<Option<ConfigSelection>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1")?;
        let rows = stmt
            .query_map(params![namespace], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut selection = ConfigSelection::new();
        for (key, raw) in rows {
            let Some(flag) = FeatureFlag::from_name(&key) else {
                tracing::warn!(namespace, key = %key, "未知的开关名称，已跳过");
                continue;
            };
            match serde_json::from_str::<FeatureValue>(&raw) {
                Ok(value) => {
                    if let Err(e) = selection.try_set(flag, value) {
                        tracing::warn!(namespace, error = %e, raw_value = %raw, "开关值类型错误，已跳过");
                    }
                }
                Err(e) => {
                    tracing::warn!(namespace, key = %key, raw_value = %raw, error = %e, "开关值格式错误，已跳过")
                }
            }
        }
        Ok(Some(selection))
    }

    fn delete_namespace(&self, namespace: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM config_kv WHERE scope_id = ?1", params![namespace])?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn save_selection(&self, sub_id: i32, selection: &ConfigSelection) -> StoreResult<()> {
        self.write_namespace(&sim_namespace(sub_id), selection)
    }

    async fn load_selection(&self, sub_id: i32) -> StoreResult<Option<ConfigSelection>> {
        self.read_namespace(&sim_namespace(sub_id))
    }

    async fn clear_selection(&self, sub_id: i32) -> StoreResult<()> {
        self.delete_namespace(&sim_namespace(sub_id))
    }

    async fn saved_sub_ids(&self) -> StoreResult<Vec<i32>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT scope_id FROM config_kv WHERE scope_id LIKE ?1 || '%'",
        )?;
        let namespaces = stmt
            .query_map(params![SIM_NAMESPACE_PREFIX], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids: Vec<i32> = namespaces
            .iter()
            .filter_map(|ns| parse_sim_namespace(ns))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn load_default_selection(&self) -> StoreResult<ConfigSelection> {
        let saved = self.read_namespace(DEFAULT_NAMESPACE)?;
        let mut selection = ConfigSelection::defaults();
        if let Some(saved) = saved {
            for (flag, value) in saved.iter() {
                selection.set(flag, value.clone());
            }
        }
        Ok(selection)
    }

    async fn save_default_selection(&self, selection: &ConfigSelection) -> StoreResult<()> {
        self.write_namespace(DEFAULT_NAMESPACE, selection)
    }
}
