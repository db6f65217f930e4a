// ==========================================
// IMS 配置覆写服务 - 配置读取
// ==========================================
// 职责: 在委托身份下读取订阅当前生效的运营商配置
// 红线: 读取失败不是错误，返回 None 并记录日志
// ==========================================

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::selection::ConfigSelection;
use crate::engine::config_mapper::ConfigMapper;
use crate::platform::bundle::PersistableBundle;
use crate::platform::services::CarrierConfigService;

pub struct ConfigReader {
    service: Arc<dyn CarrierConfigService>,
    mapper: ConfigMapper,
}

impl ConfigReader {
    pub fn new(service: Arc<dyn CarrierConfigService>, mapper: ConfigMapper) -> Self {
        Self { service, mapper }
    }

    /// 读取指定键；订阅无配置、id 为负或读取失败时返回 None
    pub fn read_values(&self, sub_id: i32, keys: &[&str]) -> Option<PersistableBundle> {
        self.read_config(sub_id)
            .map(|config| config.retain_keys(keys))
    }

    /// 读取并解码为功能开关集合
    pub fn read_current(&self, sub_id: i32) -> Option<ConfigSelection> {
        let values = self.read_values(sub_id, self.mapper.read_keys())?;
        Some(self.mapper.decode(&values))
    }

    /// 完整配置转储: 每行 `key: value`，按键排序
    pub fn dump(&self, sub_id: i32) -> Option<String> {
        let config = self.read_config(sub_id)?;
        Some(dump_text(&config))
    }

    fn read_config(&self, sub_id: i32) -> Option<PersistableBundle> {
        if sub_id < 0 {
            debug!(sub_id, "无效订阅 id，跳过读取");
            return None;
        }
        match self.service.config_for_sub_id(sub_id) {
            Ok(Some(config)) => Some(config),
            Ok(None) => {
                debug!(sub_id, "订阅没有运营商配置");
                None
            }
            Err(e) => {
                error!(sub_id, error = %e, "read config failed");
                None
            }
        }
    }
}

/// 转储文本（PersistableBundle 键有序）
pub fn dump_text(config: &PersistableBundle) -> String {
    config
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
