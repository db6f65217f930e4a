// ==========================================
// IMS 配置覆写服务 - 领域类型定义
// ==========================================
// 职责: 功能开关枚举、值类型标签、功能值
// 红线: 值类型与开关定义不符属于编程错误（panic），不是可恢复错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 功能值类型 (Feature Value Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureValueType {
    Boolean,
    String,
}

impl fmt::Display for FeatureValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValueType::Boolean => write!(f, "BOOLEAN"),
            FeatureValueType::String => write!(f, "STRING"),
        }
    }
}

// ==========================================
// 功能值 (Feature Value)
// ==========================================
// 序列化为裸 JSON 值（true / "cmcc"），与偏好存储格式一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Boolean(bool),
    String(String),
}

impl FeatureValue {
    pub fn value_type(&self) -> FeatureValueType {
        match self {
            FeatureValue::Boolean(_) => FeatureValueType::Boolean,
            FeatureValue::String(_) => FeatureValueType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FeatureValue::Boolean(v) => Some(*v),
            FeatureValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::String(v) => Some(v.as_str()),
            FeatureValue::Boolean(_) => None,
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Boolean(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::String(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::String(v)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Boolean(v) => write!(f, "{}", v),
            FeatureValue::String(v) => write!(f, "{}", v),
        }
    }
}

// ==========================================
// 功能开关 (Feature Flag)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与偏好存储键名一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlag {
    CarrierName,      // 运营商名称
    CountryIso,       // 国家码
    Volte,            // VoLTE
    Vowifi,           // VoWiFi
    Vt,               // 视频通话
    Vonr,             // 5G 语音
    CrossSim,         // 跨 SIM 通话
    Ut,               // UT 补充业务
    #[serde(rename = "FIVE_G_NR")]
    FiveGNr,          // 5G NR
    #[serde(rename = "FIVE_G_THRESHOLDS")]
    FiveGThresholds,  // 5G 信号阈值
    #[serde(rename = "SHOW_4G_FOR_LTE")]
    Show4gForLte,     // LTE 显示为 4G
}

impl FeatureFlag {
    /// 全部开关（定义顺序）
    pub const ALL: [FeatureFlag; 11] = [
        FeatureFlag::CarrierName,
        FeatureFlag::CountryIso,
        FeatureFlag::Volte,
        FeatureFlag::Vowifi,
        FeatureFlag::Vt,
        FeatureFlag::Vonr,
        FeatureFlag::CrossSim,
        FeatureFlag::Ut,
        FeatureFlag::FiveGNr,
        FeatureFlag::FiveGThresholds,
        FeatureFlag::Show4gForLte,
    ];

    /// 持久化名称
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::CarrierName => "CARRIER_NAME",
            FeatureFlag::CountryIso => "COUNTRY_ISO",
            FeatureFlag::Volte => "VOLTE",
            FeatureFlag::Vowifi => "VOWIFI",
            FeatureFlag::Vt => "VT",
            FeatureFlag::Vonr => "VONR",
            FeatureFlag::CrossSim => "CROSS_SIM",
            FeatureFlag::Ut => "UT",
            FeatureFlag::FiveGNr => "FIVE_G_NR",
            FeatureFlag::FiveGThresholds => "FIVE_G_THRESHOLDS",
            FeatureFlag::Show4gForLte => "SHOW_4G_FOR_LTE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FeatureFlag::ALL
            .iter()
            .copied()
            .find(|flag| flag.as_str() == name)
    }

    pub fn value_type(&self) -> FeatureValueType {
        match self {
            FeatureFlag::CarrierName | FeatureFlag::CountryIso => FeatureValueType::String,
            _ => FeatureValueType::Boolean,
        }
    }

    /// 默认值：布尔开关默认开启（LTE 显示 4G 除外），字符串默认为空
    pub fn default_value(&self) -> FeatureValue {
        match self {
            FeatureFlag::CarrierName | FeatureFlag::CountryIso => {
                FeatureValue::String(String::new())
            }
            FeatureFlag::Show4gForLte => FeatureValue::Boolean(false),
            _ => FeatureValue::Boolean(true),
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_value_types() {
        for flag in FeatureFlag::ALL {
            assert_eq!(flag.default_value().value_type(), flag.value_type(), "{}", flag);
        }
        assert_eq!(FeatureFlag::Show4gForLte.default_value(), FeatureValue::Boolean(false));
        assert_eq!(FeatureFlag::Volte.default_value(), FeatureValue::Boolean(true));
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        for flag in FeatureFlag::ALL {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
            assert_eq!(FeatureFlag::from_name(flag.as_str()), Some(flag));
        }
        assert_eq!(FeatureFlag::from_name("IMS_USER_AGENT"), None);
    }

    #[test]
    fn test_feature_value_untagged_json() {
        assert_eq!(serde_json::to_string(&FeatureValue::Boolean(true)).unwrap(), "true");
        let v: FeatureValue = serde_json::from_str("\"CMCC\"").unwrap();
        assert_eq!(v, FeatureValue::String("CMCC".to_string()));
    }
}
