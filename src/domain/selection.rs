// ==========================================
// IMS 配置覆写服务 - 配置选择
// ==========================================
// 职责: 一张 SIM（或全部 SIM）期望的功能开关集合
// 生命周期: 由调用方按偏好或默认值构造，每次应用/重置消费一次，核心层不保留
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::types::{FeatureFlag, FeatureValue, FeatureValueType};

/// 功能值类型与开关定义不一致
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("功能值类型不匹配: flag={flag}, expected={expected}, actual={actual}")]
pub struct SelectionTypeError {
    pub flag: FeatureFlag,
    pub expected: FeatureValueType,
    pub actual: FeatureValueType,
}

/// 功能开关 → 功能值 映射（键唯一）
///
/// 反序列化经过 try_set 校验，类型不符的 JSON 直接报错。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<FeatureFlag, FeatureValue>",
    into = "BTreeMap<FeatureFlag, FeatureValue>"
)]
pub struct ConfigSelection {
    values: BTreeMap<FeatureFlag, FeatureValue>,
}

impl ConfigSelection {
    /// 空选择（未设置的开关读取时按默认值处理）
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部开关取默认值
    pub fn defaults() -> Self {
        let mut selection = Self::new();
        for flag in FeatureFlag::ALL {
            selection.set(flag, flag.default_value());
        }
        selection
    }

    /// 设置开关值
    ///
    /// # Panics
    /// 值类型与开关定义的类型不一致时 panic（编程错误）
    pub fn set(&mut self, flag: FeatureFlag, value: impl Into<FeatureValue>) {
        if let Err(e) = self.try_set(flag, value) {
            panic!("{}", e);
        }
    }

    /// 设置开关值；类型不一致时返回错误且不修改选择
    pub fn try_set(
        &mut self,
        flag: FeatureFlag,
        value: impl Into<FeatureValue>,
    ) -> Result<(), SelectionTypeError> {
        let value = value.into();
        if value.value_type() != flag.value_type() {
            return Err(SelectionTypeError {
                flag,
                expected: flag.value_type(),
                actual: value.value_type(),
            });
        }
        self.values.insert(flag, value);
        Ok(())
    }

    /// 链式设置
    pub fn with(mut self, flag: FeatureFlag, value: impl Into<FeatureValue>) -> Self {
        self.set(flag, value);
        self
    }

    pub fn get(&self, flag: FeatureFlag) -> Option<&FeatureValue> {
        self.values.get(&flag)
    }

    /// 读取布尔开关（未设置时取默认值）
    pub fn bool_value(&self, flag: FeatureFlag) -> bool {
        self.values
            .get(&flag)
            .and_then(FeatureValue::as_bool)
            .or_else(|| flag.default_value().as_bool())
            .unwrap_or(false)
    }

    /// 读取字符串开关（未设置时为空串）
    pub fn text_value(&self, flag: FeatureFlag) -> &str {
        self.values
            .get(&flag)
            .and_then(FeatureValue::as_str)
            .unwrap_or("")
    }

    pub fn contains(&self, flag: FeatureFlag) -> bool {
        self.values.contains_key(&flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureFlag, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(FeatureFlag, FeatureValue)> for ConfigSelection {
    fn from_iter<I: IntoIterator<Item = (FeatureFlag, FeatureValue)>>(iter: I) -> Self {
        let mut selection = ConfigSelection::new();
        for (flag, value) in iter {
            selection.set(flag, value);
        }
        selection
    }
}

impl TryFrom<BTreeMap<FeatureFlag, FeatureValue>> for ConfigSelection {
    type Error = SelectionTypeError;

    fn try_from(values: BTreeMap<FeatureFlag, FeatureValue>) -> Result<Self, Self::Error> {
        let mut selection = ConfigSelection::new();
        for (flag, value) in values {
            selection.try_set(flag, value)?;
        }
        Ok(selection)
    }
}

impl From<ConfigSelection> for BTreeMap<FeatureFlag, FeatureValue> {
    fn from(selection: ConfigSelection) -> Self {
        selection.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flags_read_as_defaults() {
        let selection = ConfigSelection::new().with(FeatureFlag::Volte, false);
        assert!(!selection.bool_value(FeatureFlag::Volte));
        assert!(selection.bool_value(FeatureFlag::Vowifi));
        assert!(!selection.bool_value(FeatureFlag::Show4gForLte));
        assert_eq!(selection.text_value(FeatureFlag::CarrierName), "");
    }

    #[test]
    fn test_set_replaces_existing_key() {
        let mut selection = ConfigSelection::defaults();
        let before = selection.len();
        selection.set(FeatureFlag::CarrierName, "China Mobile");
        assert_eq!(selection.len(), before);
        assert_eq!(selection.text_value(FeatureFlag::CarrierName), "China Mobile");
    }

    #[test]
    #[should_panic(expected = "功能值类型不匹配")]
    fn test_mismatched_value_type_panics() {
        let mut selection = ConfigSelection::new();
        selection.set(FeatureFlag::Volte, "yes");
    }

    #[test]
    fn test_json_round_trip_uses_flag_names() {
        let selection = ConfigSelection::new()
            .with(FeatureFlag::Volte, false)
            .with(FeatureFlag::CarrierName, "CMCC");
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"CARRIER_NAME":"CMCC","VOLTE":false}"#);
        let back: ConfigSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selection);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_value_types() {
        let err = serde_json::from_str::<ConfigSelection>(r#"{"VOLTE":"yes"}"#).unwrap_err();
        assert!(err.to_string().contains("flag=VOLTE"), "{}", err);

        let err =
            serde_json::from_str::<ConfigSelection>(r#"{"CARRIER_NAME":true}"#).unwrap_err();
        assert!(err.to_string().contains("expected=STRING"), "{}", err);
    }

    #[test]
    fn test_try_set_leaves_selection_unchanged_on_mismatch() {
        let mut selection = ConfigSelection::new().with(FeatureFlag::Vt, true);
        let err = selection.try_set(FeatureFlag::Vt, "off").unwrap_err();
        assert_eq!(err.expected, FeatureValueType::Boolean);
        assert_eq!(err.actual, FeatureValueType::String);
        assert!(selection.bool_value(FeatureFlag::Vt));
    }
}
