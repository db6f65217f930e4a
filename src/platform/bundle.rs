// ==========================================
// IMS 配置覆写服务 - 平台 Bundle 模型
// ==========================================
// 职责: 描述与特权进程交换的扁平键值包
// 说明:
// - Bundle: 请求/响应通道上的任意值键值包
// - PersistableBundle: 平台覆写接口只接受的可持久化子集
// 红线: 不支持的值类型只丢弃并记录日志，不作为错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// PersistableValue - 可持久化值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PersistableValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    String(String),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
}

fn join_values<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for PersistableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistableValue::Int(v) => write!(f, "{}", v),
            PersistableValue::Long(v) => write!(f, "{}", v),
            PersistableValue::Double(v) => write!(f, "{}", v),
            PersistableValue::Bool(v) => write!(f, "{}", v),
            PersistableValue::String(v) => write!(f, "{}", v),
            PersistableValue::IntArray(v) => write!(f, "{}", join_values(v)),
            PersistableValue::LongArray(v) => write!(f, "{}", join_values(v)),
            PersistableValue::DoubleArray(v) => write!(f, "{}", join_values(v)),
            PersistableValue::BoolArray(v) => write!(f, "{}", join_values(v)),
            PersistableValue::StringArray(v) => write!(f, "{}", v.join(",")),
        }
    }
}

// ==========================================
// PersistableBundle - 覆写接口载荷
// ==========================================

/// 平台可持久化键值包
///
/// 键有序存储（BTreeMap），保证日志与 dump 输出稳定。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistableBundle {
    entries: BTreeMap<String, PersistableValue>,
}

impl PersistableBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: PersistableValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.put(key, PersistableValue::Bool(value));
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.put(key, PersistableValue::Int(value));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, PersistableValue::String(value.into()));
    }

    pub fn put_int_array(&mut self, key: impl Into<String>, value: &[i32]) {
        self.put(key, PersistableValue::IntArray(value.to_vec()));
    }

    pub fn get(&self, key: &str) -> Option<&PersistableValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 读取布尔值（键不存在或类型不符时返回 None）
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key) {
            Some(PersistableValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.entries.get(key) {
            Some(PersistableValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(PersistableValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        match self.entries.get(key) {
            Some(PersistableValue::IntArray(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PersistableValue> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersistableValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 只保留指定键（不存在的键忽略）
    pub fn retain_keys(&self, keys: &[&str]) -> PersistableBundle {
        let mut out = PersistableBundle::new();
        for key in keys {
            if let Some(value) = self.entries.get(*key) {
                out.put(*key, value.clone());
            }
        }
        out
    }
}

impl FromIterator<(String, PersistableValue)> for PersistableBundle {
    fn from_iter<I: IntoIterator<Item = (String, PersistableValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ==========================================
// BundleValue - 通道值（任意类型）
// ==========================================

/// 请求/响应通道上的值
///
/// 除可持久化类型外，通道还可能携带 float、嵌套包、Parcelable 等，
/// 这些类型在转换为 PersistableBundle 时被丢弃。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BundleValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    String(String),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
    Float(f32),
    Bundle(Bundle),
    Parcelable { class_name: String },
}

impl BundleValue {
    /// 值类型名称（用于日志）
    pub fn kind_name(&self) -> &'static str {
        match self {
            BundleValue::Int(_) => "int",
            BundleValue::Long(_) => "long",
            BundleValue::Double(_) => "double",
            BundleValue::Bool(_) => "boolean",
            BundleValue::String(_) => "string",
            BundleValue::IntArray(_) => "int[]",
            BundleValue::LongArray(_) => "long[]",
            BundleValue::DoubleArray(_) => "double[]",
            BundleValue::BoolArray(_) => "boolean[]",
            BundleValue::StringArray(_) => "string[]",
            BundleValue::Float(_) => "float",
            BundleValue::Bundle(_) => "bundle",
            BundleValue::Parcelable { .. } => "parcelable",
        }
    }

    /// 转换为可持久化值；不支持的类型返回 None
    pub fn into_persistable(self) -> Option<PersistableValue> {
        match self {
            BundleValue::Int(v) => Some(PersistableValue::Int(v)),
            BundleValue::Long(v) => Some(PersistableValue::Long(v)),
            BundleValue::Double(v) => Some(PersistableValue::Double(v)),
            BundleValue::Bool(v) => Some(PersistableValue::Bool(v)),
            BundleValue::String(v) => Some(PersistableValue::String(v)),
            BundleValue::IntArray(v) => Some(PersistableValue::IntArray(v)),
            BundleValue::LongArray(v) => Some(PersistableValue::LongArray(v)),
            BundleValue::DoubleArray(v) => Some(PersistableValue::DoubleArray(v)),
            BundleValue::BoolArray(v) => Some(PersistableValue::BoolArray(v)),
            BundleValue::StringArray(v) => Some(PersistableValue::StringArray(v)),
            BundleValue::Float(_) | BundleValue::Bundle(_) | BundleValue::Parcelable { .. } => {
                None
            }
        }
    }
}

impl From<PersistableValue> for BundleValue {
    fn from(value: PersistableValue) -> Self {
        match value {
            PersistableValue::Int(v) => BundleValue::Int(v),
            PersistableValue::Long(v) => BundleValue::Long(v),
            PersistableValue::Double(v) => BundleValue::Double(v),
            PersistableValue::Bool(v) => BundleValue::Bool(v),
            PersistableValue::String(v) => BundleValue::String(v),
            PersistableValue::IntArray(v) => BundleValue::IntArray(v),
            PersistableValue::LongArray(v) => BundleValue::LongArray(v),
            PersistableValue::DoubleArray(v) => BundleValue::DoubleArray(v),
            PersistableValue::BoolArray(v) => BundleValue::BoolArray(v),
            PersistableValue::StringArray(v) => BundleValue::StringArray(v),
        }
    }
}

// ==========================================
// Bundle - 通道键值包
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: BTreeMap<String, BundleValue>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: BundleValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.put(key, BundleValue::Bool(value));
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) {
        self.put(key, BundleValue::Int(value));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, BundleValue::String(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 读取 int，不存在或类型不符时返回默认值
    pub fn get_int_or(&self, key: &str, default: i32) -> i32 {
        match self.entries.get(key) {
            Some(BundleValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(BundleValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(BundleValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<BundleValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 转换为 PersistableBundle
    ///
    /// 不支持的值类型被丢弃，并记录 info 日志。
    pub fn into_persistable(self) -> PersistableBundle {
        let mut out = PersistableBundle::new();
        for (key, value) in self.entries {
            let kind = value.kind_name();
            match value.into_persistable() {
                Some(v) => out.put(key, v),
                None => {
                    tracing::info!(key = %key, kind, "toPersistableBundle: 不支持的值类型，已丢弃");
                }
            }
        }
        out
    }
}

impl From<PersistableBundle> for Bundle {
    fn from(bundle: PersistableBundle) -> Self {
        Self {
            entries: bundle
                .entries
                .into_iter()
                .map(|(k, v)| (k, BundleValue::from(v)))
                .collect(),
        }
    }
}
