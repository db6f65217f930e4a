// ==========================================
// IMS 配置覆写服务 - 配置包构建器
// ==========================================
// 职责: 功能开关集合 → 运营商配置覆写载荷（纯函数，无副作用）
// 红线:
// - 只增不减: 开关关闭时省略对应键，不写 false
//   （缺少覆写键 = 沿用平台默认/当前值）
// - 能力不足导致的跳过必须记录在构建报告中
// ==========================================

use crate::domain::payload::OverridePayload;
use crate::domain::selection::ConfigSelection;
use crate::domain::types::FeatureFlag;
use crate::platform::bundle::PersistableBundle;
use crate::platform::capabilities::PlatformCapabilities;
use crate::platform::carrier_keys as keys;

/// 5G NR SS-RSRP 信号阈值 (dBm)
///
/// 顺序: 差 / 中 / 良 / 优；严格递增，取值范围 [-140, -44]
pub const FIVE_G_SSRSRP_THRESHOLDS: [i32; 4] = [
    -128, // SIGNAL_STRENGTH_POOR
    -118, // SIGNAL_STRENGTH_MODERATE
    -108, // SIGNAL_STRENGTH_GOOD
    -98,  // SIGNAL_STRENGTH_GREAT
];

/// 阈值合法区间
pub const SSRSRP_MIN_DBM: i32 = -140;
pub const SSRSRP_MAX_DBM: i32 = -44;

/// 构建输出
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub payload: OverridePayload,
    /// 因平台能力不足而未下发的开关
    pub skipped: Vec<FeatureFlag>,
}

/// 国家码规范化: 去空白、转小写、只保留字母数字、最多 8 位
pub fn normalize_country_iso(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(8)
        .collect()
}

// ==========================================
// ConfigBundleBuilder
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ConfigBundleBuilder {
    capabilities: PlatformCapabilities,
}

impl ConfigBundleBuilder {
    pub fn new(capabilities: PlatformCapabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// 构建覆写载荷
    ///
    /// # 参数
    /// - carrier_name: 运营商名称覆写（空白视为不覆写）
    /// - country_iso: SIM 国家码覆写（空白视为不覆写）
    /// - flags: 功能开关集合
    pub fn build(
        &self,
        carrier_name: Option<&str>,
        country_iso: Option<&str>,
        flags: &ConfigSelection,
    ) -> OverridePayload {
        self.build_with_report(carrier_name, country_iso, flags).payload
    }

    /// 构建覆写载荷，并返回因能力不足而跳过的开关
    pub fn build_with_report(
        &self,
        carrier_name: Option<&str>,
        country_iso: Option<&str>,
        flags: &ConfigSelection,
    ) -> BuildOutput {
        let mut bundle = PersistableBundle::new();
        let mut skipped = Vec::new();

        // ===== 运营商名称 =====
        if let Some(name) = carrier_name.filter(|n| !n.trim().is_empty()) {
            bundle.put_bool(keys::KEY_CARRIER_NAME_OVERRIDE_BOOL, true);
            bundle.put_string(keys::KEY_CARRIER_NAME_STRING, name);
            bundle.put_string(
                keys::KEY_CARRIER_CONFIG_VERSION_STRING,
                keys::CARRIER_CONFIG_VERSION_MARKER,
            );
        }

        // ===== 国家码 =====
        let iso = country_iso.map(normalize_country_iso).unwrap_or_default();
        if !iso.is_empty() {
            if self.capabilities.supports_country_iso_override() {
                bundle.put_string(keys::KEY_SIM_COUNTRY_ISO_OVERRIDE_STRING, iso);
            } else {
                skipped.push(FeatureFlag::CountryIso);
            }
        }

        // ===== VoLTE =====
        if flags.bool_value(FeatureFlag::Volte) {
            bundle.put_bool(keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL, true);
            bundle.put_bool(keys::KEY_EDITABLE_ENHANCED_4G_LTE_BOOL, true);
            bundle.put_bool(keys::KEY_HIDE_ENHANCED_4G_LTE_BOOL, false);
            bundle.put_bool(keys::KEY_HIDE_LTE_PLUS_DATA_ICON_BOOL, false);
        }

        if flags.bool_value(FeatureFlag::Show4gForLte) {
            bundle.put_bool(keys::KEY_SHOW_4G_FOR_LTE_DATA_ICON_BOOL, true);
        }

        // ===== VT 视频通话 =====
        if flags.bool_value(FeatureFlag::Vt) {
            bundle.put_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL, true);
        }

        // ===== UT 补充业务 =====
        if flags.bool_value(FeatureFlag::Ut) {
            bundle.put_bool(keys::KEY_CARRIER_SUPPORTS_SS_OVER_UT_BOOL, true);
        }

        // ===== 跨 SIM 通话 =====
        if flags.bool_value(FeatureFlag::CrossSim) {
            bundle.put_bool(keys::KEY_CARRIER_CROSS_SIM_IMS_AVAILABLE_BOOL, true);
            bundle.put_bool(
                keys::KEY_ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA_BOOL,
                true,
            );
        }

        // ===== VoWiFi =====
        if flags.bool_value(FeatureFlag::Vowifi) {
            bundle.put_bool(keys::KEY_CARRIER_WFC_IMS_AVAILABLE_BOOL, true);
            bundle.put_bool(keys::KEY_CARRIER_WFC_SUPPORTS_WIFI_ONLY_BOOL, true);
            bundle.put_bool(keys::KEY_EDITABLE_WFC_MODE_BOOL, true);
            bundle.put_bool(keys::KEY_EDITABLE_WFC_ROAMING_MODE_BOOL, true);
            bundle.put_bool(keys::KEY_SHOW_WIFI_CALLING_ICON_IN_STATUS_BAR_BOOL, true);
            bundle.put_int(keys::KEY_WFC_SPN_FORMAT_IDX_INT, keys::WFC_SPN_FORMAT_IDX);
        }

        // ===== VoNR（需要 Android 14+） =====
        if flags.bool_value(FeatureFlag::Vonr) {
            if self.capabilities.supports_vonr() {
                bundle.put_bool(keys::KEY_VONR_ENABLED_BOOL, true);
                bundle.put_bool(keys::KEY_VONR_SETTING_VISIBILITY_BOOL, true);
            } else {
                skipped.push(FeatureFlag::Vonr);
            }
        }

        // ===== 5G NR =====
        if flags.bool_value(FeatureFlag::FiveGNr) {
            bundle.put_int_array(
                keys::KEY_CARRIER_NR_AVAILABILITIES_INT_ARRAY,
                &[
                    keys::CARRIER_NR_AVAILABILITY_NSA,
                    keys::CARRIER_NR_AVAILABILITY_SA,
                ],
            );
            if flags.bool_value(FeatureFlag::FiveGThresholds) {
                bundle.put_int_array(
                    keys::KEY_5G_NR_SSRSRP_THRESHOLDS_INT_ARRAY,
                    &FIVE_G_SSRSRP_THRESHOLDS,
                );
            }
        }

        BuildOutput {
            payload: OverridePayload::Values(bundle),
            skipped,
        }
    }

    /// 重置载荷：不含任何功能键
    pub fn build_reset(&self) -> OverridePayload {
        OverridePayload::Reset
    }

    /// 单键布尔覆写
    pub fn build_single_boolean(&self, key: &str, value: bool) -> OverridePayload {
        let mut bundle = PersistableBundle::new();
        bundle.put_bool(key, value);
        OverridePayload::Values(bundle)
    }
}
