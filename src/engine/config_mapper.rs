// ==========================================
// IMS 配置覆写服务 - 配置读回映射
// ==========================================
// 职责: 平台当前生效配置 → 功能开关集合
// 说明: 独立推导，不是构建器的逐键逆运算
// - CROSS_SIM 需要两个键同时为 true
// - VONR 需要 enabled 与 setting_visibility 同时为 true
// - FIVE_G_THRESHOLDS 需要阈值数组与参考数组完全相同
// ==========================================

use crate::domain::selection::ConfigSelection;
use crate::domain::types::FeatureFlag;
use crate::engine::bundle_builder::FIVE_G_SSRSRP_THRESHOLDS;
use crate::platform::bundle::PersistableBundle;
use crate::platform::capabilities::PlatformCapabilities;
use crate::platform::carrier_keys as keys;

/// 读回时需要的键
pub const READ_KEYS: &[&str] = &[
    keys::KEY_CARRIER_NAME_OVERRIDE_BOOL,
    keys::KEY_CARRIER_NAME_STRING,
    keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL,
    keys::KEY_CARRIER_WFC_IMS_AVAILABLE_BOOL,
    keys::KEY_CARRIER_VT_AVAILABLE_BOOL,
    keys::KEY_CARRIER_SUPPORTS_SS_OVER_UT_BOOL,
    keys::KEY_CARRIER_NR_AVAILABILITIES_INT_ARRAY,
    keys::KEY_5G_NR_SSRSRP_THRESHOLDS_INT_ARRAY,
    keys::KEY_SHOW_4G_FOR_LTE_DATA_ICON_BOOL,
    keys::KEY_CARRIER_CROSS_SIM_IMS_AVAILABLE_BOOL,
    keys::KEY_ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA_BOOL,
    keys::KEY_VONR_ENABLED_BOOL,
    keys::KEY_VONR_SETTING_VISIBILITY_BOOL,
    keys::KEY_SIM_COUNTRY_ISO_OVERRIDE_STRING,
];

#[derive(Debug, Clone, Copy)]
pub struct ConfigMapper {
    capabilities: PlatformCapabilities,
}

impl ConfigMapper {
    pub fn new(capabilities: PlatformCapabilities) -> Self {
        Self { capabilities }
    }

    pub fn read_keys(&self) -> &'static [&'static str] {
        READ_KEYS
    }

    /// 解码平台配置
    pub fn decode(&self, bundle: &PersistableBundle) -> ConfigSelection {
        let caps = self.capabilities;
        let mut selection = ConfigSelection::new();

        let name_overridden = bool_or(bundle, keys::KEY_CARRIER_NAME_OVERRIDE_BOOL, false);
        let carrier_name = if name_overridden {
            bundle.get_string(keys::KEY_CARRIER_NAME_STRING).unwrap_or("")
        } else {
            ""
        };
        selection.set(FeatureFlag::CarrierName, carrier_name);

        let country_iso = if caps.supports_country_iso_override() {
            bundle
                .get_string(keys::KEY_SIM_COUNTRY_ISO_OVERRIDE_STRING)
                .unwrap_or("")
        } else {
            ""
        };
        selection.set(FeatureFlag::CountryIso, country_iso);

        selection.set(
            FeatureFlag::Volte,
            bool_or_default(bundle, keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL, FeatureFlag::Volte),
        );
        selection.set(
            FeatureFlag::Vowifi,
            bool_or_default(bundle, keys::KEY_CARRIER_WFC_IMS_AVAILABLE_BOOL, FeatureFlag::Vowifi),
        );
        selection.set(
            FeatureFlag::Vt,
            bool_or_default(bundle, keys::KEY_CARRIER_VT_AVAILABLE_BOOL, FeatureFlag::Vt),
        );

        let vonr = if caps.supports_vonr() {
            bool_or(bundle, keys::KEY_VONR_ENABLED_BOOL, false)
                && bool_or(bundle, keys::KEY_VONR_SETTING_VISIBILITY_BOOL, false)
        } else {
            default_bool(FeatureFlag::Vonr)
        };
        selection.set(FeatureFlag::Vonr, vonr);

        let cross_sim = if caps.supports_cross_sim_readback() {
            bool_or(bundle, keys::KEY_CARRIER_CROSS_SIM_IMS_AVAILABLE_BOOL, false)
                && bool_or(
                    bundle,
                    keys::KEY_ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA_BOOL,
                    false,
                )
        } else {
            default_bool(FeatureFlag::CrossSim)
        };
        selection.set(FeatureFlag::CrossSim, cross_sim);

        selection.set(
            FeatureFlag::Ut,
            bool_or_default(bundle, keys::KEY_CARRIER_SUPPORTS_SS_OVER_UT_BOOL, FeatureFlag::Ut),
        );

        let nr = if caps.supports_nr_availabilities_readback() {
            bundle
                .get_int_array(keys::KEY_CARRIER_NR_AVAILABILITIES_INT_ARRAY)
                .map(|arr| {
                    arr.contains(&keys::CARRIER_NR_AVAILABILITY_NSA)
                        && arr.contains(&keys::CARRIER_NR_AVAILABILITY_SA)
                })
                .unwrap_or(false)
        } else {
            default_bool(FeatureFlag::FiveGNr)
        };
        selection.set(FeatureFlag::FiveGNr, nr);

        let thresholds = bundle
            .get_int_array(keys::KEY_5G_NR_SSRSRP_THRESHOLDS_INT_ARRAY)
            .map(|arr| arr == FIVE_G_SSRSRP_THRESHOLDS)
            .unwrap_or(false);
        selection.set(FeatureFlag::FiveGThresholds, thresholds);

        selection.set(
            FeatureFlag::Show4gForLte,
            bool_or_default(
                bundle,
                keys::KEY_SHOW_4G_FOR_LTE_DATA_ICON_BOOL,
                FeatureFlag::Show4gForLte,
            ),
        );

        selection
    }
}

fn bool_or(bundle: &PersistableBundle, key: &str, default: bool) -> bool {
    bundle.get_bool(key).unwrap_or(default)
}

fn default_bool(flag: FeatureFlag) -> bool {
    flag.default_value().as_bool().unwrap_or(false)
}

fn bool_or_default(bundle: &PersistableBundle, key: &str, flag: FeatureFlag) -> bool {
    bool_or(bundle, key, default_bool(flag))
}
