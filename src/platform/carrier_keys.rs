// ==========================================
// IMS 配置覆写服务 - 运营商配置键常量
// ==========================================
// 说明: 平台 CarrierConfigManager 定义的固定键名
// 部分键在较老的 SDK 头文件中缺失，这里直接使用字符串值
// ==========================================

// ===== 运营商名称 / 国家码 =====
pub const KEY_CARRIER_NAME_OVERRIDE_BOOL: &str = "carrier_name_override_bool";
pub const KEY_CARRIER_NAME_STRING: &str = "carrier_name_string";
pub const KEY_CARRIER_CONFIG_VERSION_STRING: &str = "carrier_config_version_string";
pub const KEY_SIM_COUNTRY_ISO_OVERRIDE_STRING: &str = "sim_country_iso_override_string";

// ===== VoLTE =====
pub const KEY_CARRIER_VOLTE_AVAILABLE_BOOL: &str = "carrier_volte_available_bool";
pub const KEY_EDITABLE_ENHANCED_4G_LTE_BOOL: &str = "editable_enhanced_4g_lte_bool";
pub const KEY_HIDE_ENHANCED_4G_LTE_BOOL: &str = "hide_enhanced_4g_lte_bool";
pub const KEY_HIDE_LTE_PLUS_DATA_ICON_BOOL: &str = "hide_lte_plus_data_icon_bool";
pub const KEY_SHOW_4G_FOR_LTE_DATA_ICON_BOOL: &str = "show_4g_for_lte_data_icon_bool";

// ===== VT / UT =====
pub const KEY_CARRIER_VT_AVAILABLE_BOOL: &str = "carrier_vt_available_bool";
pub const KEY_CARRIER_SUPPORTS_SS_OVER_UT_BOOL: &str = "carrier_supports_ss_over_ut_bool";

// ===== 跨 SIM 通话 =====
pub const KEY_CARRIER_CROSS_SIM_IMS_AVAILABLE_BOOL: &str = "carrier_cross_sim_ims_available_bool";
pub const KEY_ENABLE_CROSS_SIM_CALLING_ON_OPPORTUNISTIC_DATA_BOOL: &str =
    "enable_cross_sim_calling_on_opportunistic_data_bool";

// ===== VoWiFi =====
pub const KEY_CARRIER_WFC_IMS_AVAILABLE_BOOL: &str = "carrier_wfc_ims_available_bool";
pub const KEY_CARRIER_WFC_SUPPORTS_WIFI_ONLY_BOOL: &str = "carrier_wfc_supports_wifi_only_bool";
pub const KEY_EDITABLE_WFC_MODE_BOOL: &str = "editable_wfc_mode_bool";
pub const KEY_EDITABLE_WFC_ROAMING_MODE_BOOL: &str = "editable_wfc_roaming_mode_bool";
pub const KEY_SHOW_WIFI_CALLING_ICON_IN_STATUS_BAR_BOOL: &str =
    "show_wifi_calling_icon_in_status_bar_bool";
pub const KEY_WFC_SPN_FORMAT_IDX_INT: &str = "wfc_spn_format_idx_int";

// ===== VoNR =====
pub const KEY_VONR_ENABLED_BOOL: &str = "vonr_enabled_bool";
pub const KEY_VONR_SETTING_VISIBILITY_BOOL: &str = "vonr_setting_visibility_bool";

// ===== 5G NR =====
pub const KEY_CARRIER_NR_AVAILABILITIES_INT_ARRAY: &str = "carrier_nr_availabilities_int_array";
pub const KEY_5G_NR_SSRSRP_THRESHOLDS_INT_ARRAY: &str = "5g_nr_ssrsrp_thresholds_int_array";

pub const CARRIER_NR_AVAILABILITY_NSA: i32 = 1;
pub const CARRIER_NR_AVAILABILITY_SA: i32 = 2;

/// 运营商配置版本标记（覆写运营商名称时一并写入）
pub const CARRIER_CONFIG_VERSION_MARKER: &str = ":3";

/// WFC SPN 显示格式索引
pub const WFC_SPN_FORMAT_IDX: i32 = 6;
