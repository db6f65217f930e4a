// ==========================================
// IMS 配置覆写服务 - 平台能力判定
// ==========================================
// 职责: 按 SDK 版本判断哪些配置键可写/可读
// 红线: 能力缺失必须显式暴露，不能静默丢弃
// ==========================================

use serde::{Deserialize, Serialize};

/// 平台 SDK 版本号
pub mod sdk {
    /// Android 12
    pub const S: u32 = 31;
    /// Android 13
    pub const TIRAMISU: u32 = 33;
    /// Android 14
    pub const UPSIDE_DOWN_CAKE: u32 = 34;
}

/// 运行平台能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub sdk_int: u32,
}

impl PlatformCapabilities {
    pub fn new(sdk_int: u32) -> Self {
        Self { sdk_int }
    }

    /// VoNR 开关键（vonr_enabled / vonr_setting_visibility）
    pub fn supports_vonr(&self) -> bool {
        self.sdk_int >= sdk::UPSIDE_DOWN_CAKE
    }

    /// SIM 国家码覆写键
    pub fn supports_country_iso_override(&self) -> bool {
        self.sdk_int >= sdk::UPSIDE_DOWN_CAKE
    }

    /// 跨 SIM 通话键可读回
    pub fn supports_cross_sim_readback(&self) -> bool {
        self.sdk_int >= sdk::TIRAMISU
    }

    /// NR 可用性数组可读回
    pub fn supports_nr_availabilities_readback(&self) -> bool {
        self.sdk_int >= sdk::S
    }
}
