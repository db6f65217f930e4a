// ==========================================
// IMS 配置覆写服务 - 特权代理请求/响应协议
// ==========================================
// 职责: 覆写请求 ⇄ 请求 Bundle；应用结果 ⇄ 响应 Bundle
// 说明:
// - 控制键: select_sim_id / reset / prefer_persistent，其余键均为载荷
// - 解码时剥离控制键，载荷转换为可持久化子集（不支持的类型丢弃并记录日志）
// ==========================================

use crate::domain::payload::{ApplyResult, OverridePayload};
use crate::domain::sim::{SimTarget, ALL_SUBSCRIPTIONS};
use crate::platform::bundle::Bundle;

// ===== 控制键 =====
pub const KEY_SELECT_SIM_ID: &str = "select_sim_id";
pub const KEY_RESET: &str = "reset";
pub const KEY_PREFER_PERSISTENT: &str = "prefer_persistent";

const CONTROL_KEYS: [&str; 3] = [KEY_SELECT_SIM_ID, KEY_RESET, KEY_PREFER_PERSISTENT];

// ===== 响应键 =====
pub const KEY_RESULT: &str = "result";
pub const KEY_RESULT_MSG: &str = "result_msg";

/// 宿主未返回结果（或超时）时的诊断文本
pub const EMPTY_RESULT_MESSAGE: &str = "failed with empty result";

/// 覆写请求
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRequest {
    pub target: SimTarget,
    pub payload: OverridePayload,
    pub prefer_persistent: bool,
}

impl OverrideRequest {
    pub fn new(target: SimTarget, payload: OverridePayload, prefer_persistent: bool) -> Self {
        Self {
            target,
            payload,
            prefer_persistent,
        }
    }

    /// 编码为请求 Bundle
    pub fn into_bundle(self) -> Bundle {
        let reset = self.payload.is_reset();
        let mut bundle = match self.payload {
            OverridePayload::Values(values) => Bundle::from(values),
            OverridePayload::Reset => Bundle::new(),
        };
        bundle.put_int(KEY_SELECT_SIM_ID, self.target.as_raw());
        bundle.put_bool(KEY_RESET, reset);
        bundle.put_bool(KEY_PREFER_PERSISTENT, self.prefer_persistent);
        bundle
    }

    /// 从请求 Bundle 解码
    ///
    /// 缺少 select_sim_id 时按"全部活动订阅"处理。
    pub fn from_bundle(mut bundle: Bundle) -> Self {
        let target = SimTarget::from_raw(bundle.get_int_or(KEY_SELECT_SIM_ID, ALL_SUBSCRIPTIONS));
        let reset = bundle.get_bool_or(KEY_RESET, false);
        let prefer_persistent = bundle.get_bool_or(KEY_PREFER_PERSISTENT, false);
        for key in CONTROL_KEYS {
            bundle.remove(key);
        }

        let payload = if reset {
            OverridePayload::Reset
        } else {
            OverridePayload::Values(bundle.into_persistable())
        };

        Self {
            target,
            payload,
            prefer_persistent,
        }
    }
}

/// 应用结果 → 响应 Bundle
pub fn encode_result(result: &ApplyResult) -> Bundle {
    let mut bundle = Bundle::new();
    bundle.put_bool(KEY_RESULT, result.is_success());
    if let Some(message) = result.message() {
        bundle.put_string(KEY_RESULT_MSG, message);
    }
    bundle
}

/// 响应 Bundle → 应用结果
///
/// 无响应视为失败（"failed with empty result"）；失败但无消息时为 "unknown error"。
pub fn decode_result(response: Option<&Bundle>) -> ApplyResult {
    let Some(response) = response else {
        return ApplyResult::failed(EMPTY_RESULT_MESSAGE);
    };
    if response.get_bool_or(KEY_RESULT, false) {
        ApplyResult::ok()
    } else {
        ApplyResult::failed(response.get_string(KEY_RESULT_MSG).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::bundle::{BundleValue, PersistableBundle};

    #[test]
    fn test_request_bundle_carries_control_keys() {
        let mut values = PersistableBundle::new();
        values.put_bool("carrier_volte_available_bool", true);
        let bundle = OverrideRequest::new(
            SimTarget::Subscription(2),
            OverridePayload::Values(values.clone()),
            true,
        )
        .into_bundle();

        assert_eq!(bundle.get_int_or(KEY_SELECT_SIM_ID, 0), 2);
        assert!(!bundle.get_bool_or(KEY_RESET, true));
        assert!(bundle.get_bool_or(KEY_PREFER_PERSISTENT, false));

        let decoded = OverrideRequest::from_bundle(bundle);
        assert_eq!(decoded.payload, OverridePayload::Values(values));
        assert!(decoded.prefer_persistent);
    }

    #[test]
    fn test_reset_request_ignores_payload_keys() {
        let mut bundle = Bundle::new();
        bundle.put_bool(KEY_RESET, true);
        bundle.put_bool("carrier_vt_available_bool", true);
        let request = OverrideRequest::from_bundle(bundle);
        assert!(request.payload.is_reset());
        assert_eq!(request.target, SimTarget::AllActive);
    }

    #[test]
    fn test_unsupported_kinds_dropped_without_failing() {
        let mut bundle = Bundle::new();
        bundle.put_int(KEY_SELECT_SIM_ID, 1);
        bundle.put("float_key", BundleValue::Float(0.5));
        bundle.put_int("wfc_spn_format_idx_int", 6);
        let request = OverrideRequest::from_bundle(bundle);
        let values = request.payload.into_values().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get_int("wfc_spn_format_idx_int"), Some(6));
    }

    #[test]
    fn test_decode_result_variants() {
        assert_eq!(
            decode_result(None).message(),
            Some("failed with empty result")
        );

        let ok = encode_result(&ApplyResult::ok());
        assert!(decode_result(Some(&ok)).is_success());
        assert!(!ok.contains_key(KEY_RESULT_MSG));

        let mut failed = Bundle::new();
        failed.put_bool(KEY_RESULT, false);
        assert_eq!(decode_result(Some(&failed)).message(), Some("unknown error"));
    }
}
