// ==========================================
// 特权宿主集成测试
// ==========================================
// 测试目标: 委托身份生命周期、请求 Bundle 解码、读取/转储、IMS 控制、并发串行化
// ==========================================

mod helpers;

use std::sync::Arc;

use helpers::fake_platform::FakeDevice;
use ims_override::domain::{ConfigSelection, FeatureFlag, OverridePayload, SimDescriptor, SimTarget};
use ims_override::platform::carrier_keys as keys;
use ims_override::platform::{Bundle, BundleValue, CallFailure, PersistableBundle};
use ims_override::privileged::protocol::{KEY_RESULT, KEY_RESULT_MSG, KEY_SELECT_SIM_ID};
use ims_override::privileged::{OverrideRequest, OverrideShape, PrivilegedError};
use test_helpers::build_test_app;

fn volte_only() -> OverridePayload {
    let mut values = PersistableBundle::new();
    values.put_bool(keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL, true);
    OverridePayload::Values(values)
}

// ==========================================
// 委托身份生命周期
// ==========================================

#[tokio::test]
async fn test_delegation_released_after_success_and_failure() {
    let device = FakeDevice::new();
    let app = build_test_app(device.handles());

    let ok = app
        .host
        .override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false))
        .await;
    assert_eq!(ok.unwrap(), 1);

    device
        .state()
        .fail_sub
        .insert(1, CallFailure::new("IllegalArgumentException", "invalid subId"));
    let err = app
        .host
        .override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false))
        .await
        .unwrap_err();
    assert!(matches!(err, PrivilegedError::Override(_)));
    assert_eq!(err.user_message(), "invalid subId");

    let state = device.state();
    assert_eq!(state.starts, 2);
    assert_eq!(state.stops, 2);
    assert_eq!(state.active_delegations, 0);
}

#[tokio::test]
async fn test_delegation_start_failure_skips_override() {
    let device = FakeDevice::new();
    device.state().fail_start = Some(CallFailure::new("SecurityException", "uid not allowed"));
    let app = build_test_app(device.handles());

    let err = app
        .host
        .override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false))
        .await
        .unwrap_err();
    assert!(matches!(err, PrivilegedError::DelegationFailure(_)));
    assert_eq!(err.user_message(), "uid not allowed");
    assert!(device.calls().is_empty());
}

#[tokio::test]
async fn test_stop_failure_does_not_change_result() {
    let device = FakeDevice::new();
    device.state().fail_stop = Some(CallFailure::without_message("DeadObjectException"));
    let app = build_test_app(device.handles());

    let result = app
        .host
        .override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false))
        .await;
    assert!(result.is_ok());
    assert_eq!(device.state().stops, 1);
}

#[tokio::test]
async fn test_interrupt_ends_binder_wait() {
    let device = FakeDevice::new();
    device.state().pings_until_ready = Some(u32::MAX);
    let config = ims_override::config::ServiceConfig {
        apply_wait_retries: 10_000,
        apply_wait_interval: std::time::Duration::from_millis(20),
        ..test_helpers::fast_service_config()
    };
    let app = test_helpers::build_test_app_with(device.handles(), config);

    let host = app.host.clone();
    let pending = tokio::spawn(async move {
        host.override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false))
            .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    app.host.executor().interrupt();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        PrivilegedError::BrokerUnavailable {
            interrupted: true,
            ..
        }
    ));
    assert_eq!(device.state().starts, 0);
}

// ==========================================
// 请求 Bundle 解码
// ==========================================

#[tokio::test]
async fn test_request_without_sim_id_targets_all_active() {
    let device = FakeDevice::new();
    device.state().active_ids = Ok(vec![4, 5]);
    let app = build_test_app(device.handles());

    let mut request = Bundle::new();
    request.put_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL, true);
    let response = app.host.handle_override(request).await;

    assert!(response.get_bool_or(KEY_RESULT, false));
    let ids: Vec<i32> = device.calls().iter().map(|c| c.sub_id).collect();
    assert_eq!(ids, vec![4, 5]);
}

#[tokio::test]
async fn test_unsupported_value_kinds_are_dropped() {
    let device = FakeDevice::new();
    let app = build_test_app(device.handles());

    let mut request = Bundle::new();
    request.put_int(KEY_SELECT_SIM_ID, 1);
    request.put_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL, true);
    request.put("signal_scale_float", BundleValue::Float(0.5));
    request.put(
        "nested",
        BundleValue::Parcelable {
            class_name: "android.os.Messenger".to_string(),
        },
    );
    let response = app.host.handle_override(request).await;
    assert!(response.get_bool_or(KEY_RESULT, false));

    let values = device.calls()[0].values.clone().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL), Some(true));
}

#[tokio::test]
async fn test_failure_response_carries_message() {
    let device = FakeDevice::new();
    device
        .state()
        .fail_sub
        .insert(1, CallFailure::without_message("IllegalStateException"));
    let app = build_test_app(device.handles());

    let request = OverrideRequest::new(SimTarget::Subscription(1), volte_only(), false).into_bundle();
    let response = app.host.handle_override(request).await;
    assert!(!response.get_bool_or(KEY_RESULT, true));
    assert_eq!(response.get_string(KEY_RESULT_MSG), Some("IllegalStateException"));
}

// ==========================================
// 覆写形态
// ==========================================

#[tokio::test]
async fn test_shape_detected_once_from_platform() {
    let device = FakeDevice::new();
    device.state().has_three_arg = false;
    let app = build_test_app(device.handles());

    for _ in 0..2 {
        app.host
            .override_config(&OverrideRequest::new(SimTarget::Subscription(1), volte_only(), true))
            .await
            .unwrap();
    }
    assert!(device.calls().iter().all(|c| c.persistent.is_none()));
    assert_eq!(app.host.override_shape(), OverrideShape::TwoArg);
}

// ==========================================
// 并发
// ==========================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_hold_one_delegation_at_a_time() {
    let device = FakeDevice::new();
    device.state().active_ids = Ok(vec![1, 2, 3]);
    let app = build_test_app(device.handles());
    let host = app.host.clone();

    let tasks = (0..8).map(|i| {
        let host = Arc::clone(&host);
        tokio::spawn(async move {
            let target = if i % 2 == 0 {
                SimTarget::AllActive
            } else {
                SimTarget::Subscription(i)
            };
            host.override_config(&OverrideRequest::new(target, volte_only(), false))
                .await
        })
    });
    let results = futures::future::join_all(tasks).await;
    assert!(results.iter().all(|r| matches!(r, Ok(Ok(_)))));

    let state = device.state();
    assert_eq!(state.max_active_delegations, 1);
    assert_eq!(state.starts, 8);
    assert_eq!(state.stops, 8);
    assert_eq!(state.calls_outside_delegation, 0);
}

// ==========================================
// 读取 / 转储
// ==========================================

#[tokio::test]
async fn test_read_current_reflects_applied_override() {
    let device = FakeDevice::new();
    let app = build_test_app(device.handles());

    let selection = ConfigSelection::defaults()
        .with(FeatureFlag::CarrierName, "Test Carrier")
        .with(FeatureFlag::Vowifi, false);
    let mut base = PersistableBundle::new();
    base.put_bool(keys::KEY_CARRIER_WFC_IMS_AVAILABLE_BOOL, false);
    device.state().base_configs.insert(1, base);

    assert!(app
        .api
        .apply_configuration(SimTarget::Subscription(1), &selection, false)
        .await
        .is_success());

    let current = app.api.read_current_configuration(1).await.unwrap();
    assert_eq!(current.text_value(FeatureFlag::CarrierName), "Test Carrier");
    assert!(current.bool_value(FeatureFlag::Volte));
    assert!(!current.bool_value(FeatureFlag::Vowifi));
    assert!(current.bool_value(FeatureFlag::FiveGNr));
    assert!(current.bool_value(FeatureFlag::FiveGThresholds));
    assert!(current.bool_value(FeatureFlag::Vonr));
}

#[tokio::test]
async fn test_read_returns_none_for_negative_or_failing() {
    let device = FakeDevice::new();
    let app = build_test_app(device.handles());

    assert!(app.api.read_current_configuration(-1).await.is_none());
    assert!(app.api.dump_carrier_config(-1).await.is_none());
    // 负 id 不获取委托身份
    assert_eq!(device.state().starts, 0);

    // 未加载配置
    assert!(app.api.read_current_configuration(7).await.is_none());

    device.state().fail_read = Some(CallFailure::new("SecurityException", "no permission"));
    assert!(app.api.dump_carrier_config(1).await.is_none());
    let state = device.state();
    assert_eq!(state.starts, state.stops);
}

#[tokio::test]
async fn test_dump_lists_sorted_lines() {
    let device = FakeDevice::new();
    let mut base = PersistableBundle::new();
    base.put_int_array(keys::KEY_CARRIER_NR_AVAILABILITIES_INT_ARRAY, &[1, 2]);
    base.put_bool(keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL, true);
    device.state().base_configs.insert(1, base);
    let app = build_test_app(device.handles());

    let dump = app.api.dump_carrier_config(1).await.unwrap();
    assert_eq!(
        dump,
        "carrier_nr_availabilities_int_array: 1,2\ncarrier_volte_available_bool: true"
    );
}

#[tokio::test]
async fn test_read_config_returns_requested_keys_only() {
    let device = FakeDevice::new();
    let mut base = PersistableBundle::new();
    base.put_bool(keys::KEY_CARRIER_VOLTE_AVAILABLE_BOOL, true);
    base.put_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL, false);
    device.state().base_configs.insert(1, base);
    let app = build_test_app(device.handles());

    let values = app
        .host
        .read_config(1, &[keys::KEY_CARRIER_VT_AVAILABLE_BOOL])
        .await
        .unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL), Some(false));
}

// ==========================================
// SIM 列表
// ==========================================

#[tokio::test]
async fn test_list_active_sims_sorts_primary_first() {
    let device = FakeDevice::new();
    {
        let mut state = device.state();
        state.sims = vec![
            SimDescriptor::new(3, "CT", "China Telecom", 0),
            SimDescriptor::new(5, "CU", "China Unicom", 1),
        ];
        state.defaults.data = Some(5);
    }
    let app = build_test_app(device.handles());

    let ids: Vec<i32> = app.api.list_active_sims().await.iter().map(|s| s.sub_id).collect();
    assert_eq!(ids, vec![5, 3]);
}

#[tokio::test]
async fn test_list_active_sims_retries_empty_reads() {
    let device = FakeDevice::new();
    device.state().empty_sim_reads_remaining = 2;
    let app = build_test_app(device.handles());

    let sims = app.api.list_active_sims().await;
    assert_eq!(sims.len(), 1);
    assert_eq!(device.state().starts, 3);
}

#[tokio::test]
async fn test_list_active_sims_falls_back_to_manager() {
    let device = FakeDevice::new();
    device.state().sims_via_service_fails = true;
    let app = build_test_app(device.handles());

    let sims = app.api.list_active_sims().await;
    assert_eq!(sims.len(), 1);
    assert_eq!(sims[0].display_name, "CMCC");
}

// ==========================================
// IMS 控制
// ==========================================

#[tokio::test]
async fn test_restart_ims_resets_each_slot() {
    let device = FakeDevice::new();
    {
        let mut state = device.state();
        state.active_ids = Ok(vec![1, 2]);
        state.slots.insert(1, 0);
        state.slots.insert(2, 1);
    }
    let app = build_test_app(device.handles());

    assert!(app
        .api
        .restart_ims_registration(SimTarget::AllActive)
        .await
        .is_success());
    assert_eq!(device.state().ims_resets, vec![0, 1]);

    // 未知订阅没有卡槽
    let result = app
        .api
        .restart_ims_registration(SimTarget::Subscription(9))
        .await;
    assert!(!result.is_success());
    assert_eq!(result.message(), Some("no slot for 9"));
}

#[tokio::test]
async fn test_ims_registration_status() {
    let device = FakeDevice::new();
    device.state().ims_registered.insert(1, true);
    let app = build_test_app(device.handles());

    assert_eq!(app.api.read_ims_registration_status(1).await, Some(true));
    assert_eq!(app.api.read_ims_registration_status(2).await, Some(false));
    assert_eq!(app.api.read_ims_registration_status(-1).await, None);
}

// ==========================================
// 单键覆写
// ==========================================

#[tokio::test]
async fn test_update_single_boolean() {
    let device = FakeDevice::new();
    let app = build_test_app(device.handles());

    let result = app
        .api
        .update_config_boolean(1, keys::KEY_CARRIER_VT_AVAILABLE_BOOL, false)
        .await;
    assert!(result.is_success());
    let values = device.calls()[0].values.clone().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get_bool(keys::KEY_CARRIER_VT_AVAILABLE_BOOL), Some(false));

    let result = app.api.update_config_boolean(1, "  ", true).await;
    assert!(!result.is_success());
    assert_eq!(device.calls().len(), 1);
}
