// ==========================================
// 内存设备 - 用于集成测试
// ==========================================
// 职责: 同时实现 BrokerChannel / CarrierConfigService / SubscriptionService / ImsService
// 记录: 覆写调用、委托开启/结束次数、并发委托峰值、IMS 重置
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ims_override::domain::SimDescriptor;
use ims_override::platform::{
    sdk, BrokerChannel, CallError, CallFailure, CarrierConfigService, DefaultSubscriptions,
    ImsService, PersistableBundle, PlatformCapabilities, PlatformHandles, SubscriptionService,
};

/// 一次覆写调用
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideCall {
    pub sub_id: i32,
    pub values: Option<PersistableBundle>,
    /// None = 两参数形态
    pub persistent: Option<bool>,
}

/// 设备状态（测试可直接修改）
#[derive(Debug)]
pub struct FakeState {
    // ===== 代理 =====
    /// 前 N 次 ping 返回未就绪
    pub pings_until_ready: Option<u32>,
    pub pings: u32,
    pub fail_start: Option<CallFailure>,
    pub fail_stop: Option<CallFailure>,
    pub starts: u32,
    pub stops: u32,
    pub active_delegations: u32,
    pub max_active_delegations: u32,

    // ===== 运营商配置 =====
    pub has_three_arg: bool,
    pub fail_persistent: Option<CallFailure>,
    pub fail_sub: HashMap<i32, CallFailure>,
    pub base_configs: HashMap<i32, PersistableBundle>,
    pub effective_configs: HashMap<i32, PersistableBundle>,
    pub fail_read: Option<CallFailure>,
    pub calls: Vec<OverrideCall>,
    pub calls_outside_delegation: u32,

    // ===== 订阅 =====
    pub active_ids: Result<Vec<i32>, CallFailure>,
    pub sims: Vec<SimDescriptor>,
    pub sims_via_service_fails: bool,
    pub empty_sim_reads_remaining: u32,
    pub defaults: DefaultSubscriptions,

    // ===== IMS =====
    pub slots: HashMap<i32, i32>,
    pub ims_resets: Vec<i32>,
    pub ims_registered: HashMap<i32, bool>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            pings_until_ready: None,
            pings: 0,
            fail_start: None,
            fail_stop: None,
            starts: 0,
            stops: 0,
            active_delegations: 0,
            max_active_delegations: 0,
            has_three_arg: true,
            fail_persistent: None,
            fail_sub: HashMap::new(),
            base_configs: HashMap::new(),
            effective_configs: HashMap::new(),
            fail_read: None,
            calls: Vec::new(),
            calls_outside_delegation: 0,
            active_ids: Ok(vec![1]),
            sims: vec![SimDescriptor::new(1, "CMCC", "China Mobile", 0)],
            sims_via_service_fails: false,
            empty_sim_reads_remaining: 0,
            defaults: DefaultSubscriptions::default(),
            slots: HashMap::new(),
            ims_resets: Vec::new(),
            ims_registered: HashMap::new(),
        }
    }
}

/// 内存设备
pub struct FakeDevice {
    state: Mutex<FakeState>,
    capabilities: PlatformCapabilities,
}

impl FakeDevice {
    /// Android 14 设备，代理就绪，单 SIM (subId=1)
    pub fn new() -> Arc<Self> {
        Self::with_sdk(sdk::UPSIDE_DOWN_CAKE)
    }

    pub fn with_sdk(sdk_int: u32) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState::default()),
            capabilities: PlatformCapabilities::new(sdk_int),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// 注入平台句柄
    pub fn handles(self: &Arc<Self>) -> PlatformHandles {
        PlatformHandles::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.capabilities,
        )
    }

    pub fn calls(&self) -> Vec<OverrideCall> {
        self.state().calls.clone()
    }

    pub fn effective_config(&self, sub_id: i32) -> Option<PersistableBundle> {
        self.state().effective_configs.get(&sub_id).cloned()
    }

    fn record_override(
        &self,
        sub_id: i32,
        values: Option<PersistableBundle>,
        persistent: Option<bool>,
    ) -> Result<(), CallError> {
        let mut state = self.state();
        if state.active_delegations == 0 {
            state.calls_outside_delegation += 1;
        }
        state.calls.push(OverrideCall {
            sub_id,
            values: values.clone(),
            persistent,
        });

        if persistent == Some(true) {
            if let Some(failure) = state.fail_persistent.clone() {
                return Err(failure.into());
            }
        }
        if let Some(failure) = state.fail_sub.get(&sub_id).cloned() {
            return Err(failure.into());
        }

        let base = state.base_configs.get(&sub_id).cloned().unwrap_or_default();
        let effective = match values {
            None => base,
            Some(values) => {
                let mut merged = state
                    .effective_configs
                    .get(&sub_id)
                    .cloned()
                    .unwrap_or(base);
                for (key, value) in values.iter() {
                    merged.put(key, value.clone());
                }
                merged
            }
        };
        state.effective_configs.insert(sub_id, effective);
        Ok(())
    }
}

impl BrokerChannel for FakeDevice {
    fn ping_binder(&self) -> bool {
        let mut state = self.state();
        state.pings += 1;
        match state.pings_until_ready {
            None => true,
            Some(n) => state.pings > n,
        }
    }

    fn caller_uid(&self) -> u32 {
        10_086
    }

    fn start_delegate_shell_permission_identity(&self, _uid: u32) -> Result<(), CallFailure> {
        let mut state = self.state();
        if let Some(failure) = state.fail_start.clone() {
            return Err(failure);
        }
        state.starts += 1;
        state.active_delegations += 1;
        state.max_active_delegations = state.max_active_delegations.max(state.active_delegations);
        Ok(())
    }

    fn stop_delegate_shell_permission_identity(&self) -> Result<(), CallFailure> {
        let mut state = self.state();
        state.stops += 1;
        state.active_delegations = state.active_delegations.saturating_sub(1);
        match state.fail_stop.clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

impl CarrierConfigService for FakeDevice {
    fn has_persistent_override(&self) -> bool {
        self.state().has_three_arg
    }

    fn override_config(&self, sub_id: i32, values: Option<PersistableBundle>) -> Result<(), CallError> {
        self.record_override(sub_id, values, None)
    }

    fn override_config_persistent(
        &self,
        sub_id: i32,
        values: Option<PersistableBundle>,
        persistent: bool,
    ) -> Result<(), CallError> {
        if !self.state().has_three_arg {
            return Err(CallError::method_not_found(
                "overrideConfig(int,PersistableBundle,boolean)",
            ));
        }
        self.record_override(sub_id, values, Some(persistent))
    }

    fn config_for_sub_id(&self, sub_id: i32) -> Result<Option<PersistableBundle>, CallFailure> {
        let state = self.state();
        if let Some(failure) = state.fail_read.clone() {
            return Err(failure);
        }
        Ok(state
            .effective_configs
            .get(&sub_id)
            .or_else(|| state.base_configs.get(&sub_id))
            .cloned())
    }
}

impl SubscriptionService for FakeDevice {
    fn active_subscription_ids(&self) -> Result<Vec<i32>, CallFailure> {
        self.state().active_ids.clone()
    }

    fn active_subscriptions_via_service(&self) -> Result<Option<Vec<SimDescriptor>>, CallFailure> {
        let mut state = self.state();
        if state.sims_via_service_fails {
            return Err(CallFailure::without_message("NoSuchMethodError"));
        }
        if state.empty_sim_reads_remaining > 0 {
            state.empty_sim_reads_remaining -= 1;
            return Ok(Some(Vec::new()));
        }
        Ok(Some(state.sims.clone()))
    }

    fn active_subscriptions_via_manager(&self) -> Result<Vec<SimDescriptor>, CallFailure> {
        Ok(self.state().sims.clone())
    }

    fn default_subscriptions(&self) -> DefaultSubscriptions {
        self.state().defaults
    }
}

impl ImsService for FakeDevice {
    fn slot_index(&self, sub_id: i32) -> Result<i32, CallFailure> {
        self.state()
            .slots
            .get(&sub_id)
            .copied()
            .ok_or_else(|| CallFailure::new("IllegalArgumentException", format!("no slot for {}", sub_id)))
    }

    fn reset_ims(&self, slot_index: i32) -> Result<(), CallFailure> {
        self.state().ims_resets.push(slot_index);
        Ok(())
    }

    fn is_ims_registered(&self, sub_id: i32) -> Result<bool, CallFailure> {
        Ok(self
            .state()
            .ims_registered
            .get(&sub_id)
            .copied()
            .unwrap_or(false))
    }
}
