//! 内存 API 实现
//!
//! 用于测试与本地联调：载荷预先写入，可注入失败。

use crate::{ApiError, DabPumpsApi, check_envelope};
use async_trait::async_trait;
use domain::strip_simulate_suffix;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

#[derive(Default)]
struct State {
    install_list: Option<Value>,
    install_details: HashMap<String, Value>,
    device_configs: HashMap<String, Value>,
    device_statuses: HashMap<String, Value>,
    strings: HashMap<String, Value>,
    failures: VecDeque<ApiError>,
    changes: Vec<(String, String, String)>,
    calls: HashMap<&'static str, usize>,
    logged_in: bool,
}

/// 内存 API。
#[derive(Default)]
pub struct InMemoryApi {
    state: RwLock<State>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, ApiError> {
        self.state
            .write()
            .map_err(|_| ApiError::Api("lock failed".to_string()))
    }

    pub fn set_install_list(&self, payload: Value) {
        if let Ok(mut state) = self.write() {
            state.install_list = Some(payload);
        }
    }

    pub fn set_install_details(&self, install_id: &str, payload: Value) {
        if let Ok(mut state) = self.write() {
            state.install_details.insert(install_id.to_string(), payload);
        }
    }

    pub fn set_device_config(&self, config_id: &str, payload: Value) {
        if let Ok(mut state) = self.write() {
            state.device_configs.insert(config_id.to_string(), payload);
        }
    }

    pub fn set_device_status(&self, serial: &str, payload: Value) {
        if let Ok(mut state) = self.write() {
            state.device_statuses.insert(serial.to_string(), payload);
        }
    }

    pub fn set_strings(&self, language: &str, payload: Value) {
        if let Ok(mut state) = self.write() {
            state.strings.insert(language.to_string(), payload);
        }
    }

    /// 让接下来的一次调用（login 或 fetch）以指定错误失败。
    pub fn fail_next(&self, err: ApiError) {
        if let Ok(mut state) = self.write() {
            state.failures.push_back(err);
        }
    }

    /// 已提交的修改 (serial, key, value)（用于测试）。
    pub fn changes(&self) -> Vec<(String, String, String)> {
        self.state
            .read()
            .map(|state| state.changes.clone())
            .unwrap_or_default()
    }

    /// 指定方法的调用次数（用于测试）。
    pub fn calls(&self, method: &str) -> usize {
        self.state
            .read()
            .map(|state| state.calls.get(method).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_logged_in(&self) -> bool {
        self.state
            .read()
            .map(|state| state.logged_in)
            .unwrap_or(false)
    }

    /// 记录调用并弹出待注入的失败。
    fn begin(&self, method: &'static str) -> Result<std::sync::RwLockWriteGuard<'_, State>, ApiError> {
        let mut state = self.write()?;
        *state.calls.entry(method).or_insert(0) += 1;
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(state)
    }

    fn lookup(
        &self,
        method: &'static str,
        select: impl FnOnce(&State) -> Option<&Value>,
        what: &str,
    ) -> Result<Value, ApiError> {
        let state = self.begin(method)?;
        let payload = select(&state)
            .cloned()
            .ok_or_else(|| ApiError::Api(format!("no {what}")))?;
        check_envelope(&payload)?;
        Ok(payload)
    }
}

#[async_trait]
impl DabPumpsApi for InMemoryApi {
    async fn login(&self) -> Result<(), ApiError> {
        let mut state = self.begin("login")?;
        state.logged_in = true;
        Ok(())
    }

    async fn logout(&self) {
        if let Ok(mut state) = self.write() {
            *state.calls.entry("logout").or_insert(0) += 1;
            state.logged_in = false;
        }
    }

    async fn fetch_install_list(&self) -> Result<Value, ApiError> {
        self.lookup(
            "fetch_install_list",
            |state| state.install_list.as_ref(),
            "installation list",
        )
    }

    async fn fetch_install_details(&self, install_id: &str) -> Result<Value, ApiError> {
        let install_id = strip_simulate_suffix(install_id);
        self.lookup(
            "fetch_install_details",
            |state| state.install_details.get(install_id),
            &format!("installation {install_id}"),
        )
    }

    async fn fetch_device_config(&self, config_id: &str) -> Result<Value, ApiError> {
        self.lookup(
            "fetch_device_config",
            |state| state.device_configs.get(config_id),
            &format!("configuration {config_id}"),
        )
    }

    async fn fetch_device_status(&self, serial: &str) -> Result<Value, ApiError> {
        let serial = strip_simulate_suffix(serial);
        self.lookup(
            "fetch_device_status",
            |state| state.device_statuses.get(serial),
            &format!("status for device {serial}"),
        )
    }

    async fn fetch_strings(&self, language: &str) -> Result<Value, ApiError> {
        self.lookup(
            "fetch_strings",
            |state| state.strings.get(language),
            &format!("strings for language {language}"),
        )
    }

    async fn change_device_status(
        &self,
        serial: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.begin("change_device_status")?;
        state.changes.push((
            strip_simulate_suffix(serial).to_string(),
            key.to_string(),
            value.to_string(),
        ));
        Ok(())
    }
}
