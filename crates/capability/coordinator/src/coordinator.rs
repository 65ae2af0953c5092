use crate::{CoordinatorError, CoordinatorOptions};
use dab_assemble::{
    assemble_device_config, assemble_device_status, assemble_install_details,
    assemble_install_list, assemble_snapshot, assemble_strings,
};
use dab_client::DabPumpsApi;
use dab_entity::build_entities;
use dab_telemetry::{
    new_cycle_id, poll_cycle_span, record_poll_failure, record_poll_retry, record_poll_success,
};
use domain::{
    ConfigMap, DEFAULT_USER_ROLE, Device, DeviceMap, InstallMap, Snapshot, StatusMap, StringTable,
};
use entity_contract::{EntityRecord, Platform};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{Instrument, debug, info, warn};

/// 协调器缓存。时间戳为 None 表示从未成功刷新。
#[derive(Clone)]
struct Cache {
    installs: InstallMap,
    installs_at: Option<Instant>,
    devices: DeviceMap,
    devices_at: Option<Instant>,
    configs: ConfigMap,
    configs_at: Option<Instant>,
    statuses: StatusMap,
    statuses_at: Option<Instant>,
    strings: StringTable,
    strings_at: Option<Instant>,
    user_role: String,
}

struct State {
    cache: Cache,
    /// 第 n 次尝试成功（或最终失败）的次数。
    retries_needed: Vec<u64>,
}

struct Inner {
    api: Arc<dyn DabPumpsApi>,
    options: CoordinatorOptions,
    state: Mutex<State>,
    /// 串行化轮询周期。
    cycle: Mutex<()>,
    snapshot: RwLock<Arc<Snapshot>>,
    strings: RwLock<Arc<StringTable>>,
}

/// 单个安装的轮询协调器。克隆共享同一份状态。
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new(api: Arc<dyn DabPumpsApi>, mut options: CoordinatorOptions) -> Self {
        options.retry_attempts = options.retry_attempts.max(1);
        let cache = Cache {
            installs: InstallMap::new(),
            installs_at: None,
            devices: DeviceMap::new(),
            devices_at: None,
            configs: ConfigMap::new(),
            configs_at: None,
            statuses: StatusMap::new(),
            statuses_at: None,
            strings: StringTable::new(options.language.clone(), BTreeMap::new()),
            strings_at: None,
            user_role: DEFAULT_USER_ROLE.to_string(),
        };
        let state = State {
            cache,
            retries_needed: vec![0; options.retry_attempts as usize],
        };
        Self {
            inner: Arc::new(Inner {
                api,
                options,
                state: Mutex::new(state),
                cycle: Mutex::new(()),
                snapshot: RwLock::new(Arc::new(Snapshot::default())),
                strings: RwLock::new(Arc::new(StringTable::default())),
            }),
        }
    }

    pub fn install_id(&self) -> &str {
        &self.inner.options.install_id
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.inner.options
    }

    /// 最近一次成功周期的快照。
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn strings(&self) -> Arc<StringTable> {
        self.inner.strings.read().await.clone()
    }

    pub async fn user_role(&self) -> String {
        self.inner.state.lock().await.cache.user_role.clone()
    }

    /// 执行一个轮询周期，成功后原子替换快照。
    ///
    /// 鉴权失败立即返回，不做重试。
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoordinatorError> {
        let cycle_id = new_cycle_id();
        let span = poll_cycle_span(self.install_id(), &cycle_id);
        async {
            let _cycle = self.inner.cycle.lock().await;
            let result = self
                .with_retries("poll cycle", || async move {
                    // 网络请求期间不持有状态锁，结束后一次性写回
                    let mut cache = self.inner.state.lock().await.cache.clone();
                    let result = self.detect_data(&mut cache).await;
                    self.inner.state.lock().await.cache = cache;
                    result
                })
                .await;

            match result {
                Ok(()) => {
                    let state = self.inner.state.lock().await;
                    let cache = &state.cache;
                    let snapshot = Arc::new(assemble_snapshot(
                        self.install_id(),
                        &cache.devices,
                        &cache.configs,
                        &cache.statuses,
                    ));
                    *self.inner.snapshot.write().await = snapshot.clone();
                    *self.inner.strings.write().await = Arc::new(cache.strings.clone());
                    record_poll_success();
                    debug!(
                        "snapshot updated with {} devices and {} statuses",
                        snapshot.devices.len(),
                        snapshot.statuses.len()
                    );
                    Ok(snapshot)
                }
                Err(err) => {
                    record_poll_failure();
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// 拉取账号下的安装列表（用于选择安装）。
    pub async fn fetch_installations(&self) -> Result<InstallMap, CoordinatorError> {
        let api = &self.inner.api;
        let simulate = self.inner.options.simulate_multi_install;
        let installs = self
            .with_retries("installation list", || async move {
                api.login().await?;
                let payload = api.fetch_install_list().await?;
                Ok::<_, CoordinatorError>(assemble_install_list(&payload, simulate)?)
            })
            .await?;

        let mut state = self.inner.state.lock().await;
        state.cache.installs = installs.clone();
        state.cache.installs_at = Some(Instant::now());
        Ok(installs)
    }

    /// 基于当前快照构建指定平台的实体。
    pub async fn entities(&self, platform: Platform) -> Vec<EntityRecord> {
        let snapshot = self.snapshot().await;
        let strings = self.strings().await;
        build_entities(platform, self.install_id(), &snapshot, &strings)
    }

    /// 修改可写实体（number/select/switch）的值。
    ///
    /// 未知或未变化时返回 `Ok(false)`；否则先更新缓存，再提交到厂商。
    pub async fn modify(&self, object_id: &str, value: &str) -> Result<bool, CoordinatorError> {
        let (serial, key) = {
            let mut state = self.inner.state.lock().await;
            let Some(status) = state.cache.statuses.get_mut(object_id) else {
                return Ok(false);
            };
            if status.value == value {
                return Ok(false);
            }
            debug!(
                "set {} from {} to {}",
                status.unique_id, status.value, value
            );
            status.value = value.to_string();
            (status.serial.clone(), status.key.clone())
        };

        {
            let mut snapshot = self.inner.snapshot.write().await;
            if snapshot.statuses.contains_key(object_id) {
                let mut next = Snapshot::clone(&snapshot);
                if let Some(status) = next.statuses.get_mut(object_id) {
                    status.value = value.to_string();
                }
                *snapshot = Arc::new(next);
            }
        }

        let api = &self.inner.api;
        let (serial, key) = (serial.as_str(), key.as_str());
        self.with_retries("change device status", || async move {
            api.login().await?;
            api.change_device_status(serial, key, value).await?;
            Ok::<_, CoordinatorError>(())
        })
        .await?;
        Ok(true)
    }

    /// 诊断信息：重试直方图与各缓存映射。
    pub async fn diagnostics(&self) -> Value {
        let state = self.inner.state.lock().await;
        let total = state.retries_needed.iter().sum::<u64>().max(1);
        let retries_counter: BTreeMap<String, u64> = state
            .retries_needed
            .iter()
            .enumerate()
            .map(|(idx, count)| (idx.to_string(), *count))
            .collect();
        let retries_percent: BTreeMap<String, f64> = state
            .retries_needed
            .iter()
            .enumerate()
            .map(|(idx, count)| {
                let percent = 100.0 * *count as f64 / total as f64;
                (idx.to_string(), (percent * 100.0).round() / 100.0)
            })
            .collect();
        let age = |at: Option<Instant>| at.map(|at| at.elapsed().as_secs());
        let cache = &state.cache;

        json!({
            "diagnostics": {
                "retries_counter": retries_counter,
                "retries_percent": retries_percent,
            },
            "data": {
                "install_id": self.install_id(),
                "install_map_age_s": age(cache.installs_at),
                "install_map": cache.installs,
                "device_map_age_s": age(cache.devices_at),
                "device_map": cache.devices,
                "config_map_age_s": age(cache.configs_at),
                "config_map": cache.configs,
                "status_map_age_s": age(cache.statuses_at),
                "status_map": cache.statuses,
                "string_map_age_s": age(cache.strings_at),
                "string_map_lang": cache.strings.language,
                "string_map": cache.strings.messages,
                "user_role": cache.user_role,
            },
        })
    }

    /// 按选项重试；鉴权失败不重试。每次失败后先注销会话。
    async fn with_retries<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, CoordinatorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoordinatorError>>,
    {
        let attempts = self.inner.options.retry_attempts as usize;
        let delay = self.inner.options.retry_delay;
        let mut attempt = 0;
        loop {
            let err = match op().await {
                Ok(value) => {
                    self.record_attempt(attempt).await;
                    return Ok(value);
                }
                Err(err) => err,
            };

            self.inner.api.logout().await;
            if err.is_auth() || attempt + 1 >= attempts {
                self.record_attempt(attempt).await;
                warn!("{} failed after {} attempt(s): {}", what, attempt + 1, err);
                return Err(err);
            }

            record_poll_retry();
            if attempt < 2 {
                info!("retry {} in {:?}. {}", attempt + 1, delay, err);
            } else {
                warn!("retry {} in {:?}. {}", attempt + 1, delay, err);
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn record_attempt(&self, attempt: usize) {
        let mut state = self.inner.state.lock().await;
        let last = state.retries_needed.len().saturating_sub(1);
        if let Some(count) = state.retries_needed.get_mut(attempt.min(last)) {
            *count += 1;
        }
    }

    fn expired(&self, at: Option<Instant>) -> bool {
        at.is_none_or(|at| at.elapsed() >= self.inner.options.metadata_ttl)
    }

    /// 单次尝试：登录后按需刷新元数据，状态每次都刷新。
    ///
    /// 已有旧数据时，元数据刷新失败只记录告警。
    async fn detect_data(&self, cache: &mut Cache) -> Result<(), CoordinatorError> {
        let api = &self.inner.api;
        let options = &self.inner.options;
        let mut warnings = Vec::new();

        api.login().await?;

        if self.expired(cache.devices_at) {
            if let Err(err) = self.refresh_devices(cache).await {
                if cache.devices.is_empty() {
                    return Err(err);
                }
                warnings.push(format!("ignoring error during refresh of devices: {err}"));
                cache.devices_at = Some(Instant::now());
            }
        }

        if self.expired(cache.configs_at) {
            let devices: Vec<Device> = cache.devices.values().cloned().collect();
            for device in &devices {
                let config = match api.fetch_device_config(&device.config_id).await {
                    Ok(payload) => assemble_device_config(device, &payload).map_err(Into::into),
                    Err(err) => Err(CoordinatorError::from(err)),
                };
                match config {
                    Ok(config) => {
                        cache.configs.insert(config.id.clone(), config);
                        cache.configs_at = Some(Instant::now());
                    }
                    Err(err) if cache.configs.is_empty() => return Err(err),
                    Err(err) => {
                        warnings.push(format!("ignoring error during refresh of device config: {err}"));
                        cache.configs_at = Some(Instant::now());
                    }
                }
            }
        }

        let mut statuses = StatusMap::new();
        for device in cache.devices.values() {
            let payload = api.fetch_device_status(&device.serial).await?;
            statuses.extend(assemble_device_status(device, &payload)?);
        }
        cache.statuses = statuses;
        cache.statuses_at = Some(Instant::now());

        if self.expired(cache.strings_at) {
            let strings = match api.fetch_strings(&options.language).await {
                Ok(payload) => assemble_strings(&payload, &options.language).map_err(Into::into),
                Err(err) => Err(CoordinatorError::from(err)),
            };
            match strings {
                Ok(strings) => {
                    // 空表不算成功刷新，下个周期重试
                    if !strings.is_empty() {
                        cache.strings_at = Some(Instant::now());
                    }
                    cache.strings = strings;
                }
                Err(err) if cache.strings.is_empty() => return Err(err),
                Err(err) => {
                    warnings.push(format!("ignoring error during refresh of strings: {err}"));
                    cache.strings_at = Some(Instant::now());
                }
            }
        }

        if self.expired(cache.installs_at) {
            let installs = match api.fetch_install_list().await {
                Ok(payload) => assemble_install_list(&payload, options.simulate_multi_install)
                    .map_err(CoordinatorError::from),
                Err(err) => Err(CoordinatorError::from(err)),
            };
            match installs {
                Ok(installs) => {
                    if !installs.is_empty() {
                        cache.installs = installs;
                    }
                    cache.installs_at = Some(Instant::now());
                }
                Err(err) => {
                    warnings.push(format!(
                        "ignoring error during refresh of installation list: {err}"
                    ));
                    cache.installs_at = Some(Instant::now());
                }
            }
        }

        if !warnings.is_empty() {
            warn!("{}", warnings.join("\n"));
        }
        Ok(())
    }

    /// 刷新设备映射；同时清理不再被引用的配置与状态。
    ///
    /// 返回空设备列表时保留已知映射。
    async fn refresh_devices(&self, cache: &mut Cache) -> Result<(), CoordinatorError> {
        let install_id = self.install_id();
        let payload = self.inner.api.fetch_install_details(install_id).await?;
        let details = assemble_install_details(install_id, &payload)?;
        if details.devices.is_empty() {
            warn!(
                "installation '{}' ({}) returned no devices; keeping the known device map",
                self.inner.options.install_name, install_id
            );
            return Ok(());
        }

        let devices = details.devices;
        cache
            .configs
            .retain(|id, _| devices.values().any(|device| &device.config_id == id));
        cache
            .statuses
            .retain(|_, status| devices.contains_key(&status.serial));
        info!(
            "installation '{}' has {} devices",
            self.inner.options.install_name,
            devices.len()
        );
        cache.devices = devices;
        cache.devices_at = Some(Instant::now());
        cache.user_role = details.user_role;
        Ok(())
    }
}
