//! 数据装配：厂商原始 JSON → 规范化的安装、设备、参数配置与状态映射。

mod raw;

use domain::{
    ConfigMap, DEFAULT_USER_ROLE, Device, DeviceMap, InstallMap, Installation, ParamMeta,
    ParamType, ParameterConfig, SIMULATE_SUFFIX_ID, SIMULATE_SUFFIX_NAME, Snapshot, StatusMap,
    StatusValue, StringTable, VENDOR_NAME, create_id, strip_simulate_suffix,
};
use raw::{
    RawDeviceConfig, RawDeviceStatus, RawInstallDetails, RawInstallList, RawParam, RawStrings,
    initials, non_empty, value_text,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 状态值 `h` 表示设备不支持该参数。
pub const UNSUPPORTED_VALUE: &str = "h";

/// 装配错误。
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("mismatch: {0}")]
    Mismatch(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// 安装详情：设备映射与当前用户角色。
#[derive(Debug, Clone, PartialEq)]
pub struct InstallDetails {
    pub devices: DeviceMap,
    pub user_role: String,
}

fn parse<T: DeserializeOwned>(payload: &Value) -> Result<T, AssembleError> {
    T::deserialize(payload).map_err(|err| AssembleError::InvalidPayload(err.to_string()))
}

fn suffixes(simulated: bool) -> (&'static str, &'static str) {
    if simulated {
        (SIMULATE_SUFFIX_ID, SIMULATE_SUFFIX_NAME)
    } else {
        ("", "")
    }
}

/// 安装列表。`simulate` 为 true 时为每个安装额外生成一份模拟副本。
pub fn assemble_install_list(payload: &Value, simulate: bool) -> Result<InstallMap, AssembleError> {
    let list: RawInstallList = parse(payload)?;
    let installations = list.values.unwrap_or_default();

    let passes: &[bool] = if simulate { &[false, true] } else { &[false] };
    let mut installs = InstallMap::new();
    for &simulated in passes {
        let (suffix_id, suffix_name) = suffixes(simulated);
        for (idx, raw) in installations.iter().enumerate() {
            let raw_id = raw.installation_id.as_deref().unwrap_or_default();
            let name = non_empty(&raw.name)
                .or_else(|| non_empty(&raw.description))
                .map(str::to_string)
                .unwrap_or_else(|| format!("installation {idx}"));

            let id = create_id(&[&format!("{raw_id}{suffix_id}")]);
            let install = Installation {
                id: id.clone(),
                name: format!("{name}{suffix_name}"),
                description: non_empty(&raw.description).unwrap_or_default().to_string(),
                company: non_empty(&raw.company).unwrap_or_default().to_string(),
                address: non_empty(&raw.address).unwrap_or_default().to_string(),
                role: non_empty(&raw.user_role)
                    .unwrap_or(DEFAULT_USER_ROLE)
                    .to_string(),
                device_count: raw.dums.as_ref().map_or(0, Vec::len),
            };
            debug!("installation found: {}", install.name);
            installs.insert(id, install);
        }
    }
    Ok(installs)
}

/// 安装详情 → 以序列号为键的设备映射。
///
/// `install_id` 可带模拟后缀；此时设备序列号与名称同样带后缀。
pub fn assemble_install_details(
    install_id: &str,
    payload: &Value,
) -> Result<InstallDetails, AssembleError> {
    let details: RawInstallDetails = parse(payload)?;
    let vendor_id = strip_simulate_suffix(install_id);
    let (suffix_id, suffix_name) = suffixes(vendor_id != install_id);

    let returned = details.installation_id.as_deref().unwrap_or_default();
    if returned != vendor_id {
        return Err(AssembleError::Mismatch(format!(
            "expected installation id {vendor_id}, got '{returned}'"
        )));
    }

    let mut devices = DeviceMap::new();
    for (idx, dum) in details.dums.unwrap_or_default().iter().enumerate() {
        let serial = non_empty(&dum.serial)
            .ok_or_else(|| AssembleError::MissingField("serial".to_string()))?;
        let config_id = non_empty(&dum.configuration_id)
            .ok_or_else(|| AssembleError::MissingField("configuration_id".to_string()))?;
        let fallback = format!("device {idx}");
        let product = non_empty(&dum.product_name).unwrap_or(fallback.as_str());
        let name = non_empty(&dum.name).unwrap_or(product);

        let device = Device {
            id: create_id(&[&format!("{name}{suffix_id}")]),
            serial: format!("{serial}{suffix_id}"),
            name: format!("{name}{suffix_name}"),
            vendor: VENDOR_NAME.to_string(),
            product: product.to_string(),
            version: non_empty(&dum.configuration_name)
                .unwrap_or_default()
                .to_string(),
            config_id: config_id.to_string(),
            install_id: install_id.to_string(),
        };
        debug!(
            "device found: {} with serial {}",
            device.name, device.serial
        );
        devices.insert(device.serial.clone(), device);
    }

    Ok(InstallDetails {
        devices,
        user_role: non_empty(&details.user_role)
            .unwrap_or(DEFAULT_USER_ROLE)
            .to_string(),
    })
}

/// 设备的参数配置（元数据）。
pub fn assemble_device_config(
    device: &Device,
    payload: &Value,
) -> Result<ParameterConfig, AssembleError> {
    let config: RawDeviceConfig = parse(payload)?;
    let config_id = config.configuration_id.as_deref().unwrap_or_default();
    if config_id != device.config_id {
        return Err(AssembleError::Mismatch(format!(
            "expected configuration id {}, got '{}'",
            device.config_id, config_id
        )));
    }

    let raw_params = config
        .metadata
        .and_then(|metadata| metadata.params)
        .unwrap_or_default();
    let mut params = BTreeMap::new();
    for (idx, value) in raw_params.iter().enumerate() {
        let raw = match RawParam::deserialize(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "skip malformed param {} of configuration {}: {}",
                    idx, config_id, err
                );
                continue;
            }
        };
        let key = non_empty(&raw.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("param{idx}"));
        let values = raw
            .values
            .iter()
            .flatten()
            .filter(|pair| pair.len() >= 2)
            .map(|pair| (value_text(&pair[0]), value_text(&pair[1])))
            .collect();

        let meta = ParamMeta {
            key: key.clone(),
            param_type: ParamType::parse(raw.param_type.as_deref().unwrap_or_default()),
            unit: raw.unit.clone(),
            weight: raw.weight,
            values,
            min: raw.min,
            max: raw.max,
            family: raw.family.clone().unwrap_or_default(),
            group: raw.group.clone().unwrap_or_default(),
            view: initials(&raw.view),
            change: initials(&raw.change),
            log: initials(&raw.log),
            report: initials(&raw.report),
        };
        params.insert(key, meta);
    }

    let name = non_empty(&config.name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("config{config_id}"));
    debug!(
        "configuration found: {} with {} metadata params",
        name,
        params.len()
    );

    Ok(ParameterConfig {
        id: config_id.to_string(),
        label: non_empty(&config.label)
            .map(str::to_string)
            .unwrap_or_else(|| format!("config{config_id}")),
        description: non_empty(&config.description)
            .map(str::to_string)
            .unwrap_or_else(|| format!("config {config_id}")),
        params,
    })
}

/// 设备实时状态，以 object id（序列号 + key）为键。
pub fn assemble_device_status(device: &Device, payload: &Value) -> Result<StatusMap, AssembleError> {
    let raw: RawDeviceStatus = parse(payload)?;
    let encoded = non_empty(&raw.status).unwrap_or("{}");
    let values: BTreeMap<String, Value> = serde_json::from_str(encoded)
        .map_err(|err| AssembleError::InvalidPayload(format!("status of {}: {err}", device.serial)))?;

    let statuses: StatusMap = values
        .iter()
        .map(|(key, value)| (key, value_text(value)))
        .filter(|(_, value)| value != UNSUPPORTED_VALUE)
        .map(|(key, value)| {
            let status = StatusValue {
                serial: device.serial.clone(),
                unique_id: create_id(&[&device.name, key]),
                key: key.clone(),
                value,
            };
            (create_id(&[&device.serial, key]), status)
        })
        .collect();
    debug!(
        "statuses found for '{}' with {} values",
        device.name,
        statuses.len()
    );
    Ok(statuses)
}

/// 本地化字符串表；缺少 bundle 时使用 `default_language`。
pub fn assemble_strings(payload: &Value, default_language: &str) -> Result<StringTable, AssembleError> {
    let raw: RawStrings = parse(payload)?;
    let language = non_empty(&raw.bundle).unwrap_or(default_language);
    let messages = raw.messages.unwrap_or_default();
    debug!(
        "strings found: {} in language '{}'",
        messages.len(),
        language
    );
    Ok(StringTable::new(language, messages))
}

/// 组装单个轮询周期的快照。
///
/// 只保留仍被设备引用的配置；丢弃不属于该安装或缺少参数元数据的状态。
pub fn assemble_snapshot(
    install_id: &str,
    devices: &DeviceMap,
    configs: &ConfigMap,
    statuses: &StatusMap,
) -> Snapshot {
    let devices: DeviceMap = devices
        .iter()
        .filter(|(_, device)| device.install_id == install_id)
        .map(|(serial, device)| (serial.clone(), device.clone()))
        .collect();
    let configs: ConfigMap = configs
        .iter()
        .filter(|(id, _)| devices.values().any(|device| &device.config_id == *id))
        .map(|(id, config)| (id.clone(), config.clone()))
        .collect();

    let mut kept = StatusMap::new();
    for (object_id, status) in statuses {
        let Some(device) = devices.get(&status.serial) else {
            debug!(
                "skip status '{}'; serial {} is not part of installation {}",
                object_id, status.serial, install_id
            );
            continue;
        };
        let known = configs
            .get(&device.config_id)
            .is_some_and(|config| config.param(&status.key).is_some());
        if !known {
            warn!(
                "device metadata holds no info for '{}' with value '{}'",
                status.key, status.value
            );
            continue;
        }
        kept.insert(object_id.clone(), status.clone());
    }

    Snapshot {
        devices,
        configs,
        statuses: kept,
    }
}
