use serde::Serialize;
use std::collections::BTreeMap;

/// 安装（厂商门户中的一个现场）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub company: String,
    pub address: String,
    pub role: String,
    pub device_count: usize,
}

/// 设备（泵或通信模块）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: String,
    /// 序列号；模拟设备带 `_test` 后缀。
    pub serial: String,
    pub name: String,
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub config_id: String,
    pub install_id: String,
}

/// 参数类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Enum,
    Measure,
    Label,
    Other(String),
}

impl ParamType {
    pub fn parse(value: &str) -> Self {
        match value {
            "enum" => Self::Enum,
            "measure" => Self::Measure,
            "label" => Self::Label,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Enum => "enum",
            Self::Measure => "measure",
            Self::Label => "label",
            Self::Other(value) => value,
        }
    }
}

/// 参数元数据（某一设备型号/固件的单个参数定义）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamMeta {
    pub key: String,
    pub param_type: ParamType,
    pub unit: Option<String>,
    pub weight: Option<f64>,
    /// 原始值 → 标签，仅 `enum` 类型有内容。
    pub values: BTreeMap<String, String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub family: String,
    pub group: String,
    /// 可见权限首字母（C=客户，I=安装商，...）。
    pub view: String,
    /// 可修改权限首字母。
    pub change: String,
    pub log: String,
    pub report: String,
}

impl ParamMeta {
    /// 仅带 key 与类型的空元数据，其余字段为空。
    pub fn new(key: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            key: key.into(),
            param_type,
            unit: None,
            weight: None,
            values: BTreeMap::new(),
            min: None,
            max: None,
            family: String::new(),
            group: String::new(),
            view: String::new(),
            change: String::new(),
            log: String::new(),
            report: String::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        self.param_type == ParamType::Enum
    }

    pub fn is_measure(&self) -> bool {
        self.param_type == ParamType::Measure
    }

    pub fn changeable_by(&self, role: char) -> bool {
        self.change.contains(role)
    }

    pub fn visible_to(&self, role: char) -> bool {
        self.view.contains(role)
    }

    /// 任何角色可修改即视为设置项。
    pub fn is_editable(&self) -> bool {
        !self.change.is_empty()
    }

    /// 原始值对应的标签，找不到时返回原始值。
    pub fn label_for<'a>(&'a self, raw: &'a str) -> &'a str {
        self.values.get(raw).map(String::as_str).unwrap_or(raw)
    }
}

/// 参数配置（一个设备型号的完整元数据）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterConfig {
    pub id: String,
    pub label: String,
    pub description: String,
    pub params: BTreeMap<String, ParamMeta>,
}

impl ParameterConfig {
    pub fn param(&self, key: &str) -> Option<&ParamMeta> {
        self.params.get(key)
    }
}

/// 设备实时状态值。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusValue {
    pub serial: String,
    pub unique_id: String,
    pub key: String,
    pub value: String,
}

pub type InstallMap = BTreeMap<String, Installation>;
pub type DeviceMap = BTreeMap<String, Device>;
pub type ConfigMap = BTreeMap<String, ParameterConfig>;
pub type StatusMap = BTreeMap<String, StatusValue>;

/// 单次轮询的不可变快照。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// serial → Device
    pub devices: DeviceMap,
    /// config_id → ParameterConfig
    pub configs: ConfigMap,
    /// object_id → StatusValue
    pub statuses: StatusMap,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() || self.configs.is_empty() || self.statuses.is_empty()
    }

    /// 状态所属设备及其参数元数据。
    pub fn resolve(&self, status: &StatusValue) -> Option<(&Device, &ParamMeta)> {
        let device = self.devices.get(&status.serial)?;
        let config = self.configs.get(&device.config_id)?;
        let meta = config.param(&status.key)?;
        Some((device, meta))
    }
}

/// 本地化字符串表，查不到时回退为原文。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StringTable {
    pub language: String,
    pub messages: BTreeMap<String, String>,
}

impl StringTable {
    pub fn new(language: impl Into<String>, messages: BTreeMap<String, String>) -> Self {
        Self {
            language: language.into(),
            messages,
        }
    }

    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
