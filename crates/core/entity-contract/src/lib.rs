//! 交付给自动化平台的稳定实体契约。

use serde::Serialize;
use std::fmt;

/// 实体平台。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Number,
    Select,
    Switch,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Sensor,
        Platform::BinarySensor,
        Platform::Number,
        Platform::Select,
        Platform::Switch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::Number => "number",
            Self::Select => "select",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 实体分类（控制 UI 分组）。缺省（None）用 `Option` 表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// 状态类（统计方式）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

/// 设备类（sensor 与 number 平台共用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Enum,
    Temperature,
    Pressure,
    Water,
    VolumeFlowRate,
    Distance,
    Duration,
    DataSize,
    PowerFactor,
    Current,
    Voltage,
    Power,
    Energy,
}

/// 实体当前值。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// 开关类：未知状态为 None。
    State(Option<bool>),
}

/// 实体所属设备信息。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
}

/// 实体记录：一次构建的完整结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub platform: Platform,
    pub install_id: String,
    pub object_id: String,
    pub unique_id: String,
    /// 参数 key。
    pub key: String,
    /// 翻译后的显示名称。
    pub name: String,
    pub device: DeviceInfo,
    pub unit: Option<String>,
    pub icon: Option<String>,
    pub device_class: Option<DeviceClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    pub entity_category: Option<EntityCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// number 专用。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    /// select 专用。
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub value: EntityValue,
}
