//! 厂商原始载荷结构。字段可能缺失或为 null，一律按可选处理。

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawInstallList {
    pub values: Option<Vec<RawInstallation>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawInstallation {
    pub installation_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub user_role: Option<String>,
    pub dums: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawInstallDetails {
    pub installation_id: Option<String>,
    pub user_role: Option<String>,
    pub dums: Option<Vec<RawDum>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDum {
    pub serial: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "ProductName", alias = "distro")]
    pub product_name: Option<String>,
    pub configuration_name: Option<String>,
    pub configuration_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDeviceConfig {
    pub configuration_id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawMetadata {
    /// 逐个解析，单个参数格式错误不影响其余参数。
    pub params: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawParam {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max: Option<f64>,
    pub family: Option<String>,
    pub group: Option<String>,
    /// `[[raw, label], ...]`，raw 可能是数字。
    pub values: Option<Vec<Vec<Value>>>,
    pub view: Option<Vec<String>>,
    pub change: Option<Vec<String>>,
    pub log: Option<Vec<String>>,
    pub report: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDeviceStatus {
    /// JSON 编码的对象字符串。
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStrings {
    pub bundle: Option<String>,
    pub messages: Option<BTreeMap<String, String>>,
}

/// 数字或数字字符串；其他形式视为缺失。
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

pub(crate) fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// 非空字符串，否则 None。
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// JSON 值的文本形式；字符串不带引号。
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// 权限数组 → 首字母串，如 `["Customer", "Installer"]` → `"CI"`。
pub(crate) fn initials(roles: &Option<Vec<String>>) -> String {
    roles
        .iter()
        .flatten()
        .filter_map(|role| role.chars().next())
        .collect()
}
