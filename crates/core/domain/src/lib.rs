pub mod data;

pub use data::{
    ConfigMap, Device, DeviceMap, InstallMap, Installation, ParamMeta, ParamType, ParameterConfig,
    Snapshot, StatusMap, StatusValue, StringTable,
};

/// 设备厂商名称。
pub const VENDOR_NAME: &str = "DAB Pumps";

/// 用户在安装内的默认角色。
pub const DEFAULT_USER_ROLE: &str = "CUSTOMER";

/// 模拟安装/设备的 ID 后缀。
pub const SIMULATE_SUFFIX_ID: &str = "_test";

/// 模拟安装/设备的名称后缀。
pub const SIMULATE_SUFFIX_NAME: &str = " (test)";

/// 由若干片段生成稳定的小写标识（实体 object_id / unique_id）。
pub fn create_id(parts: &[&str]) -> String {
    let joined = parts.join("_");
    joined
        .trim_matches('_')
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// 去掉模拟后缀，得到厂商侧真实 ID。
pub fn strip_simulate_suffix(id: &str) -> &str {
    id.strip_suffix(SIMULATE_SUFFIX_ID).unwrap_or(id)
}
