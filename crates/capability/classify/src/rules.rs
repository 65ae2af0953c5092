//! 分类规则表：每条规则为 (谓词, 结果)，自上而下首个命中者生效。

use crate::vocabulary::Vocabulary;
use domain::ParamMeta;
use entity_contract::{EntityCategory, Platform, StateClass};

/// 有序规则：谓词命中即返回对应结果。
pub type Rule<T> = (fn(&ParamMeta) -> bool, T);

/// 按顺序求值，返回首个命中规则的结果。
pub fn first_match<T: Copy>(rules: &[Rule<T>], meta: &ParamMeta) -> Option<T> {
    rules
        .iter()
        .find(|(predicate, _)| predicate(meta))
        .map(|(_, result)| *result)
}

// ---- 可见性 ----

/// 即使所在分组被屏蔽也要暴露的 key。
pub const VISIBLE_KEYS: &[&str] = &["RamUsed", "RamUsedMax", "PumpDisable", "LatestError"];
pub const HIDDEN_KEYS: &[&str] = &[];
pub const VISIBLE_GROUPS: &[&str] = &[];
pub const HIDDEN_GROUPS: &[&str] = &["Debug", "System Management", "ModbusDevice", "Errors"];

fn key_whitelisted(meta: &ParamMeta) -> bool {
    VISIBLE_KEYS.contains(&meta.key.as_str())
}

fn key_blacklisted(meta: &ParamMeta) -> bool {
    HIDDEN_KEYS.contains(&meta.key.as_str())
}

fn group_whitelisted(meta: &ParamMeta) -> bool {
    VISIBLE_GROUPS.contains(&meta.group.as_str())
}

fn group_blacklisted(meta: &ParamMeta) -> bool {
    HIDDEN_GROUPS.contains(&meta.group.as_str())
}

pub const VISIBILITY_RULES: &[Rule<bool>] = &[
    (key_whitelisted, true),
    (key_blacklisted, false),
    (group_whitelisted, true),
    (group_blacklisted, false),
];

// ---- 平台 ----

/// 安装商可修改时作为控制项的 key。
pub const CONFIG_KEYS: &[&str] = &["PumpDisable"];
/// 客户可修改时作为控制项的分组。
pub const CONFIG_GROUPS: &[&str] = &["Extra Comfort"];

pub fn is_config(meta: &ParamMeta) -> bool {
    (CONFIG_KEYS.contains(&meta.key.as_str()) && meta.changeable_by('I'))
        || (CONFIG_GROUPS.contains(&meta.group.as_str()) && meta.changeable_by('C'))
}

/// 恰好两个取值，且每个原始值与标签都在词表中。
pub fn is_two_state(meta: &ParamMeta, vocabulary: Vocabulary) -> bool {
    meta.is_enum()
        && meta.values.len() == 2
        && meta
            .values
            .iter()
            .all(|(raw, label)| vocabulary.contains(raw) && vocabulary.contains(label))
}

fn config_switch(meta: &ParamMeta) -> bool {
    is_config(meta) && is_two_state(meta, Vocabulary::Switch)
}

fn config_select(meta: &ParamMeta) -> bool {
    is_config(meta) && meta.is_enum()
}

fn config_number(meta: &ParamMeta) -> bool {
    is_config(meta) && meta.is_measure() && meta.min.is_some() && meta.max.is_some()
}

fn binary_state(meta: &ParamMeta) -> bool {
    is_two_state(meta, Vocabulary::BinarySensor)
}

/// 未命中任何规则时回落为 `Platform::Sensor`。
pub const PLATFORM_RULES: &[Rule<Platform>] = &[
    (config_switch, Platform::Switch),
    (config_select, Platform::Select),
    (config_number, Platform::Number),
    (binary_state, Platform::BinarySensor),
];

// ---- 状态类 ----

pub const STATELESS_GROUPS: &[&str] = &["Modbus", "Extra Comfort"];

/// 每个周期清零的计数器。
pub const PERIOD_RESET_KEYS: &[&str] = &[
    "Last_Period_Flow_Counter",
    "Last_Period_flow_Flow_Counter_Gall",
    "Last_Period_Energy_Counter",
];

/// 单调递增的计数器与计时器。
pub const TOTAL_INCREASING_KEYS: &[&str] = &[
    "Actual_Period_Flow_Counter",
    "Actual_Period_Flow_Counter_Gall",
    "Actual_Period_Energy_Counter",
    "FCp_Partial_Delivered_Flow_Gall",
    "FCp_Partial_Delivered_Flow_mc",
    "FCt_Total_Delivered_Flow_Gall",
    "FCt_Total_Delivered_Flow_mc",
    "HO_PowerOnHours",
    "HO_PumpRunHours",
    "PartialEnergy",
    "SO_PowerOnSeconds",
    "SO_PumpRunSeconds",
    "StartNumber",
    "TotalEnergy",
    "UpTime",
    "WlanRx",
    "WlanTx",
];

fn not_measure(meta: &ParamMeta) -> bool {
    !meta.is_measure()
}

fn editable(meta: &ParamMeta) -> bool {
    meta.is_editable()
}

fn stateless_group(meta: &ParamMeta) -> bool {
    STATELESS_GROUPS.contains(&meta.group.as_str())
}

fn period_reset_key(meta: &ParamMeta) -> bool {
    PERIOD_RESET_KEYS.contains(&meta.key.as_str())
}

fn total_increasing_key(meta: &ParamMeta) -> bool {
    TOTAL_INCREASING_KEYS.contains(&meta.key.as_str())
}

/// 未命中任何规则时回落为 `StateClass::Measurement`。
pub const STATE_CLASS_RULES: &[Rule<Option<StateClass>>] = &[
    (not_measure, None),
    (editable, None),
    (stateless_group, None),
    (period_reset_key, None),
    (total_increasing_key, Some(StateClass::TotalIncreasing)),
];

// ---- 实体分类 ----

/// 始终作为普通实体展示的分组（优先于其余所有规则）。
pub const PLAIN_GROUPS: &[&str] = &["I/O"];
pub const CONTROL_GROUPS: &[&str] = &["Extra Comfort"];
pub const SETTINGS_GROUPS: &[&str] = &["System Management"];

pub const DIAGNOSTIC_GROUPS: &[&str] = &[
    "Debug",
    "Errors",
    "Extra Comfort",
    "Firmware Updates",
    "I/O",
    "Installer",
    "Modbus",
    "ModbusDevice",
    "PLC",
    "System Management",
    "Technical Assistance",
    "Version",
];

pub const DIAGNOSTIC_KEYS: &[&str] = &["LastErrorOccurrency", "LastErrorTimePowerOn"];

fn plain_group(meta: &ParamMeta) -> bool {
    PLAIN_GROUPS.contains(&meta.group.as_str())
}

fn customer_control(meta: &ParamMeta) -> bool {
    CONTROL_GROUPS.contains(&meta.group.as_str()) && meta.changeable_by('C')
}

fn installer_setting(meta: &ParamMeta) -> bool {
    SETTINGS_GROUPS.contains(&meta.group.as_str()) && meta.changeable_by('I')
}

fn diagnostic_group(meta: &ParamMeta) -> bool {
    DIAGNOSTIC_GROUPS.contains(&meta.group.as_str())
}

fn diagnostic_key(meta: &ParamMeta) -> bool {
    DIAGNOSTIC_KEYS.contains(&meta.key.as_str())
}

fn service_only(meta: &ParamMeta) -> bool {
    !meta.visible_to('C') && !meta.visible_to('I')
}

fn installer_gear(meta: &ParamMeta) -> bool {
    !meta.visible_to('C') && meta.family == "gear"
}

/// 未命中任何规则时无分类。
pub const CATEGORY_RULES: &[Rule<Option<EntityCategory>>] = &[
    (plain_group, None),
    (customer_control, None),
    (installer_setting, Some(EntityCategory::Config)),
    (diagnostic_group, Some(EntityCategory::Diagnostic)),
    (diagnostic_key, Some(EntityCategory::Diagnostic)),
    (editable, Some(EntityCategory::Diagnostic)),
    (service_only, Some(EntityCategory::Diagnostic)),
    (installer_gear, Some(EntityCategory::Diagnostic)),
];
