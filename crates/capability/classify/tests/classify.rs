use dab_classify::{
    Vocabulary, category_for, classify, is_visible, platform_for, state_class_for, step_for,
};
use domain::{ParamMeta, ParamType};
use entity_contract::{DeviceClass, EntityCategory, Platform, StateClass};

fn meta(key: &str, group: &str, param_type: ParamType) -> ParamMeta {
    let mut meta = ParamMeta::new(key, param_type);
    meta.group = group.to_string();
    meta
}

fn with_values(mut meta: ParamMeta, values: &[(&str, &str)]) -> ParamMeta {
    meta.values = values
        .iter()
        .map(|(raw, label)| (raw.to_string(), label.to_string()))
        .collect();
    meta
}

fn ranged(key: &str, unit: &str, min: f64, max: f64) -> ParamMeta {
    let mut meta = meta(key, "Extra Comfort", ParamType::Measure);
    meta.unit = Some(unit.to_string());
    meta.min = Some(min);
    meta.max = Some(max);
    meta.change = "C".to_string();
    meta
}

const GROUPS: &[&str] = &[
    "",
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
    "Status",
];
const PERMISSIONS: &[&str] = &["", "C", "I", "CI", "R"];

#[test]
fn pump_disable_becomes_config_switch() {
    let mut pump_disable = with_values(
        meta("PumpDisable", "System Management", ParamType::Enum),
        &[("0", "Off"), ("1", "On")],
    );
    pump_disable.change = "I".to_string();

    assert!(is_visible(&pump_disable));
    assert_eq!(platform_for(&pump_disable), Platform::Switch);
    assert_eq!(category_for(&pump_disable), Some(EntityCategory::Config));

    let classified = classify(&pump_disable);
    assert!(classified.visible);
    assert_eq!(classified.platform, Platform::Switch);
    assert_eq!(classified.unit, None);
    assert_eq!(classified.state_class, None);
    assert_eq!(classified.step, None);
}

#[test]
fn whitelisted_keys_are_visible_in_any_group() {
    for key in ["RamUsed", "RamUsedMax", "PumpDisable", "LatestError"] {
        for group in GROUPS {
            assert!(
                is_visible(&meta(key, group, ParamType::Measure)),
                "{key} in {group}"
            );
        }
    }
}

#[test]
fn blacklisted_groups_hide_other_keys() {
    for group in GROUPS {
        let hidden = matches!(
            *group,
            "Debug" | "System Management" | "ModbusDevice" | "Errors"
        );
        assert_eq!(
            is_visible(&meta("PressureSetpoint", group, ParamType::Measure)),
            !hidden,
            "group {group}"
        );
    }
}

#[test]
fn platform_selection() {
    let two_state = [("0", "Off"), ("1", "On")];

    let mut control = with_values(meta("SleepMode", "Extra Comfort", ParamType::Enum), &two_state);
    control.change = "C".to_string();
    assert_eq!(platform_for(&control), Platform::Switch);

    let mut select = with_values(
        meta("SleepMode", "Extra Comfort", ParamType::Enum),
        &[("0", "Eco"), ("1", "Comfort")],
    );
    select.change = "C".to_string();
    assert_eq!(platform_for(&select), Platform::Select);

    let number = ranged("SetpointPressure", "bar", 1.0, 6.0);
    assert_eq!(platform_for(&number), Platform::Number);

    let mut open_ended = number.clone();
    open_ended.max = None;
    assert_eq!(platform_for(&open_ended), Platform::Sensor);

    // 无修改权限时退化为只读平台
    let readonly = with_values(meta("SleepMode", "Extra Comfort", ParamType::Enum), &two_state);
    assert_eq!(platform_for(&readonly), Platform::BinarySensor);

    let active = with_values(
        meta("PumpStatus", "Status", ParamType::Enum),
        &[("0", "Inactive"), ("1", "Active")],
    );
    assert_eq!(platform_for(&active), Platform::BinarySensor);

    let three_state = with_values(
        meta("PumpStatus", "Status", ParamType::Enum),
        &[("0", "Off"), ("1", "On"), ("2", "Fault")],
    );
    assert_eq!(platform_for(&three_state), Platform::Sensor);

    // 安装商权限不足以让 Extra Comfort 成为控制项
    let mut installer_only = select.clone();
    installer_only.change = "I".to_string();
    assert_eq!(platform_for(&installer_only), Platform::Sensor);
}

#[test]
fn vocabulary_check_uses_both_raw_and_label() {
    // "Enable" 在 switch 词表中但不在 binary_sensor 词表中
    let readonly = with_values(
        meta("Feature", "Status", ParamType::Enum),
        &[("0", "Disable"), ("1", "Enable")],
    );
    assert_eq!(platform_for(&readonly), Platform::Sensor);
    assert!(Vocabulary::Switch.contains("Enable"));
    assert!(!Vocabulary::BinarySensor.contains("Enable"));

    let mut control = readonly.clone();
    control.group = "Extra Comfort".to_string();
    control.change = "C".to_string();
    assert_eq!(platform_for(&control), Platform::Switch);

    let lowercase_mismatch = with_values(
        meta("Feature", "Status", ParamType::Enum),
        &[("0", "oFF"), ("1", "On")],
    );
    assert_eq!(platform_for(&lowercase_mismatch), Platform::Sensor);
}

#[test]
fn open_closed_enum_is_binary_sensor() {
    let valve = with_values(
        meta("ValveState", "Status", ParamType::Enum),
        &[("0", "Closed"), ("1", "Open")],
    );
    assert_eq!(platform_for(&valve), Platform::BinarySensor);
    assert_eq!(Vocabulary::BinarySensor.state_of(valve.label_for("0")), Some(false));
    assert_eq!(Vocabulary::BinarySensor.state_of(valve.label_for("1")), Some(true));

    // open/closed 不属于 switch 词表，可写时落到 select
    let mut control = valve.clone();
    control.group = "Extra Comfort".to_string();
    control.change = "C".to_string();
    assert_eq!(platform_for(&control), Platform::Select);
}

#[test]
fn platform_is_total_over_permutations() {
    let types = [
        ParamType::Enum,
        ParamType::Measure,
        ParamType::Label,
        ParamType::Other("string".to_string()),
    ];
    for param_type in types {
        for group in GROUPS {
            for change in PERMISSIONS {
                let mut meta = meta("PumpDisable", group, param_type.clone());
                meta.change = change.to_string();
                let platform = platform_for(&meta);
                assert!(Platform::ALL.contains(&platform));
            }
        }
    }
}

#[test]
fn state_class_rules() {
    let mut counter = meta("TotalEnergy", "Energy", ParamType::Measure);
    counter.unit = Some("kWh".to_string());
    assert_eq!(
        state_class_for(&counter),
        Some(StateClass::TotalIncreasing)
    );

    let reset = meta("Last_Period_Energy_Counter", "Energy", ParamType::Measure);
    assert_eq!(state_class_for(&reset), None);

    let pressure = meta("VP_PressureBar", "Status", ParamType::Measure);
    assert_eq!(state_class_for(&pressure), Some(StateClass::Measurement));

    let modbus = meta("VP_PressureBar", "Modbus", ParamType::Measure);
    assert_eq!(state_class_for(&modbus), None);

    let mut setting = pressure.clone();
    setting.change = "C".to_string();
    assert_eq!(state_class_for(&setting), None);

    let label = meta("TotalEnergy", "Energy", ParamType::Label);
    assert_eq!(state_class_for(&label), None);
}

fn expected_category(meta: &ParamMeta) -> Option<EntityCategory> {
    let diagnostic_groups = [
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
    if meta.group == "I/O" {
        None
    } else if meta.group == "Extra Comfort" && meta.change.contains('C') {
        None
    } else if meta.group == "System Management" && meta.change.contains('I') {
        Some(EntityCategory::Config)
    } else if diagnostic_groups.contains(&meta.group.as_str())
        || meta.key == "LastErrorOccurrency"
        || meta.key == "LastErrorTimePowerOn"
        || !meta.change.is_empty()
        || (!meta.view.contains('C') && !meta.view.contains('I'))
        || (!meta.view.contains('C') && meta.family == "gear")
    {
        Some(EntityCategory::Diagnostic)
    } else {
        None
    }
}

#[test]
fn category_cascade_covers_every_combination() {
    for key in ["PressureSetpoint", "LastErrorOccurrency"] {
        for group in GROUPS {
            for change in PERMISSIONS {
                for view in PERMISSIONS {
                    for family in ["", "gear"] {
                        let mut meta = meta(key, group, ParamType::Measure);
                        meta.change = change.to_string();
                        meta.view = view.to_string();
                        meta.family = family.to_string();
                        assert_eq!(
                            category_for(&meta),
                            expected_category(&meta),
                            "{key}/{group}/change={change}/view={view}/family={family}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn io_group_is_never_categorised() {
    let mut meta = meta("LastErrorOccurrency", "I/O", ParamType::Measure);
    meta.change = "I".to_string();
    meta.view = String::new();
    assert_eq!(category_for(&meta), None);
}

#[test]
fn step_inference() {
    assert_eq!(step_for(&ranged("Delay", "s", 0.0, 3600.0)), Some(3600));
    assert_eq!(step_for(&ranged("Level", "%", 0.0, 100.0)), Some(100));
    assert_eq!(step_for(&ranged("Delay", "secondi", 60.0, 600.0)), Some(60));
    assert_eq!(step_for(&ranged("Delay", "min", 0.0, 90.0)), Some(1));
    assert_eq!(step_for(&ranged("Delay", "h", 24.0, 72.0)), Some(24));
    // 候选 1 总能整除，因此整数区间总能得到步长
    assert_eq!(step_for(&ranged("Level", "%", 1.0, 7.0)), Some(1));
    // 截断取整后再判断
    assert_eq!(step_for(&ranged("Level", "%", 0.0, 100.9)), Some(100));

    let mut unbounded = ranged("Level", "%", 0.0, 100.0);
    unbounded.min = None;
    assert_eq!(step_for(&unbounded), None);
}

#[test]
fn number_classification() {
    let setpoint = ranged("SetpointPressure", "bar", 1.0, 6.0);
    let classified = classify(&setpoint);
    assert_eq!(classified.platform, Platform::Number);
    assert_eq!(classified.unit.as_ref().map(|unit| unit.symbol()), Some("bar"));
    assert_eq!(classified.icon, Some("mdi:water-pump"));
    assert_eq!(classified.device_class, Some(DeviceClass::Pressure));
    assert_eq!(classified.state_class, None);
    assert_eq!(classified.step, Some(1));
    assert_eq!(classified.category, None);
}

#[test]
fn enum_sensor_has_enum_class_and_no_unit() {
    let mut mode = with_values(
        meta("PumpMode", "Status", ParamType::Enum),
        &[("0", "Standby"), ("1", "Go"), ("2", "Fault")],
    );
    mode.unit = Some("bar".to_string());
    mode.view = "CI".to_string();
    let classified = classify(&mode);
    assert_eq!(classified.platform, Platform::Sensor);
    assert_eq!(classified.unit, None);
    assert_eq!(classified.icon, None);
    assert_eq!(classified.device_class, Some(DeviceClass::Enum));
    assert_eq!(classified.state_class, None);
}

#[test]
fn classification_is_idempotent() {
    let mut samples = vec![
        ranged("SetpointPressure", "bar", 1.0, 6.0),
        meta("TotalEnergy", "Energy", ParamType::Measure),
        with_values(
            meta("PumpDisable", "System Management", ParamType::Enum),
            &[("0", "Off"), ("1", "On")],
        ),
    ];
    samples[2].change = "I".to_string();
    for sample in &samples {
        assert_eq!(classify(sample), classify(sample));
        assert_eq!(is_visible(sample), is_visible(sample));
        assert_eq!(step_for(sample), step_for(sample));
    }
}
