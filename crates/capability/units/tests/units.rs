use dab_units::{
    DisplayUnit, Unit, icon_for, normalize, number_device_class_for, sensor_device_class_for,
};
use entity_contract::DeviceClass;
use std::collections::HashSet;

#[test]
fn vendor_units_normalize_to_display_units() {
    let cases = [
        ("mc", "m³"),
        ("l", "L"),
        ("l/min", "L/min"),
        ("gpm", "gal/min"),
        ("gall/min", "gal/min"),
        ("inch", "in"),
        ("secondi", "s"),
        ("KB", "kB"),
        ("MByte", "MB"),
        ("°C", "°C"),
    ];
    for (vendor, expected) in cases {
        let unit = normalize(Some(vendor)).expect("known unit");
        assert_eq!(unit.symbol(), expected, "vendor unit {vendor}");
        assert!(unit.known().is_some());
    }
}

#[test]
fn no_unit_markers_normalize_to_none() {
    for marker in [Some(""), Some("None"), Some("Address"), Some("SW. Vers."), None] {
        assert_eq!(normalize(marker), None, "marker {marker:?}");
    }
}

#[test]
fn unknown_unit_passes_through() {
    let before = dab_telemetry::metrics().snapshot().unknown_units;
    let unit = normalize(Some("xyz-unknown")).expect("passthrough");
    assert_eq!(unit, DisplayUnit::Unknown("xyz-unknown".to_string()));
    assert_eq!(unit.symbol(), "xyz-unknown");
    assert!(dab_telemetry::metrics().snapshot().unknown_units > before);
    assert_eq!(icon_for(Some(&unit)), None);
    assert_eq!(sensor_device_class_for(Some(&unit), false), None);
}

#[test]
fn every_unit_has_a_distinct_symbol() {
    let symbols: HashSet<&str> = Unit::ALL.iter().map(Unit::symbol).collect();
    assert_eq!(symbols.len(), Unit::ALL.len());
    for unit in Unit::ALL {
        // icon 与设备类对每个变体都是全函数
        let _ = unit.icon();
        let _ = unit.device_class();
        assert!(!unit.symbol().is_empty());
    }
}

#[test]
fn icons_follow_display_unit() {
    let icon = |unit: Unit| icon_for(Some(&DisplayUnit::Known(unit)));
    assert_eq!(icon(Unit::Celsius), Some("mdi:thermometer"));
    assert_eq!(icon(Unit::Bar), Some("mdi:water-pump"));
    assert_eq!(icon(Unit::CubicMeter), Some("mdi:water"));
    assert_eq!(icon(Unit::LiterPerMinute), Some("mdi:hydro-power"));
    assert_eq!(icon(Unit::Hour), Some("mdi:timer"));
    assert_eq!(icon(Unit::Rpm), None);
    assert_eq!(icon_for(None), None);
}

#[test]
fn enum_short_circuits_device_class() {
    let bar = DisplayUnit::Known(Unit::Bar);
    assert_eq!(sensor_device_class_for(Some(&bar), true), Some(DeviceClass::Enum));
    assert_eq!(number_device_class_for(None, true), Some(DeviceClass::Enum));
    assert_eq!(
        sensor_device_class_for(Some(&bar), false),
        Some(DeviceClass::Pressure)
    );
    assert_eq!(
        number_device_class_for(Some(&DisplayUnit::Known(Unit::Second)), false),
        Some(DeviceClass::Duration)
    );
    assert_eq!(
        number_device_class_for(Some(&DisplayUnit::Known(Unit::Minute)), false),
        None
    );
    assert_eq!(sensor_device_class_for(None, false), None);
}
