//! 厂商单位映射：厂商单位字符串 → 显示单位，并按显示单位派生图标与设备类。

use dab_telemetry::record_unknown_unit;
use entity_contract::DeviceClass;
use tracing::warn;

/// 已知的显示单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Bar,
    Psi,
    CubicMeter,
    Liter,
    LiterPerMinute,
    Gallon,
    GallonPerMinute,
    Centimeter,
    Inch,
    Millisecond,
    Second,
    Minute,
    Hour,
    Rpm,
    Byte,
    Kilobyte,
    Megabyte,
    Percent,
    Volt,
    Ampere,
    Kilowatt,
    KilowattHour,
}

impl Unit {
    pub const ALL: [Unit; 24] = [
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Bar,
        Unit::Psi,
        Unit::CubicMeter,
        Unit::Liter,
        Unit::LiterPerMinute,
        Unit::Gallon,
        Unit::GallonPerMinute,
        Unit::Centimeter,
        Unit::Inch,
        Unit::Millisecond,
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Rpm,
        Unit::Byte,
        Unit::Kilobyte,
        Unit::Megabyte,
        Unit::Percent,
        Unit::Volt,
        Unit::Ampere,
        Unit::Kilowatt,
        Unit::KilowattHour,
    ];

    /// 显示符号。
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Bar => "bar",
            Self::Psi => "psi",
            Self::CubicMeter => "m³",
            Self::Liter => "L",
            Self::LiterPerMinute => "L/min",
            Self::Gallon => "gal",
            Self::GallonPerMinute => "gal/min",
            Self::Centimeter => "cm",
            Self::Inch => "in",
            Self::Millisecond => "ms",
            Self::Second => "s",
            Self::Minute => "min",
            Self::Hour => "h",
            Self::Rpm => "rpm",
            Self::Byte => "B",
            Self::Kilobyte => "kB",
            Self::Megabyte => "MB",
            Self::Percent => "%",
            Self::Volt => "V",
            Self::Ampere => "A",
            Self::Kilowatt => "kW",
            Self::KilowattHour => "kWh",
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            Self::Celsius | Self::Fahrenheit => Some("mdi:thermometer"),
            Self::Bar | Self::Psi => Some("mdi:water-pump"),
            Self::CubicMeter | Self::Liter | Self::Gallon => Some("mdi:water"),
            Self::LiterPerMinute | Self::GallonPerMinute => Some("mdi:hydro-power"),
            Self::Centimeter | Self::Inch => Some("mdi:waves-arrow-up"),
            Self::Second | Self::Minute => Some("mdi:timer-sand"),
            Self::Hour => Some("mdi:timer"),
            Self::Byte | Self::Kilobyte | Self::Megabyte => Some("mdi:memory"),
            Self::Percent => Some("mdi:percent"),
            Self::Volt | Self::Ampere => Some("mdi:lightning-bolt"),
            Self::Kilowatt => Some("mdi:power-plug"),
            Self::KilowattHour => Some("mdi:lightning"),
            Self::Millisecond | Self::Rpm => None,
        }
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        match self {
            Self::Celsius | Self::Fahrenheit => Some(DeviceClass::Temperature),
            Self::Bar | Self::Psi => Some(DeviceClass::Pressure),
            Self::CubicMeter | Self::Liter | Self::Gallon => Some(DeviceClass::Water),
            Self::LiterPerMinute | Self::GallonPerMinute => Some(DeviceClass::VolumeFlowRate),
            Self::Centimeter | Self::Inch => Some(DeviceClass::Distance),
            Self::Second => Some(DeviceClass::Duration),
            Self::Byte | Self::Kilobyte | Self::Megabyte => Some(DeviceClass::DataSize),
            Self::Percent => Some(DeviceClass::PowerFactor),
            Self::Ampere => Some(DeviceClass::Current),
            Self::Volt => Some(DeviceClass::Voltage),
            Self::Kilowatt => Some(DeviceClass::Power),
            Self::KilowattHour => Some(DeviceClass::Energy),
            Self::Millisecond | Self::Minute | Self::Hour | Self::Rpm => None,
        }
    }
}

/// 厂商单位表；`None` 表示该字符串是"无单位"标识。
const VENDOR_UNITS: &[(&str, Option<Unit>)] = &[
    ("°C", Some(Unit::Celsius)),
    ("°F", Some(Unit::Fahrenheit)),
    ("bar", Some(Unit::Bar)),
    ("psi", Some(Unit::Psi)),
    ("mc", Some(Unit::CubicMeter)),
    ("l", Some(Unit::Liter)),
    ("l/min", Some(Unit::LiterPerMinute)),
    ("gall", Some(Unit::Gallon)),
    ("gall/min", Some(Unit::GallonPerMinute)),
    ("gpm", Some(Unit::GallonPerMinute)),
    ("cm", Some(Unit::Centimeter)),
    ("inch", Some(Unit::Inch)),
    ("ms", Some(Unit::Millisecond)),
    ("s", Some(Unit::Second)),
    ("secondi", Some(Unit::Second)),
    ("min", Some(Unit::Minute)),
    ("h", Some(Unit::Hour)),
    ("rpm", Some(Unit::Rpm)),
    ("B", Some(Unit::Byte)),
    ("kB", Some(Unit::Kilobyte)),
    ("KB", Some(Unit::Kilobyte)),
    ("MByte", Some(Unit::Megabyte)),
    ("%", Some(Unit::Percent)),
    ("V", Some(Unit::Volt)),
    ("A", Some(Unit::Ampere)),
    ("kW", Some(Unit::Kilowatt)),
    ("kWh", Some(Unit::KilowattHour)),
    ("Address", None),
    ("SW. Vers.", None),
    ("None", None),
    ("", None),
];

/// 规范化后的显示单位。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayUnit {
    Known(Unit),
    /// 未登记的厂商单位，原样透传。
    Unknown(String),
}

impl DisplayUnit {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Known(unit) => unit.symbol(),
            Self::Unknown(raw) => raw,
        }
    }

    pub fn known(&self) -> Option<Unit> {
        match self {
            Self::Known(unit) => Some(*unit),
            Self::Unknown(_) => None,
        }
    }
}

/// 厂商单位 → 显示单位。
///
/// `None`、空串、`"None"`、`"Address"`、`"SW. Vers."` 均为无单位；
/// 未登记的非空字符串记录告警后原样透传。
pub fn normalize(vendor_unit: Option<&str>) -> Option<DisplayUnit> {
    let raw = vendor_unit?;
    match VENDOR_UNITS.iter().find(|(vendor, _)| *vendor == raw) {
        Some((_, unit)) => (*unit).map(DisplayUnit::Known),
        None => {
            warn!(
                "unit '{}' is not supported by the unit table; passing it through unchanged",
                raw
            );
            record_unknown_unit();
            Some(DisplayUnit::Unknown(raw.to_string()))
        }
    }
}

/// 显示单位 → 图标。
pub fn icon_for(unit: Option<&DisplayUnit>) -> Option<&'static str> {
    unit.and_then(DisplayUnit::known).and_then(|unit| unit.icon())
}

/// number 平台设备类；enum 类型直接归为 `Enum`。
pub fn number_device_class_for(unit: Option<&DisplayUnit>, is_enum: bool) -> Option<DeviceClass> {
    if is_enum {
        return Some(DeviceClass::Enum);
    }
    unit.and_then(DisplayUnit::known)
        .and_then(|unit| unit.device_class())
}

/// sensor 平台设备类；enum 类型直接归为 `Enum`。
pub fn sensor_device_class_for(unit: Option<&DisplayUnit>, is_enum: bool) -> Option<DeviceClass> {
    if is_enum {
        return Some(DeviceClass::Enum);
    }
    unit.and_then(DisplayUnit::known)
        .and_then(|unit| unit.device_class())
}
