//! 参数分类：决定每个设备参数是否暴露、归属哪个平台，以及单位、图标、
//! 设备类、状态类、实体分类与数值步长。
//!
//! 所有函数都是 `ParamMeta` 的纯函数，不持有任何状态，可在任意线程并发调用。

pub mod rules;
pub mod vocabulary;

use dab_units::{
    DisplayUnit, Unit, icon_for, normalize, number_device_class_for, sensor_device_class_for,
};
use domain::ParamMeta;
use entity_contract::{DeviceClass, EntityCategory, Platform, StateClass};
use rules::{CATEGORY_RULES, PLATFORM_RULES, STATE_CLASS_RULES, VISIBILITY_RULES, first_match};

pub use vocabulary::Vocabulary;

/// 分类结果（不持久化，元数据变化后需重新计算）。
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedParam<'a> {
    pub meta: &'a ParamMeta,
    pub visible: bool,
    pub platform: Platform,
    pub unit: Option<DisplayUnit>,
    pub icon: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub category: Option<EntityCategory>,
    pub step: Option<u32>,
}

/// 参数是否应暴露为实体。
pub fn is_visible(meta: &ParamMeta) -> bool {
    first_match(VISIBILITY_RULES, meta).unwrap_or(true)
}

/// 参数归属的平台；总有结果，缺省为 sensor。
pub fn platform_for(meta: &ParamMeta) -> Platform {
    first_match(PLATFORM_RULES, meta).unwrap_or(Platform::Sensor)
}

pub fn state_class_for(meta: &ParamMeta) -> Option<StateClass> {
    first_match(STATE_CLASS_RULES, meta).unwrap_or(Some(StateClass::Measurement))
}

pub fn category_for(meta: &ParamMeta) -> Option<EntityCategory> {
    first_match(CATEGORY_RULES, meta).flatten()
}

/// 数值步长：按单位挑选候选除数，返回首个能整除 min、max 与 (max - min) 的候选。
///
/// min 或 max 缺失时返回 None。
pub fn step_for(meta: &ParamMeta) -> Option<u32> {
    let unit = normalize(meta.unit.as_deref());
    step_with_unit(meta, unit.as_ref())
}

fn step_candidates(unit: Option<&DisplayUnit>) -> &'static [i64] {
    match unit.and_then(DisplayUnit::known) {
        Some(Unit::Second) => &[3600, 60, 1],
        Some(Unit::Minute) => &[60, 1],
        Some(Unit::Hour) => &[24, 1],
        _ => &[1000, 100, 10, 1],
    }
}

fn step_with_unit(meta: &ParamMeta, unit: Option<&DisplayUnit>) -> Option<u32> {
    let min = meta.min?.trunc() as i64;
    let max = meta.max?.trunc() as i64;
    step_candidates(unit)
        .iter()
        .copied()
        .find(|candidate| {
            min % candidate == 0 && max % candidate == 0 && (max - min) % candidate == 0
        })
        .and_then(|candidate| u32::try_from(candidate).ok())
}

/// 一次性求出参数的全部分类属性。
///
/// enum 参数没有显示单位；状态类只对 sensor/number 有意义，设备类同理。
pub fn classify(meta: &ParamMeta) -> ClassifiedParam<'_> {
    let platform = platform_for(meta);
    let unit = if meta.is_enum() {
        None
    } else {
        normalize(meta.unit.as_deref())
    };
    let (device_class, state_class) = match platform {
        Platform::Sensor => (
            sensor_device_class_for(unit.as_ref(), meta.is_enum()),
            state_class_for(meta),
        ),
        Platform::Number => (
            number_device_class_for(unit.as_ref(), meta.is_enum()),
            state_class_for(meta),
        ),
        Platform::BinarySensor | Platform::Select | Platform::Switch => (None, None),
    };
    let step = match platform {
        Platform::Number => step_with_unit(meta, unit.as_ref()),
        _ => None,
    };

    ClassifiedParam {
        meta,
        visible: is_visible(meta),
        platform,
        icon: icon_for(unit.as_ref()),
        unit,
        device_class,
        state_class,
        category: category_for(meta),
        step,
    }
}
