//! 实体构建：分类结果 + 实时状态值 → 平台实体记录。

use dab_classify::{ClassifiedParam, Vocabulary, classify};
use dab_telemetry::{
    record_build_failure, record_entity_built, record_skipped_hidden, record_skipped_unmapped,
    record_status_seen,
};
use domain::{Device, ParamMeta, ParamType, Snapshot, StatusValue, StringTable};
use entity_contract::{DeviceInfo, EntityRecord, EntityValue, Platform};
use tracing::{debug, info, warn};

/// 单个参数的构建错误；只影响该参数，不中断批次。
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("missing metadata: {0}")]
    MissingMetadata(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// 构建实体时共享的上下文。
#[derive(Debug, Clone, Copy)]
pub struct EntityContext<'a> {
    pub install_id: &'a str,
    pub strings: &'a StringTable,
}

/// 构建单个实体。
pub fn build_entity(
    ctx: EntityContext<'_>,
    classified: &ClassifiedParam<'_>,
    device: &Device,
    object_id: &str,
    status: &StatusValue,
) -> Result<EntityRecord, EntityError> {
    let meta = classified.meta;
    let mut record = EntityRecord {
        platform: classified.platform,
        install_id: ctx.install_id.to_string(),
        object_id: object_id.to_string(),
        unique_id: status.unique_id.clone(),
        key: status.key.clone(),
        name: ctx.strings.get(&status.key).to_string(),
        device: device_info(device),
        unit: None,
        icon: classified.icon.map(str::to_string),
        device_class: classified.device_class,
        state_class: classified.state_class,
        entity_category: classified.category,
        precision: None,
        min: None,
        max: None,
        step: None,
        options: Vec::new(),
        value: EntityValue::State(None),
    };

    match classified.platform {
        Platform::Sensor => {
            record.unit = classified.unit.as_ref().map(|unit| unit.symbol().to_string());
            match &meta.param_type {
                ParamType::Measure => {
                    let (value, precision) = scaled_value(meta, &status.value)?;
                    record.value = value;
                    record.precision = Some(precision);
                }
                ParamType::Enum => {
                    let label = meta.label_for(&status.value);
                    record.value = EntityValue::Text(ctx.strings.get(label).to_string());
                }
                ParamType::Label => {
                    record.value = EntityValue::Text(ctx.strings.get(&status.value).to_string());
                }
                ParamType::Other(kind) => {
                    warn!(
                        "unknown parameter type '{}' for '{}'; treating it as a label",
                        kind, meta.key
                    );
                    record.value = EntityValue::Text(ctx.strings.get(&status.value).to_string());
                }
            }
        }
        Platform::BinarySensor => {
            record.value = two_state_value(meta, &status.value, Vocabulary::BinarySensor)?;
        }
        Platform::Switch => {
            record.value = two_state_value(meta, &status.value, Vocabulary::Switch)?;
        }
        Platform::Select => {
            if meta.values.is_empty() {
                return Err(EntityError::MissingMetadata(format!(
                    "select '{}' has no options",
                    meta.key
                )));
            }
            record.options = meta
                .values
                .values()
                .map(|label| ctx.strings.get(label).to_string())
                .collect();
            let label = meta.label_for(&status.value);
            record.value = EntityValue::Text(ctx.strings.get(label).to_string());
        }
        Platform::Number => {
            let (min, max) = match (meta.min, meta.max) {
                (Some(min), Some(max)) => (min, max),
                _ => {
                    return Err(EntityError::MissingMetadata(format!(
                        "number '{}' requires both min and max",
                        meta.key
                    )));
                }
            };
            let (value, precision) = scaled_value(meta, &status.value)?;
            record.unit = classified.unit.as_ref().map(|unit| unit.symbol().to_string());
            record.min = Some(min);
            record.max = Some(max);
            record.step = classified.step;
            record.precision = Some(precision);
            record.value = value;
        }
    }

    Ok(record)
}

/// 为指定平台构建安装内的全部实体。
///
/// 单个参数的失败只记录告警；相同输入多次调用结果相同。
pub fn build_entities(
    platform: Platform,
    install_id: &str,
    snapshot: &Snapshot,
    strings: &StringTable,
) -> Vec<EntityRecord> {
    if snapshot.is_empty() {
        warn!(
            "no device data for installation '{}'; skipping {} entities",
            install_id, platform
        );
        return Vec::new();
    }

    let ctx = EntityContext {
        install_id,
        strings,
    };
    let mut entities = Vec::new();
    for (object_id, status) in &snapshot.statuses {
        record_status_seen();

        let device = match snapshot.devices.get(&status.serial) {
            Some(device) if device.install_id == install_id => device,
            _ => continue,
        };
        let meta = match snapshot
            .configs
            .get(&device.config_id)
            .and_then(|config| config.param(&status.key))
        {
            Some(meta) => meta,
            None => {
                warn!(
                    "device metadata holds no info to create an entity for '{}' with value '{}'",
                    status.key, status.value
                );
                record_skipped_unmapped();
                continue;
            }
        };

        let classified = classify(meta);
        if !classified.visible {
            debug!("skip '{}'; it is hidden by the visibility rules", meta.key);
            record_skipped_hidden();
            continue;
        }
        if classified.platform != platform {
            continue;
        }

        match build_entity(ctx, &classified, device, object_id, status) {
            Ok(record) => {
                record_entity_built();
                entities.push(record);
            }
            Err(err) => {
                warn!(
                    "could not build {} entity for '{}': {}",
                    platform, object_id, err
                );
                record_build_failure();
            }
        }
    }

    info!(
        "built {} {} entities for installation '{}' with {} devices",
        entities.len(),
        platform,
        install_id,
        snapshot.devices.len()
    );
    entities
}

fn device_info(device: &Device) -> DeviceInfo {
    DeviceInfo {
        serial: device.serial.clone(),
        name: device.name.clone(),
        manufacturer: device.vendor.clone(),
        model: device.product.clone(),
        sw_version: device.version.clone(),
    }
}

/// 按权重缩放测量值，返回值与显示精度。
///
/// 权重缺失、为 0 或 1 时按整数处理。
fn scaled_value(meta: &ParamMeta, raw: &str) -> Result<(EntityValue, u32), EntityError> {
    let invalid = || EntityError::InvalidValue(format!("'{}' for '{}'", raw, meta.key));
    match meta.weight {
        Some(weight) if weight != 0.0 && weight != 1.0 => {
            let digits = (1.0 / weight).log10().floor() as i32;
            let value = raw.trim().parse::<f64>().map_err(|_| invalid())? * weight;
            Ok((
                EntityValue::Float(round_to(value, digits)),
                digits.max(0) as u32,
            ))
        }
        _ => {
            let value = raw.trim().parse::<i64>().map_err(|_| invalid())?;
            Ok((EntityValue::Integer(value), 0))
        }
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        // 负精度：取整到十位、百位……
        let factor = 10f64.powi(-digits);
        (value / factor).round() * factor
    }
}

fn two_state_value(
    meta: &ParamMeta,
    raw: &str,
    vocabulary: Vocabulary,
) -> Result<EntityValue, EntityError> {
    if !meta.is_enum() || meta.values.len() != 2 {
        return Err(EntityError::MissingMetadata(format!(
            "'{}' is not a two-state enum",
            meta.key
        )));
    }
    Ok(EntityValue::State(vocabulary.state_of(meta.label_for(raw))))
}
