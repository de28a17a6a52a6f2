//! 配置校验模块
//!
//! 校验规则：
//! - link_reference / topic 非空
//! - update_rate > 0 且有限
//! - 0 < near < far
//! - 图像尺寸、bin/beam 数量 > 0
//! - 视场角在 (0, π] 内
//! - step_size > 0
//! - sink 名称非空且唯一

use std::collections::HashSet;
use std::f64::consts::PI;

use contracts::{ContractError, SonarBlueprint, SonarConfig};

/// 校验 SonarBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SonarBlueprint) -> Result<(), ContractError> {
    validate_references(&blueprint.sensor)?;
    validate_update_rate(&blueprint.sensor)?;
    validate_clip(&blueprint.sensor)?;
    validate_resolution(&blueprint.sensor)?;
    validate_fov(&blueprint.sensor)?;
    validate_world(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 link 与 topic
fn validate_references(sensor: &SonarConfig) -> Result<(), ContractError> {
    if sensor.link_reference.trim().is_empty() {
        return Err(ContractError::config_validation(
            "sensor.link_reference",
            "link reference cannot be empty",
        ));
    }
    if sensor.topic.trim().is_empty() {
        return Err(ContractError::config_validation(
            "sensor.topic",
            "topic name is not set",
        ));
    }
    Ok(())
}

/// 校验发布频率
fn validate_update_rate(sensor: &SonarConfig) -> Result<(), ContractError> {
    if !sensor.update_rate.is_finite() || sensor.update_rate <= 0.0 {
        return Err(ContractError::config_validation(
            "sensor.update_rate",
            format!("update_rate must be > 0, got {}", sensor.update_rate),
        ));
    }
    Ok(())
}

/// 校验裁剪距离
fn validate_clip(sensor: &SonarConfig) -> Result<(), ContractError> {
    let clip = &sensor.clip;
    if clip.near <= 0.0 || clip.far <= 0.0 {
        return Err(ContractError::config_validation(
            "sensor.clip",
            format!(
                "clip distances must be > 0, got near={} far={}",
                clip.near, clip.far
            ),
        ));
    }
    if clip.near >= clip.far {
        return Err(ContractError::config_validation(
            "sensor.clip.near / sensor.clip.far",
            format!("near ({}) must be < far ({})", clip.near, clip.far),
        ));
    }
    Ok(())
}

/// 校验分辨率
fn validate_resolution(sensor: &SonarConfig) -> Result<(), ContractError> {
    let checks = [
        ("sensor.image.width", sensor.image.width),
        ("sensor.image.height", sensor.image.height),
        ("sensor.bin_count", sensor.bin_count),
        ("sensor.beam_count", sensor.beam_count),
    ];
    for (field, value) in checks {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }
    Ok(())
}

/// 校验视场角
fn validate_fov(sensor: &SonarConfig) -> Result<(), ContractError> {
    for (field, value) in [("sensor.hfov", sensor.hfov), ("sensor.vfov", sensor.vfov)] {
        if !(value > 0.0 && value <= PI) {
            return Err(ContractError::config_validation(
                field,
                format!("field of view must be in (0, π], got {value}"),
            ));
        }
    }
    Ok(())
}

/// 校验仿真世界
fn validate_world(blueprint: &SonarBlueprint) -> Result<(), ContractError> {
    let world = &blueprint.world;
    if !world.step_size.is_finite() || world.step_size <= 0.0 {
        return Err(ContractError::config_validation(
            "world.step_size",
            format!("step_size must be > 0, got {}", world.step_size),
        ));
    }
    for (idx, target) in world.targets.iter().enumerate() {
        if target.radius <= 0.0 {
            return Err(ContractError::config_validation(
                format!("world.targets[{idx}].radius"),
                format!("radius must be > 0, got {}", target.radius),
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &SonarBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}
