//! 配置校验模块
//!
//! 校验规则：
//! - dispatcher name 唯一
//! - 每个 channel 至多一个 dispatcher
//! - channel 非空
//! - max_batch_size >= 1
//! - dispatcher.sink 必须引用已声明的 sink
//! - sink name 唯一
//! - file sink 必须携带 path 参数

use std::collections::HashSet;

use contracts::{ContractError, DispatchPlan, SinkType};

/// 校验 DispatchPlan 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(plan: &DispatchPlan) -> Result<(), ContractError> {
    validate_sink_names(plan)?;
    validate_sink_params(plan)?;
    validate_dispatchers(plan)?;
    Ok(())
}

/// 校验 sink name 唯一性
fn validate_sink_names(plan: &DispatchPlan) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sink in &plan.sinks {
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 类型特定参数
fn validate_sink_params(plan: &DispatchPlan) -> Result<(), ContractError> {
    for sink in &plan.sinks {
        if sink.sink_type == SinkType::File && !sink.params.contains_key("path") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.path", sink.name),
                "file sink requires a 'path' parameter",
            ));
        }
    }
    Ok(())
}

/// 校验 dispatcher 声明
fn validate_dispatchers(plan: &DispatchPlan) -> Result<(), ContractError> {
    let sink_names: HashSet<&str> = plan.sinks.iter().map(|s| s.name.as_str()).collect();

    let mut seen = HashSet::new();
    let mut seen_channels = HashSet::new();
    for spec in &plan.dispatchers {
        if !seen.insert(&spec.name) {
            return Err(ContractError::config_validation(
                format!("dispatchers[name={}]", spec.name),
                "duplicate dispatcher name",
            ));
        }
        if !seen_channels.insert(&spec.channel) {
            return Err(ContractError::config_validation(
                format!("dispatchers[{}].channel", spec.name),
                format!("channel '{}' already has a dispatcher", spec.channel),
            ));
        }
        if spec.channel.is_empty() {
            return Err(ContractError::config_validation(
                format!("dispatchers[{}].channel", spec.name),
                "channel must not be empty",
            ));
        }
        if spec.max_batch_size == 0 {
            return Err(ContractError::config_validation(
                format!("dispatchers[{}].max_batch_size", spec.name),
                "max_batch_size must be >= 1",
            ));
        }
        if !sink_names.contains(spec.sink.as_str()) {
            return Err(ContractError::config_validation(
                format!("dispatchers[{}].sink", spec.name),
                format!("unknown sink '{}'", spec.sink),
            ));
        }
    }
    Ok(())
}
