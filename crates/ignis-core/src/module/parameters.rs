//! Module parameters: `{"parameter": "<name>"}` placeholders, optionally
//! with a `"default"`, filled in from values supplied at deploy time.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{Future, FutureKind};
use crate::amount::parse_amount;

/// Values of one module's parameters.
pub type ModuleParameters = BTreeMap<String, Value>;

/// Parameter values keyed by module id. Values under [`GLOBAL_PARAMETERS`]
/// apply to every module unless the module sets its own.
pub type DeploymentParameters = BTreeMap<String, ModuleParameters>;

pub const GLOBAL_PARAMETERS: &str = "$global";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterReference<'a> {
    pub name: &'a str,
    pub default: Option<&'a Value>,
}

/// What a parameter may hold, given where it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Any,
    /// A wei amount: a non-negative integer or its decimal string.
    Amount,
    Address,
}

impl ParameterType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Amount => match value {
                Value::Number(number) => number.as_u64().is_some(),
                Value::String(raw) => parse_amount(raw).is_ok(),
                _ => false,
            },
            Self::Address => value.as_str().is_some_and(is_address),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Any => "any value",
            Self::Amount => "an amount",
            Self::Address => "an address",
        })
    }
}

/// One placeholder inside a future.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterUse<'a> {
    pub future_id: &'a str,
    pub name: &'a str,
    pub default: Option<&'a Value>,
    pub expected: ParameterType,
}

pub fn parameter_reference(value: &Value) -> Option<ParameterReference<'_>> {
    let object = value.as_object()?;
    let name = object.get("parameter")?.as_str()?;
    if object.keys().any(|key| key != "parameter" && key != "default") {
        return None;
    }
    Some(ParameterReference {
        name,
        default: object.get("default"),
    })
}

/// Global values overlaid with the module's own.
pub fn module_parameters(parameters: &DeploymentParameters, module_id: &str) -> ModuleParameters {
    let mut merged = parameters.get(GLOBAL_PARAMETERS).cloned().unwrap_or_default();
    if let Some(own) = parameters.get(module_id) {
        merged.extend(own.iter().map(|(name, value)| (name.clone(), value.clone())));
    }
    merged
}

impl Future {
    pub fn parameter_uses(&self) -> Vec<ParameterUse<'_>> {
        let id = self.id.as_str();
        let mut uses = Vec::new();
        match &self.kind {
            FutureKind::ContractDeployment { args, value, .. } | FutureKind::ContractCall { args, value, .. } => {
                for arg in args {
                    collect_parameter_uses(id, arg, ParameterType::Any, &mut uses);
                }
                if let Some(value) = value {
                    collect_parameter_uses(id, value, ParameterType::Amount, &mut uses);
                }
            }
            FutureKind::StaticCall { args, .. } | FutureKind::EncodeFunctionCall { args, .. } => {
                for arg in args {
                    collect_parameter_uses(id, arg, ParameterType::Any, &mut uses);
                }
            }
            FutureKind::ContractAt { address, .. } => {
                collect_parameter_uses(id, address, ParameterType::Address, &mut uses);
            }
            FutureKind::SendData { to, value, .. } => {
                collect_parameter_uses(id, to, ParameterType::Address, &mut uses);
                if let Some(value) = value {
                    collect_parameter_uses(id, value, ParameterType::Amount, &mut uses);
                }
            }
            FutureKind::LibraryDeployment { .. } | FutureKind::ReadEventArgument { .. } => {}
        }
        uses
    }
}

fn collect_parameter_uses<'a>(
    future_id: &'a str,
    value: &'a Value,
    expected: ParameterType,
    out: &mut Vec<ParameterUse<'a>>,
) {
    if let Some(reference) = parameter_reference(value) {
        out.push(ParameterUse {
            future_id,
            name: reference.name,
            default: reference.default,
            expected,
        });
        return;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_parameter_uses(future_id, item, ParameterType::Any, out)),
        Value::Object(map) => map
            .values()
            .for_each(|item| collect_parameter_uses(future_id, item, ParameterType::Any, out)),
        _ => {}
    }
}

fn is_address(text: &str) -> bool {
    text.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|byte| byte.is_ascii_hexdigit()))
}

#[cfg(test)]
#[path = "parameters_test.rs"]
mod tests;
