//! [`AbiCodec`] over the JSON ABI of compiler artifacts.

use std::collections::BTreeMap;

use alloy_dyn_abi::{DynSolType, DynSolValue, EventExt, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Event, Function, JsonAbi, Param};
use alloy_primitives::{hex, B256, U256};
use ignis_core::{NameOrIndex, TransactionLog};
use ignis_engine::{AbiCodec, Artifact, CodecError};
use serde_json::Value;

const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyAbiCodec;

fn parse_abi(artifact: &Artifact) -> Result<JsonAbi, String> {
    serde_json::from_value::<JsonAbi>(artifact.abi.clone())
        .map_err(|error| format!("invalid abi of `{}`: {error}", artifact.contract_name))
}

fn decode_hex(field: &str, text: &str) -> Result<Vec<u8>, String> {
    hex::decode(text.trim_start_matches("0x")).map_err(|error| format!("invalid {field} hex: {error}"))
}

/// Writes library addresses over the placeholders of the bytecode. A
/// library may be named with or without its source file.
pub(crate) fn link_bytecode(artifact: &Artifact, libraries: &BTreeMap<String, String>) -> Result<String, CodecError> {
    let mut bytecode = artifact.bytecode.trim_start_matches("0x").to_string();
    if !bytecode.is_ascii() {
        return Err(CodecError::Encode(format!(
            "bytecode of `{}` is not hex text",
            artifact.contract_name
        )));
    }
    for (source, references) in &artifact.link_references {
        for (library_name, positions) in references {
            let qualified = format!("{source}:{library_name}");
            let address = libraries
                .get(&qualified)
                .or_else(|| libraries.get(library_name))
                .ok_or_else(|| CodecError::MissingLibrary(qualified.clone()))?;
            let address = address.trim_start_matches("0x").to_ascii_lowercase();
            if address.len() != 40 || !address.bytes().all(|byte| byte.is_ascii_hexdigit()) {
                return Err(CodecError::Encode(format!("invalid address for library `{qualified}`")));
            }
            for position in positions {
                let start = position.start * 2;
                let end = start + position.length * 2;
                if end > bytecode.len() || position.length != 20 {
                    return Err(CodecError::Encode(format!(
                        "link reference of `{qualified}` at {} is out of range",
                        position.start
                    )));
                }
                bytecode.replace_range(start..end, &address);
            }
        }
    }
    Ok(format!("0x{bytecode}"))
}

fn encode_args(params: &[Param], args: &[Value]) -> Result<Vec<DynSolValue>, String> {
    if params.len() != args.len() {
        return Err(format!("expected {} arguments, got {}", params.len(), args.len()));
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| param_json_to_dyn_value(param, arg))
        .collect()
}

fn select_function<'a>(abi: &'a JsonAbi, artifact: &Artifact, function_name: &str, arity: Option<usize>) -> Result<&'a Function, CodecError> {
    let unknown = || CodecError::UnknownFunction {
        contract_name: artifact.contract_name.clone(),
        function_name: function_name.to_string(),
    };
    // `name(types)` picks an overload by signature.
    if function_name.contains('(') {
        return abi
            .functions()
            .find(|function| function.signature() == function_name)
            .ok_or_else(unknown);
    }
    let overloads = abi.function(function_name).ok_or_else(unknown)?;
    match (overloads.as_slice(), arity) {
        ([function], _) => Ok(function),
        (_, Some(arity)) => overloads
            .iter()
            .find(|function| function.inputs.len() == arity)
            .ok_or_else(unknown),
        (_, None) => overloads.first().ok_or_else(unknown),
    }
}

fn output_position<'a>(mut names: impl ExactSizeIterator<Item = &'a str>, name_or_index: &NameOrIndex) -> Option<usize> {
    let len = names.len();
    match name_or_index {
        NameOrIndex::Index(index) => usize::try_from(*index).ok().filter(|index| *index < len),
        NameOrIndex::Name(name) => names.position(|param| param == name.as_str()),
    }
}

fn select_output(values: Vec<DynSolValue>, params: &[Param], name_or_index: &NameOrIndex) -> Result<Value, CodecError> {
    let index = output_position(params.iter().map(|param| param.name.as_str()), name_or_index)
        .filter(|index| *index < values.len())
        .ok_or_else(|| CodecError::Decode(format!("no output `{name_or_index}`")))?;
    Ok(dyn_value_to_json(&values[index]))
}

impl AbiCodec for AlloyAbiCodec {
    fn encode_deployment(
        &self,
        artifact: &Artifact,
        args: &[Value],
        libraries: &BTreeMap<String, String>,
    ) -> Result<String, CodecError> {
        let bytecode = link_bytecode(artifact, libraries)?;
        let abi = parse_abi(artifact).map_err(CodecError::Encode)?;
        let encoded_args = match &abi.constructor {
            Some(constructor) => {
                let values = encode_args(&constructor.inputs, args).map_err(CodecError::Encode)?;
                constructor
                    .abi_encode_input(&values)
                    .map_err(|error| CodecError::Encode(format!("abi encode constructor failed: {error}")))?
            }
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(CodecError::Encode(format!(
                    "`{}` has no constructor but {} arguments were given",
                    artifact.contract_name,
                    args.len()
                )))
            }
        };
        Ok(format!("{bytecode}{}", hex::encode(encoded_args)))
    }

    fn encode_function_call(&self, artifact: &Artifact, function_name: &str, args: &[Value]) -> Result<String, CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Encode)?;
        let function = select_function(&abi, artifact, function_name, Some(args.len()))?;
        let values = encode_args(&function.inputs, args).map_err(CodecError::Encode)?;
        let calldata = function
            .abi_encode_input(&values)
            .map_err(|error| CodecError::Encode(format!("abi encode input failed: {error}")))?;
        Ok(format!("0x{}", hex::encode(calldata)))
    }

    fn check_constructor(&self, artifact: &Artifact, arg_count: usize) -> Result<(), CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Encode)?;
        let expected = abi.constructor.as_ref().map_or(0, |constructor| constructor.inputs.len());
        if expected != arg_count {
            return Err(CodecError::ArgumentCount {
                contract_name: artifact.contract_name.clone(),
                function_name: "constructor".to_string(),
                expected,
                actual: arg_count,
            });
        }
        Ok(())
    }

    fn check_function(
        &self,
        artifact: &Artifact,
        function_name: &str,
        arg_count: usize,
        output: Option<&NameOrIndex>,
    ) -> Result<(), CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Encode)?;
        let function = select_function(&abi, artifact, function_name, Some(arg_count))?;
        if function.inputs.len() != arg_count {
            return Err(CodecError::ArgumentCount {
                contract_name: artifact.contract_name.clone(),
                function_name: function_name.to_string(),
                expected: function.inputs.len(),
                actual: arg_count,
            });
        }
        if let Some(output) = output {
            output_position(function.outputs.iter().map(|param| param.name.as_str()), output).ok_or_else(|| {
                CodecError::UnknownOutput {
                    name: function_name.to_string(),
                    selector: output.to_string(),
                }
            })?;
        }
        Ok(())
    }

    fn check_event_argument(
        &self,
        artifact: &Artifact,
        event_name: &str,
        argument: &NameOrIndex,
    ) -> Result<(), CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Decode)?;
        let event = select_event(&abi, event_name).ok_or_else(|| CodecError::UnknownEvent {
            contract_name: artifact.contract_name.clone(),
            event_name: event_name.to_string(),
        })?;
        output_position(event.inputs.iter().map(|input| input.name.as_str()), argument).ok_or_else(|| {
            CodecError::UnknownOutput {
                name: event_name.to_string(),
                selector: argument.to_string(),
            }
        })?;
        Ok(())
    }

    fn decode_function_result(
        &self,
        artifact: &Artifact,
        function_name: &str,
        return_data: &str,
        name_or_index: &NameOrIndex,
    ) -> Result<Value, CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Decode)?;
        let function = select_function(&abi, artifact, function_name, None)?;
        let raw = decode_hex("return data", return_data).map_err(CodecError::Decode)?;
        let values = function
            .abi_decode_output(&raw, true)
            .map_err(|error| CodecError::Decode(format!("abi decode output failed: {error}")))?;
        select_output(values, &function.outputs, name_or_index)
    }

    fn decode_error(&self, artifact: Option<&Artifact>, return_data: &str) -> String {
        let Ok(raw) = decode_hex("revert data", return_data) else {
            return format!("reverted with invalid data {return_data}");
        };
        if raw.is_empty() {
            return "reverted without a reason".to_string();
        }
        if raw.len() < 4 {
            return format!("reverted with unrecognized data {return_data}");
        }
        let (selector, body) = raw.split_at(4);
        if selector == ERROR_STRING_SELECTOR {
            if let Some(DynSolValue::String(reason)) = decode_single(DynSolType::String, body) {
                return format!("reverted with reason `{reason}`");
            }
        }
        if selector == PANIC_SELECTOR {
            if let Some(DynSolValue::Uint(code, _)) = decode_single(DynSolType::Uint(256), body) {
                return format!("reverted with panic code {code:#x}");
            }
        }
        let custom = artifact
            .and_then(|artifact| parse_abi(artifact).ok())
            .and_then(|abi| {
                abi.errors().find_map(|error| {
                    if error.selector().as_slice() != selector {
                        return None;
                    }
                    let values = error.abi_decode_input(body, true).ok()?;
                    let args: Vec<String> = values.iter().map(|value| dyn_value_to_json(value).to_string()).collect();
                    Some(format!("reverted with custom error {}({})", error.name, args.join(", ")))
                })
            });
        custom.unwrap_or_else(|| format!("reverted with unrecognized data {return_data}"))
    }

    fn decode_event_argument(
        &self,
        artifact: &Artifact,
        event_name: &str,
        event_index: u64,
        name_or_index: &NameOrIndex,
        emitter_address: &str,
        logs: &[TransactionLog],
    ) -> Result<Value, CodecError> {
        let abi = parse_abi(artifact).map_err(CodecError::Decode)?;
        let not_found = || CodecError::EventNotFound {
            event_name: event_name.to_string(),
            event_index,
        };
        let event = select_event(&abi, event_name).ok_or_else(not_found)?;
        let topic = format!("{:#x}", event.selector());
        let log = logs
            .iter()
            .filter(|log| log.address.eq_ignore_ascii_case(emitter_address))
            .filter(|log| {
                log.topics
                    .first()
                    .is_some_and(|first| first.eq_ignore_ascii_case(&topic))
            })
            .nth(usize::try_from(event_index).map_err(|_| not_found())?)
            .ok_or_else(not_found)?;

        let topics = log
            .topics
            .iter()
            .map(|topic| topic.parse::<B256>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| CodecError::Decode(format!("invalid log topic: {error}")))?;
        let data = decode_hex("log data", &log.data).map_err(CodecError::Decode)?;
        let decoded = event
            .decode_log_parts(topics, &data, true)
            .map_err(|error| CodecError::Decode(format!("abi decode event failed: {error}")))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let values = event
            .inputs
            .iter()
            .map(|input| if input.indexed { indexed.next() } else { body.next() })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CodecError::Decode(format!("event `{event_name}` does not match its abi")))?;
        let params: Vec<Param> = event
            .inputs
            .iter()
            .map(|input| Param {
                ty: input.ty.clone(),
                name: input.name.clone(),
                components: input.components.clone(),
                internal_type: input.internal_type.clone(),
            })
            .collect();
        select_output(values, &params, name_or_index)
    }
}

fn decode_single(ty: DynSolType, body: &[u8]) -> Option<DynSolValue> {
    match DynSolType::Tuple(vec![ty]).abi_decode_params(body).ok()? {
        DynSolValue::Tuple(mut values) if values.len() == 1 => values.pop(),
        _ => None,
    }
}

fn select_event<'a>(abi: &'a JsonAbi, event_name: &str) -> Option<&'a Event> {
    if event_name.contains('(') {
        return abi.events().find(|event| event.signature() == event_name);
    }
    abi.event(event_name)?.first()
}

fn param_json_to_dyn_value(param: &Param, value: &Value) -> Result<DynSolValue, String> {
    if let Some(suffix) = param.ty.strip_prefix("tuple") {
        return tuple_json_to_dyn_value(&param.components, suffix, value);
    }
    let ty = param
        .resolve()
        .map_err(|error| format!("resolve abi param type `{}` failed: {error}", param.ty))?;
    dyn_value_from_type(&ty, value)
}

fn tuple_json_to_dyn_value(components: &[Param], suffix: &str, value: &Value) -> Result<DynSolValue, String> {
    if suffix.is_empty() {
        return tuple_json_base_to_dyn_value(components, value);
    }
    let dims = parse_array_dims(suffix)?;
    tuple_json_array_to_dyn_value(components, &dims, value)
}

fn tuple_json_array_to_dyn_value(
    components: &[Param],
    dims: &[Option<usize>],
    value: &Value,
) -> Result<DynSolValue, String> {
    let Some((first, rest)) = dims.split_first() else {
        return tuple_json_base_to_dyn_value(components, value);
    };
    let items = value
        .as_array()
        .ok_or_else(|| "tuple array arg must be array".to_string())?;
    if let Some(expected) = first {
        if items.len() != *expected {
            return Err(format!(
                "tuple fixed array length mismatch, expected {expected}, got {}",
                items.len()
            ));
        }
    }
    let values = items
        .iter()
        .map(|item| tuple_json_array_to_dyn_value(components, rest, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match first {
        Some(_) => DynSolValue::FixedArray(values),
        None => DynSolValue::Array(values),
    })
}

fn tuple_json_base_to_dyn_value(components: &[Param], value: &Value) -> Result<DynSolValue, String> {
    if let Some(items) = value.as_array() {
        if items.len() != components.len() {
            return Err(format!(
                "tuple arg length mismatch, expected {}, got {}",
                components.len(),
                items.len()
            ));
        }
        let values = components
            .iter()
            .zip(items)
            .map(|(component, item)| param_json_to_dyn_value(component, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(DynSolValue::Tuple(values));
    }
    let object = value
        .as_object()
        .ok_or_else(|| "tuple arg must be object or array".to_string())?;
    let mut values = Vec::<DynSolValue>::with_capacity(components.len());
    for component in components {
        if component.name.is_empty() {
            return Err("tuple component name must be non-empty when using object args".to_string());
        }
        let item = object
            .get(component.name.as_str())
            .ok_or_else(|| format!("missing tuple field `{}`", component.name))?;
        values.push(param_json_to_dyn_value(component, item)?);
    }
    Ok(DynSolValue::Tuple(values))
}

fn parse_array_dims(mut suffix: &str) -> Result<Vec<Option<usize>>, String> {
    let mut dims = Vec::<Option<usize>>::new();
    while !suffix.is_empty() {
        if !suffix.starts_with('[') {
            return Err(format!("invalid tuple array suffix `{suffix}`"));
        }
        let close = suffix
            .find(']')
            .ok_or_else(|| format!("invalid tuple array suffix `{suffix}`"))?;
        let size_raw = &suffix[1..close];
        if size_raw.is_empty() {
            dims.push(None);
        } else {
            let size = size_raw
                .parse::<usize>()
                .map_err(|error| format!("invalid tuple array size `{size_raw}`: {error}"))?;
            dims.push(Some(size));
        }
        suffix = &suffix[close + 1..];
    }
    Ok(dims)
}

fn dyn_value_from_type(ty: &DynSolType, value: &Value) -> Result<DynSolValue, String> {
    // Scalars given as strings are coerced by alloy, which accepts decimal
    // and hex numbers as well as checksummed or lowercase addresses.
    let text_or = |expected: &str| {
        value
            .as_str()
            .ok_or_else(|| format!("{expected} arg must be string, got {value}"))
    };
    #[allow(unreachable_patterns)]
    match ty {
        DynSolType::Bool => value
            .as_bool()
            .map(DynSolValue::Bool)
            .ok_or_else(|| "bool arg must be boolean".to_string()),
        DynSolType::Int(bits) => {
            let text = match value.as_i64() {
                Some(number) => number.to_string(),
                None => text_or("int")?.to_string(),
            };
            ty.coerce_str(&text)
                .map_err(|error| format!("invalid int{bits} arg: {error}"))
        }
        DynSolType::Uint(bits) => {
            if let Some(number) = value.as_u64() {
                return Ok(DynSolValue::Uint(U256::from(number), *bits));
            }
            ty.coerce_str(text_or("uint")?)
                .map_err(|error| format!("invalid uint{bits} arg: {error}"))
        }
        DynSolType::FixedBytes(_) | DynSolType::Address | DynSolType::Function => ty
            .coerce_str(text_or(&ty.sol_type_name())?)
            .map_err(|error| format!("invalid {} arg: {error}", ty.sol_type_name())),
        DynSolType::Bytes => {
            if let Some(text) = value.as_str() {
                return ty
                    .coerce_str(text)
                    .map_err(|error| format!("invalid bytes arg: {error}"));
            }
            let items = value
                .as_array()
                .ok_or_else(|| "bytes arg must be hex string or byte array".to_string())?;
            let bytes = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|number| u8::try_from(number).ok())
                        .ok_or_else(|| format!("bytes array item out of range: {item}"))
                })
                .collect::<Result<Vec<u8>, _>>()?;
            Ok(DynSolValue::Bytes(bytes))
        }
        DynSolType::String => value
            .as_str()
            .map(|text| DynSolValue::String(text.to_string()))
            .ok_or_else(|| "string arg must be string".to_string()),
        DynSolType::Array(inner) => {
            let items = value
                .as_array()
                .ok_or_else(|| "array arg must be array".to_string())?;
            let values = items
                .iter()
                .map(|item| dyn_value_from_type(inner, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Array(values))
        }
        DynSolType::FixedArray(inner, size) => {
            let items = value
                .as_array()
                .ok_or_else(|| "fixed array arg must be array".to_string())?;
            if items.len() != *size {
                return Err(format!(
                    "fixed array arg length mismatch, expected {size}, got {}",
                    items.len()
                ));
            }
            let values = items
                .iter()
                .map(|item| dyn_value_from_type(inner, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::FixedArray(values))
        }
        DynSolType::Tuple(types) => {
            let items = value
                .as_array()
                .ok_or_else(|| "tuple arg must be array".to_string())?;
            if items.len() != types.len() {
                return Err(format!(
                    "tuple arg length mismatch, expected {}, got {}",
                    types.len(),
                    items.len()
                ));
            }
            let values = items
                .iter()
                .zip(types)
                .map(|(item, ty)| dyn_value_from_type(ty, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Tuple(values))
        }
        _ => Err("unsupported dynamic abi type".to_string()),
    }
}

/// Integers become decimal strings so that no precision is lost.
fn dyn_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(boolean) => Value::Bool(*boolean),
        DynSolValue::Int(number, _) => Value::String(number.to_string()),
        DynSolValue::Uint(number, _) => Value::String(number.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(format!("0x{}", hex::encode(&word[..*size]))),
        DynSolValue::Address(address) => Value::String(format!("{address:#x}")),
        DynSolValue::Function(function) => Value::String(format!("0x{}", hex::encode(function.as_slice()))),
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        DynSolValue::String(text) => Value::String(text.clone()),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            Value::Array(values.iter().map(dyn_value_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

#[cfg(test)]
#[path = "abi_test.rs"]
mod tests;
