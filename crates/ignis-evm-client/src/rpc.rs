//! JSON-RPC payloads to and from engine types.

use ignis_core::{NetworkFees, TransactionLog, TransactionReceipt, TransactionReceiptStatus};
use ignis_engine::{BlockInfo, BlockTag, CallParams, ChainError};
use serde_json::{json, Map, Value};

pub(crate) fn block_tag(tag: BlockTag) -> &'static str {
    match tag {
        BlockTag::Latest => "latest",
        BlockTag::Pending => "pending",
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ChainError {
    ChainError::InvalidInput {
        field: field.to_string(),
        message: message.into(),
    }
}

pub(crate) fn quantity_u128(value: &Value, field: &str) -> Result<u128, ChainError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid(field, format!("expected hex quantity, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| invalid(field, format!("expected 0x prefix: {text}")))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|error| invalid(field, format!("{text}: {error}")))
}

pub(crate) fn quantity_u64(value: &Value, field: &str) -> Result<u64, ChainError> {
    let quantity = quantity_u128(value, field)?;
    u64::try_from(quantity).map_err(|_| invalid(field, format!("{quantity} does not fit in 64 bits")))
}

fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ChainError> {
    object
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| invalid(key, "missing"))
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String, ChainError> {
    field(object, key)?
        .as_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| invalid(key, "expected string"))
}

fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ChainError> {
    value.as_object().ok_or_else(|| invalid(what, format!("expected object, got {value}")))
}

pub(crate) fn parse_block(value: &Value) -> Result<BlockInfo, ChainError> {
    let block = object(value, "block")?;
    Ok(BlockInfo {
        number: quantity_u64(field(block, "number")?, "number")?,
        hash: string_field(block, "hash")?,
    })
}

/// `None` for unknown or not yet mined transactions.
pub(crate) fn parse_receipt(value: &Value) -> Result<Option<TransactionReceipt>, ChainError> {
    if value.is_null() {
        return Ok(None);
    }
    let receipt = object(value, "receipt")?;
    if receipt.get("blockNumber").map_or(true, Value::is_null) {
        return Ok(None);
    }
    let status = match quantity_u64(field(receipt, "status")?, "status")? {
        1 => TransactionReceiptStatus::Success,
        _ => TransactionReceiptStatus::Failure,
    };
    let contract_address = match receipt.get("contractAddress") {
        Some(Value::String(address)) => Some(address.to_ascii_lowercase()),
        _ => None,
    };
    let logs = match receipt.get("logs") {
        Some(Value::Array(logs)) => logs.iter().map(parse_log).collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    Ok(Some(TransactionReceipt {
        block_hash: string_field(receipt, "blockHash")?,
        block_number: quantity_u64(field(receipt, "blockNumber")?, "blockNumber")?,
        status,
        contract_address,
        logs,
    }))
}

fn parse_log(value: &Value) -> Result<TransactionLog, ChainError> {
    let log = object(value, "log")?;
    let topics = match log.get("topics") {
        Some(Value::Array(topics)) => topics
            .iter()
            .map(|topic| {
                topic
                    .as_str()
                    .map(str::to_ascii_lowercase)
                    .ok_or_else(|| invalid("topics", "expected string"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    Ok(TransactionLog {
        address: string_field(log, "address")?,
        log_index: quantity_u64(field(log, "logIndex")?, "logIndex")?,
        data: string_field(log, "data")?,
        topics,
    })
}

/// Base fee of a block, `None` before London.
pub(crate) fn base_fee_per_gas(block: &Value) -> Result<Option<u128>, ChainError> {
    object(block, "block")?
        .get("baseFeePerGas")
        .filter(|value| !value.is_null())
        .map(|value| quantity_u128(value, "baseFeePerGas"))
        .transpose()
}

/// The max fee leaves room for the base fee to double.
pub(crate) fn eip1559_fees(base_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> NetworkFees {
    NetworkFees::Eip1559 {
        max_fee_per_gas: base_fee_per_gas
            .saturating_mul(2)
            .saturating_add(max_priority_fee_per_gas),
        max_priority_fee_per_gas,
    }
}

pub(crate) fn call_object(params: &CallParams) -> Value {
    let mut call = json!({
        "from": params.from,
        "data": params.data,
        "value": format!("{:#x}", params.value),
    });
    if let (Some(to), Some(object)) = (&params.to, call.as_object_mut()) {
        object.insert("to".to_string(), Value::String(to.clone()));
    }
    call
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
