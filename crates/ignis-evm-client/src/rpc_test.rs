use ignis_core::{NetworkFees, TransactionReceiptStatus};
use ignis_engine::{BlockTag, CallParams};
use serde_json::{json, Value};

use super::*;

#[test]
fn quantities_are_hex() {
    assert_eq!(quantity_u64(&json!("0x10"), "n").expect("quantity"), 16);
    assert_eq!(quantity_u128(&json!("0x"), "n").expect("quantity"), 0);
    assert!(quantity_u64(&json!(16), "n").is_err());
    assert!(quantity_u64(&json!("0x10000000000000000"), "n").is_err());
}

#[test]
fn pending_receipts_are_not_receipts() {
    assert_eq!(parse_receipt(&Value::Null).expect("receipt"), None);
    assert_eq!(
        parse_receipt(&json!({"blockNumber": null, "status": "0x1"})).expect("receipt"),
        None
    );
}

#[test]
fn receipt_with_logs_is_parsed() {
    let receipt = parse_receipt(&json!({
        "blockHash": "0xABC",
        "blockNumber": "0x2",
        "status": "0x1",
        "contractAddress": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        "logs": [{
            "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "logIndex": "0x0",
            "data": "0x",
            "topics": ["0xDDF2"]
        }]
    }))
    .expect("receipt")
    .expect("mined");

    assert_eq!(receipt.block_number, 2);
    assert_eq!(receipt.block_hash, "0xabc");
    assert_eq!(receipt.status, TransactionReceiptStatus::Success);
    assert_eq!(
        receipt.contract_address.as_deref(),
        Some("0x5fbdb2315678afecb367f032d93f642f64180aa3")
    );
    assert_eq!(receipt.logs[0].topics, vec!["0xddf2".to_string()]);
}

#[test]
fn failed_status_is_a_failure() {
    let receipt = parse_receipt(&json!({
        "blockHash": "0x1",
        "blockNumber": "0x1",
        "status": "0x0",
        "contractAddress": null,
        "logs": []
    }))
    .expect("receipt")
    .expect("mined");

    assert_eq!(receipt.status, TransactionReceiptStatus::Failure);
    assert_eq!(receipt.contract_address, None);
}

#[test]
fn base_fee_is_optional() {
    assert_eq!(base_fee_per_gas(&json!({"baseFeePerGas": "0x64"})).expect("fee"), Some(100));
    assert_eq!(base_fee_per_gas(&json!({"baseFeePerGas": null})).expect("fee"), None);
    assert_eq!(
        eip1559_fees(100, 2),
        NetworkFees::Eip1559 {
            max_fee_per_gas: 202,
            max_priority_fee_per_gas: 2,
        }
    );
}

#[test]
fn call_object_omits_missing_target() {
    let call = call_object(&CallParams {
        from: "0x01".to_string(),
        to: None,
        data: "0x6080".to_string(),
        value: 255,
    });
    assert_eq!(call, json!({"from": "0x01", "data": "0x6080", "value": "0xff"}));
    assert_eq!(block_tag(BlockTag::Pending), "pending");
}
