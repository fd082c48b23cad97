use serde_json::json;

use super::{decode_journal_message_line, encode_journal_message_line, JournalMessage};
use crate::execution_result::{DeploymentSuccess, ExecutionResult};
use crate::execution_state::StrategyConfigValue;
use crate::network_interaction::{NetworkFees, TransactionReceiptStatus};

#[test]
fn messages_carry_screaming_snake_case_type_tags() {
    let message = JournalMessage::DeploymentInitialize(super::DeploymentInitializeMessage { chain_id: 31337 });
    let line = encode_journal_message_line(&message).expect("encode");
    assert_eq!(line, "{\"type\":\"DEPLOYMENT_INITIALIZE\",\"chain_id\":31337}\n");
    assert_eq!(message.message_type(), "DEPLOYMENT_INITIALIZE");
    assert_eq!(message.future_id(), None);
}

#[test]
fn decodes_transaction_send_with_decimal_fees() {
    let line = json!({
        "type": "TRANSACTION_SEND",
        "future_id": "M#Foo",
        "network_interaction_id": 1,
        "transaction": {
            "hash": "0xaa",
            "nonce": 0,
            "fees": {"kind": "eip1559", "max_fee_per_gas": "1000000000", "max_priority_fee_per_gas": "1"}
        }
    })
    .to_string();

    let JournalMessage::TransactionSend(message) = decode_journal_message_line(&line).expect("decode") else {
        panic!("expected TRANSACTION_SEND");
    };
    assert_eq!(message.transaction.nonce, 0);
    assert_eq!(message.transaction.receipt, None);
    assert_eq!(
        message.transaction.fees,
        NetworkFees::Eip1559 {
            max_fee_per_gas: 1_000_000_000,
            max_priority_fee_per_gas: 1,
        }
    );
}

#[test]
fn decodes_completion_and_confirmation_messages() {
    let complete = decode_journal_message_line(
        r#"{"type":"DEPLOYMENT_EXECUTION_STATE_COMPLETE","future_id":"M#Foo","result":{"type":"SUCCESS","address":"0x01"}}"#,
    )
    .expect("complete");
    let JournalMessage::DeploymentExecutionStateComplete(message) = &complete else {
        panic!("expected completion");
    };
    assert_eq!(
        message.result,
        ExecutionResult::Success(DeploymentSuccess {
            address: "0x01".to_string()
        })
    );
    assert_eq!(complete.future_id(), Some("M#Foo"));

    let confirm = decode_journal_message_line(
        r#"{"type":"TRANSACTION_CONFIRM","future_id":"M#Foo","network_interaction_id":1,"hash":"0xaa","receipt":{"block_hash":"0xbb","block_number":7,"status":"SUCCESS","contract_address":"0x01"}}"#,
    )
    .expect("confirm");
    let JournalMessage::TransactionConfirm(message) = &confirm else {
        panic!("expected confirmation");
    };
    assert_eq!(message.receipt.status, TransactionReceiptStatus::Success);
    assert!(message.receipt.logs.is_empty());
    assert_eq!(confirm.network_interaction_id(), Some(1));
}

#[test]
fn strategy_config_keeps_fractional_numbers() {
    let line = json!({
        "type": "DEPLOYMENT_EXECUTION_STATE_INITIALIZE",
        "future_id": "M#Foo",
        "future_type": "CONTRACT_DEPLOYMENT",
        "strategy": "create2",
        "strategy_config": {"salt": "0x01", "gas_multiplier": 1.5, "retries": 3},
        "artifact_id": "Foo",
        "contract_name": "Foo",
        "value": "0",
        "from": "0x01"
    })
    .to_string();

    let message = decode_journal_message_line(&line).expect("decode");
    let JournalMessage::DeploymentExecutionStateInitialize(initialize) = &message else {
        panic!("expected deployment initialize");
    };
    assert_eq!(
        initialize.strategy_config.get("gas_multiplier"),
        Some(&StrategyConfigValue::Number(serde_json::Number::from_f64(1.5).expect("finite")))
    );
    assert_eq!(
        initialize.strategy_config.get("retries"),
        Some(&StrategyConfigValue::Number(3.into()))
    );

    let again = decode_journal_message_line(&encode_journal_message_line(&message).expect("encode")).expect("decode");
    assert_eq!(again, message);
}

#[test]
fn rejects_unknown_message_types() {
    assert!(decode_journal_message_line(r#"{"type":"RUN_START"}"#).is_err());
}
