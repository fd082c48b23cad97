use serde_json::json;

use super::{NetworkFees, NetworkInteraction, NetworkInteractionRequest};

#[test]
fn fee_bump_rounds_up_and_keeps_kind() {
    let fees = NetworkFees::Eip1559 {
        max_fee_per_gas: 100,
        max_priority_fee_per_gas: 3,
    };
    assert_eq!(
        fees.bumped(10),
        NetworkFees::Eip1559 {
            max_fee_per_gas: 110,
            max_priority_fee_per_gas: 4,
        }
    );
    assert_eq!(
        NetworkFees::Legacy { gas_price: 0 }.bumped(10),
        NetworkFees::Legacy { gas_price: 1 }
    );
}

#[test]
fn fee_max_is_component_wise() {
    let left = NetworkFees::Eip1559 {
        max_fee_per_gas: 200,
        max_priority_fee_per_gas: 1,
    };
    let right = NetworkFees::Eip1559 {
        max_fee_per_gas: 150,
        max_priority_fee_per_gas: 2,
    };
    assert_eq!(
        left.max(&right),
        NetworkFees::Eip1559 {
            max_fee_per_gas: 200,
            max_priority_fee_per_gas: 2,
        }
    );
}

#[test]
fn onchain_request_becomes_fresh_interaction() {
    let request: NetworkInteractionRequest = serde_json::from_value(json!({
        "type": "ONCHAIN_INTERACTION",
        "id": 1,
        "data": "0x6080",
        "value": "0",
        "from": "0xabc"
    }))
    .expect("request");

    let NetworkInteraction::Onchain(interaction) = request.into_interaction() else {
        panic!("expected onchain interaction");
    };
    assert_eq!(interaction.id, 1);
    assert_eq!(interaction.to, None);
    assert_eq!(interaction.nonce, None);
    assert!(interaction.transactions.is_empty());
    assert!(!interaction.should_be_resent);
}
