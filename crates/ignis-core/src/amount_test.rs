use serde::{Deserialize, Serialize};

use super::parse_amount;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Holder {
    #[serde(with = "crate::amount")]
    value: u128,
}

#[test]
fn amounts_are_written_as_decimal_strings() {
    let holder = Holder {
        value: 340_282_366_920_938_463_463_374_607_431_768_211_455,
    };
    let encoded = serde_json::to_string(&holder).expect("encode");
    assert_eq!(encoded, r#"{"value":"340282366920938463463374607431768211455"}"#);
}

#[test]
fn amounts_accept_integers_and_hex_strings() {
    let from_int: Holder = serde_json::from_str(r#"{"value":42}"#).expect("int");
    assert_eq!(from_int.value, 42);
    let from_hex: Holder = serde_json::from_str(r#"{"value":"0x10"}"#).expect("hex");
    assert_eq!(from_hex.value, 16);
    assert!(serde_json::from_str::<Holder>(r#"{"value":-1}"#).is_err());
}

#[test]
fn parse_amount_rejects_garbage() {
    assert_eq!(parse_amount("1000"), Ok(1000));
    assert!(parse_amount("ten").is_err());
}
