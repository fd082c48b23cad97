//! Serde adapter for wei amounts.
//!
//! Amounts are written as decimal strings so that values above `u64::MAX`
//! survive JSON tooling. Plain JSON integers are accepted on read.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = u128;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal string or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u128, E> {
        Ok(u128::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<u128, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u128, E> {
        u128::try_from(value).map_err(|_| E::custom(format!("amount must be non-negative, got {value}")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<u128, E> {
        parse_amount(value).map_err(E::custom)
    }
}

/// Parses a decimal or `0x`-prefixed hex amount.
pub fn parse_amount(raw: &str) -> Result<u128, String> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => trimmed.parse::<u128>(),
    };
    parsed.map_err(|_| format!("invalid amount `{raw}`"))
}

#[cfg(test)]
#[path = "amount_test.rs"]
mod tests;
