use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkFees {
    Eip1559 {
        #[serde(with = "crate::amount")]
        max_fee_per_gas: u128,
        #[serde(with = "crate::amount")]
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        #[serde(with = "crate::amount")]
        gas_price: u128,
    },
}

impl NetworkFees {
    /// Raises every component by `percent`, rounding up so that a bump of a
    /// tiny fee still changes it.
    pub fn bumped(&self, percent: u128) -> Self {
        let bump = |fee: u128| fee.saturating_add((fee.saturating_mul(percent)).div_ceil(100).max(1));
        match self {
            Self::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => Self::Eip1559 {
                max_fee_per_gas: bump(*max_fee_per_gas),
                max_priority_fee_per_gas: bump(*max_priority_fee_per_gas),
            },
            Self::Legacy { gas_price } => Self::Legacy {
                gas_price: bump(*gas_price),
            },
        }
    }

    /// Component-wise maximum. Mixed kinds keep `other`.
    pub fn max(&self, other: &Self) -> Self {
        match (self, other) {
            (
                Self::Eip1559 {
                    max_fee_per_gas: left_max,
                    max_priority_fee_per_gas: left_priority,
                },
                Self::Eip1559 {
                    max_fee_per_gas: right_max,
                    max_priority_fee_per_gas: right_priority,
                },
            ) => Self::Eip1559 {
                max_fee_per_gas: (*left_max).max(*right_max),
                max_priority_fee_per_gas: (*left_priority).max(*right_priority),
            },
            (Self::Legacy { gas_price: left }, Self::Legacy { gas_price: right }) => Self::Legacy {
                gas_price: (*left).max(*right),
            },
            _ => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionReceiptStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub address: String,
    pub log_index: u64,
    pub data: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub block_hash: String,
    pub block_number: u64,
    pub status: TransactionReceiptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub logs: Vec<TransactionLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub fees: NetworkFees,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TransactionReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainInteraction {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub data: String,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default)]
    pub should_be_resent: bool,
}

impl OnchainInteraction {
    pub fn confirmed_transaction(&self) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| transaction.receipt.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStaticCallResult {
    pub return_data: String,
    pub success: bool,
    #[serde(default)]
    pub custom_error_reported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCallInteraction {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub data: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RawStaticCallResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkInteraction {
    #[serde(rename = "ONCHAIN_INTERACTION")]
    Onchain(OnchainInteraction),
    StaticCall(StaticCallInteraction),
}

impl NetworkInteraction {
    pub fn id(&self) -> u32 {
        match self {
            Self::Onchain(interaction) => interaction.id,
            Self::StaticCall(interaction) => interaction.id,
        }
    }
}

/// What a strategy asks the engine to perform next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkInteractionRequest {
    #[serde(rename = "ONCHAIN_INTERACTION")]
    Onchain {
        id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        data: String,
        #[serde(with = "crate::amount")]
        value: u128,
        from: String,
    },
    StaticCall {
        id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        data: String,
        from: String,
    },
}

impl NetworkInteractionRequest {
    pub fn id(&self) -> u32 {
        match self {
            Self::Onchain { id, .. } | Self::StaticCall { id, .. } => *id,
        }
    }

    pub fn into_interaction(self) -> NetworkInteraction {
        match self {
            Self::Onchain {
                id,
                to,
                data,
                value,
                from,
            } => NetworkInteraction::Onchain(OnchainInteraction {
                id,
                to,
                data,
                value,
                from,
                transactions: Vec::new(),
                nonce: None,
                should_be_resent: false,
            }),
            Self::StaticCall { id, to, data, from } => NetworkInteraction::StaticCall(StaticCallInteraction {
                id,
                to,
                data,
                from,
                result: None,
            }),
        }
    }
}

#[cfg(test)]
#[path = "network_interaction_test.rs"]
mod tests;
