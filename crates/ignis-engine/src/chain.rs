//! Boundary to the EVM node. Everything the engine learns about the chain
//! goes through [`ChainClient`].

use futures::future::LocalBoxFuture;
use ignis_core::{NetworkFees, RawStaticCallResult, TransactionReceipt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    Latest,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub number: u64,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionParams {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub data: String,
    #[serde(with = "ignis_core::amount")]
    pub value: u128,
    pub nonce: u64,
    pub fees: NetworkFees,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParams {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub data: String,
    #[serde(with = "ignis_core::amount")]
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("unknown sender {0}")]
    UnknownSender(String),
    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },
}

pub trait ChainClient {
    fn chain_id(&self) -> LocalBoxFuture<'_, Result<i64, ChainError>>;

    /// Addresses the client can sign for, in a stable order.
    fn accounts(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ChainError>>;

    fn latest_block(&self) -> LocalBoxFuture<'_, Result<BlockInfo, ChainError>>;

    fn transaction_count<'a>(&'a self, address: &'a str, block: BlockTag) -> LocalBoxFuture<'a, Result<u64, ChainError>>;

    fn network_fees(&self) -> LocalBoxFuture<'_, Result<NetworkFees, ChainError>>;

    /// Signs and broadcasts, returning the transaction hash.
    fn send_transaction<'a>(&'a self, params: &'a TransactionParams) -> LocalBoxFuture<'a, Result<String, ChainError>>;

    /// Whether the node knows the transaction, mined or in its mempool.
    fn transaction_exists<'a>(&'a self, hash: &'a str) -> LocalBoxFuture<'a, Result<bool, ChainError>>;

    fn transaction_receipt<'a>(&'a self, hash: &'a str)
        -> LocalBoxFuture<'a, Result<Option<TransactionReceipt>, ChainError>>;

    fn static_call<'a>(
        &'a self,
        params: &'a CallParams,
        block: BlockTag,
    ) -> LocalBoxFuture<'a, Result<RawStaticCallResult, ChainError>>;

    /// Resolves once the chain head has advanced.
    fn wait_for_next_block(&self) -> LocalBoxFuture<'_, Result<(), ChainError>>;
}
