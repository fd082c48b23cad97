use std::borrow::Cow;
use std::cell::Cell;
use std::str::FromStr;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::{BuiltInConnectionString, ClientBuilder, RpcClient};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{BoxTransport, TransportError};
use alloy_primitives::{hex, Address, Bytes, U256};
use futures::future::{FutureExt, LocalBoxFuture};
use ignis_core::{NetworkFees, RawStaticCallResult, TransactionReceipt};
use ignis_engine::{BlockInfo, BlockTag, CallParams, ChainClient, ChainError, TransactionParams};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::provider::{EvmRpcEndpoint, ProviderError};
use crate::rpc::{
    base_fee_per_gas, block_tag, call_object, eip1559_fees, parse_block, parse_receipt, quantity_u128, quantity_u64,
};
use crate::signer::LocalAccounts;

/// [`ChainClient`] over JSON-RPC. Transactions are signed locally with the
/// configured accounts; the node only ever sees raw transactions.
///
/// Futures returned by the client need a tokio runtime.
pub struct AlloyChainClient {
    endpoint: EvmRpcEndpoint,
    client: RpcClient<BoxTransport>,
    accounts: LocalAccounts,
    wallet: Option<EthereumWallet>,
    chain_id: Cell<Option<u64>>,
}

impl AlloyChainClient {
    pub async fn connect(endpoint: EvmRpcEndpoint, accounts: LocalAccounts) -> Result<Self, ProviderError> {
        let connect_error = |message: String| ProviderError::Connect {
            rpc_url: endpoint.rpc_url.clone(),
            message,
        };
        let connect = endpoint
            .rpc_url
            .parse::<BuiltInConnectionString>()
            .map_err(|error| connect_error(error.to_string()))?;
        let client = tokio::time::timeout(endpoint.timeout(), ClientBuilder::default().connect_boxed(connect))
            .await
            .map_err(|_| connect_error(format!("timeout after {}ms", endpoint.timeout_ms)))?
            .map_err(|error| connect_error(error.to_string()))?;
        let wallet = accounts.wallet()?;
        info!(rpc_url = %endpoint.rpc_url, accounts = accounts.addresses().len(), "connected to node");
        Ok(Self {
            endpoint,
            client,
            accounts,
            wallet,
            chain_id: Cell::new(None),
        })
    }

    /// Outer error: the request never completed. Inner error: the node
    /// answered with an error.
    async fn raw_request(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Result<Value, TransportError>, ChainError> {
        let provider = ProviderBuilder::new().on_client(self.client.clone());
        let raw_params = serde_json::value::to_raw_value(&params)
            .map_err(|error| ChainError::Rpc(format!("rpc `{method}` params encode failed: {error}")))?;
        let raw_result = tokio::time::timeout(
            self.endpoint.timeout(),
            provider.raw_request_dyn(Cow::Borrowed(method), &raw_params),
        )
        .await
        .map_err(|_| ChainError::Rpc(format!("rpc `{method}` timeout after {}ms", self.endpoint.timeout_ms)))?;
        match raw_result {
            Ok(raw) => serde_json::from_str::<Value>(raw.get())
                .map(Ok)
                .map_err(|error| ChainError::Rpc(format!("rpc `{method}` result decode failed: {error}"))),
            Err(error) => Ok(Err(error)),
        }
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Value, ChainError> {
        self.raw_request(method, params)
            .await?
            .map_err(|error| ChainError::Rpc(format!("rpc `{method}` failed: {error}")))
    }

    async fn chain_id_u64(&self) -> Result<u64, ChainError> {
        if let Some(chain_id) = self.chain_id.get() {
            return Ok(chain_id);
        }
        let chain_id = quantity_u64(&self.request("eth_chainId", json!([])).await?, "chainId")?;
        self.chain_id.set(Some(chain_id));
        Ok(chain_id)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        quantity_u64(&self.request("eth_blockNumber", json!([])).await?, "blockNumber")
    }

    async fn latest_block_json(&self) -> Result<Value, ChainError> {
        self.request("eth_getBlockByNumber", json!(["latest", false])).await
    }

    fn transaction_request(&self, params: &TransactionParams, chain_id: u64) -> Result<TransactionRequest, ChainError> {
        let from = parse_address("from", &params.from)?;
        let data = Bytes::from_str(&params.data).map_err(|error| ChainError::InvalidInput {
            field: "data".to_string(),
            message: error.to_string(),
        })?;
        let request = TransactionRequest::default()
            .with_from(from)
            .with_value(U256::from(params.value))
            .with_nonce(params.nonce)
            .with_chain_id(chain_id);
        let request = match &params.to {
            Some(to) => request.with_to(parse_address("to", to)?).with_input(data),
            None => request.with_deploy_code(data),
        };
        Ok(match params.fees {
            NetworkFees::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => request
                .with_max_fee_per_gas(max_fee_per_gas)
                .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
            NetworkFees::Legacy { gas_price } => request.with_gas_price(gas_price),
        })
    }
}

fn parse_address(field: &str, address: &str) -> Result<Address, ChainError> {
    Address::from_str(address).map_err(|error| ChainError::InvalidInput {
        field: field.to_string(),
        message: format!("{address}: {error}"),
    })
}

impl ChainClient for AlloyChainClient {
    fn chain_id(&self) -> LocalBoxFuture<'_, Result<i64, ChainError>> {
        async move {
            let chain_id = self.chain_id_u64().await?;
            i64::try_from(chain_id).map_err(|_| ChainError::InvalidInput {
                field: "chainId".to_string(),
                message: format!("{chain_id} is out of range"),
            })
        }
        .boxed_local()
    }

    fn accounts(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ChainError>> {
        async move { Ok(self.accounts.addresses()) }.boxed_local()
    }

    fn latest_block(&self) -> LocalBoxFuture<'_, Result<BlockInfo, ChainError>> {
        async move { parse_block(&self.latest_block_json().await?) }.boxed_local()
    }

    fn transaction_count<'a>(&'a self, address: &'a str, block: BlockTag) -> LocalBoxFuture<'a, Result<u64, ChainError>> {
        async move {
            let count = self
                .request("eth_getTransactionCount", json!([address, block_tag(block)]))
                .await?;
            quantity_u64(&count, "transactionCount")
        }
        .boxed_local()
    }

    fn network_fees(&self) -> LocalBoxFuture<'_, Result<NetworkFees, ChainError>> {
        async move {
            let latest = self.latest_block_json().await?;
            match base_fee_per_gas(&latest)? {
                Some(base_fee) => {
                    let priority = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
                    Ok(eip1559_fees(base_fee, quantity_u128(&priority, "maxPriorityFeePerGas")?))
                }
                None => {
                    let gas_price = self.request("eth_gasPrice", json!([])).await?;
                    Ok(NetworkFees::Legacy {
                        gas_price: quantity_u128(&gas_price, "gasPrice")?,
                    })
                }
            }
        }
        .boxed_local()
    }

    fn send_transaction<'a>(&'a self, params: &'a TransactionParams) -> LocalBoxFuture<'a, Result<String, ChainError>> {
        async move {
            let Some(wallet) = self.wallet.clone().filter(|_| self.accounts.contains(&params.from)) else {
                return Err(ChainError::UnknownSender(params.from.clone()));
            };
            let chain_id = self.chain_id_u64().await?;
            let request = self.transaction_request(params, chain_id)?;
            let provider = ProviderBuilder::new()
                .with_recommended_fillers()
                .wallet(wallet)
                .on_client(self.client.clone());
            let pending = tokio::time::timeout(self.endpoint.timeout(), provider.send_transaction(request))
                .await
                .map_err(|_| ChainError::Rpc(format!("send transaction timeout after {}ms", self.endpoint.timeout_ms)))?
                .map_err(|error| ChainError::Rpc(format!("send transaction failed: {error}")))?;
            let hash = format!("{:#x}", pending.tx_hash());
            debug!(from = %params.from, nonce = params.nonce, %hash, "transaction broadcast");
            Ok(hash)
        }
        .boxed_local()
    }

    fn transaction_exists<'a>(&'a self, hash: &'a str) -> LocalBoxFuture<'a, Result<bool, ChainError>> {
        async move {
            let transaction = self.request("eth_getTransactionByHash", json!([hash])).await?;
            Ok(!transaction.is_null())
        }
        .boxed_local()
    }

    fn transaction_receipt<'a>(
        &'a self,
        hash: &'a str,
    ) -> LocalBoxFuture<'a, Result<Option<TransactionReceipt>, ChainError>> {
        async move { parse_receipt(&self.request("eth_getTransactionReceipt", json!([hash])).await?) }.boxed_local()
    }

    fn static_call<'a>(
        &'a self,
        params: &'a CallParams,
        block: BlockTag,
    ) -> LocalBoxFuture<'a, Result<RawStaticCallResult, ChainError>> {
        async move {
            let response = self
                .raw_request("eth_call", json!([call_object(params), block_tag(block)]))
                .await?;
            let error = match response {
                Ok(value) => {
                    return Ok(RawStaticCallResult {
                        return_data: value.as_str().unwrap_or("0x").to_string(),
                        success: true,
                        custom_error_reported: false,
                    })
                }
                Err(error) => error,
            };
            let Some(payload) = error.as_error_resp() else {
                return Err(ChainError::Rpc(format!("eth_call failed: {error}")));
            };
            let custom_error_reported = payload.message.contains("custom error");
            if let Some(data) = payload.as_revert_data() {
                return Ok(RawStaticCallResult {
                    return_data: format!("0x{}", hex::encode(&data)),
                    success: false,
                    custom_error_reported,
                });
            }
            if payload.message.contains("revert") {
                return Ok(RawStaticCallResult {
                    return_data: "0x".to_string(),
                    success: false,
                    custom_error_reported,
                });
            }
            Err(ChainError::Rpc(format!("eth_call failed: {error}")))
        }
        .boxed_local()
    }

    /// Resolves once the head advances, or after the rpc timeout so that
    /// fee bump timers keep running on a chain that only mines on demand.
    fn wait_for_next_block(&self) -> LocalBoxFuture<'_, Result<(), ChainError>> {
        async move {
            let start = self.block_number().await?;
            let deadline = tokio::time::Instant::now() + self.endpoint.timeout();
            loop {
                tokio::time::sleep(self.endpoint.block_polling_interval()).await;
                if self.block_number().await? > start || tokio::time::Instant::now() >= deadline {
                    return Ok(());
                }
            }
        }
        .boxed_local()
    }
}
