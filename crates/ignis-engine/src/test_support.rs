//! Message builders and scripted collaborators shared by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use futures::future::{FutureExt, LocalBoxFuture};
use ignis_core::{
    CallExecutionStateInitializeMessage, DeploymentExecutionStateCompleteMessage,
    DeploymentExecutionStateInitializeMessage, DeploymentInitializeMessage, DeploymentSuccess, ExecutionResult,
    FutureType, JournalMessage, NameOrIndex, NetworkFees, NetworkInteractionRequest, NetworkInteractionRequestMessage,
    OnchainInteractionMessage, StaticCallExecutionStateInitializeMessage, StrategyConfig, Transaction,
    TransactionConfirmMessage, TransactionLog, TransactionPrepareSendMessage, TransactionReceipt,
    TransactionReceiptStatus, TransactionSendMessage,
};
use serde_json::Value;

use crate::chain::{BlockInfo, BlockTag, CallParams, ChainClient, ChainError, TransactionParams};
use crate::strategy::{AbiCodec, Artifact, ArtifactError, ArtifactResolver, CodecError};

pub const SENDER: &str = "0x1111111111111111111111111111111111111111";
pub const OTHER_SENDER: &str = "0x2222222222222222222222222222222222222222";

pub fn initialize(chain_id: i64) -> JournalMessage {
    JournalMessage::DeploymentInitialize(DeploymentInitializeMessage { chain_id })
}

pub fn deployment_init(future_id: &str, contract_name: &str) -> JournalMessage {
    deployment_init_with(future_id, contract_name, "basic", BTreeSet::new())
}

pub fn deployment_init_with(
    future_id: &str,
    contract_name: &str,
    strategy: &str,
    dependencies: BTreeSet<String>,
) -> JournalMessage {
    JournalMessage::DeploymentExecutionStateInitialize(DeploymentExecutionStateInitializeMessage {
        future_id: future_id.to_string(),
        future_type: FutureType::ContractDeployment,
        strategy: strategy.to_string(),
        strategy_config: StrategyConfig::new(),
        dependencies,
        artifact_id: contract_name.to_string(),
        contract_name: contract_name.to_string(),
        constructor_args: Vec::new(),
        libraries: BTreeMap::new(),
        value: 0,
        from: SENDER.to_string(),
    })
}

pub fn call_init(future_id: &str, contract_address: &str, function_name: &str) -> JournalMessage {
    JournalMessage::CallExecutionStateInitialize(CallExecutionStateInitializeMessage {
        future_id: future_id.to_string(),
        strategy: "basic".to_string(),
        strategy_config: StrategyConfig::new(),
        dependencies: BTreeSet::new(),
        artifact_id: "Foo".to_string(),
        contract_address: contract_address.to_string(),
        function_name: function_name.to_string(),
        args: Vec::new(),
        value: 0,
        from: SENDER.to_string(),
    })
}

pub fn static_call_init(future_id: &str, contract_address: &str, function_name: &str) -> JournalMessage {
    JournalMessage::StaticCallExecutionStateInitialize(StaticCallExecutionStateInitializeMessage {
        future_id: future_id.to_string(),
        strategy: "basic".to_string(),
        strategy_config: StrategyConfig::new(),
        dependencies: BTreeSet::new(),
        artifact_id: "Foo".to_string(),
        contract_address: contract_address.to_string(),
        function_name: function_name.to_string(),
        args: Vec::new(),
        name_or_index: NameOrIndex::default(),
        from: SENDER.to_string(),
    })
}

pub fn onchain_request(future_id: &str, network_interaction_id: u32) -> JournalMessage {
    JournalMessage::NetworkInteractionRequest(NetworkInteractionRequestMessage {
        future_id: future_id.to_string(),
        network_interaction: NetworkInteractionRequest::Onchain {
            id: network_interaction_id,
            to: None,
            data: "0x6080".to_string(),
            value: 0,
            from: SENDER.to_string(),
        },
    })
}

pub fn static_request(future_id: &str, network_interaction_id: u32) -> JournalMessage {
    JournalMessage::NetworkInteractionRequest(NetworkInteractionRequestMessage {
        future_id: future_id.to_string(),
        network_interaction: NetworkInteractionRequest::StaticCall {
            id: network_interaction_id,
            to: Some("0x00000000000000000000000000000000000000aa".to_string()),
            data: "0x8da5cb5b".to_string(),
            from: SENDER.to_string(),
        },
    })
}

pub fn prepare_send(future_id: &str, network_interaction_id: u32, nonce: u64) -> JournalMessage {
    JournalMessage::TransactionPrepareSend(TransactionPrepareSendMessage {
        future_id: future_id.to_string(),
        network_interaction_id,
        nonce,
    })
}

pub fn fees(max_fee_per_gas: u128) -> NetworkFees {
    NetworkFees::Eip1559 {
        max_fee_per_gas,
        max_priority_fee_per_gas: 1,
    }
}

pub fn send(future_id: &str, network_interaction_id: u32, hash: &str, nonce: u64) -> JournalMessage {
    JournalMessage::TransactionSend(TransactionSendMessage {
        future_id: future_id.to_string(),
        network_interaction_id,
        transaction: Transaction {
            hash: hash.to_string(),
            fees: fees(100),
            nonce,
            receipt: None,
        },
    })
}

pub fn receipt(contract_address: Option<&str>, status: TransactionReceiptStatus) -> TransactionReceipt {
    TransactionReceipt {
        block_hash: "0xb1".to_string(),
        block_number: 1,
        status,
        contract_address: contract_address.map(str::to_string),
        logs: Vec::new(),
    }
}

pub fn confirm(future_id: &str, network_interaction_id: u32, hash: &str, contract_address: Option<&str>) -> JournalMessage {
    JournalMessage::TransactionConfirm(TransactionConfirmMessage {
        future_id: future_id.to_string(),
        network_interaction_id,
        hash: hash.to_string(),
        receipt: receipt(contract_address, TransactionReceiptStatus::Success),
    })
}

pub fn onchain_signal(future_id: &str, network_interaction_id: u32) -> OnchainInteractionMessage {
    OnchainInteractionMessage {
        future_id: future_id.to_string(),
        network_interaction_id,
    }
}

pub fn deployment_success(future_id: &str, address: &str) -> JournalMessage {
    JournalMessage::DeploymentExecutionStateComplete(DeploymentExecutionStateCompleteMessage {
        future_id: future_id.to_string(),
        result: ExecutionResult::Success(DeploymentSuccess {
            address: address.to_string(),
        }),
    })
}

/// The full journal of one successful deployment on chain 31337.
pub fn successful_deployment_journal(future_id: &str, address: &str) -> Vec<JournalMessage> {
    vec![
        initialize(31337),
        deployment_init(future_id, "Foo"),
        onchain_request(future_id, 1),
        prepare_send(future_id, 1, 0),
        send(future_id, 1, "0xaa", 0),
        confirm(future_id, 1, "0xaa", Some(address)),
        deployment_success(future_id, address),
    ]
}

/// Codec that produces readable placeholder calldata.
#[derive(Debug, Default)]
pub struct FakeCodec;

impl AbiCodec for FakeCodec {
    fn encode_deployment(
        &self,
        artifact: &Artifact,
        args: &[Value],
        libraries: &BTreeMap<String, String>,
    ) -> Result<String, CodecError> {
        Ok(format!(
            "deploy:{}:{}:{}",
            artifact.contract_name,
            Value::Array(args.to_vec()),
            serde_json::to_string(libraries).map_err(|error| CodecError::Encode(error.to_string()))?
        ))
    }

    fn encode_function_call(&self, artifact: &Artifact, function_name: &str, args: &[Value]) -> Result<String, CodecError> {
        if function_name == "missing" {
            return Err(CodecError::UnknownFunction {
                contract_name: artifact.contract_name.clone(),
                function_name: function_name.to_string(),
            });
        }
        Ok(format!(
            "call:{}.{function_name}:{}",
            artifact.contract_name,
            Value::Array(args.to_vec())
        ))
    }

    fn check_constructor(&self, _artifact: &Artifact, _arg_count: usize) -> Result<(), CodecError> {
        Ok(())
    }

    /// `missing` does not exist, `pair` takes two arguments and no function
    /// has an output named `nope`.
    fn check_function(
        &self,
        artifact: &Artifact,
        function_name: &str,
        arg_count: usize,
        output: Option<&NameOrIndex>,
    ) -> Result<(), CodecError> {
        if function_name == "missing" {
            return Err(CodecError::UnknownFunction {
                contract_name: artifact.contract_name.clone(),
                function_name: function_name.to_string(),
            });
        }
        if function_name == "pair" && arg_count != 2 {
            return Err(CodecError::ArgumentCount {
                contract_name: artifact.contract_name.clone(),
                function_name: function_name.to_string(),
                expected: 2,
                actual: arg_count,
            });
        }
        if output == Some(&NameOrIndex::Name("nope".to_string())) {
            return Err(CodecError::UnknownOutput {
                name: function_name.to_string(),
                selector: "nope".to_string(),
            });
        }
        Ok(())
    }

    fn check_event_argument(
        &self,
        artifact: &Artifact,
        event_name: &str,
        _argument: &NameOrIndex,
    ) -> Result<(), CodecError> {
        if event_name == "Missing" {
            return Err(CodecError::UnknownEvent {
                contract_name: artifact.contract_name.clone(),
                event_name: event_name.to_string(),
            });
        }
        Ok(())
    }

    fn decode_function_result(
        &self,
        _artifact: &Artifact,
        _function_name: &str,
        return_data: &str,
        _name_or_index: &NameOrIndex,
    ) -> Result<Value, CodecError> {
        Ok(Value::String(return_data.to_string()))
    }

    fn decode_error(&self, _artifact: Option<&Artifact>, return_data: &str) -> String {
        format!("reverted with {return_data}")
    }

    fn decode_event_argument(
        &self,
        _artifact: &Artifact,
        event_name: &str,
        event_index: u64,
        name_or_index: &NameOrIndex,
        emitter_address: &str,
        logs: &[TransactionLog],
    ) -> Result<Value, CodecError> {
        let matching: Vec<&TransactionLog> = logs
            .iter()
            .filter(|log| log.address.eq_ignore_ascii_case(emitter_address))
            .collect();
        let log = usize::try_from(event_index)
            .ok()
            .and_then(|index| matching.get(index))
            .ok_or_else(|| CodecError::EventNotFound {
                event_name: event_name.to_string(),
                event_index,
            })?;
        Ok(Value::String(format!("{}:{name_or_index}", log.data)))
    }
}

#[derive(Debug, Default)]
pub struct FakeArtifacts;

impl ArtifactResolver for FakeArtifacts {
    fn load_artifact(&self, artifact_id: &str) -> Result<Artifact, ArtifactError> {
        if artifact_id == "Missing" {
            return Err(ArtifactError::NotFound(artifact_id.to_string()));
        }
        Ok(Artifact {
            contract_name: artifact_id.to_string(),
            abi: Value::Array(Vec::new()),
            bytecode: "0x6080".to_string(),
            link_references: BTreeMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
struct ScriptedTransaction {
    params: TransactionParams,
    hash: String,
    mined_in: Option<u64>,
}

#[derive(Debug, Default)]
struct ScriptedChainState {
    block_number: u64,
    sent_count: usize,
    transactions: Vec<ScriptedTransaction>,
    mined_nonce: BTreeMap<String, u64>,
    external_pending: BTreeMap<String, u64>,
    reverting_functions: BTreeSet<String>,
    failing_simulations: BTreeSet<String>,
    mine_automatically: bool,
    forget_unmined: bool,
    receipt_logs: Vec<TransactionLog>,
}

/// In-memory chain. Transactions are mined on the next block unless
/// automatic mining is turned off.
#[derive(Debug)]
pub struct ScriptedChain {
    chain_id: i64,
    accounts: Vec<String>,
    state: RefCell<ScriptedChainState>,
}

impl ScriptedChain {
    pub fn new(chain_id: i64) -> Self {
        Self {
            chain_id,
            accounts: vec![SENDER.to_string(), OTHER_SENDER.to_string()],
            state: RefCell::new(ScriptedChainState {
                mine_automatically: true,
                ..ScriptedChainState::default()
            }),
        }
    }

    pub fn with_manual_mining(self) -> Self {
        self.state.borrow_mut().mine_automatically = false;
        self
    }

    /// The next block drops every unmined transaction instead of mining it.
    pub fn dropping_unmined(self) -> Self {
        self.state.borrow_mut().forget_unmined = true;
        self
    }

    pub fn with_reverting_function(self, function_name: &str) -> Self {
        self.state
            .borrow_mut()
            .reverting_functions
            .insert(function_name.to_string());
        self
    }

    pub fn with_failing_simulation(self, function_name: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_simulations
            .insert(function_name.to_string());
        self
    }

    pub fn with_receipt_logs(self, logs: Vec<TransactionLog>) -> Self {
        self.state.borrow_mut().receipt_logs = logs;
        self
    }

    /// Simulates transactions sent by someone else from `address`.
    pub fn with_external_transactions(self, address: &str, mined: u64, pending: u64) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.mined_nonce.insert(address.to_string(), mined);
            state.external_pending.insert(address.to_string(), pending);
        }
        self
    }

    pub fn sent(&self) -> Vec<TransactionParams> {
        self.state
            .borrow()
            .transactions
            .iter()
            .map(|transaction| transaction.params.clone())
            .collect()
    }

    pub fn mine(&self) {
        let mut state = self.state.borrow_mut();
        state.block_number += 1;
        let block = state.block_number;
        let mut mined = Vec::new();
        for transaction in state.transactions.iter_mut() {
            if transaction.mined_in.is_some() {
                continue;
            }
            let replaced = mined
                .iter()
                .any(|(from, nonce): &(String, u64)| from == &transaction.params.from && *nonce == transaction.params.nonce);
            if !replaced {
                transaction.mined_in = Some(block);
                mined.push((transaction.params.from.clone(), transaction.params.nonce));
            }
        }
        for (from, nonce) in mined {
            let entry = state.mined_nonce.entry(from).or_insert(0);
            *entry = (*entry).max(nonce + 1);
        }
    }

    fn block_number(&self) -> u64 {
        self.state.borrow().block_number
    }
}

fn function_of(data: &str) -> Option<&str> {
    let rest = data.strip_prefix("call:")?;
    let (target, _) = rest.split_once(':')?;
    target.split_once('.').map(|(_, function_name)| function_name)
}

impl ChainClient for ScriptedChain {
    fn chain_id(&self) -> LocalBoxFuture<'_, Result<i64, ChainError>> {
        let chain_id = self.chain_id;
        async move { Ok(chain_id) }.boxed_local()
    }

    fn accounts(&self) -> LocalBoxFuture<'_, Result<Vec<String>, ChainError>> {
        async move { Ok(self.accounts.clone()) }.boxed_local()
    }

    fn latest_block(&self) -> LocalBoxFuture<'_, Result<BlockInfo, ChainError>> {
        async move {
            let number = self.block_number();
            Ok(BlockInfo {
                number,
                hash: format!("0xblock{number}"),
            })
        }
        .boxed_local()
    }

    fn transaction_count<'a>(&'a self, address: &'a str, block: BlockTag) -> LocalBoxFuture<'a, Result<u64, ChainError>> {
        async move {
            let state = self.state.borrow();
            let mined = state.mined_nonce.get(address).copied().unwrap_or(0);
            match block {
                BlockTag::Latest => Ok(mined),
                BlockTag::Pending => {
                    let own = state
                        .transactions
                        .iter()
                        .filter(|transaction| transaction.params.from == address)
                        .map(|transaction| transaction.params.nonce + 1)
                        .max()
                        .unwrap_or(0);
                    let external = mined + state.external_pending.get(address).copied().unwrap_or(0);
                    Ok(mined.max(own).max(external))
                }
            }
        }
        .boxed_local()
    }

    fn network_fees(&self) -> LocalBoxFuture<'_, Result<NetworkFees, ChainError>> {
        async move { Ok(fees(100)) }.boxed_local()
    }

    fn send_transaction<'a>(&'a self, params: &'a TransactionParams) -> LocalBoxFuture<'a, Result<String, ChainError>> {
        async move {
            let mut state = self.state.borrow_mut();
            state.sent_count += 1;
            let hash = format!("0xtx{}", state.sent_count);
            state.transactions.push(ScriptedTransaction {
                params: params.clone(),
                hash: hash.clone(),
                mined_in: None,
            });
            Ok(hash)
        }
        .boxed_local()
    }

    fn transaction_exists<'a>(&'a self, hash: &'a str) -> LocalBoxFuture<'a, Result<bool, ChainError>> {
        async move {
            let state = self.state.borrow();
            Ok(state
                .transactions
                .iter()
                .any(|transaction| transaction.hash == hash))
        }
        .boxed_local()
    }

    fn transaction_receipt<'a>(
        &'a self,
        hash: &'a str,
    ) -> LocalBoxFuture<'a, Result<Option<TransactionReceipt>, ChainError>> {
        async move {
            let state = self.state.borrow();
            let Some(transaction) = state
                .transactions
                .iter()
                .find(|transaction| transaction.hash == hash)
            else {
                return Ok(None);
            };
            let Some(block_number) = transaction.mined_in else {
                return Ok(None);
            };
            let reverted = function_of(&transaction.params.data)
                .is_some_and(|function_name| state.reverting_functions.contains(function_name));
            let contract_address = transaction
                .params
                .to
                .is_none()
                .then(|| format!("0xc0ntract{}", transaction.params.nonce));
            Ok(Some(TransactionReceipt {
                block_hash: format!("0xblock{block_number}"),
                block_number,
                status: if reverted {
                    TransactionReceiptStatus::Failure
                } else {
                    TransactionReceiptStatus::Success
                },
                contract_address: contract_address.clone(),
                logs: state
                    .receipt_logs
                    .iter()
                    .map(|log| TransactionLog {
                        address: contract_address.clone().unwrap_or_else(|| log.address.clone()),
                        ..log.clone()
                    })
                    .collect(),
            }))
        }
        .boxed_local()
    }

    fn static_call<'a>(
        &'a self,
        params: &'a CallParams,
        _block: BlockTag,
    ) -> LocalBoxFuture<'a, Result<ignis_core::RawStaticCallResult, ChainError>> {
        async move {
            let state = self.state.borrow();
            let failing = function_of(&params.data)
                .is_some_and(|function_name| state.failing_simulations.contains(function_name));
            Ok(ignis_core::RawStaticCallResult {
                return_data: if failing {
                    "0xdead".to_string()
                } else {
                    format!("0xresult:{}", params.data)
                },
                success: !failing,
                custom_error_reported: false,
            })
        }
        .boxed_local()
    }

    fn wait_for_next_block(&self) -> LocalBoxFuture<'_, Result<(), ChainError>> {
        async move {
            let (automatic, forget) = {
                let state = self.state.borrow();
                (state.mine_automatically, state.forget_unmined)
            };
            if forget {
                let mut state = self.state.borrow_mut();
                state.block_number += 1;
                state.forget_unmined = false;
                state
                    .transactions
                    .retain(|transaction| transaction.mined_in.is_some());
            } else if automatic {
                self.mine();
            } else {
                self.state.borrow_mut().block_number += 1;
            }
            Ok(())
        }
        .boxed_local()
    }
}
