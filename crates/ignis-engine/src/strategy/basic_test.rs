use futures::executor::block_on;
use ignis_core::{
    DeploymentSuccess, ExecutionResult, JournalMessage, NetworkInteractionRequest, RawStaticCallResult,
    StaticCallCompleteMessage, StaticCallSuccess, TransactionConfirmMessage, TransactionReceiptStatus,
};
use serde_json::json;

use super::BasicStrategy;
use crate::reducer::replay;
use crate::strategy::{ExecutionStrategy, StrategyError, StrategyOutcome, StrategyStep};
use crate::test_support::*;

#[test]
fn deployment_starts_with_a_create_request() {
    let artifacts = FakeArtifacts;
    let codec = FakeCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let state = replay(&[initialize(31337), deployment_init("M#Foo", "Foo")]).expect("state");

    let step = block_on(strategy.next_step(state.execution_state("M#Foo").expect("foo"))).expect("step");

    let StrategyStep::Request(NetworkInteractionRequest::Onchain { id, to, data, from, .. }) = step else {
        panic!("expected onchain request");
    };
    assert_eq!(id, 1);
    assert_eq!(to, None);
    assert_eq!(data, "deploy:Foo:[]:{}");
    assert_eq!(from, SENDER);
}

#[test]
fn confirmed_deployment_completes_with_the_contract_address() {
    let artifacts = FakeArtifacts;
    let codec = FakeCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let journal = successful_deployment_journal("M#Foo", "0x01");
    let state = replay(&journal[..6]).expect("state");

    let step = block_on(strategy.next_step(state.execution_state("M#Foo").expect("foo"))).expect("step");
    assert_eq!(
        step,
        StrategyStep::Complete(StrategyOutcome::Deployment(ExecutionResult::Success(DeploymentSuccess {
            address: "0x01".to_string()
        })))
    );
}

#[test]
fn reverted_call_completes_with_the_transaction_hash() {
    let artifacts = FakeArtifacts;
    let codec = FakeCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let state = replay(&[
        initialize(31337),
        call_init("M#Foo.f", "0x01", "f"),
        onchain_request("M#Foo.f", 1),
        send("M#Foo.f", 1, "0xaa", 0),
        JournalMessage::TransactionConfirm(TransactionConfirmMessage {
            future_id: "M#Foo.f".to_string(),
            network_interaction_id: 1,
            hash: "0xaa".to_string(),
            receipt: receipt(None, TransactionReceiptStatus::Failure),
        }),
    ])
    .expect("state");

    let step = block_on(strategy.next_step(state.execution_state("M#Foo.f").expect("call"))).expect("step");
    assert_eq!(
        step,
        StrategyStep::Complete(StrategyOutcome::Call(ExecutionResult::RevertedTransaction {
            tx_hash: "0xaa".to_string()
        }))
    );
}

#[test]
fn static_call_decodes_success_and_reports_failure() {
    let artifacts = FakeArtifacts;
    let codec = FakeCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let complete = |success: bool| {
        JournalMessage::StaticCallComplete(StaticCallCompleteMessage {
            future_id: "M#Foo.owner".to_string(),
            network_interaction_id: 1,
            result: RawStaticCallResult {
                return_data: "0x2a".to_string(),
                success,
                custom_error_reported: false,
            },
        })
    };
    let base = vec![
        initialize(31337),
        static_call_init("M#Foo.owner", "0x01", "owner"),
        static_request("M#Foo.owner", 1),
    ];

    let mut succeeded = base.clone();
    succeeded.push(complete(true));
    let state = replay(&succeeded).expect("state");
    let step = block_on(strategy.next_step(state.execution_state("M#Foo.owner").expect("call"))).expect("step");
    assert_eq!(
        step,
        StrategyStep::Complete(StrategyOutcome::StaticCall(ExecutionResult::Success(StaticCallSuccess {
            value: json!("0x2a")
        })))
    );

    let mut failed = base;
    failed.push(complete(false));
    let state = replay(&failed).expect("state");
    let step = block_on(strategy.next_step(state.execution_state("M#Foo.owner").expect("call"))).expect("step");
    assert_eq!(
        step,
        StrategyStep::Complete(StrategyOutcome::StaticCall(ExecutionResult::StaticCallError {
            error: "reverted with 0x2a".to_string()
        }))
    );
}

#[test]
fn missing_artifacts_surface_as_strategy_errors() {
    let artifacts = FakeArtifacts;
    let codec = FakeCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let state = replay(&[initialize(31337), deployment_init("M#Missing", "Missing")]).expect("state");

    let error = block_on(strategy.next_step(state.execution_state("M#Missing").expect("state"))).expect_err("error");
    assert!(matches!(error, StrategyError::Artifact(_)));
    assert_eq!(error.to_string(), "artifact `Missing` not found");
}
