use super::{EvmRpcEndpoint, EvmRpcTransport, ProviderError, DEFAULT_RPC_TIMEOUT_MS};

#[test]
fn endpoint_defaults_timeout_and_polling() {
    let endpoint = EvmRpcEndpoint::new("http://127.0.0.1:8545").expect("endpoint");
    assert_eq!(endpoint.timeout_ms, DEFAULT_RPC_TIMEOUT_MS);
    assert_eq!(endpoint.transport().expect("transport"), EvmRpcTransport::Http);
    assert_eq!(endpoint.block_polling_interval().as_millis(), 1_000);
}

#[test]
fn endpoint_rejects_unknown_scheme() {
    let error = EvmRpcEndpoint::new("ftp://eth.example").expect_err("must reject url");
    assert!(matches!(error, ProviderError::InvalidRpcUrl(_)));
}

#[test]
fn endpoint_accepts_ws_and_detects_transport() {
    let endpoint = EvmRpcEndpoint::new("wss://eth.example").expect("wss endpoint");
    assert_eq!(endpoint.transport().expect("transport"), EvmRpcTransport::Ws);
}

#[test]
fn endpoint_rejects_zero_timeouts() {
    let endpoint = EvmRpcEndpoint::new("https://eth.example").expect("endpoint");
    assert_eq!(
        endpoint.clone().with_timeout_ms(0).expect_err("zero timeout"),
        ProviderError::InvalidTimeout(0)
    );
    assert_eq!(
        endpoint.with_block_polling_interval_ms(0).expect_err("zero interval"),
        ProviderError::InvalidPollingInterval(0)
    );
}
