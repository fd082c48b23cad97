mod abi;
pub mod artifacts;
pub mod client;
pub mod provider;
mod rpc;
pub mod signer;

pub use abi::AlloyAbiCodec;
pub use artifacts::FsArtifactResolver;
pub use client::AlloyChainClient;
pub use provider::{
    EvmRpcEndpoint, EvmRpcTransport, ProviderError, DEFAULT_BLOCK_POLLING_INTERVAL_MS, DEFAULT_RPC_TIMEOUT_MS,
};
pub use signer::{LocalAccounts, LocalPrivateKeySigner, SignerError};
