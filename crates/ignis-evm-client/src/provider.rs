use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::signer::SignerError;

pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_BLOCK_POLLING_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvmRpcTransport {
    Http,
    Ws,
}

/// Where and how patiently to talk to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmRpcEndpoint {
    pub rpc_url: String,
    pub timeout_ms: u64,
    pub block_polling_interval_ms: u64,
}

impl EvmRpcEndpoint {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, ProviderError> {
        let endpoint = Self {
            rpc_url: rpc_url.into(),
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            block_polling_interval_ms: DEFAULT_BLOCK_POLLING_INTERVAL_MS,
        };
        endpoint.validate()?;
        Ok(endpoint)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ProviderError> {
        self.timeout_ms = timeout_ms;
        self.validate()?;
        Ok(self)
    }

    pub fn with_block_polling_interval_ms(mut self, interval_ms: u64) -> Result<Self, ProviderError> {
        self.block_polling_interval_ms = interval_ms;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ProviderError> {
        self.transport()?;
        if self.timeout_ms == 0 {
            return Err(ProviderError::InvalidTimeout(self.timeout_ms));
        }
        if self.block_polling_interval_ms == 0 {
            return Err(ProviderError::InvalidPollingInterval(self.block_polling_interval_ms));
        }
        Ok(())
    }

    pub fn transport(&self) -> Result<EvmRpcTransport, ProviderError> {
        if self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://") {
            return Ok(EvmRpcTransport::Http);
        }
        if self.rpc_url.starts_with("ws://") || self.rpc_url.starts_with("wss://") {
            return Ok(EvmRpcTransport::Ws);
        }
        Err(ProviderError::InvalidRpcUrl(self.rpc_url.clone()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn block_polling_interval(&self) -> Duration {
        Duration::from_millis(self.block_polling_interval_ms)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("invalid rpc url, expected http(s) or ws(s): {0}")]
    InvalidRpcUrl(String),
    #[error("invalid timeout_ms, expected > 0: {0}")]
    InvalidTimeout(u64),
    #[error("invalid block_polling_interval_ms, expected > 0: {0}")]
    InvalidPollingInterval(u64),
    #[error("connect rpc `{rpc_url}` failed: {message}")]
    Connect { rpc_url: String, message: String },
    #[error(transparent)]
    Signer(#[from] SignerError),
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
