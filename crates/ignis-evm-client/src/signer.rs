use std::fmt;
use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, B256};
use k256::ecdsa::SigningKey;

#[derive(Clone)]
pub struct LocalPrivateKeySigner {
    private_key: B256,
    address: Address,
}

impl LocalPrivateKeySigner {
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let private_key =
            B256::from_str(private_key_hex).map_err(|error| SignerError::InvalidKey(error.to_string()))?;
        let signing_key = SigningKey::from_slice(private_key.as_slice())
            .map_err(|error| SignerError::InvalidKey(error.to_string()))?;
        let address = Address::from_public_key(signing_key.verifying_key());
        Ok(Self {
            private_key,
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Lowercase `0x` address, the form used in journals.
    pub fn address_hex(&self) -> String {
        format!("{:#x}", self.address)
    }

    fn wallet_signer(&self) -> Result<PrivateKeySigner, SignerError> {
        PrivateKeySigner::from_bytes(&self.private_key).map_err(|error| SignerError::InvalidKey(error.to_string()))
    }
}

impl fmt::Debug for LocalPrivateKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPrivateKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// The accounts a client signs for, in configuration order. Account index
/// `n` in a module refers to the `n`-th key.
#[derive(Debug, Clone, Default)]
pub struct LocalAccounts {
    signers: Vec<LocalPrivateKeySigner>,
}

impl LocalAccounts {
    pub fn from_hex_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self, SignerError> {
        let mut signers: Vec<LocalPrivateKeySigner> = Vec::with_capacity(keys.len());
        for key in keys {
            let signer = LocalPrivateKeySigner::from_hex(key.as_ref())?;
            if signers.iter().any(|known| known.address == signer.address) {
                return Err(SignerError::DuplicateAccount(signer.address_hex()));
            }
            signers.push(signer);
        }
        Ok(Self { signers })
    }

    pub fn addresses(&self) -> Vec<String> {
        self.signers.iter().map(LocalPrivateKeySigner::address_hex).collect()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.signers
            .iter()
            .any(|signer| signer.address_hex().eq_ignore_ascii_case(address))
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Wallet holding every key, `None` without accounts.
    pub fn wallet(&self) -> Result<Option<EthereumWallet>, SignerError> {
        let mut signers = self.signers.iter();
        let Some(first) = signers.next() else {
            return Ok(None);
        };
        let mut wallet = EthereumWallet::new(first.wallet_signer()?);
        for signer in signers {
            wallet.register_signer(signer.wallet_signer()?);
        }
        Ok(Some(wallet))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid private key hex: {0}")]
    InvalidKey(String),
    #[error("account {0} is configured more than once")]
    DuplicateAccount(String),
}

#[cfg(test)]
#[path = "signer_test.rs"]
mod tests;
