use super::{LocalAccounts, LocalPrivateKeySigner, SignerError};

// Well known development keys.
const KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const ADDRESS_0: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const ADDRESS_1: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

#[test]
fn local_private_key_signer_rejects_invalid_hex() {
    let error = LocalPrivateKeySigner::from_hex("0x1234").expect_err("must reject short key");
    assert!(matches!(error, SignerError::InvalidKey(_)));
}

#[test]
fn signer_derives_the_address() {
    let signer = LocalPrivateKeySigner::from_hex(KEY_0).expect("valid key");
    assert_eq!(signer.address_hex(), ADDRESS_0);
    assert!(!format!("{signer:?}").contains("ac0974"));
}

#[test]
fn accounts_keep_configuration_order() {
    let accounts = LocalAccounts::from_hex_keys(&[KEY_1, KEY_0]).expect("accounts");

    assert_eq!(accounts.addresses(), vec![ADDRESS_1.to_string(), ADDRESS_0.to_string()]);
    assert!(accounts.contains(&ADDRESS_0.to_ascii_uppercase().replace("0X", "0x")));
    assert!(accounts.wallet().expect("wallet").is_some());
}

#[test]
fn accounts_reject_duplicates() {
    let error = LocalAccounts::from_hex_keys(&[KEY_0, KEY_0]).expect_err("duplicate");
    assert_eq!(error, SignerError::DuplicateAccount(ADDRESS_0.to_string()));
}

#[test]
fn no_accounts_means_no_wallet() {
    let accounts = LocalAccounts::default();
    assert!(accounts.is_empty());
    assert!(accounts.wallet().expect("wallet").is_none());
}
