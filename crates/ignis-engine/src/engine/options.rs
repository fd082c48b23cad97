use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the driver does when one of its own transactions disappears, or
/// its nonce gets used by a transaction sent from elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Stop the run with a named error. Nonce bookkeeping for the sender can
    /// no longer be trusted, so a human has to look.
    #[default]
    Halt,
    /// Record the drop (or replacement) and send the interaction again.
    Resend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub max_fee_bumps: u32,
    pub time_before_bumping_fees: Duration,
    pub required_confirmations: u64,
    pub drop_policy: DropPolicy,
    /// Futures of one batch processed at the same time.
    pub max_concurrency: usize,
    /// Sender for futures without `from`. The first account when unset.
    pub default_sender: Option<String>,
}

pub const DEFAULT_MAX_FEE_BUMPS: u32 = 4;
pub const DEFAULT_TIME_BEFORE_BUMPING_FEES: Duration = Duration::from_secs(180);
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u64 = 1;
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Percentage added to the previous fees when a transaction is resent.
pub const FEE_BUMP_PERCENT: u128 = 10;

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_fee_bumps: DEFAULT_MAX_FEE_BUMPS,
            time_before_bumping_fees: DEFAULT_TIME_BEFORE_BUMPING_FEES,
            required_confirmations: DEFAULT_REQUIRED_CONFIRMATIONS,
            drop_policy: DropPolicy::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            default_sender: None,
        }
    }
}
