//! The driver: turns a validated, reconciled module into journal messages by
//! asking the strategy what to do and the chain what happened.

mod error;
mod future_processor;
mod initialize;
mod monitor;
mod nonce;
mod options;
mod result;
mod runner;
mod session;
mod validation;

pub use error::EngineError;
pub use options::{
    DropPolicy, EngineOptions, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_FEE_BUMPS, DEFAULT_REQUIRED_CONFIRMATIONS,
    DEFAULT_TIME_BEFORE_BUMPING_FEES, FEE_BUMP_PERCENT,
};
pub use result::DeploymentResult;
pub use runner::ExecutionEngine;
