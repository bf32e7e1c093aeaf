// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Error Taxonomy

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::pool::PoolId;
use crate::types::Account;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Rejected inbound configuration. Raised before any simulation state exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("malformed configuration document: {0}")]
    Malformed(String),
    #[error("invalid coin list in `{field}`: {reason}")]
    InvalidCoins { field: &'static str, reason: String },
    #[error("invalid decimal in `{field}`: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("deposit tokens and token weights should have same length ({deposits} vs {weights})")]
    DepositWeightLength { deposits: usize, weights: usize },
    #[error("deposit tokens and token weights should have same denom order (position {index}: {deposit} vs {weight})")]
    DepositWeightOrder { index: usize, deposit: String, weight: String },
    #[error("initial pool weights and target pool weights should have same length ({initial} vs {target})")]
    TargetWeightLength { initial: usize, target: usize },
    #[error("initial pool weights and target pool weights should have same denom order (position {index}: {initial} vs {target})")]
    TargetWeightOrder { index: usize, initial: String, target: String },
    #[error("could not parse duration {0:?}")]
    InvalidDuration(String),
    #[error("could not parse time {0:?}")]
    InvalidStartTime(String),
    #[error("duration {duration} exceeds the maximum of {max}")]
    DurationTooLong { duration: String, max: String },
    #[error("transition window from {start} lasting {duration} is out of the representable time range")]
    TimeOutOfRange { start: String, duration: String },
    #[error("`{field}` must be in [0, 1), got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },
    #[error("daily volume must be positive")]
    ZeroDailyVolume,
    #[error("trade unit must be positive")]
    ZeroTradeUnit,
    #[error("at least one trader is required")]
    NoTraders,
    #[error("token {0:?} is not part of the pool")]
    UnknownToken(String),
    #[error("token in and token out must differ, both are {0:?}")]
    SameToken(String),
    #[error("trader funding for {days} days of {daily_volume} overflows")]
    VolumeOverflow { days: u64, daily_volume: u64 },
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Errors reported by a [`crate::pool::Pool`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("pool {0} does not exist")]
    UnknownPool(PoolId),
    #[error("denom {0:?} is not in the pool")]
    UnknownDenom(String),
    #[error("invalid denom {0:?}")]
    InvalidDenom(String),
    #[error("amount of {0} must be positive")]
    ZeroAmount(String),
    #[error("invalid pool parameters: {0}")]
    InvalidParams(String),
    #[error("{account} has {available}{denom}, needs {required}{denom}")]
    InsufficientFunds { account: Account, denom: String, available: u64, required: u64 },
    #[error("token in {amount} exceeds max in ratio of pool balance {balance}")]
    MaxInRatio { amount: u64, balance: u64 },
    #[error("token out {out} is lesser than min amount {min}")]
    SlippageExceeded { out: u64, min: u64 },
    #[error("swap of {0} produces no output")]
    ZeroOutput(String),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Any failure of a run. No partial result accompanies any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("failed to fund {account}: {source}")]
    Funding { account: Account, source: PoolError },
    #[error("failed to create pool: {0}")]
    PoolCreation(PoolError),
    #[error("swap of {amount}{denom} by {trader} at {time} failed: {source}")]
    SwapExecution {
        trader: Account,
        amount: u64,
        denom: String,
        time: DateTime<Utc>,
        source: PoolError,
    },
    #[error("pool query at {time} failed: {source}")]
    PoolQuery { time: DateTime<Utc>, source: PoolError },
}
