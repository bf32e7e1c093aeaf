// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Pool Abstraction
//
// The engine only issues operations against a `Pool`; weight interpolation,
// swap math and balance bookkeeping belong to the implementation.

pub mod ledger;
pub mod math;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::types::{Account, Coin};

pub use ledger::InMemoryLedger;

pub type PoolId = u64;

// ─── Pool parameters ─────────────────────────────────────────────────────────

/// One pool asset: current balance and weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAsset {
    pub token: Coin,
    pub weight: Decimal,
}

impl PoolAsset {
    pub fn new(token: Coin, weight: Decimal) -> Self {
        Self { token, weight }
    }

    pub fn denom(&self) -> &str {
        &self.token.denom
    }
}

/// Linear weight transition. Only the weights of `initial_weights` and
/// `target_weights` are read; their token amounts are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmoothWeightChangeParams {
    /// `None` means "when the pool is created".
    pub start_time: Option<DateTime<Utc>>,
    pub duration: Duration,
    pub initial_weights: Vec<PoolAsset>,
    pub target_weights: Vec<PoolAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub swap_fee: Decimal,
    pub exit_fee: Decimal,
    pub smooth_weight_change: Option<SmoothWeightChangeParams>,
    pub future_governor: String,
}

// ─── Pool trait ──────────────────────────────────────────────────────────────

/// Ledger + AMM collaborator. Calls are synchronous; every mutating call
/// either applies fully or returns an error with no effect.
pub trait Pool {
    /// Credit `coins` to `account` before the simulation starts.
    fn fund(&mut self, account: &Account, coins: &[Coin]) -> Result<(), PoolError>;

    /// Create a pool funded from `creator`, returning its handle.
    fn create_pool(
        &mut self,
        creator: &Account,
        params: PoolParams,
        assets: Vec<PoolAsset>,
    ) -> Result<PoolId, PoolError>;

    /// Current balance and weight of `denom` in the pool.
    fn get_asset(&self, pool: PoolId, denom: &str) -> Result<PoolAsset, PoolError>;

    /// Move the pool's clock to `time`, updating time-dependent weights.
    fn advance_time(&mut self, pool: PoolId, time: DateTime<Utc>) -> Result<(), PoolError>;

    /// Output `swap_exact_amount_in` would produce right now, without executing.
    fn quote_exact_amount_in(
        &self,
        pool: PoolId,
        token_in: &Coin,
        token_out_denom: &str,
    ) -> Result<u64, PoolError>;

    /// Swap exactly `token_in` for at least `min_out` of `token_out_denom`.
    fn swap_exact_amount_in(
        &mut self,
        pool: PoolId,
        trader: &Account,
        token_in: &Coin,
        token_out_denom: &str,
        min_out: u64,
    ) -> Result<u64, PoolError>;

    /// Price of `token_out` in units of `token_in`, inclusive of swap fee, at
    /// the pool's current time.
    fn spot_price(&self, pool: PoolId, token_in: &str, token_out: &str) -> Result<Decimal, PoolError>;

    /// Bank balance of `account` in `denom`.
    fn balance(&self, account: &Account, denom: &str) -> u64;
}
