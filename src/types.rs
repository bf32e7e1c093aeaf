// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Type Definitions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Account ─────────────────────────────────────────────────────────────────

/// Ledger identity: the pool creator or one of the simulated traders.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Account(pub String);

impl Account {
    pub fn funder() -> Self {
        Account("funder".to_string())
    }

    /// Trader identities are 1-based: `trader-1`, `trader-2`, ...
    pub fn trader(index: usize) -> Self {
        Account(format!("trader-{}", index + 1))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Account(s.to_string())
    }
}

// ─── Coins ───────────────────────────────────────────────────────────────────

/// Denoms follow the cosmos-sdk rule `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    let first_ok = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    first_ok
        && (3..=128).contains(&denom.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

/// Integer amount of a single denom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self { denom: denom.into(), amount }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Decimal amount of a single denom; used for pool weights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Decimal,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Self {
        Self { denom: denom.into(), amount }
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ─── TradeEvent ──────────────────────────────────────────────────────────────

/// A scheduled synthetic buy of `amount` units of the input asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub amount: u64,
    pub scheduled_time: DateTime<Utc>,
}

impl TradeEvent {
    pub fn new(amount: u64, scheduled_time: DateTime<Utc>) -> Self {
        Self { amount, scheduled_time }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_time <= now
    }
}

// ─── PriceObservation ────────────────────────────────────────────────────────

/// One spot-price sample. Serialized as `{"time": <unix secs>, "value": "<dec>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    #[serde(rename = "value")]
    pub price: Decimal,
}

// ─── SimulationResult ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(rename = "data")]
    pub prices: Vec<PriceObservation>,
    pub daily_volume: u64,
    pub total_volume: u64,
    #[serde(rename = "total_buys")]
    pub total_trades: u64,
}

impl SimulationResult {
    pub fn first_price(&self) -> Option<Decimal> {
        self.prices.first().map(|p| p.price)
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.prices.last().map(|p| p.price)
    }
}

// ─── TickTrades ──────────────────────────────────────────────────────────────

/// Totals of the trades executed during a single clock tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTrades {
    pub volume: u64,
    pub count: u64,
}
