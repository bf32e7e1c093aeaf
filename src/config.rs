// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Configuration
//
// `ConfigInput` is the inbound document exactly as a caller writes it;
// `SimulationConfig` is the resolved, validated form the engine runs on.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::pool::{PoolAsset, PoolParams, SmoothWeightChangeParams};
use crate::types::{is_valid_denom, Coin, DecCoin};

pub const DEFAULT_TOKEN_IN: &str = "uosmo";
pub const DEFAULT_TOKEN_OUT: &str = "ustars";
pub const DEFAULT_TRADERS: usize = 4;
pub const DEFAULT_SLIPPAGE_TOLERANCE: Decimal = dec!(0.01);
/// Longest transition a run accepts.
pub const MAX_DURATION_DAYS: i64 = 365;

// ─── Wire schema ─────────────────────────────────────────────────────────────

/// Inbound configuration document. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigInput {
    /// Initial weights, e.g. `"90ustars,10uosmo"`.
    pub weights: String,
    /// Deposit per asset in the same denom order, e.g. `"50000000000000ustars,125000000000uosmo"`.
    pub initial_deposit: String,
    pub swap_fee: String,
    pub exit_fee: String,
    #[serde(default)]
    pub future_governor: String,
    pub lbp_params: LbpParamsInput,
    pub daily_volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traders: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<String>,
    /// Base-denom units per scheduled volume unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_unit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LbpParamsInput {
    /// RFC 3339. Defaults to the time the run starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// e.g. `"120h"`.
    pub duration: String,
    pub target_pool_weights: String,
}

// ─── Resolved configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub initial_weights: Vec<DecCoin>,
    pub target_weights: Vec<DecCoin>,
    pub deposit: Vec<Coin>,
    pub swap_fee: Decimal,
    pub exit_fee: Decimal,
    pub future_governor: String,
    pub duration: Duration,
    pub start_time: Option<DateTime<Utc>>,
    pub daily_volume: u64,
    pub token_in: String,
    pub token_out: String,
    pub traders: usize,
    pub slippage_tolerance: Decimal,
    pub trade_unit: u64,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let input: ConfigInput =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Malformed(e.to_string()))?;
        Self::from_input(input)
    }

    pub fn from_input(input: ConfigInput) -> Result<Self, ConfigurationError> {
        let config = Self {
            initial_weights: parse_dec_coins("weights", &input.weights)?,
            target_weights: parse_dec_coins("target-pool-weights", &input.lbp_params.target_pool_weights)?,
            deposit: parse_coins("initial-deposit", &input.initial_deposit)?,
            swap_fee: parse_decimal("swap-fee", &input.swap_fee)?,
            exit_fee: parse_decimal("exit-fee", &input.exit_fee)?,
            future_governor: input.future_governor,
            duration: parse_duration(&input.lbp_params.duration)?,
            start_time: input
                .lbp_params
                .start_time
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(parse_start_time)
                .transpose()?,
            daily_volume: input.daily_volume,
            token_in: input.token_in.unwrap_or_else(|| DEFAULT_TOKEN_IN.to_string()),
            token_out: input.token_out.unwrap_or_else(|| DEFAULT_TOKEN_OUT.to_string()),
            traders: input.traders.unwrap_or(DEFAULT_TRADERS),
            slippage_tolerance: input
                .slippage_tolerance
                .as_deref()
                .map(|s| parse_decimal("slippage-tolerance", s))
                .transpose()?
                .unwrap_or(DEFAULT_SLIPPAGE_TOLERANCE),
            trade_unit: input.trade_unit.unwrap_or(1),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every cross-field invariant. Runs again at the start of each
    /// simulation so hand-built configs get the same treatment.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.deposit.len() != self.initial_weights.len() {
            return Err(ConfigurationError::DepositWeightLength {
                deposits: self.deposit.len(),
                weights: self.initial_weights.len(),
            });
        }
        for (index, (deposit, weight)) in self.deposit.iter().zip(&self.initial_weights).enumerate() {
            if deposit.denom != weight.denom {
                return Err(ConfigurationError::DepositWeightOrder {
                    index,
                    deposit: deposit.denom.clone(),
                    weight: weight.denom.clone(),
                });
            }
        }
        if self.target_weights.len() != self.initial_weights.len() {
            return Err(ConfigurationError::TargetWeightLength {
                initial: self.initial_weights.len(),
                target: self.target_weights.len(),
            });
        }
        for (index, (initial, target)) in self.initial_weights.iter().zip(&self.target_weights).enumerate() {
            if initial.denom != target.denom {
                return Err(ConfigurationError::TargetWeightOrder {
                    index,
                    initial: initial.denom.clone(),
                    target: target.denom.clone(),
                });
            }
        }

        check_rate("swap-fee", self.swap_fee)?;
        check_rate("exit-fee", self.exit_fee)?;
        check_rate("slippage-tolerance", self.slippage_tolerance)?;

        if self.duration <= Duration::zero() {
            return Err(ConfigurationError::InvalidDuration(self.duration.to_string()));
        }
        let max = Duration::days(MAX_DURATION_DAYS);
        if self.duration > max {
            return Err(ConfigurationError::DurationTooLong {
                duration: self.duration.to_string(),
                max: max.to_string(),
            });
        }
        if let Some(start) = self.start_time {
            self.transition_end(start)?;
        }
        if self.daily_volume == 0 {
            return Err(ConfigurationError::ZeroDailyVolume);
        }
        if self.trade_unit == 0 {
            return Err(ConfigurationError::ZeroTradeUnit);
        }
        if self.traders == 0 {
            return Err(ConfigurationError::NoTraders);
        }
        if self.token_in == self.token_out {
            return Err(ConfigurationError::SameToken(self.token_in.clone()));
        }
        for token in [&self.token_in, &self.token_out] {
            if !self.deposit.iter().any(|c| &c.denom == token) {
                return Err(ConfigurationError::UnknownToken(token.clone()));
            }
        }
        self.trader_funding()?;
        Ok(())
    }

    /// End of the transition starting at `start`. Fails unless one spare day
    /// past the end is still representable, since the timeline schedules
    /// whole days that may run beyond it.
    pub fn transition_end(&self, start: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigurationError> {
        let out_of_range = || ConfigurationError::TimeOutOfRange {
            start: start.to_rfc3339(),
            duration: self.duration.to_string(),
        };
        let end = start.checked_add_signed(self.duration).ok_or_else(out_of_range)?;
        end.checked_add_signed(Duration::days(1)).ok_or_else(out_of_range)?;
        Ok(end)
    }

    /// Whole days in the transition window, rounded to nearest.
    pub fn total_days(&self) -> u64 {
        (self.duration.num_seconds() as f64 / 86_400.0).round() as u64
    }

    /// Input-asset balance given to every trader: enough for the whole
    /// horizon plus one spare day.
    pub fn trader_funding(&self) -> Result<u64, ConfigurationError> {
        let days = self.total_days();
        days.checked_add(1)
            .and_then(|d| d.checked_mul(self.daily_volume))
            .and_then(|v| v.checked_mul(self.trade_unit))
            .ok_or(ConfigurationError::VolumeOverflow { days, daily_volume: self.daily_volume })
    }

    /// Deposit paired with initial weights, in configuration order.
    pub fn pool_assets(&self) -> Vec<PoolAsset> {
        self.deposit
            .iter()
            .zip(&self.initial_weights)
            .map(|(coin, w)| PoolAsset::new(coin.clone(), w.amount))
            .collect()
    }

    pub fn pool_params(&self, start_time: DateTime<Utc>) -> PoolParams {
        let target_weights = self
            .deposit
            .iter()
            .zip(&self.target_weights)
            .map(|(coin, w)| PoolAsset::new(coin.clone(), w.amount))
            .collect();
        PoolParams {
            swap_fee: self.swap_fee,
            exit_fee: self.exit_fee,
            smooth_weight_change: Some(SmoothWeightChangeParams {
                start_time: Some(start_time),
                duration: self.duration,
                initial_weights: self.pool_assets(),
                target_weights,
            }),
            future_governor: self.future_governor.clone(),
        }
    }
}

// ─── Engine tunables ─────────────────────────────────────────────────────────

/// Knobs of the engine itself, independent of the pool being simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Simulated time between clock ticks and price samples.
    pub step_interval: Duration,
    /// Trades of a day are scheduled in `[day_start, day_start + window)`.
    pub intra_day_window: Duration,
    /// Largest trade is `daily_volume / chunk_divisor` (at least 1).
    pub chunk_divisor: u64,
    /// Extra units of every deposit asset given to the pool creator.
    pub funder_buffer: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            step_interval: Duration::minutes(5),
            intra_day_window: Duration::minutes(1400),
            chunk_divisor: 500,
            funder_buffer: 1_000_000_000,
        }
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn check_rate(field: &'static str, value: Decimal) -> Result<(), ConfigurationError> {
    if value.is_sign_negative() || value >= Decimal::ONE {
        return Err(ConfigurationError::RateOutOfRange { field, value });
    }
    Ok(())
}

fn parse_decimal(field: &'static str, s: &str) -> Result<Decimal, ConfigurationError> {
    Decimal::from_str(s.trim()).map_err(|_| ConfigurationError::InvalidDecimal {
        field,
        value: s.to_string(),
    })
}

/// Split `"<amount><denom>"` at the first character that cannot be part of
/// the amount.
fn split_coin(token: &str) -> Option<(&str, &str)> {
    let at = token.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (amount, denom) = token.split_at(at);
    (!amount.is_empty()).then_some((amount, denom))
}

fn split_list<'a>(field: &'static str, s: &'a str) -> Result<Vec<(&'a str, &'a str)>, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidCoins { field, reason };
    if s.trim().is_empty() {
        return Err(invalid("empty coin list".into()));
    }
    let mut seen: Vec<&str> = Vec::new();
    let mut out = Vec::new();
    for token in s.split(',').map(str::trim) {
        let (amount, denom) = split_coin(token).ok_or_else(|| invalid(format!("malformed coin {:?}", token)))?;
        if !is_valid_denom(denom) {
            return Err(invalid(format!("invalid denom {:?}", denom)));
        }
        if seen.contains(&denom) {
            return Err(invalid(format!("duplicate denom {:?}", denom)));
        }
        seen.push(denom);
        out.push((amount, denom));
    }
    Ok(out)
}

/// Parse `"90ustars,10uosmo"` into decimal coins, keeping the written order.
pub fn parse_dec_coins(field: &'static str, s: &str) -> Result<Vec<DecCoin>, ConfigurationError> {
    split_list(field, s)?
        .into_iter()
        .map(|(amount, denom)| {
            let value = Decimal::from_str(amount).map_err(|_| ConfigurationError::InvalidCoins {
                field,
                reason: format!("invalid amount {:?}", amount),
            })?;
            if value <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidCoins {
                    field,
                    reason: format!("{} must be positive", denom),
                });
            }
            Ok(DecCoin::new(denom, value))
        })
        .collect()
}

/// Parse `"100ustars,5uosmo"` into integer coins, keeping the written order.
pub fn parse_coins(field: &'static str, s: &str) -> Result<Vec<Coin>, ConfigurationError> {
    split_list(field, s)?
        .into_iter()
        .map(|(amount, denom)| {
            let value: u64 = amount.parse().map_err(|_| ConfigurationError::InvalidCoins {
                field,
                reason: format!("invalid integer amount {:?}", amount),
            })?;
            if value == 0 {
                return Err(ConfigurationError::InvalidCoins {
                    field,
                    reason: format!("{} must be positive", denom),
                });
            }
            Ok(Coin::new(denom, value))
        })
        .collect()
}

/// Human-readable duration such as `"120h"`, `"5days"` or `"1h 30m"`.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidDuration(s.to_string());
    let std_duration = humantime::parse_duration(s.trim()).map_err(|_| invalid())?;
    let duration = Duration::from_std(std_duration).map_err(|_| invalid())?;
    if duration <= Duration::zero() {
        return Err(invalid());
    }
    Ok(duration)
}

pub fn parse_start_time(s: &str) -> Result<DateTime<Utc>, ConfigurationError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ConfigurationError::InvalidStartTime(s.to_string()))
}
