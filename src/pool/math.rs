// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Weighted Pool Math
//
// Balancer-style weighted invariant. All arithmetic is checked `Decimal`;
// token amounts are truncated to whole units on the way out.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::PoolError;

/// Largest single swap input, as a fraction of the pool's input balance.
pub const MAX_IN_RATIO: Decimal = dec!(0.5);

/// Spot price of `out` denominated in `in`, scaled by `1 / (1 - swap_fee)`.
pub fn spot_price_with_fee(
    balance_in: u64,
    weight_in: Decimal,
    balance_out: u64,
    weight_out: Decimal,
    swap_fee: Decimal,
) -> Result<Decimal, PoolError> {
    let numer = Decimal::from(balance_in)
        .checked_div(weight_in)
        .ok_or(PoolError::Overflow("spot price"))?;
    let denom = Decimal::from(balance_out)
        .checked_div(weight_out)
        .ok_or(PoolError::Overflow("spot price"))?;
    let spot = numer.checked_div(denom).ok_or(PoolError::Overflow("spot price"))?;
    let scale = Decimal::ONE
        .checked_div(Decimal::ONE - swap_fee)
        .ok_or(PoolError::Overflow("spot price"))?;
    spot.checked_mul(scale).ok_or(PoolError::Overflow("spot price"))
}

/// Tokens out for exactly `amount_in` tokens in:
///
/// `out = B_out * (1 - (B_in / (B_in + in * (1 - fee))) ^ (W_in / W_out))`
pub fn out_given_in(
    balance_in: u64,
    weight_in: Decimal,
    balance_out: u64,
    weight_out: Decimal,
    amount_in: u64,
    swap_fee: Decimal,
) -> Result<u64, PoolError> {
    let overflow = || PoolError::Overflow("out given in");

    let in_after_fee = Decimal::from(amount_in)
        .checked_mul(Decimal::ONE - swap_fee)
        .ok_or_else(overflow)?;
    let before = Decimal::from(balance_in);
    let after = before.checked_add(in_after_fee).ok_or_else(overflow)?;
    let y = before.checked_div(after).ok_or_else(overflow)?;
    let weight_ratio = weight_in.checked_div(weight_out).ok_or_else(overflow)?;
    let y_pow = y.checked_powd(weight_ratio).ok_or_else(overflow)?;
    let out = Decimal::from(balance_out)
        .checked_mul(Decimal::ONE - y_pow)
        .ok_or_else(overflow)?;

    // powd can land a hair above 1 for tiny inputs
    if out.is_sign_negative() {
        return Ok(0);
    }
    out.trunc().to_u64().ok_or_else(overflow)
}

/// Fraction of the transition elapsed at `now`, clamped to `[0, 1]`.
pub fn elapsed_fraction(start: DateTime<Utc>, duration: Duration, now: DateTime<Utc>) -> Decimal {
    if now <= start {
        return Decimal::ZERO;
    }
    let total = duration.num_milliseconds();
    if total <= 0 {
        return Decimal::ONE;
    }
    let elapsed = (now - start).num_milliseconds();
    if elapsed >= total {
        return Decimal::ONE;
    }
    Decimal::from(elapsed) / Decimal::from(total)
}

/// `initial + (target - initial) * fraction`.
pub fn interpolate_weight(initial: Decimal, target: Decimal, fraction: Decimal) -> Decimal {
    initial + (target - initial) * fraction
}
