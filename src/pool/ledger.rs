// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - In-Memory Ledger
//
// Reference `Pool` implementation: a bank of account balances plus weighted
// pools whose weights move linearly over an optional transition window.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::math;
use super::{Pool, PoolAsset, PoolId, PoolParams};
use crate::error::PoolError;
use crate::types::{is_valid_denom, Account, Coin};

const MIN_POOL_ASSETS: usize = 2;
const MAX_POOL_ASSETS: usize = 8;

// ---------------------------------------------------------------------------
// WeightedPool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Transition {
    start: DateTime<Utc>,
    duration: Duration,
    initial: Vec<Decimal>,
    target: Vec<Decimal>,
}

#[derive(Debug, Clone)]
struct WeightedPool {
    swap_fee: Decimal,
    /// Charged on exits, which the simulator never performs; kept for queries.
    exit_fee: Decimal,
    future_governor: String,
    /// Balances live here; weights are the ones set at creation.
    assets: Vec<PoolAsset>,
    transition: Option<Transition>,
}

impl WeightedPool {
    fn index_of(&self, denom: &str) -> Result<usize, PoolError> {
        self.assets
            .iter()
            .position(|a| a.denom() == denom)
            .ok_or_else(|| PoolError::UnknownDenom(denom.to_string()))
    }

    fn weight_at(&self, index: usize, now: DateTime<Utc>) -> Decimal {
        match &self.transition {
            Some(t) => {
                let fraction = math::elapsed_fraction(t.start, t.duration, now);
                math::interpolate_weight(t.initial[index], t.target[index], fraction)
            }
            None => self.assets[index].weight,
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// Single-threaded bank + pool keeper. Pool ids are assigned from 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    now: DateTime<Utc>,
    balances: BTreeMap<Account, BTreeMap<String, u64>>,
    pools: Vec<WeightedPool>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger starting its clock at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now, ..Self::default() }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn exit_fee(&self, id: PoolId) -> Result<Decimal, PoolError> {
        self.pool(id).map(|p| p.exit_fee)
    }

    pub fn future_governor(&self, id: PoolId) -> Result<&str, PoolError> {
        self.pool(id).map(|p| p.future_governor.as_str())
    }

    fn pool(&self, id: PoolId) -> Result<&WeightedPool, PoolError> {
        id.checked_sub(1)
            .and_then(|i| self.pools.get(i as usize))
            .ok_or(PoolError::UnknownPool(id))
    }

    fn pool_mut(&mut self, id: PoolId) -> Result<&mut WeightedPool, PoolError> {
        id.checked_sub(1)
            .and_then(|i| self.pools.get_mut(i as usize))
            .ok_or(PoolError::UnknownPool(id))
    }

    fn require_balance(&self, account: &Account, coin: &Coin) -> Result<(), PoolError> {
        let available = self.balance(account, &coin.denom);
        if available < coin.amount {
            return Err(PoolError::InsufficientFunds {
                account: account.clone(),
                denom: coin.denom.clone(),
                available,
                required: coin.amount,
            });
        }
        Ok(())
    }

    fn debit(&mut self, account: &Account, coin: &Coin) -> Result<(), PoolError> {
        self.require_balance(account, coin)?;
        if let Some(bal) = self
            .balances
            .get_mut(account)
            .and_then(|b| b.get_mut(&coin.denom))
        {
            *bal -= coin.amount;
        }
        Ok(())
    }

    fn credit(&mut self, account: &Account, coin: &Coin) -> Result<(), PoolError> {
        let bal = self
            .balances
            .entry(account.clone())
            .or_default()
            .entry(coin.denom.clone())
            .or_insert(0);
        *bal = bal.checked_add(coin.amount).ok_or(PoolError::Overflow("credit"))?;
        Ok(())
    }

    /// Swap output plus the in/out asset indices, with every pre-trade check.
    fn compute_swap(
        &self,
        pool_id: PoolId,
        token_in: &Coin,
        token_out_denom: &str,
    ) -> Result<(usize, usize, u64), PoolError> {
        let pool = self.pool(pool_id)?;
        if token_in.amount == 0 {
            return Err(PoolError::ZeroAmount(token_in.denom.clone()));
        }
        let i = pool.index_of(&token_in.denom)?;
        let o = pool.index_of(token_out_denom)?;
        if i == o {
            return Err(PoolError::InvalidParams(format!(
                "cannot swap {} for itself",
                token_out_denom
            )));
        }

        let balance_in = pool.assets[i].token.amount;
        let balance_out = pool.assets[o].token.amount;
        if Decimal::from(token_in.amount) > Decimal::from(balance_in) * math::MAX_IN_RATIO {
            return Err(PoolError::MaxInRatio { amount: token_in.amount, balance: balance_in });
        }

        let out = math::out_given_in(
            balance_in,
            pool.weight_at(i, self.now),
            balance_out,
            pool.weight_at(o, self.now),
            token_in.amount,
            pool.swap_fee,
        )?;
        if out == 0 {
            return Err(PoolError::ZeroOutput(token_in.to_string()));
        }
        Ok((i, o, out))
    }
}

fn validate_coins(coins: &[Coin]) -> Result<(), PoolError> {
    for coin in coins {
        if !is_valid_denom(&coin.denom) {
            return Err(PoolError::InvalidDenom(coin.denom.clone()));
        }
        if coin.amount == 0 {
            return Err(PoolError::ZeroAmount(coin.denom.clone()));
        }
    }
    Ok(())
}

fn validate_rate(name: &str, rate: Decimal) -> Result<(), PoolError> {
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(PoolError::InvalidParams(format!("{} must be in [0, 1), got {}", name, rate)));
    }
    Ok(())
}

fn aligned_weights(
    assets: &[PoolAsset],
    weights: &[PoolAsset],
    label: &str,
) -> Result<Vec<Decimal>, PoolError> {
    if assets.len() != weights.len() {
        return Err(PoolError::InvalidParams(format!(
            "{} weights cover {} assets, pool has {}",
            label,
            weights.len(),
            assets.len()
        )));
    }
    assets
        .iter()
        .zip(weights)
        .map(|(asset, w)| {
            if asset.denom() != w.denom() {
                Err(PoolError::InvalidParams(format!(
                    "{} weight denom {} does not match pool asset {}",
                    label,
                    w.denom(),
                    asset.denom()
                )))
            } else if w.weight <= Decimal::ZERO {
                Err(PoolError::InvalidParams(format!("{} weight of {} must be positive", label, w.denom())))
            } else {
                Ok(w.weight)
            }
        })
        .collect()
}

impl Pool for InMemoryLedger {
    fn fund(&mut self, account: &Account, coins: &[Coin]) -> Result<(), PoolError> {
        validate_coins(coins)?;
        // Check for overflow before touching any balance.
        for coin in coins {
            self.balance(account, &coin.denom)
                .checked_add(coin.amount)
                .ok_or(PoolError::Overflow("fund"))?;
        }
        for coin in coins {
            self.credit(account, coin)?;
        }
        Ok(())
    }

    fn create_pool(
        &mut self,
        creator: &Account,
        params: PoolParams,
        assets: Vec<PoolAsset>,
    ) -> Result<PoolId, PoolError> {
        if !(MIN_POOL_ASSETS..=MAX_POOL_ASSETS).contains(&assets.len()) {
            return Err(PoolError::InvalidParams(format!(
                "pool needs {}..={} assets, got {}",
                MIN_POOL_ASSETS,
                MAX_POOL_ASSETS,
                assets.len()
            )));
        }
        let tokens: Vec<Coin> = assets.iter().map(|a| a.token.clone()).collect();
        validate_coins(&tokens)?;
        for (i, asset) in assets.iter().enumerate() {
            if assets[..i].iter().any(|a| a.denom() == asset.denom()) {
                return Err(PoolError::InvalidParams(format!("duplicate denom {}", asset.denom())));
            }
            if asset.weight <= Decimal::ZERO {
                return Err(PoolError::InvalidParams(format!(
                    "weight of {} must be positive",
                    asset.denom()
                )));
            }
        }
        validate_rate("swap fee", params.swap_fee)?;
        validate_rate("exit fee", params.exit_fee)?;

        let transition = match params.smooth_weight_change {
            Some(swc) => {
                if swc.duration <= Duration::zero() {
                    return Err(PoolError::InvalidParams("transition duration must be positive".into()));
                }
                Some(Transition {
                    start: swc.start_time.unwrap_or(self.now),
                    duration: swc.duration,
                    initial: aligned_weights(&assets, &swc.initial_weights, "initial")?,
                    target: aligned_weights(&assets, &swc.target_weights, "target")?,
                })
            }
            None => None,
        };

        for token in &tokens {
            self.require_balance(creator, token)?;
        }
        for token in &tokens {
            self.debit(creator, token)?;
        }

        let governor = params.future_governor;
        self.pools.push(WeightedPool {
            swap_fee: params.swap_fee,
            exit_fee: params.exit_fee,
            future_governor: governor.clone(),
            assets,
            transition,
        });
        let id = self.pools.len() as PoolId;
        debug!(
            pool_id = id,
            creator = %creator,
            future_governor = %governor,
            "created weighted pool"
        );
        Ok(id)
    }

    fn get_asset(&self, pool_id: PoolId, denom: &str) -> Result<PoolAsset, PoolError> {
        let pool = self.pool(pool_id)?;
        let i = pool.index_of(denom)?;
        Ok(PoolAsset::new(pool.assets[i].token.clone(), pool.weight_at(i, self.now)))
    }

    fn advance_time(&mut self, pool_id: PoolId, time: DateTime<Utc>) -> Result<(), PoolError> {
        self.pool(pool_id)?;
        if time > self.now {
            self.now = time;
        }
        Ok(())
    }

    fn quote_exact_amount_in(
        &self,
        pool_id: PoolId,
        token_in: &Coin,
        token_out_denom: &str,
    ) -> Result<u64, PoolError> {
        self.compute_swap(pool_id, token_in, token_out_denom)
            .map(|(_, _, out)| out)
    }

    fn swap_exact_amount_in(
        &mut self,
        pool_id: PoolId,
        trader: &Account,
        token_in: &Coin,
        token_out_denom: &str,
        min_out: u64,
    ) -> Result<u64, PoolError> {
        let (i, o, out) = self.compute_swap(pool_id, token_in, token_out_denom)?;
        if out < min_out {
            return Err(PoolError::SlippageExceeded { out, min: min_out });
        }
        self.require_balance(trader, token_in)?;

        let pool = self.pool(pool_id)?;
        let new_in = pool.assets[i]
            .token
            .amount
            .checked_add(token_in.amount)
            .ok_or(PoolError::Overflow("swap"))?;
        let new_out = pool.assets[o]
            .token
            .amount
            .checked_sub(out)
            .ok_or(PoolError::Overflow("swap"))?;
        let received = Coin::new(token_out_denom, out);
        self.balance(trader, token_out_denom)
            .checked_add(out)
            .ok_or(PoolError::Overflow("swap"))?;

        self.debit(trader, token_in)?;
        self.credit(trader, &received)?;
        let pool = self.pool_mut(pool_id)?;
        pool.assets[i].token.amount = new_in;
        pool.assets[o].token.amount = new_out;
        Ok(out)
    }

    fn spot_price(&self, pool_id: PoolId, token_in: &str, token_out: &str) -> Result<Decimal, PoolError> {
        let pool = self.pool(pool_id)?;
        let i = pool.index_of(token_in)?;
        let o = pool.index_of(token_out)?;
        math::spot_price_with_fee(
            pool.assets[i].token.amount,
            pool.weight_at(i, self.now),
            pool.assets[o].token.amount,
            pool.weight_at(o, self.now),
            pool.swap_fee,
        )
    }

    fn balance(&self, account: &Account, denom: &str) -> u64 {
        self.balances
            .get(account)
            .and_then(|b| b.get(denom))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SmoothWeightChangeParams;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
    }

    fn lbp_assets(stars_w: Decimal, osmo_w: Decimal) -> Vec<PoolAsset> {
        vec![
            PoolAsset::new(Coin::new("ustars", 50_000_000), stars_w),
            PoolAsset::new(Coin::new("uosmo", 1_000_000), osmo_w),
        ]
    }

    fn lbp_params() -> PoolParams {
        PoolParams {
            swap_fee: dec!(0.003),
            exit_fee: dec!(0.001),
            smooth_weight_change: Some(SmoothWeightChangeParams {
                start_time: Some(t0()),
                duration: Duration::hours(10),
                initial_weights: lbp_assets(dec!(90), dec!(10)),
                target_weights: lbp_assets(dec!(1), dec!(1)),
            }),
            future_governor: "24h".into(),
        }
    }

    fn funded_ledger() -> (InMemoryLedger, PoolId) {
        let mut ledger = InMemoryLedger::at(t0());
        let funder = Account::funder();
        ledger
            .fund(&funder, &[Coin::new("ustars", 60_000_000), Coin::new("uosmo", 2_000_000)])
            .unwrap();
        let id = ledger
            .create_pool(&funder, lbp_params(), lbp_assets(dec!(90), dec!(10)))
            .unwrap();
        (ledger, id)
    }

    #[test]
    fn test_create_pool_debits_creator() {
        let (ledger, id) = funded_ledger();
        assert_eq!(id, 1);
        assert_eq!(ledger.balance(&Account::funder(), "ustars"), 10_000_000);
        assert_eq!(ledger.balance(&Account::funder(), "uosmo"), 1_000_000);
        let asset = ledger.get_asset(id, "ustars").unwrap();
        assert_eq!(asset.token.amount, 50_000_000);
        assert_eq!(asset.weight, dec!(90));
        assert_eq!(ledger.exit_fee(id).unwrap(), dec!(0.001));
        assert_eq!(ledger.future_governor(id).unwrap(), "24h");
        assert_eq!(ledger.exit_fee(2), Err(PoolError::UnknownPool(2)));
    }

    #[test]
    fn test_create_pool_insufficient_funds_leaves_balances() {
        let mut ledger = InMemoryLedger::at(t0());
        let funder = Account::funder();
        ledger.fund(&funder, &[Coin::new("ustars", 60_000_000)]).unwrap();
        let err = ledger
            .create_pool(&funder, lbp_params(), lbp_assets(dec!(90), dec!(10)))
            .unwrap_err();
        assert!(matches!(err, PoolError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance(&funder, "ustars"), 60_000_000);
        assert_eq!(ledger.pool_count(), 0);
    }

    #[test]
    fn test_create_pool_rejects_bad_params() {
        let mut ledger = InMemoryLedger::at(t0());
        let funder = Account::funder();
        ledger
            .fund(&funder, &[Coin::new("ustars", 60_000_000), Coin::new("uosmo", 2_000_000)])
            .unwrap();

        let mut params = lbp_params();
        params.swap_fee = dec!(1);
        assert!(matches!(
            ledger.create_pool(&funder, params, lbp_assets(dec!(90), dec!(10))),
            Err(PoolError::InvalidParams(_))
        ));

        let single = vec![PoolAsset::new(Coin::new("ustars", 1), dec!(1))];
        assert!(matches!(
            ledger.create_pool(&funder, lbp_params(), single),
            Err(PoolError::InvalidParams(_))
        ));

        let mut params = lbp_params();
        if let Some(swc) = params.smooth_weight_change.as_mut() {
            swc.target_weights.reverse();
        }
        assert!(matches!(
            ledger.create_pool(&funder, params, lbp_assets(dec!(90), dec!(10))),
            Err(PoolError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_fund_rejects_invalid_denom() {
        let mut ledger = InMemoryLedger::new();
        let err = ledger
            .fund(&Account::trader(0), &[Coin::new("uosmo", 1), Coin::new("9bad", 1)])
            .unwrap_err();
        assert_eq!(err, PoolError::InvalidDenom("9bad".into()));
        assert_eq!(ledger.balance(&Account::trader(0), "uosmo"), 0);
    }

    #[test]
    fn test_weights_interpolate_with_time() {
        let (mut ledger, id) = funded_ledger();
        ledger.advance_time(id, t0() + Duration::hours(5)).unwrap();
        assert_eq!(ledger.get_asset(id, "ustars").unwrap().weight, dec!(45.5));
        assert_eq!(ledger.get_asset(id, "uosmo").unwrap().weight, dec!(5.5));

        ledger.advance_time(id, t0() + Duration::hours(20)).unwrap();
        assert_eq!(ledger.get_asset(id, "ustars").unwrap().weight, dec!(1));

        // time never moves backward
        ledger.advance_time(id, t0()).unwrap();
        assert_eq!(ledger.get_asset(id, "ustars").unwrap().weight, dec!(1));
    }

    #[test]
    fn test_spot_price_falls_as_weights_converge() {
        let (mut ledger, id) = funded_ledger();
        let start = ledger.spot_price(id, "uosmo", "ustars").unwrap();
        ledger.advance_time(id, t0() + Duration::hours(10)).unwrap();
        let end = ledger.spot_price(id, "uosmo", "ustars").unwrap();
        assert!(end < start, "{} !< {}", end, start);
    }

    #[test]
    fn test_swap_moves_balances_and_price() {
        let (mut ledger, id) = funded_ledger();
        let trader = Account::trader(0);
        ledger.fund(&trader, &[Coin::new("uosmo", 10_000)]).unwrap();
        let before = ledger.spot_price(id, "uosmo", "ustars").unwrap();

        let token_in = Coin::new("uosmo", 1_000);
        let quote = ledger.quote_exact_amount_in(id, &token_in, "ustars").unwrap();
        let out = ledger
            .swap_exact_amount_in(id, &trader, &token_in, "ustars", quote)
            .unwrap();
        assert_eq!(out, quote);
        assert_eq!(ledger.balance(&trader, "uosmo"), 9_000);
        assert_eq!(ledger.balance(&trader, "ustars"), out);
        assert_eq!(ledger.get_asset(id, "uosmo").unwrap().token.amount, 1_001_000);
        assert_eq!(ledger.get_asset(id, "ustars").unwrap().token.amount, 50_000_000 - out);

        let after = ledger.spot_price(id, "uosmo", "ustars").unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_swap_failures_leave_state_untouched() {
        let (mut ledger, id) = funded_ledger();
        let trader = Account::trader(0);
        ledger.fund(&trader, &[Coin::new("uosmo", 100)]).unwrap();

        let err = ledger
            .swap_exact_amount_in(id, &trader, &Coin::new("uosmo", 1_000), "ustars", 0)
            .unwrap_err();
        assert!(matches!(err, PoolError::InsufficientFunds { .. }));

        let err = ledger
            .swap_exact_amount_in(id, &trader, &Coin::new("uosmo", 50), "ustars", u64::MAX)
            .unwrap_err();
        assert!(matches!(err, PoolError::SlippageExceeded { .. }));

        let err = ledger
            .quote_exact_amount_in(id, &Coin::new("uosmo", 600_000), "ustars")
            .unwrap_err();
        assert!(matches!(err, PoolError::MaxInRatio { .. }));

        assert_eq!(ledger.balance(&trader, "uosmo"), 100);
        assert_eq!(ledger.get_asset(id, "uosmo").unwrap().token.amount, 1_000_000);
    }

    #[test]
    fn test_unknown_pool_and_denom() {
        let (ledger, id) = funded_ledger();
        assert_eq!(ledger.get_asset(id + 1, "uosmo"), Err(PoolError::UnknownPool(id + 1)));
        assert_eq!(ledger.get_asset(0, "uosmo"), Err(PoolError::UnknownPool(0)));
        assert_eq!(
            ledger.spot_price(id, "uatom", "ustars"),
            Err(PoolError::UnknownDenom("uatom".into()))
        );
    }
}
