// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Trade Executor
//
// Drains due events from the queue and submits them to the pool one by one,
// so each trade sees the price impact of the ones before it.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use crate::error::{ConfigurationError, PoolError, SimulationError};
use crate::pool::{Pool, PoolId};
use crate::timeline::TradeQueue;
use crate::types::{Account, Coin, TickTrades};

#[derive(Debug, Clone)]
pub struct TradeExecutor {
    pub pool_id: PoolId,
    pub token_in: String,
    pub token_out: String,
    pub traders: Vec<Account>,
    /// Accepted shortfall below the quoted output, e.g. 0.01.
    pub slippage_tolerance: Decimal,
    /// Base-denom units per scheduled volume unit.
    pub trade_unit: u64,
}

impl TradeExecutor {
    /// Lowest acceptable output for a quote.
    pub fn min_out(&self, quote: u64) -> u64 {
        (Decimal::from(quote) * (Decimal::ONE - self.slippage_tolerance))
            .trunc()
            .to_u64()
            .unwrap_or(0)
    }

    /// Execute every event due at `now` in queue order. The first failing
    /// swap aborts with `SwapExecution`; nothing is skipped or retried. A due
    /// event with no trader to submit it is a configuration error.
    pub fn execute_due<P, R>(
        &self,
        pool: &mut P,
        queue: &mut TradeQueue,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<TickTrades, SimulationError>
    where
        P: Pool + ?Sized,
        R: Rng + ?Sized,
    {
        let mut executed = TickTrades::default();
        if self.traders.is_empty() && queue.peek().map_or(false, |e| e.is_due(now)) {
            return Err(ConfigurationError::NoTraders.into());
        }
        while let Some(event) = queue.pop_due(now) {
            let trader = &self.traders[rng.gen_range(0..self.traders.len())];
            let fail = |source: PoolError| SimulationError::SwapExecution {
                trader: trader.clone(),
                amount: event.amount,
                denom: self.token_in.clone(),
                time: now,
                source,
            };

            let units = event
                .amount
                .checked_mul(self.trade_unit)
                .ok_or_else(|| fail(PoolError::Overflow("trade unit")))?;
            let token_in = Coin::new(self.token_in.clone(), units);
            let quote = pool
                .quote_exact_amount_in(self.pool_id, &token_in, &self.token_out)
                .map_err(fail)?;
            let out = pool
                .swap_exact_amount_in(self.pool_id, trader, &token_in, &self.token_out, self.min_out(quote))
                .map_err(fail)?;
            trace!(trader = %trader, amount = event.amount, out, "executed buy");

            executed.volume += event.amount;
            executed.count += 1;
        }
        Ok(executed)
    }
}
