// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Price Sampler

use chrono::{DateTime, Utc};

use crate::error::SimulationError;
use crate::pool::{Pool, PoolId};
use crate::types::PriceObservation;

/// Append-only spot-price series, one observation per clock tick.
#[derive(Debug, Clone)]
pub struct PriceSampler {
    pool_id: PoolId,
    token_in: String,
    token_out: String,
    observations: Vec<PriceObservation>,
}

impl PriceSampler {
    pub fn new(pool_id: PoolId, token_in: impl Into<String>, token_out: impl Into<String>) -> Self {
        Self {
            pool_id,
            token_in: token_in.into(),
            token_out: token_out.into(),
            observations: Vec::new(),
        }
    }

    pub fn with_capacity(mut self, ticks: usize) -> Self {
        self.observations.reserve(ticks);
        self
    }

    /// Record the fee-inclusive spot price of `token_out` in `token_in`.
    pub fn sample<P: Pool + ?Sized>(
        &mut self,
        pool: &P,
        now: DateTime<Utc>,
    ) -> Result<PriceObservation, SimulationError> {
        let price = pool
            .spot_price(self.pool_id, &self.token_in, &self.token_out)
            .map_err(|source| SimulationError::PoolQuery { time: now, source })?;
        let observation = PriceObservation { time: now, price };
        self.observations.push(observation);
        Ok(observation)
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn into_series(self) -> Vec<PriceObservation> {
        self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;
    use crate::pool::{InMemoryLedger, PoolAsset, PoolParams};
    use crate::types::{Account, Coin};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ledger_with_pool() -> (InMemoryLedger, PoolId) {
        let mut ledger = InMemoryLedger::new();
        let funder = Account::funder();
        ledger
            .fund(&funder, &[Coin::new("ustars", 4_000), Coin::new("uosmo", 1_000)])
            .unwrap();
        let params = PoolParams {
            swap_fee: Decimal::ZERO,
            exit_fee: Decimal::ZERO,
            smooth_weight_change: None,
            future_governor: String::new(),
        };
        let assets = vec![
            PoolAsset::new(Coin::new("ustars", 4_000), dec!(1)),
            PoolAsset::new(Coin::new("uosmo", 1_000), dec!(1)),
        ];
        let id = ledger.create_pool(&funder, params, assets).unwrap();
        (ledger, id)
    }

    #[test]
    fn test_sample_every_call_appends() {
        let (ledger, id) = ledger_with_pool();
        let mut sampler = PriceSampler::new(id, "uosmo", "ustars").with_capacity(3);
        let t = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        for i in 0..3 {
            let obs = sampler.sample(&ledger, t + Duration::minutes(5 * i)).unwrap();
            assert_eq!(obs.price, dec!(0.25));
        }
        let series = sampler.into_series();
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].time - series[0].time, Duration::minutes(10));
    }

    #[test]
    fn test_unknown_denom_is_pool_query_error() {
        let (ledger, id) = ledger_with_pool();
        let mut sampler = PriceSampler::new(id, "uatom", "ustars");
        let err = sampler.sample(&ledger, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::PoolQuery { source: PoolError::UnknownDenom(_), .. }
        ));
        assert!(sampler.observations().is_empty());
    }
}
