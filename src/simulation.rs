// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Simulation Core
//
// Validates the configuration, funds accounts, creates the pool, builds the
// trade timeline and drives the clock loop to produce a `SimulationResult`.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::clock::SimulationClock;
use crate::config::{SimulationConfig, SimulationSettings};
use crate::error::{ConfigurationError, PoolError, SimulationError};
use crate::executor::TradeExecutor;
use crate::pool::{InMemoryLedger, Pool, PoolId};
use crate::sampler::PriceSampler;
use crate::timeline::TradeTimeline;
use crate::types::{Account, Coin, SimulationResult};
use crate::volume::VolumeScheduler;

// ─── Simulator struct ────────────────────────────────────────────────────────

/// One seeded simulation run against a `Pool` backend.
pub struct Simulator<P = InMemoryLedger> {
    config: SimulationConfig,
    settings: SimulationSettings,
    seed: u64,
    pool: P,
}

impl Simulator<InMemoryLedger> {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::with_pool(config, seed, InMemoryLedger::new())
    }
}

impl<P: Pool> Simulator<P> {
    pub fn with_pool(config: SimulationConfig, seed: u64, pool: P) -> Self {
        Self {
            config,
            settings: SimulationSettings::default(),
            seed,
            pool,
        }
    }

    pub fn with_settings(mut self, settings: SimulationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run to completion. Either the whole run succeeds or nothing is returned.
    pub fn run(self) -> Result<SimulationResult, SimulationError> {
        self.run_with_pool().map(|(result, _)| result)
    }

    /// Like [`Simulator::run`], also handing back the pool backend so its
    /// final balances can be inspected.
    #[tracing::instrument(name = "simulation", skip_all, fields(seed = self.seed))]
    pub fn run_with_pool(mut self) -> Result<(SimulationResult, P), SimulationError> {
        // 1. Validate
        self.config.validate()?;
        self.validate_settings()?;
        let trader_funding = self.config.trader_funding()?;
        let start = self
            .config
            .start_time
            .unwrap_or_else(|| Utc::now().trunc_subsecs(0));
        self.config.transition_end(start)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        info!(
            %start,
            duration_hours = self.config.duration.num_hours(),
            daily_volume = self.config.daily_volume,
            "starting LBP simulation"
        );

        // 2. Fund
        let funder = Account::funder();
        let traders: Vec<Account> = (0..self.config.traders).map(Account::trader).collect();
        self.fund_accounts(&funder, &traders, trader_funding)?;

        // 3. Create pool
        let pool_id = self
            .pool
            .create_pool(&funder, self.config.pool_params(start), self.config.pool_assets())
            .map_err(SimulationError::PoolCreation)?;
        self.advance_pool(pool_id, start)?;
        for coin in &self.config.deposit {
            if let Ok(asset) = self.pool.get_asset(pool_id, &coin.denom) {
                debug!(pool_id, denom = %coin.denom, balance = asset.token.amount, weight = %asset.weight, "pool asset");
            }
        }

        // 4. Build timeline
        let timeline = TradeTimeline {
            start,
            days: self.config.total_days(),
            daily_volume: self.config.daily_volume,
            intra_day_window: self.settings.intra_day_window,
            scheduler: VolumeScheduler::new(self.settings.chunk_divisor),
        };
        let mut queue = timeline.build(&mut rng)?;
        debug!(events = queue.len(), volume = queue.total_volume(), "trade timeline built");

        // 5. Clock loop
        let mut clock = SimulationClock::new(start, self.config.duration, self.settings.step_interval)?;
        let executor = TradeExecutor {
            pool_id,
            token_in: self.config.token_in.clone(),
            token_out: self.config.token_out.clone(),
            traders,
            slippage_tolerance: self.config.slippage_tolerance,
            trade_unit: self.config.trade_unit,
        };
        let mut sampler = PriceSampler::new(pool_id, &self.config.token_in, &self.config.token_out)
            .with_capacity(clock.total_ticks() as usize);
        let mut total_volume = 0u64;
        let mut total_trades = 0u64;

        while clock.is_running() {
            let now = clock.now();
            self.advance_pool(pool_id, now)?;
            let tick = executor.execute_due(&mut self.pool, &mut queue, now, &mut rng)?;
            total_volume += tick.volume;
            total_trades += tick.count;
            sampler.sample(&self.pool, now)?;
            clock.advance();
        }

        if !queue.is_empty() {
            warn!(
                remaining = queue.len(),
                volume = queue.total_volume(),
                "trades scheduled at or after the transition end were not executed"
            );
        }

        // 6. Assemble
        let result = SimulationResult {
            prices: sampler.into_series(),
            daily_volume: self.config.daily_volume,
            total_volume,
            total_trades,
        };
        info!(
            samples = result.prices.len(),
            total_volume,
            total_trades,
            "LBP simulation finished"
        );
        Ok((result, self.pool))
    }

    fn validate_settings(&self) -> Result<(), ConfigurationError> {
        if self.settings.step_interval <= Duration::zero() {
            return Err(ConfigurationError::InvalidDuration(self.settings.step_interval.to_string()));
        }
        if self.settings.intra_day_window <= Duration::zero() {
            return Err(ConfigurationError::InvalidDuration(self.settings.intra_day_window.to_string()));
        }
        Ok(())
    }

    /// Pool creator gets every deposit asset plus a buffer; each trader gets
    /// `trader_funding` of the input asset.
    fn fund_accounts(
        &mut self,
        funder: &Account,
        traders: &[Account],
        trader_funding: u64,
    ) -> Result<(), SimulationError> {
        let funding_error = |account: &Account, source: PoolError| SimulationError::Funding {
            account: account.clone(),
            source,
        };

        let funder_coins = self
            .config
            .deposit
            .iter()
            .map(|c| {
                c.amount
                    .checked_add(self.settings.funder_buffer)
                    .map(|amount| Coin::new(c.denom.clone(), amount))
                    .ok_or_else(|| funding_error(funder, PoolError::Overflow("funder buffer")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.pool
            .fund(funder, &funder_coins)
            .map_err(|e| funding_error(funder, e))?;

        let trader_coins = [Coin::new(self.config.token_in.clone(), trader_funding)];
        for trader in traders {
            self.pool
                .fund(trader, &trader_coins)
                .map_err(|e| funding_error(trader, e))?;
        }
        Ok(())
    }

    fn advance_pool(&mut self, pool_id: PoolId, now: DateTime<Utc>) -> Result<(), SimulationError> {
        self.pool
            .advance_time(pool_id, now)
            .map_err(|source| SimulationError::PoolQuery { time: now, source })
    }
}
