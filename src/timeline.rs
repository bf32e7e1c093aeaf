// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Trade Timeline
//
// Per-day volume partitions get random intra-day timestamps, then all days
// are merged into one queue ordered by scheduled time.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::types::TradeEvent;
use crate::volume::VolumeScheduler;

// ─── TradeQueue ──────────────────────────────────────────────────────────────

/// Trade events in non-decreasing `scheduled_time` order. Only ever drained
/// from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeQueue {
    events: VecDeque<TradeEvent>,
}

impl TradeQueue {
    /// Sorts `events` by scheduled time; ties keep no particular order.
    pub fn from_events(mut events: Vec<TradeEvent>) -> Self {
        events.sort_unstable_by_key(|e| e.scheduled_time);
        Self { events: events.into() }
    }

    /// Remove and return the head event if it is due at `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<TradeEvent> {
        if self.events.front()?.is_due(now) {
            self.events.pop_front()
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&TradeEvent> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_volume(&self) -> u64 {
        self.events.iter().map(|e| e.amount).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TradeEvent> {
        self.events.iter()
    }
}

// ─── TradeTimeline ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TradeTimeline {
    pub start: DateTime<Utc>,
    pub days: u64,
    pub daily_volume: u64,
    /// Offsets are whole minutes drawn from `[0, window)`.
    pub intra_day_window: Duration,
    pub scheduler: VolumeScheduler,
}

impl TradeTimeline {
    /// Build the full queue. For every day the partition draws come first,
    /// then one offset draw per partitioned amount. Fails if a scheduled time
    /// falls outside the representable range.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TradeQueue, ConfigurationError> {
        let window_minutes = self.intra_day_window.num_minutes().max(1);
        let out_of_range = |at: DateTime<Utc>, span: Duration| ConfigurationError::TimeOutOfRange {
            start: at.to_rfc3339(),
            duration: span.to_string(),
        };
        let mut events = Vec::new();
        let mut day_start = self.start;
        for day in 0..self.days {
            if day > 0 {
                day_start = day_start
                    .checked_add_signed(Duration::days(1))
                    .ok_or_else(|| out_of_range(day_start, Duration::days(1)))?;
            }
            let amounts = self.scheduler.partition(self.daily_volume, rng);
            debug!(day, trades = amounts.len(), "scheduled day");
            for amount in amounts {
                let offset = Duration::minutes(rng.gen_range(0..window_minutes));
                let at = day_start
                    .checked_add_signed(offset)
                    .ok_or_else(|| out_of_range(day_start, offset))?;
                events.push(TradeEvent::new(amount, at));
            }
        }
        Ok(TradeQueue::from_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap()
    }

    fn timeline(days: u64, daily_volume: u64) -> TradeTimeline {
        TradeTimeline {
            start: start(),
            days,
            daily_volume,
            intra_day_window: Duration::minutes(1400),
            scheduler: VolumeScheduler::default(),
        }
    }

    #[test]
    fn test_queue_is_sorted_and_inside_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let queue = timeline(5, 200_000).build(&mut rng).unwrap();
        let end = start() + Duration::hours(120);

        let times: Vec<_> = queue.iter().map(|e| e.scheduled_time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "queue out of order");
        assert!(times.iter().all(|t| *t >= start() && *t < end));
    }

    #[test]
    fn test_per_day_volume_is_conserved() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let queue = timeline(5, 200_000).build(&mut rng).unwrap();
        let mut per_day = [0u64; 5];
        for e in queue.iter() {
            let day = (e.scheduled_time - start()).num_days() as usize;
            per_day[day] += e.amount;
        }
        assert_eq!(per_day, [200_000; 5]);
        assert_eq!(queue.total_volume(), 1_000_000);
    }

    #[test]
    fn test_offsets_stay_inside_intra_day_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let queue = timeline(3, 10_000).build(&mut rng).unwrap();
        for e in queue.iter() {
            let into_day = (e.scheduled_time - start()).num_minutes() % 1440;
            assert!(into_day < 1400, "offset {} past window", into_day);
        }
    }

    #[test]
    fn test_zero_days_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(timeline(0, 1_000).build(&mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_pop_due_drains_in_order() {
        let t = start();
        let mut queue = TradeQueue::from_events(vec![
            TradeEvent::new(3, t + Duration::minutes(10)),
            TradeEvent::new(1, t),
            TradeEvent::new(2, t + Duration::minutes(5)),
        ]);
        assert_eq!(queue.pop_due(t + Duration::minutes(5)).map(|e| e.amount), Some(1));
        assert_eq!(queue.pop_due(t + Duration::minutes(5)).map(|e| e.amount), Some(2));
        assert_eq!(queue.pop_due(t + Duration::minutes(5)), None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().map(|e| e.amount), Some(3));
    }

    #[test]
    fn test_schedule_past_time_range_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut late = timeline(3, 1_000);
        late.start = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let err = late.build(&mut rng).unwrap_err();
        assert!(matches!(err, ConfigurationError::TimeOutOfRange { .. }));
    }
}
