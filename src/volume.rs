// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Volume Scheduler
//
// Splits a daily volume target into randomly sized buys that add up to the
// target exactly.

use rand::Rng;

/// Partitions volume into chunks of at most `total / divisor` (never below 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeScheduler {
    divisor: u64,
}

impl Default for VolumeScheduler {
    fn default() -> Self {
        Self { divisor: 500 }
    }
}

impl VolumeScheduler {
    /// A zero divisor is treated as 1 (a single chunk may take the whole total).
    pub fn new(divisor: u64) -> Self {
        Self { divisor: divisor.max(1) }
    }

    /// Largest chunk `partition` may draw for `total`.
    pub fn chunk_cap(&self, total: u64) -> u64 {
        (total / self.divisor).max(1)
    }

    /// Draw chunks uniformly from `[1, min(remaining, cap)]` until nothing
    /// remains. Returns an empty vec for `total == 0`.
    pub fn partition<R: Rng + ?Sized>(&self, total: u64, rng: &mut R) -> Vec<u64> {
        let cap = self.chunk_cap(total);
        let mut amounts = Vec::with_capacity((self.divisor as usize).min(total as usize) * 2);
        let mut remaining = total;
        while remaining > 0 {
            let n = rng.gen_range(1..=remaining.min(cap));
            amounts.push(n);
            remaining -= n;
        }
        amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_partition_conserves_volume() {
        let scheduler = VolumeScheduler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for total in [1u64, 7, 499, 500, 501, 1_000_000, 200_000, 12_345_678] {
            let parts = scheduler.partition(total, &mut rng);
            assert_eq!(parts.iter().sum::<u64>(), total, "total {}", total);
            assert!(parts.iter().all(|&p| p > 0), "zero chunk for {}", total);
        }
    }

    #[test]
    fn test_partition_respects_cap() {
        let scheduler = VolumeScheduler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let parts = scheduler.partition(1_000_000, &mut rng);
        assert!(parts.iter().all(|&p| p <= 2_000));
        // ~1000 draws on average; anything near that shows organic splitting
        assert!(parts.len() > 500, "only {} chunks", parts.len());
    }

    #[test]
    fn test_small_totals_clamp_cap_to_one() {
        let scheduler = VolumeScheduler::default();
        assert_eq!(scheduler.chunk_cap(499), 1);
        assert_eq!(scheduler.chunk_cap(1), 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let parts = scheduler.partition(499, &mut rng);
        assert_eq!(parts, vec![1; 499]);
    }

    #[test]
    fn test_zero_total_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(VolumeScheduler::default().partition(0, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_partition() {
        let scheduler = VolumeScheduler::new(100);
        let a = scheduler.partition(50_000, &mut ChaCha8Rng::seed_from_u64(9));
        let b = scheduler.partition(50_000, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
