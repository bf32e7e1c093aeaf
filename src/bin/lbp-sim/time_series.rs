// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Price Series JSONL Writer
//
// One JSON line per sampled tick, for analysis outside the simulator.

use std::io::Write;
use std::path::Path;

use lbp_sim::PriceObservation;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PriceSnapshot {
    pub tick: usize,
    /// Unix seconds
    pub time: i64,
    pub timestamp: String,
    pub value: Decimal,
    /// Relative change against the previous tick, 0 on the first one.
    pub change: Decimal,
}

pub struct TimeSeriesRecorder {
    snapshots: Vec<PriceSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn from_observations(observations: &[PriceObservation]) -> Self {
        let mut previous: Option<Decimal> = None;
        let snapshots = observations
            .iter()
            .enumerate()
            .map(|(tick, obs)| {
                let change = match previous {
                    Some(p) if !p.is_zero() => (obs.price - p) / p,
                    _ => Decimal::ZERO,
                };
                previous = Some(obs.price);
                PriceSnapshot {
                    tick,
                    time: obs.time.timestamp(),
                    timestamp: obs.time.to_rfc3339(),
                    value: obs.price,
                    change,
                }
            })
            .collect();
        Self { snapshots }
    }

    pub fn write_jsonl(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        file.flush()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_change_is_relative_to_previous_tick() {
        let t = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let observations = vec![
            PriceObservation { time: t, price: dec!(2) },
            PriceObservation { time: t + Duration::minutes(5), price: dec!(1.5) },
        ];
        let recorder = TimeSeriesRecorder::from_observations(&observations);
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.snapshots[0].change, Decimal::ZERO);
        assert_eq!(recorder.snapshots[1].change, dec!(-0.25));
        assert_eq!(recorder.snapshots[1].time, t.timestamp() + 300);
    }
}
