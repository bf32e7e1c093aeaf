// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite

pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod pool;
pub mod sampler;
pub mod simulation;
pub mod timeline;
pub mod types;
pub mod volume;
pub mod wasm;

pub use config::{ConfigInput, LbpParamsInput, SimulationConfig, SimulationSettings};
pub use error::{ConfigurationError, PoolError, SimulationError};
pub use pool::{InMemoryLedger, Pool, PoolAsset, PoolId, PoolParams};
pub use simulation::Simulator;
pub use types::*;
