// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - WASM Interface

use wasm_bindgen::prelude::*;

use crate::config::{ConfigInput, SimulationConfig};
use crate::simulation::Simulator;

/// Run one simulation from a `ConfigInput` object. Any failure is returned
/// as a JS string and no partial series is produced.
#[wasm_bindgen]
pub fn simulate(config: JsValue, seed: u64) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let input: ConfigInput = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("malformed configuration: {}", e)))?;
    let config = SimulationConfig::from_input(input).map_err(to_js_error)?;
    let result = Simulator::new(config, seed).run().map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
