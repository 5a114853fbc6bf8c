//! WASM bindings for the solver
//!
//! This module provides a JavaScript-friendly API: models and options come
//! in as plain objects and solutions go back out the same way.

use wasm_bindgen::prelude::*;

use crate::{Model, Options, Solver};

/// Solve a model with the default options
#[wasm_bindgen]
pub fn solve(model: JsValue) -> Result<JsValue, JsValue> {
    let model: Model =
        serde_wasm_bindgen::from_value(model).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = crate::solve(&model);
    serde_wasm_bindgen::to_value(&solution).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solve a model with explicit options (missing fields take their defaults)
#[wasm_bindgen(js_name = solveWithOptions)]
pub fn solve_with_options(model: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let model: Model =
        serde_wasm_bindgen::from_value(model).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let options: Options =
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = Solver::with_options(options).solve(&model);
    serde_wasm_bindgen::to_value(&solution).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The default options used by the solver
#[wasm_bindgen(js_name = defaultOptions)]
pub fn default_options() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Options::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
