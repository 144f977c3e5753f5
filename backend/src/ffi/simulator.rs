//! PyO3 wrapper for Orchestrator
//!
//! Exposes the orchestrator to Python as `Simulator`, configured from a JSON
//! model and returning JSON reports.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::orchestrator::{ModelConfig, Orchestrator};

/// Python wrapper for Rust Orchestrator
///
/// # Example (from Python)
///
/// ```python
/// from queueing_simulator_core_rs import Simulator
///
/// sim = Simulator.new(open("clinic.json").read())
/// report = json.loads(sim.run(100.0))
/// print(report["resources"][0]["server"][-1])
/// ```
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    inner: Orchestrator,
}

#[pymethods]
impl PySimulator {
    /// Create a simulator from a JSON model
    ///
    /// Raises ValueError if the model is malformed or fails validation.
    #[staticmethod]
    fn new(config_json: &str) -> PyResult<Self> {
        let config =
            ModelConfig::from_json(config_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let inner = Orchestrator::from_config(&config)
            .map_err(|e| PyValueError::new_err(format!("Failed to create simulator: {}", e)))?;
        Ok(PySimulator { inner })
    }

    /// Run until `until` and return the report as JSON
    ///
    /// Raises RuntimeError on a fatal model error (e.g. unbalanced release).
    fn run(&mut self, until: f64) -> PyResult<String> {
        self.inner
            .run(until)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        self.inner
            .report()
            .to_json(false)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Current simulated time
    fn now(&self) -> f64 {
        self.inner.now()
    }
}
