//! Native `test` extension module for exercising extension build pipelines.

mod error;
mod logging;

use pyo3::prelude::*;
use pyo3::types::PyTuple;

pub use error::Error;

use logging::LOG_TARGET;

/// Version reported as `test.__version__`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Python test function
#[pyfunction]
#[pyo3(name = "test", signature = (*args))]
fn test_fn(args: &Bound<'_, PyTuple>) -> i64 {
    log::trace!(target: LOG_TARGET, "test() called, ignoring {} argument(s)", args.len());
    0
}

/// Python test module
#[pymodule]
#[pyo3(name = "test")]
fn test_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    if let Err(err) = logging::init() {
        log::warn!(target: LOG_TARGET, "{err}");
    }
    m.add("__version__", VERSION)?;
    m.add_function(wrap_pyfunction!(test_fn, m)?)?;
    log::debug!(target: LOG_TARGET, "module `test` {VERSION} initialized");
    Ok(())
}
