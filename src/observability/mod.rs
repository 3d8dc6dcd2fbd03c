//! Logging setup and metrics exposition.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{render_metrics, EXPOSED_METRICS};
