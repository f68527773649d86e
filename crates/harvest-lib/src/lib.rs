pub mod batch;
pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod signal;

pub use batch::*;
pub use config::{AnalysisConfig, Experiment};
pub use detectors::*;
pub use error::{HarvestError, Result};
pub use metrics::*;
pub use signal::*;
