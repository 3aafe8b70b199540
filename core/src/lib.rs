//! Correlation and aggregation core for comparing antennas from ADIF logs.
//!
//! Logs recorded simultaneously on different antennas are parsed, joined on
//! the counterpart station, and reduced to per-antenna SNR summaries that a
//! [`presentation::ChartRenderer`] turns into images.

pub mod adif;
pub mod aggregation;
pub mod correlation;
pub mod math;
pub mod prelude;
pub mod presentation;
pub mod session;
pub mod telemetry;

pub use prelude::{AnalysisError, AnalysisMode, AnalysisResult, Reduction};
pub use presentation::{AnalysisReport, ChartImage, ChartRenderer};
pub use session::{Analyzer, InMemoryLog, LogFile, LogSource, Summaries};
