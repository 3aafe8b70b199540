//! Reductions from correlated observations to per-antenna summaries.

pub mod band_comparison;
pub mod distance;
pub mod ranking;

pub use band_comparison::{BandComparator, BandComparison, BandPanel, GridLayout, PanelContent};
pub use distance::{DistanceCorrelator, DistancePoint, DistanceScatter};
pub use ranking::{AntennaStanding, Ranker, Ranking};
