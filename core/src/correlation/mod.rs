//! Cross-log grouping of records into comparable observations.

pub mod engine;
pub mod groups;
pub mod logset;

pub use engine::Correlator;
pub use groups::{BandGroups, Contribution, JoinKey, Observation, StationGroups};
pub use logset::{Admission, AntennaLogSet};
