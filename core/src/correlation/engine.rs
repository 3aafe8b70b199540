use crate::adif::Record;
use crate::correlation::groups::{BandGroups, Contribution, JoinKey};
use crate::correlation::logset::AntennaLogSet;
use crate::prelude::AnalysisMode;
use crate::telemetry::log::LogManager;

/// Joins records from independently collected logs into comparable observations.
pub struct Correlator {
    mode: AnalysisMode,
    logger: LogManager,
}

impl Correlator {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            logger: LogManager::new("correlator"),
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// `None` when the record cannot take part in this mode's join.
    pub fn join_key(&self, record: &Record) -> Option<JoinKey> {
        let identity = match self.mode {
            AnalysisMode::Transmission if record.operator().is_empty() => return None,
            AnalysisMode::Transmission => record.operator(),
            AnalysisMode::Reception => record.call(),
        };
        Some(JoinKey::new(identity, record.grid_prefix()))
    }

    pub fn correlate<'a>(&self, logs: &'a AntennaLogSet) -> BandGroups<'a> {
        let mut groups = BandGroups::new();
        let mut skipped = 0usize;

        for (antenna, records) in logs.iter() {
            for record in records {
                match self.join_key(record) {
                    Some(key) => groups.insert(record.band(), key, Contribution { antenna, record }),
                    None => skipped += 1,
                }
            }
        }

        let observations: usize = groups.iter().map(|(_, stations)| stations.len()).sum();
        self.logger.record(&format!(
            "{} mode: {} bands, {} observations, {} records without join key",
            self.mode,
            groups.band_count(),
            observations,
            skipped
        ));
        groups
    }
}
