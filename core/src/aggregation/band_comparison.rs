use crate::adif::{AntennaId, Band};
use crate::correlation::BandGroups;
use crate::prelude::Reduction;
use serde::Serialize;
use std::collections::BTreeMap;

pub const GRID_COLUMNS: usize = 3;

/// Subplot arrangement for the per-band grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub rows: usize,
    pub columns: usize,
}

impl GridLayout {
    pub fn for_panels(panels: usize) -> Self {
        Self {
            rows: panels.div_ceil(GRID_COLUMNS),
            columns: panels.min(GRID_COLUMNS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PanelContent {
    /// SNR samples per antenna, from observations seen by two or more antennas.
    Distributions(BTreeMap<AntennaId, Vec<f64>>),
    NoComparableData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPanel {
    pub band: Band,
    pub content: PanelContent,
}

impl BandPanel {
    pub fn distributions(&self) -> Option<&BTreeMap<AntennaId, Vec<f64>>> {
        match &self.content {
            PanelContent::Distributions(distributions) => Some(distributions),
            PanelContent::NoComparableData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandComparison {
    pub panels: Vec<BandPanel>,
    pub layout: GridLayout,
}

/// Per-band SNR distributions restricted to comparable observations.
pub struct BandComparator;

impl Reduction for BandComparator {
    type Summary = BandComparison;

    fn reduce(&self, groups: &BandGroups<'_>) -> Option<BandComparison> {
        let panels: Vec<BandPanel> = groups
            .iter()
            .map(|(band, stations)| {
                let mut distributions: BTreeMap<AntennaId, Vec<f64>> = BTreeMap::new();
                for observation in stations.observations().filter(|o| o.is_comparable()) {
                    for contribution in observation.contributions() {
                        if let Some(snr) = contribution.record.snr_db() {
                            distributions
                                .entry(contribution.antenna.clone())
                                .or_default()
                                .push(snr);
                        }
                    }
                }
                let content = if distributions.is_empty() {
                    PanelContent::NoComparableData
                } else {
                    PanelContent::Distributions(distributions)
                };
                BandPanel {
                    band: *band,
                    content,
                }
            })
            .collect();

        if panels.iter().all(|panel| panel.distributions().is_none()) {
            return None;
        }

        Some(BandComparison {
            layout: GridLayout::for_panels(panels.len()),
            panels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adif::Record;
    use crate::correlation::{AntennaLogSet, Correlator};
    use crate::prelude::AnalysisMode;

    fn snr_record(freq: f64, antenna: &str, operator: &str, snr: Option<f64>) -> Record {
        Record::new(
            freq,
            format!("N0CALL/{antenna}"),
            operator,
            "FN42aa",
            snr,
            Some(1200.0),
        )
        .unwrap()
    }

    #[test]
    fn single_antenna_observations_are_excluded() {
        let mut logs = AntennaLogSet::new();
        logs.admit(vec![
            snr_record(14.074, "1", "K1ABC", Some(-5.0)),
            snr_record(14.074, "1", "W1AW", Some(-1.0)),
        ]);
        logs.admit(vec![snr_record(14.074, "2", "K1ABC", Some(-9.0))]);

        let groups = Correlator::new(AnalysisMode::Transmission).correlate(&logs);
        let comparison = BandComparator.reduce(&groups).unwrap();
        let panel = &comparison.panels[0];
        assert_eq!(panel.band, Band::M20);

        let distributions = panel.distributions().unwrap();
        assert_eq!(distributions[&AntennaId::new("1")], vec![-5.0]);
        assert_eq!(distributions[&AntennaId::new("2")], vec![-9.0]);
    }

    #[test]
    fn band_without_comparable_snr_gets_empty_panel() {
        let mut logs = AntennaLogSet::new();
        logs.admit(vec![
            snr_record(14.074, "1", "K1ABC", Some(-5.0)),
            snr_record(7.074, "1", "DL1XYZ", Some(-3.0)),
            snr_record(28.074, "1", "VK2AAA", None),
        ]);
        logs.admit(vec![
            snr_record(14.074, "2", "K1ABC", Some(-9.0)),
            snr_record(28.074, "2", "VK2AAA", None),
        ]);

        let groups = Correlator::new(AnalysisMode::Transmission).correlate(&logs);
        let comparison = BandComparator.reduce(&groups).unwrap();
        let contents: Vec<(String, bool)> = comparison
            .panels
            .iter()
            .map(|p| (p.band.to_string(), p.distributions().is_some()))
            .collect();
        assert_eq!(
            contents,
            [("40m".into(), false), ("20m".into(), true), ("10m".into(), false)]
        );
        assert_eq!(comparison.layout, GridLayout { rows: 1, columns: 3 });
    }

    #[test]
    fn no_comparable_data_anywhere_is_none() {
        let mut logs = AntennaLogSet::new();
        logs.admit(vec![snr_record(14.074, "1", "K1ABC", Some(-5.0))]);
        logs.admit(vec![snr_record(14.074, "2", "W1AW", Some(-9.0))]);
        let groups = Correlator::new(AnalysisMode::Transmission).correlate(&logs);
        assert!(BandComparator.reduce(&groups).is_none());
        assert!(BandComparator.reduce(&BandGroups::new()).is_none());
    }

    #[test]
    fn grid_layout_wraps_after_three_columns() {
        assert_eq!(GridLayout::for_panels(1), GridLayout { rows: 1, columns: 1 });
        assert_eq!(GridLayout::for_panels(3), GridLayout { rows: 1, columns: 3 });
        assert_eq!(GridLayout::for_panels(4), GridLayout { rows: 2, columns: 3 });
        assert_eq!(GridLayout::for_panels(7), GridLayout { rows: 3, columns: 3 });
    }
}
