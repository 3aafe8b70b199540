use crate::adif::{AntennaId, Band};
use crate::correlation::BandGroups;
use crate::math::stats::StatsHelper;
use crate::prelude::Reduction;
use ndarray::Array2;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntennaStanding {
    pub antenna: AntennaId,
    pub mean_snr: f64,
    pub std_dev: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Bands with at least one SNR sample, in display order.
    pub bands: Vec<Band>,
    /// Best antenna first.
    pub standings: Vec<AntennaStanding>,
    /// Row per standing, column per band; `None` marks a band the antenna never heard.
    pub band_means: Array2<Option<f64>>,
}

impl Ranking {
    pub fn band_mean(&self, antenna: &AntennaId, band: Band) -> Option<f64> {
        let row = self.standings.iter().position(|s| &s.antenna == antenna)?;
        let column = self.bands.iter().position(|b| *b == band)?;
        self.band_means[[row, column]]
    }

    pub fn leader(&self) -> Option<&AntennaStanding> {
        self.standings.first()
    }
}

/// Descending mean; equal means fall back to ascending antenna id.
fn by_mean_descending(lhs: &AntennaStanding, rhs: &AntennaStanding) -> Ordering {
    rhs.mean_snr
        .total_cmp(&lhs.mean_snr)
        .then_with(|| lhs.antenna.cmp(&rhs.antenna))
}

/// Overall SNR ranking over every observation, comparable or not.
pub struct Ranker;

impl Reduction for Ranker {
    type Summary = Ranking;

    fn reduce(&self, groups: &BandGroups<'_>) -> Option<Ranking> {
        let mut per_band: BTreeMap<&AntennaId, BTreeMap<Band, Vec<f64>>> = BTreeMap::new();
        let mut overall: BTreeMap<&AntennaId, Vec<f64>> = BTreeMap::new();
        let mut bands = BTreeSet::new();

        for (band, contribution) in groups.contributions() {
            let Some(snr) = contribution.record.snr_db() else {
                continue;
            };
            per_band
                .entry(contribution.antenna)
                .or_default()
                .entry(band)
                .or_default()
                .push(snr);
            overall.entry(contribution.antenna).or_default().push(snr);
            bands.insert(band);
        }

        if overall.is_empty() {
            return None;
        }

        let mut standings: Vec<AntennaStanding> = overall
            .iter()
            .filter_map(|(antenna, samples)| {
                Some(AntennaStanding {
                    antenna: (*antenna).clone(),
                    mean_snr: StatsHelper::mean(samples)?,
                    std_dev: StatsHelper::std_dev(samples)?,
                    samples: samples.len(),
                })
            })
            .collect();
        standings.sort_by(by_mean_descending);

        let bands: Vec<Band> = bands.into_iter().collect();
        let band_means = Array2::from_shape_fn((standings.len(), bands.len()), |(row, column)| {
            per_band
                .get(&standings[row].antenna)
                .and_then(|by_band| by_band.get(&bands[column]))
                .and_then(|samples| StatsHelper::mean(samples))
        });

        Some(Ranking {
            bands,
            standings,
            band_means,
        })
    }
}
