use crate::adif::AntennaId;
use crate::correlation::BandGroups;
use crate::prelude::Reduction;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistancePoint {
    pub distance_km: f64,
    pub snr_db: f64,
}

/// Raw distance/SNR points per antenna; no binning or fitting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceScatter {
    pub series: BTreeMap<AntennaId, Vec<DistancePoint>>,
}

impl DistanceScatter {
    pub fn point_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// `(min, max)` over all distances and SNRs, for axis ranges.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut points = self.series.values().flatten();
        let first = points.next()?;
        let init = (
            (first.distance_km, first.distance_km),
            (first.snr_db, first.snr_db),
        );
        Some(points.fold(init, |((dmin, dmax), (smin, smax)), p| {
            (
                (dmin.min(p.distance_km), dmax.max(p.distance_km)),
                (smin.min(p.snr_db), smax.max(p.snr_db)),
            )
        }))
    }
}

pub struct DistanceCorrelator;

impl Reduction for DistanceCorrelator {
    type Summary = DistanceScatter;

    fn reduce(&self, groups: &BandGroups<'_>) -> Option<DistanceScatter> {
        let mut series: BTreeMap<AntennaId, Vec<DistancePoint>> = BTreeMap::new();
        for (_, contribution) in groups.contributions() {
            let record = contribution.record;
            if let (Some(snr_db), Some(distance_km)) = (record.snr_db(), record.distance_km()) {
                series
                    .entry(contribution.antenna.clone())
                    .or_default()
                    .push(DistancePoint {
                        distance_km,
                        snr_db,
                    });
            }
        }

        if series.is_empty() {
            None
        } else {
            Some(DistanceScatter { series })
        }
    }
}
