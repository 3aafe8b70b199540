use antcore::adif::AntennaId;
use plotters::style::{RGBColor, BLACK};
use std::collections::{BTreeMap, BTreeSet};

const SERIES: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const RAMP_LOW: RGBColor = RGBColor(215, 48, 39);
const RAMP_MID: RGBColor = RGBColor(254, 224, 139);
const RAMP_HIGH: RGBColor = RGBColor(26, 152, 80);

/// Stable color per antenna, assigned in antenna order.
pub struct Palette {
    colors: BTreeMap<AntennaId, RGBColor>,
}

impl Palette {
    pub fn new<'a>(antennas: impl IntoIterator<Item = &'a AntennaId>) -> Self {
        let unique: BTreeSet<&AntennaId> = antennas.into_iter().collect();
        let colors = unique
            .into_iter()
            .enumerate()
            .map(|(idx, antenna)| (antenna.clone(), SERIES[idx % SERIES.len()]))
            .collect();
        Self { colors }
    }

    pub fn color(&self, antenna: &AntennaId) -> RGBColor {
        self.colors.get(antenna).copied().unwrap_or(BLACK)
    }
}

fn lerp(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Red to green over -30..+30 dB.
pub fn snr_ramp(mean_snr: f64) -> RGBColor {
    let t = ((mean_snr + 30.0) / 60.0).clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(RAMP_LOW, RAMP_MID, t * 2.0)
    } else {
        lerp(RAMP_MID, RAMP_HIGH, (t - 0.5) * 2.0)
    }
}
