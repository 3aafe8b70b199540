use serde::{Serialize, Serializer};
use std::fmt;

/// Amateur HF band a contact frequency falls into.
///
/// Variant order is the display order: the known bands from 40m down to 10m,
/// then anything outside the band plan, ascending by frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    M40,
    M30,
    M20,
    M17,
    M15,
    M12,
    M10,
    /// Frequency outside every known interval, kept in whole kHz.
    Unclassified { khz: i64 },
}

/// Half-open `[lower, upper)` limits in MHz.
const BAND_PLAN: &[(Band, f64, f64)] = &[
    (Band::M40, 7.0, 7.3),
    (Band::M30, 10.1, 10.15),
    (Band::M20, 14.0, 14.35),
    (Band::M17, 18.068, 18.168),
    (Band::M15, 21.0, 21.45),
    (Band::M12, 24.89, 24.99),
    (Band::M10, 28.0, 29.7),
];

impl Band {
    pub fn classify(frequency_mhz: f64) -> Self {
        BAND_PLAN
            .iter()
            .find(|(_, lower, upper)| (*lower..*upper).contains(&frequency_mhz))
            .map(|(band, _, _)| *band)
            .unwrap_or_else(|| Band::Unclassified {
                khz: whole_khz(frequency_mhz),
            })
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, Band::Unclassified { .. })
    }
}

/// Kilohertz as shown by a three-decimal MHz label, so ties round on the exact binary value.
fn whole_khz(frequency_mhz: f64) -> i64 {
    format!("{:.3}", frequency_mhz)
        .replace('.', "")
        .parse()
        .unwrap_or_else(|_| (frequency_mhz * 1000.0).round() as i64)
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::M40 => f.write_str("40m"),
            Band::M30 => f.write_str("30m"),
            Band::M20 => f.write_str("20m"),
            Band::M17 => f.write_str("17m"),
            Band::M15 => f.write_str("15m"),
            Band::M12 => f.write_str("12m"),
            Band::M10 => f.write_str("10m"),
            Band::Unclassified { khz } => write!(f, "{:.3}MHz", *khz as f64 / 1000.0),
        }
    }
}

impl Serialize for Band {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
