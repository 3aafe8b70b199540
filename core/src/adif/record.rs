use crate::adif::band::Band;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Antenna identifier taken from the `/<digits>` suffix of a logged callsign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AntennaId(String);

impl AntennaId {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// First `/` immediately followed by one or more ASCII digits wins.
    pub fn from_callsign(callsign: &str) -> Self {
        callsign
            .match_indices('/')
            .map(|(idx, _)| {
                let tail = &callsign[idx + 1..];
                let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
                &tail[..digits]
            })
            .find(|digits| !digits.is_empty())
            .map(Self::new)
            .unwrap_or_else(Self::unknown)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    fn numeric_key(&self) -> Option<(usize, &str)> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let significant = self.0.trim_start_matches('0');
        Some((significant.len(), significant))
    }
}

/// Numeric ids compare by value ("2" < "10"), everything else after them.
impl Ord for AntennaId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_key(), other.numeric_key()) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for AntennaId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AntennaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a record chunk never becomes a [`Record`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecordRejection {
    #[error("missing FREQ")]
    MissingFrequency,
    #[error("missing CALL")]
    MissingCallsign,
    #[error("neither SNR nor DISTANCE present")]
    MissingSignalMetrics,
    #[error("field {field} is not a finite number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// One validated contact entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    frequency_mhz: f64,
    call: String,
    operator: String,
    grid_locator: String,
    snr_db: Option<f64>,
    distance_km: Option<f64>,
    antenna: AntennaId,
}

impl Record {
    /// Builds a record, enforcing that a callsign and at least one signal
    /// metric are present. The antenna id is derived from `call`.
    pub fn new(
        frequency_mhz: f64,
        call: impl Into<String>,
        operator: impl Into<String>,
        grid_locator: impl Into<String>,
        snr_db: Option<f64>,
        distance_km: Option<f64>,
    ) -> Result<Self, RecordRejection> {
        let call = call.into();
        if call.is_empty() {
            return Err(RecordRejection::MissingCallsign);
        }
        if snr_db.is_none() && distance_km.is_none() {
            return Err(RecordRejection::MissingSignalMetrics);
        }
        let antenna = AntennaId::from_callsign(&call);
        Ok(Self {
            frequency_mhz,
            call,
            operator: operator.into(),
            grid_locator: grid_locator.into(),
            snr_db,
            distance_km,
            antenna,
        })
    }

    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_mhz
    }

    pub fn call(&self) -> &str {
        &self.call
    }

    /// Empty when the log carried no `OPERATOR` field.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn grid_locator(&self) -> &str {
        &self.grid_locator
    }

    pub fn snr_db(&self) -> Option<f64> {
        self.snr_db
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn antenna(&self) -> &AntennaId {
        &self.antenna
    }

    pub fn band(&self) -> Band {
        Band::classify(self.frequency_mhz)
    }

    /// First six characters of the locator (subsquare precision).
    pub fn grid_prefix(&self) -> &str {
        match self.grid_locator.char_indices().nth(6) {
            Some((idx, _)) => &self.grid_locator[..idx],
            None => &self.grid_locator,
        }
    }
}
