use crate::adif::{AntennaId, Record};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of offering one file's records to an [`AntennaLogSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Accepted(AntennaId),
    /// Same antenna as an earlier file; the earlier records were discarded.
    Replaced(AntennaId),
    Empty,
    MixedAntennas(Vec<AntennaId>),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Accepted(_) | Admission::Replaced(_))
    }
}

/// Records per antenna, one uploaded file each.
#[derive(Debug, Default, Clone)]
pub struct AntennaLogSet {
    logs: BTreeMap<AntennaId, Vec<Record>>,
}

impl AntennaLogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a file only when every record names the same antenna.
    pub fn admit(&mut self, records: Vec<Record>) -> Admission {
        let antennas: BTreeSet<&AntennaId> = records.iter().map(Record::antenna).collect();
        if antennas.len() > 1 {
            return Admission::MixedAntennas(antennas.into_iter().cloned().collect());
        }
        let Some(antenna) = antennas.into_iter().next().cloned() else {
            return Admission::Empty;
        };

        match self.logs.insert(antenna.clone(), records) {
            Some(_) => Admission::Replaced(antenna),
            None => Admission::Accepted(antenna),
        }
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn antennas(&self) -> impl Iterator<Item = &AntennaId> {
        self.logs.keys()
    }

    pub fn records(&self, antenna: &AntennaId) -> Option<&[Record]> {
        self.logs.get(antenna).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AntennaId, &[Record])> {
        self.logs
            .iter()
            .map(|(antenna, records)| (antenna, records.as_slice()))
    }

    pub fn record_count(&self) -> usize {
        self.logs.values().map(Vec::len).sum()
    }
}
