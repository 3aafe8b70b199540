use crate::adif::{AntennaId, Band, Record};
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Station identity plus 6-character locator; approximates "the same contact".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoinKey {
    pub identity: String,
    pub locator: String,
}

impl JoinKey {
    pub fn new(identity: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            locator: locator.into(),
        }
    }
}

/// One antenna's record inside an [`Observation`].
#[derive(Debug, Clone, Copy)]
pub struct Contribution<'a> {
    pub antenna: &'a AntennaId,
    pub record: &'a Record,
}

/// Every record, across antennas, that matched one join key within one band.
#[derive(Debug, Default, Clone)]
pub struct Observation<'a> {
    contributions: Vec<Contribution<'a>>,
}

impl<'a> Observation<'a> {
    pub fn push(&mut self, contribution: Contribution<'a>) {
        self.contributions.push(contribution);
    }

    pub fn contributions(&self) -> &[Contribution<'a>] {
        &self.contributions
    }

    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    pub fn antenna_count(&self) -> usize {
        self.contributions
            .iter()
            .map(|c| c.antenna)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Seen by at least two distinct antennas.
    pub fn is_comparable(&self) -> bool {
        self.antenna_count() > 1
    }
}

/// Observations of one band, ordered by join key.
#[derive(Debug, Default, Clone)]
pub struct StationGroups<'a> {
    groups: BTreeMap<JoinKey, Observation<'a>>,
}

impl<'a> StationGroups<'a> {
    pub fn entry(&mut self, key: JoinKey) -> &mut Observation<'a> {
        self.groups.entry(key).or_default()
    }

    pub fn get(&self, key: &JoinKey) -> Option<&Observation<'a>> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, JoinKey, Observation<'a>> {
        self.groups.iter()
    }

    pub fn observations(&self) -> impl Iterator<Item = &Observation<'a>> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Two-level grouping: band, then join key.
#[derive(Debug, Default, Clone)]
pub struct BandGroups<'a> {
    bands: BTreeMap<Band, StationGroups<'a>>,
}

impl<'a> BandGroups<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, band: Band, key: JoinKey, contribution: Contribution<'a>) {
        self.bands
            .entry(band)
            .or_default()
            .entry(key)
            .push(contribution);
    }

    pub fn band(&self, band: &Band) -> Option<&StationGroups<'a>> {
        self.bands.get(band)
    }

    /// Bands in display order.
    pub fn iter(&self) -> btree_map::Iter<'_, Band, StationGroups<'a>> {
        self.bands.iter()
    }

    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.bands.keys().copied()
    }

    /// Every contribution with its band, ignoring comparability.
    pub fn contributions(&self) -> impl Iterator<Item = (Band, &Contribution<'a>)> + '_ {
        self.bands.iter().flat_map(|(band, groups)| {
            groups
                .observations()
                .flat_map(move |observation| observation.contributions().iter().map(move |c| (*band, c)))
        })
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
