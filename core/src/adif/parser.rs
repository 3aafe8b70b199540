use crate::adif::fields::{Chunks, FieldTable};
use crate::adif::record::{Record, RecordRejection};
use crate::telemetry::log::LogManager;
use std::fs;
use std::path::Path;

pub const FIELD_FREQ: &str = "FREQ";
pub const FIELD_CALL: &str = "CALL";
pub const FIELD_OPERATOR: &str = "OPERATOR";
pub const FIELD_GRIDSQUARE: &str = "GRIDSQUARE";
pub const FIELD_MY_GRIDSQUARE: &str = "MY_GRIDSQUARE";
pub const FIELD_SNR: &str = "APP_PSKREP_SNR";
pub const FIELD_DISTANCE: &str = "DISTANCE";

fn parse_number(
    table: &FieldTable<'_>,
    field: &'static str,
) -> Result<Option<f64>, RecordRejection> {
    match table.get(field) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| RecordRejection::InvalidNumber {
                field,
                value: raw.to_string(),
            }),
    }
}

/// Turns one field table into a validated record.
pub fn parse_record(table: &FieldTable<'_>) -> Result<Record, RecordRejection> {
    let frequency = parse_number(table, FIELD_FREQ)?.ok_or(RecordRejection::MissingFrequency)?;
    let call = table.get(FIELD_CALL).ok_or(RecordRejection::MissingCallsign)?;
    let operator = table.get(FIELD_OPERATOR).unwrap_or_default();
    let grid = table
        .get(FIELD_GRIDSQUARE)
        .or_else(|| table.get(FIELD_MY_GRIDSQUARE))
        .unwrap_or_default();
    let snr = parse_number(table, FIELD_SNR)?;
    let distance = parse_number(table, FIELD_DISTANCE)?;

    Record::new(frequency, call, operator, grid, snr, distance)
}

/// Lazy record stream over one file's content. Invalid chunks are skipped.
pub struct Records<'a> {
    chunks: Chunks<'a>,
    rejected: usize,
    logger: LogManager,
}

impl Records<'_> {
    /// Chunks dropped so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        for table in self.chunks.by_ref() {
            match parse_record(&table) {
                Ok(record) => return Some(record),
                Err(reason) => {
                    self.rejected += 1;
                    self.logger.trace(&format!("skipping ADIF record: {}", reason));
                }
            }
        }
        None
    }
}

/// Reads ADIF logs. File-level failures surface as zero records, never as errors.
pub struct LogParser {
    logger: LogManager,
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("parser"),
        }
    }

    pub fn records<'a>(&self, content: &'a str) -> Records<'a> {
        Records {
            chunks: Chunks::new(content),
            rejected: 0,
            logger: self.logger,
        }
    }

    pub fn parse_str(&self, name: &str, content: &str) -> Vec<Record> {
        let mut records = self.records(content);
        let parsed: Vec<Record> = records.by_ref().collect();
        self.logger.record(&format!(
            "{}: {} records, {} skipped",
            name,
            parsed.len(),
            records.rejected()
        ));
        parsed
    }

    pub fn parse_bytes(&self, name: &str, bytes: &[u8]) -> Vec<Record> {
        match std::str::from_utf8(bytes) {
            Ok(content) => self.parse_str(name, content),
            Err(err) => {
                self.logger
                    .warn(&format!("{}: not valid UTF-8 ({}), ignoring file", name, err));
                Vec::new()
            }
        }
    }

    pub fn parse_path(&self, path: &Path) -> Vec<Record> {
        match fs::read(path) {
            Ok(bytes) => self.parse_bytes(&path.display().to_string(), &bytes),
            Err(err) => {
                self.logger
                    .warn(&format!("{}: unreadable ({}), ignoring file", path.display(), err));
                Vec::new()
            }
        }
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}
