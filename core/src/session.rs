use crate::adif::{LogParser, Record};
use crate::aggregation::{
    BandComparator, BandComparison, DistanceCorrelator, DistanceScatter, Ranker, Ranking,
};
use crate::correlation::{Admission, AntennaLogSet, Correlator};
use crate::prelude::{AnalysisError, AnalysisMode, AnalysisResult, Reduction};
use crate::presentation::{AnalysisReport, ChartImage, ChartRenderer};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use std::path::PathBuf;
use std::sync::Arc;

pub const MIN_FILES: usize = 2;
pub const MIN_ANTENNAS: usize = 2;

/// A named log that can be turned into records exactly once per analysis.
pub trait LogSource {
    fn name(&self) -> &str;
    fn read_records(&self, parser: &LogParser) -> Vec<Record>;
}

#[derive(Debug, Clone)]
pub struct InMemoryLog {
    pub name: String,
    pub content: Vec<u8>,
}

impl InMemoryLog {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl LogSource for InMemoryLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&self, parser: &LogParser) -> Vec<Record> {
        parser.parse_bytes(&self.name, &self.content)
    }
}

#[derive(Debug, Clone)]
pub struct LogFile {
    pub name: String,
    pub path: PathBuf,
}

impl LogSource for LogFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_records(&self, parser: &LogParser) -> Vec<Record> {
        parser.parse_path(&self.path)
    }
}

/// Numeric output of one analysis, before rendering.
#[derive(Debug, Clone, Default)]
pub struct Summaries {
    pub band_comparison: Option<BandComparison>,
    pub ranking: Option<Ranking>,
    pub distance: Option<DistanceScatter>,
}

impl Summaries {
    /// Renders what is available; a failed chart is logged and left out.
    pub fn render<R: ChartRenderer>(&self, renderer: &R) -> AnalysisReport {
        let logger = LogManager::new("presentation");
        let keep = |chart: &str, result: Result<ChartImage, R::Error>| match result {
            Ok(image) => Some(image),
            Err(err) => {
                logger.warn(&format!("{} chart failed: {}", chart, err));
                None
            }
        };

        AnalysisReport {
            band_comparison: self
                .band_comparison
                .as_ref()
                .and_then(|c| keep("band comparison", renderer.render_band_grid(c))),
            overall_ranking: self
                .ranking
                .as_ref()
                .and_then(|r| keep("overall ranking", renderer.render_ranking_pair(r))),
            distance_analysis: self
                .distance
                .as_ref()
                .and_then(|d| keep("distance analysis", renderer.render_scatter(d))),
        }
    }
}

/// Runs parse, admission, correlation and the three reductions for one request.
pub struct Analyzer {
    parser: LogParser,
    correlator: Correlator,
    metrics: Option<Arc<MetricsRecorder>>,
    logger: LogManager,
}

impl Analyzer {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            parser: LogParser::new(),
            correlator: Correlator::new(mode),
            metrics: None,
            logger: LogManager::new("analyzer"),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn mode(&self) -> AnalysisMode {
        self.correlator.mode()
    }

    /// Builds the per-antenna log set, enforcing both request-level minimums.
    pub fn collect<S: LogSource>(&self, sources: &[S]) -> AnalysisResult<AntennaLogSet> {
        if sources.len() < MIN_FILES {
            return Err(AnalysisError::InsufficientFiles {
                found: sources.len(),
            });
        }

        let mut logs = AntennaLogSet::new();
        let mut dropped = 0usize;
        for source in sources {
            let records = source.read_records(&self.parser);
            match logs.admit(records) {
                Admission::Accepted(antenna) => {
                    self.logger
                        .record(&format!("{} -> antenna /{}", source.name(), antenna));
                }
                Admission::Replaced(antenna) => {
                    self.logger.warn(&format!(
                        "{} repeats antenna /{}, replacing the earlier file",
                        source.name(),
                        antenna
                    ));
                }
                Admission::Empty => {
                    dropped += 1;
                    self.logger
                        .warn(&format!("{} has no usable records", source.name()));
                }
                Admission::MixedAntennas(antennas) => {
                    dropped += 1;
                    let ids: Vec<String> = antennas.iter().map(|a| format!("/{}", a)).collect();
                    self.logger.warn(&format!(
                        "{} mixes antennas {}, ignoring file",
                        source.name(),
                        ids.join(", ")
                    ));
                }
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_ingest(logs.record_count(), dropped);
        }

        if logs.len() < MIN_ANTENNAS {
            return Err(AnalysisError::InsufficientAntennas { found: logs.len() });
        }
        Ok(logs)
    }

    pub fn summarize(&self, logs: &AntennaLogSet) -> Summaries {
        let groups = self.correlator.correlate(logs);
        Summaries {
            band_comparison: BandComparator.reduce(&groups),
            ranking: Ranker.reduce(&groups),
            distance: DistanceCorrelator.reduce(&groups),
        }
    }

    pub fn analyze<S: LogSource>(&self, sources: &[S]) -> AnalysisResult<Summaries> {
        let logs = self.collect(sources)?;
        Ok(self.summarize(&logs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adif::AntennaId;
    use std::cell::Cell;
    use std::fmt;

    fn adif(antenna: &str, rows: &[(&str, f64, f64)]) -> InMemoryLog {
        let body: String = rows
            .iter()
            .map(|(operator, freq, snr)| {
                let call = format!("N0CALL/{antenna}");
                let freq = freq.to_string();
                let snr = snr.to_string();
                format!(
                    "<FREQ:{}>{} <CALL:{}>{} <OPERATOR:{}>{} <GRIDSQUARE:6>FN42aa \
                     <APP_PSKREP_SNR:{}>{} <DISTANCE:4>5400 <eor>\n",
                    freq.len(),
                    freq,
                    call.len(),
                    call,
                    operator.len(),
                    operator,
                    snr.len(),
                    snr
                )
            })
            .collect();
        InMemoryLog::new(format!("antenna{antenna}.adi"), format!("<EOH>\n{body}"))
    }

    #[test]
    fn one_file_is_rejected_before_parsing() {
        struct Untouchable(Cell<bool>);
        impl LogSource for Untouchable {
            fn name(&self) -> &str {
                "only.adi"
            }
            fn read_records(&self, _: &LogParser) -> Vec<Record> {
                self.0.set(true);
                Vec::new()
            }
        }

        let source = [Untouchable(Cell::new(false))];
        let err = Analyzer::new(AnalysisMode::Transmission)
            .analyze(&source)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientFiles { found: 1 }));
        assert!(!source[0].0.get());
    }

    #[test]
    fn same_antenna_twice_is_insufficient() {
        let sources = [
            adif("3", &[("K1ABC", 14.074, -3.0)]),
            adif("3", &[("K1ABC", 14.074, -5.0)]),
        ];
        let err = Analyzer::new(AnalysisMode::Transmission)
            .analyze(&sources)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientAntennas { found: 1 }));
    }

    #[test]
    fn mixed_and_empty_files_do_not_count() {
        let mixed = InMemoryLog::new(
            "mixed.adi",
            "<FREQ:5>7.074 <CALL:8>N0CALL/1 <APP_PSKREP_SNR:1>1 <eor>\
             <FREQ:5>7.074 <CALL:8>N0CALL/2 <APP_PSKREP_SNR:1>1 <eor>",
        );
        let garbage = InMemoryLog::new("garbage.adi", vec![0xff, 0x00, 0xfe]);
        let good = adif("1", &[("K1ABC", 14.074, -3.0)]);

        let metrics = Arc::new(MetricsRecorder::new());
        let analyzer = Analyzer::new(AnalysisMode::Transmission).with_metrics(metrics.clone());
        let err = analyzer.analyze(&[mixed, garbage, good]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientAntennas { found: 1 }));
        assert_eq!(metrics.snapshot().files_dropped, 2);
        assert_eq!(metrics.snapshot().records_ingested, 1);
    }

    #[test]
    fn two_antenna_scenario() {
        let sources = [
            adif("1", &[("K1ABC", 14.074, 5.0)]),
            adif("2", &[("K1ABC", 14.074, 10.0)]),
        ];
        let summaries = Analyzer::new(AnalysisMode::Transmission)
            .analyze(&sources)
            .unwrap();

        let comparison = summaries.band_comparison.unwrap();
        assert_eq!(comparison.panels.len(), 1);
        let panel = comparison.panels[0].distributions().unwrap();
        assert_eq!(panel[&AntennaId::new("1")], vec![5.0]);
        assert_eq!(panel[&AntennaId::new("2")], vec![10.0]);

        let ranking = summaries.ranking.unwrap();
        let order: Vec<(&str, f64)> = ranking
            .standings
            .iter()
            .map(|s| (s.antenna.as_str(), s.mean_snr))
            .collect();
        assert_eq!(order, [("2", 10.0), ("1", 5.0)]);

        assert_eq!(summaries.distance.unwrap().point_count(), 2);
    }

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("refused")
        }
    }

    impl std::error::Error for Refused {}

    /// Renders the band grid, refuses the rest.
    struct PickyRenderer;

    impl ChartRenderer for PickyRenderer {
        type Error = Refused;

        fn render_band_grid(&self, c: &BandComparison) -> Result<ChartImage, Refused> {
            Ok(ChartImage::svg(format!("<svg>{}</svg>", c.panels.len())))
        }

        fn render_ranking_pair(&self, _: &Ranking) -> Result<ChartImage, Refused> {
            Err(Refused)
        }

        fn render_scatter(&self, _: &DistanceScatter) -> Result<ChartImage, Refused> {
            Err(Refused)
        }
    }

    #[test]
    fn failed_charts_are_absent_from_report() {
        let sources = [
            adif("1", &[("K1ABC", 14.074, 5.0), ("W1AW", 7.074, -2.0)]),
            adif("2", &[("K1ABC", 14.074, 10.0)]),
        ];
        let report = Analyzer::new(AnalysisMode::Transmission)
            .analyze(&sources)
            .unwrap()
            .render(&PickyRenderer);

        assert_eq!(
            report.band_comparison.map(|image| image.data),
            Some(b"<svg>2</svg>".to_vec())
        );
        assert!(report.overall_ranking.is_none());
        assert!(report.distance_analysis.is_none());
    }

    #[test]
    fn nothing_to_render_when_summaries_are_empty() {
        let report = Summaries::default().render(&PickyRenderer);
        assert_eq!(report, AnalysisReport::default());
    }
}
