use crate::charts::SvgCharts;
use crate::workflow::config::ServerConfig;
use crate::workflow::staging::StagingArea;
use antcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use antcore::{AnalysisMode, AnalysisReport, AnalysisResult, Analyzer, LogFile, LogSource};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Drives one analysis per call: parse, correlate, reduce, render.
#[derive(Clone)]
pub struct Runner {
    config: Arc<ServerConfig>,
    charts: Arc<SvgCharts>,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: ServerConfig) -> Self {
        let charts = SvgCharts::new(config.charts.clone());
        Self {
            config: Arc::new(config),
            charts: Arc::new(charts),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Consumes the staging area, so its directory is gone once this returns.
    pub fn analyze(&self, staging: StagingArea, mode: AnalysisMode) -> AnalysisResult<AnalysisReport> {
        info!(
            "analysis ({}) of {} staged files in {}",
            mode,
            staging.len(),
            staging.path().display()
        );
        self.run(staging.logs(), mode)
    }

    pub fn analyze_paths(&self, paths: &[PathBuf], mode: AnalysisMode) -> AnalysisResult<AnalysisReport> {
        let sources: Vec<LogFile> = paths
            .iter()
            .map(|path| LogFile {
                name: path.display().to_string(),
                path: path.clone(),
            })
            .collect();
        self.run(&sources, mode)
    }

    fn run<S: LogSource>(&self, sources: &[S], mode: AnalysisMode) -> AnalysisResult<AnalysisReport> {
        let analyzer = Analyzer::new(mode).with_metrics(self.metrics.clone());
        match analyzer.analyze(sources) {
            Ok(summaries) => {
                let report = summaries.render(self.charts.as_ref());
                self.metrics.record_completed();
                Ok(report)
            }
            Err(err) => {
                self.metrics.record_rejected();
                Err(err)
            }
        }
    }
}
