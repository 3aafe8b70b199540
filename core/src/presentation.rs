//! Seam to the chart backend. The core only produces numeric summaries.

use crate::aggregation::{BandComparison, DistanceScatter, Ranking};

pub const MEDIA_TYPE_SVG: &str = "image/svg+xml";

/// Encoded chart, opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub media_type: &'static str,
    pub data: Vec<u8>,
}

impl ChartImage {
    pub fn svg(document: String) -> Self {
        Self {
            media_type: MEDIA_TYPE_SVG,
            data: document.into_bytes(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.media_type {
            MEDIA_TYPE_SVG => "svg",
            _ => "bin",
        }
    }
}

pub trait ChartRenderer {
    type Error: std::error::Error;

    /// One subplot per band, laid out on `comparison.layout`.
    fn render_band_grid(&self, comparison: &BandComparison) -> Result<ChartImage, Self::Error>;
    /// Per-band means on top, overall standings with spread below.
    fn render_ranking_pair(&self, ranking: &Ranking) -> Result<ChartImage, Self::Error>;
    fn render_scatter(&self, scatter: &DistanceScatter) -> Result<ChartImage, Self::Error>;
}

/// The three charts of one analysis; any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub band_comparison: Option<ChartImage>,
    pub overall_ranking: Option<ChartImage>,
    pub distance_analysis: Option<ChartImage>,
}

impl AnalysisReport {
    pub fn charts(&self) -> [(&'static str, Option<&ChartImage>); 3] {
        [
            ("band_comparison", self.band_comparison.as_ref()),
            ("overall_ranking", self.overall_ranking.as_ref()),
            ("distance_analysis", self.distance_analysis.as_ref()),
        ]
    }
}
