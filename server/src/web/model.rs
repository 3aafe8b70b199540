use antcore::{AnalysisReport, ChartImage};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// `data:<media type>;base64,<payload>`, directly usable as an `<img src>`.
pub fn data_uri(image: &ChartImage) -> String {
    format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.data))
}

/// Body of a successful `/analyze`; a missing chart is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub band_comparison: Option<String>,
    pub overall_ranking: Option<String>,
    pub distance_analysis: Option<String>,
}

impl From<&AnalysisReport> for AnalyzeResponse {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            band_comparison: report.band_comparison.as_ref().map(data_uri),
            overall_ranking: report.overall_ranking.as_ref().map(data_uri),
            distance_analysis: report.distance_analysis.as_ref().map(data_uri),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
