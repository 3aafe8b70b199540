//! SVG rendering of the three analysis charts.

mod band_grid;
mod palette;
mod ranking;
mod scatter;

use crate::workflow::config::ChartConfig;
use antcore::aggregation::{BandComparison, DistanceScatter, Ranking};
use antcore::{ChartImage, ChartRenderer};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

const FONT: &str = "sans-serif";
/// Headroom above and below the data on value axes, in dB.
const Y_PADDING_DB: f64 = 3.0;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart drawing failed: {0}")]
    Drawing(String),
    #[error("nothing to draw for {0}")]
    Empty(&'static str),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Drawing(err.to_string())
    }
}

type Canvas<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn render_svg<F>(size: (u32, u32), draw: F) -> Result<ChartImage, ChartError>
where
    F: FnOnce(&Canvas<'_>) -> Result<(), ChartError>,
{
    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(ChartImage::svg(document))
}

/// Value axis that always contains zero, padded on both sides.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (low, high) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (low - Y_PADDING_DB, high + Y_PADDING_DB)
}

fn antenna_label(antenna: &antcore::adif::AntennaId) -> String {
    format!("/{}", antenna)
}

pub struct SvgCharts {
    config: ChartConfig,
}

impl SvgCharts {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }
}

impl ChartRenderer for SvgCharts {
    type Error = ChartError;

    fn render_band_grid(&self, comparison: &BandComparison) -> Result<ChartImage, ChartError> {
        if comparison.panels.is_empty() {
            return Err(ChartError::Empty("band comparison"));
        }
        let size = (
            self.config.panel_width * comparison.layout.columns.max(1) as u32,
            self.config.panel_height * comparison.layout.rows.max(1) as u32,
        );
        render_svg(size, |root| band_grid::draw(root, comparison))
    }

    fn render_ranking_pair(&self, ranking: &Ranking) -> Result<ChartImage, ChartError> {
        if ranking.standings.is_empty() {
            return Err(ChartError::Empty("overall ranking"));
        }
        let size = (self.config.ranking_width, self.config.ranking_height);
        render_svg(size, |root| ranking::draw(root, ranking))
    }

    fn render_scatter(&self, scatter: &DistanceScatter) -> Result<ChartImage, ChartError> {
        let size = (self.config.scatter_width, self.config.scatter_height);
        render_svg(size, |root| scatter::draw(root, scatter))
    }
}
