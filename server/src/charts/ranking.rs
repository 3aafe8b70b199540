use super::palette::{snr_ramp, Palette};
use super::{antenna_label, value_range, Canvas, ChartError, FONT};
use antcore::adif::Band;
use antcore::aggregation::Ranking;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Share of each band slot covered by its bar group.
const GROUP_WIDTH: f64 = 0.8;

/// Slot `idx` spans `[idx - 0.5, idx + 0.5)`.
fn slot_axis(count: usize) -> std::ops::Range<f64> {
    -0.5..count as f64 - 0.5
}

/// Index of the slot whose center is at `x`; tick marks between centers get none.
fn slot_at(x: f64, count: usize) -> Option<usize> {
    let idx = x.round();
    let centered = (x - idx).abs() < 1e-6;
    (centered && idx >= 0.0 && (idx as usize) < count).then_some(idx as usize)
}

pub(super) fn draw(root: &Canvas<'_>, ranking: &Ranking) -> Result<(), ChartError> {
    let areas = root.split_evenly((2, 1));
    let [upper, lower] = areas.as_slice() else {
        return Err(ChartError::Drawing("ranking layout".into()));
    };
    draw_band_means(upper, ranking)?;
    draw_standings(lower, ranking)
}

fn draw_band_means(area: &Canvas<'_>, ranking: &Ranking) -> Result<(), ChartError> {
    let bands: &[Band] = &ranking.bands;
    let palette = Palette::new(ranking.standings.iter().map(|s| &s.antenna));
    let (low, high) = value_range(ranking.band_means.iter().flatten().copied());
    let slot = GROUP_WIDTH / ranking.standings.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Average SNR by Band", (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            slot_axis(bands.len()),
            low..high,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bands.len())
        .x_desc("Band")
        .y_desc("Average SNR (dB)")
        .x_label_formatter(&|x| {
            slot_at(*x, bands.len())
                .map(|idx| bands[idx].to_string())
                .unwrap_or_default()
        })
        .label_style((FONT, 14).into_font())
        .draw()?;

    chart.draw_series(LineSeries::new(
        [(-0.5, 0.0), (bands.len() as f64 - 0.5, 0.0)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    for (row, standing) in ranking.standings.iter().enumerate() {
        let color = palette.color(&standing.antenna);
        let offset = -GROUP_WIDTH / 2.0 + row as f64 * slot;
        let bars: Vec<Rectangle<(f64, f64)>> = ranking
            .band_means
            .row(row)
            .iter()
            .enumerate()
            .filter_map(|(column, mean)| {
                let mean = (*mean)?;
                let left = column as f64 + offset;
                Some(Rectangle::new([(left, 0.0), (left + slot, mean)], color.filled()))
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(format!("Antenna {}", antenna_label(&standing.antenna)))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font((FONT, 14).into_font())
        .draw()?;

    Ok(())
}

fn draw_standings(area: &Canvas<'_>, ranking: &Ranking) -> Result<(), ChartError> {
    let standings = &ranking.standings;
    let (low, high) = value_range(
        standings
            .iter()
            .flat_map(|s| [s.mean_snr - s.std_dev, s.mean_snr + s.std_dev]),
    );

    let mut chart = ChartBuilder::on(area)
        .caption("Overall Antenna Ranking", (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            slot_axis(standings.len()),
            low..high,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(standings.len())
        .x_desc("Antenna")
        .y_desc("Average SNR (dB)")
        .x_label_formatter(&|x| {
            slot_at(*x, standings.len())
                .map(|idx| antenna_label(&standings[idx].antenna))
                .unwrap_or_default()
        })
        .label_style((FONT, 14).into_font())
        .draw()?;

    chart.draw_series(LineSeries::new(
        [(-0.5, 0.0), (standings.len() as f64 - 0.5, 0.0)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    chart.draw_series(standings.iter().enumerate().map(|(idx, standing)| {
        let left = idx as f64 - GROUP_WIDTH / 2.0;
        Rectangle::new(
            [(left, 0.0), (left + GROUP_WIDTH, standing.mean_snr)],
            snr_ramp(standing.mean_snr).filled(),
        )
    }))?;

    chart.draw_series(standings.iter().enumerate().map(|(idx, standing)| {
        ErrorBar::new_vertical(
            idx as f64,
            standing.mean_snr - standing.std_dev,
            standing.mean_snr,
            standing.mean_snr + standing.std_dev,
            BLACK.filled(),
            12,
        )
    }))?;

    let above = TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    let below = TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    chart.draw_series(standings.iter().enumerate().map(|(idx, standing)| {
        let (y, style) = if standing.mean_snr >= 0.0 {
            (standing.mean_snr + standing.std_dev, above.clone())
        } else {
            (standing.mean_snr - standing.std_dev, below.clone())
        };
        Text::new(
            format!("{:.1} dB (n={})", standing.mean_snr, standing.samples),
            (idx as f64, y),
            style,
        )
    }))?;

    Ok(())
}
