use super::palette::Palette;
use super::{antenna_label, Canvas, ChartError, FONT};
use antcore::aggregation::DistanceScatter;
use plotters::prelude::*;

pub(super) fn draw(root: &Canvas<'_>, scatter: &DistanceScatter) -> Result<(), ChartError> {
    let Some(((dmin, dmax), (smin, smax))) = scatter.bounds() else {
        return Err(ChartError::Empty("distance analysis"));
    };
    let x_pad = ((dmax - dmin) * 0.05).max(50.0);
    let y_pad = ((smax - smin) * 0.05).max(1.0);
    let palette = Palette::new(scatter.series.keys());

    let mut chart = ChartBuilder::on(root)
        .caption("SNR vs Distance", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (dmin - x_pad).max(0.0)..dmax + x_pad,
            smin - y_pad..smax + y_pad,
        )?;

    chart
        .configure_mesh()
        .x_desc("Distance (km)")
        .y_desc("SNR (dB)")
        .label_style((FONT, 14).into_font())
        .axis_desc_style((FONT, 16).into_font())
        .draw()?;

    let y_range = smin - y_pad..smax + y_pad;
    if y_range.contains(&0.0) {
        chart.draw_series(LineSeries::new(
            [((dmin - x_pad).max(0.0), 0.0), (dmax + x_pad, 0.0)],
            BLACK.mix(0.4).stroke_width(1),
        ))?;
    }

    for (antenna, points) in &scatter.series {
        let color = palette.color(antenna);
        chart
            .draw_series(points.iter().map(|p| {
                Circle::new((p.distance_km, p.snr_db), 3, color.mix(0.6).filled())
            }))?
            .label(format!("Antenna {}", antenna_label(antenna)))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
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
