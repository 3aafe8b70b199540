use super::palette::Palette;
use super::{antenna_label, value_range, Canvas, ChartError, FONT};
use antcore::adif::AntennaId;
use antcore::aggregation::{BandComparison, BandPanel};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;

const MUTED: RGBColor = RGBColor(128, 128, 128);

pub(super) fn draw(root: &Canvas<'_>, comparison: &BandComparison) -> Result<(), ChartError> {
    let palette = Palette::new(
        comparison
            .panels
            .iter()
            .filter_map(BandPanel::distributions)
            .flat_map(BTreeMap::keys),
    );
    let areas = root.split_evenly((comparison.layout.rows, comparison.layout.columns));
    for (panel, area) in comparison.panels.iter().zip(areas.iter()) {
        match panel.distributions() {
            Some(distributions) => draw_boxplots(area, panel, distributions, &palette)?,
            None => draw_empty(area, panel)?,
        }
    }
    Ok(())
}

fn draw_boxplots(
    area: &Canvas<'_>,
    panel: &BandPanel,
    distributions: &BTreeMap<AntennaId, Vec<f64>>,
    palette: &Palette,
) -> Result<(), ChartError> {
    let series: Vec<(&AntennaId, &Vec<f64>)> = distributions
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .collect();
    let (low, high) = value_range(series.iter().flat_map(|(_, values)| values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{} - SNR Comparison", panel.band), (FONT, 18).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(45)
        .build_cartesian_2d(
            (0u32..series.len() as u32).into_segmented(),
            low as f32..high as f32,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("SNR (dB)")
        .x_labels(series.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) => series
                .get(*idx as usize)
                .map(|(antenna, _)| antenna_label(antenna))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .label_style((FONT, 13).into_font())
        .draw()?;

    chart.draw_series(LineSeries::new(
        [(SegmentValue::Exact(0), 0.0f32), (SegmentValue::Last, 0.0f32)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    chart.draw_series(series.iter().enumerate().map(|(idx, (antenna, values))| {
        Boxplot::new_vertical(
            SegmentValue::CenterOf(idx as u32),
            &Quartiles::new(values.as_slice()),
        )
        .width(28)
        .whisker_width(0.6)
        .style(palette.color(antenna).stroke_width(2))
    }))?;

    Ok(())
}

fn draw_empty(area: &Canvas<'_>, panel: &BandPanel) -> Result<(), ChartError> {
    let (width, height) = area.dim_in_pixel();
    let (x, y) = (width as i32 / 2, height as i32 / 2);
    let centered = Pos::new(HPos::Center, VPos::Center);
    let title = TextStyle::from((FONT, 18).into_font()).pos(centered);
    let note = TextStyle::from((FONT, 14).into_font())
        .color(&MUTED)
        .pos(centered);

    area.draw(&Text::new(panel.band.to_string(), (x, y - 14), title))?;
    area.draw(&Text::new("No comparable data", (x, y + 12), note))?;
    Ok(())
}
