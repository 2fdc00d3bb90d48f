//! PNG charts for margin sweeps and storage timelines.

use std::path::Path;

use cubesat_data::StorageSample;
use cubesat_export::output::ensure_parent_dir;
use cubesat_link::{LOW_MARGIN_DB, SweepPoint};
use plotters::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    Empty,
    #[error("output path contains invalid UTF-8")]
    InvalidPath,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Draw(err.to_string())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Axis range padded by 5 % (or ±1 when flat).
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return Some((lo - 1.0, hi + 1.0));
    }
    Some((lo - 0.05 * span, hi + 0.05 * span))
}

fn output_str(path: &Path) -> Result<&str, PlotError> {
    ensure_parent_dir(path)?;
    path.to_str().ok_or(PlotError::InvalidPath)
}

/// Draw link margin against the swept parameter, with the 0 dB and low-margin thresholds.
pub fn render_margin_curve(
    path: &Path,
    points: &[SweepPoint],
    x_desc: &str,
    size: (u32, u32),
) -> Result<(), PlotError> {
    let (x_min, x_max) = padded_range(points.iter().map(|p| p.x)).ok_or(PlotError::Empty)?;
    let (y_min, y_max) = padded_range(
        points
            .iter()
            .map(|p| p.margin_db)
            .chain([0.0, LOW_MARGIN_DB]),
    )
    .ok_or(PlotError::Empty)?;

    let root = BitMapBackend::new(output_str(path)?, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Link margin sweep", caption_font)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Link margin (dB)")
        .label_style(label_font.clone())
        .draw()
        .map_err(draw_err)?;

    for (level, color) in [(0.0, RED), (LOW_MARGIN_DB, RGBColor(210, 140, 20))] {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_min, level), (x_max, level)],
                ShapeStyle::from(&color.mix(0.6)).stroke_width(1),
            )))
            .map_err(draw_err)?;
    }

    chart
        .draw_series(std::iter::once(PathElement::new(
            points.iter().map(|p| (p.x, p.margin_db)).collect::<Vec<_>>(),
            ShapeStyle::from(&BLUE).stroke_width(2),
        )))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Draw cumulative storage (MB) against hours since mission start, with the capacity line.
pub fn render_storage_timeline(
    path: &Path,
    samples: &[StorageSample],
    capacity_mb: f64,
    size: (u32, u32),
) -> Result<(), PlotError> {
    let origin = samples.first().ok_or(PlotError::Empty)?.timestamp;
    let series: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| {
            let hours = (s.timestamp - origin).num_milliseconds() as f64 / 3_600_000.0;
            (hours, s.stored_mb)
        })
        .collect();

    let (x_min, x_max) = padded_range(series.iter().map(|p| p.0)).ok_or(PlotError::Empty)?;
    let (_, y_max) = padded_range(series.iter().map(|p| p.1).chain([0.0, capacity_mb]))
        .ok_or(PlotError::Empty)?;

    let root = BitMapBackend::new(output_str(path)?, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Onboard storage timeline", caption_font)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Mission elapsed time (h)")
        .y_desc("Stored data (MB)")
        .label_style(label_font.clone())
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_min, capacity_mb), (x_max, capacity_mb)],
            ShapeStyle::from(&RED.mix(0.6)).stroke_width(2),
        )))
        .map_err(draw_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            series,
            ShapeStyle::from(&BLUE).stroke_width(2),
        )))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
