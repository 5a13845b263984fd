// src/rendering/plot.rs
//
// Static rendering of a plot encoding: scatter panel plus a colour bar.

use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::encoding::{ColorScale, PlotEncoding};

const COLORBAR_WIDTH: u32 = 90;
const COLORBAR_STEPS: usize = 64;

/// Axis range of `values` with 5% padding on each side. Flat or empty
/// data get a unit-wide range.
pub fn padded_range(values: &[f64]) -> Range<f64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}

/// Marker sizes are diameters in pixels; plotters takes a radius.
pub fn marker_radius(size: f64) -> i32 {
    (size / 2.0).round().max(0.0) as i32
}

/// Draws the chart to ANY backend (SVG file, PNG bitmap)
pub fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    enc: &PlotEncoding,
    title: &str,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    let scale = ColorScale::by_name_or_default(&enc.colorscale);
    let (width, _) = root.dim_in_pixel();
    let (plot_area, bar_area) = root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));

    // 1. Scatter panel
    let mut chart = ChartBuilder::on(&plot_area)
        .caption(title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(padded_range(&enc.x), padded_range(&enc.y))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(enc.x_title.as_str())
        .y_desc(enc.y_title.as_str())
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    // Hidden points (size 0) are skipped
    let points: Vec<(f64, f64, i32, RGBColor)> = (0..enc.x.len().min(enc.y.len()))
        .filter(|&i| enc.sizes.get(i).copied().unwrap_or(0.0) > 0.0)
        .map(|i| {
            let (r, g, b) = scale.map(enc.colors.get(i).copied().unwrap_or(f64::NAN), enc.color_domain);
            (enc.x[i], enc.y[i], marker_radius(enc.sizes[i]), RGBColor(r, g, b))
        })
        .collect();

    let outline = RGBColor(0, 116, 217).mix(enc.opacity);
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y, radius, color)| Circle::new((x, y), radius, color.mix(enc.opacity).filled())),
    )?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y, radius, _)| Circle::new((x, y), radius, outline.stroke_width(1))),
    )?;

    // 2. Colour bar
    let [cmin, cmax] = enc.color_domain;
    let top = if cmax > cmin { cmax } else { cmin + 1.0 };
    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(60)
        .margin_bottom(70)
        .margin_right(10)
        .y_label_area_size(45)
        .caption(enc.color_title.as_str(), ("sans-serif", 12))
        .build_cartesian_2d(0.0..1.0, cmin..top)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .draw()?;

    let step = (top - cmin) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let lo = cmin + step * i as f64;
        let (r, g, b) = scale.sample((i as f64 + 0.5) / COLORBAR_STEPS as f64);
        Rectangle::new([(0.0, lo), (1.0, lo + step)], RGBColor(r, g, b).filled())
    }))?;

    Ok(())
}

pub fn save_svg(enc: &PlotEncoding, title: &str, path: &str, size: (u32, u32)) -> Result<(), String> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    draw_scatter(&root, enc, title).map_err(|e| e.to_string())?;
    root.present().map_err(|e| e.to_string())?;
    log::info!("Plot written to {}", path);
    Ok(())
}

pub fn save_png(enc: &PlotEncoding, title: &str, path: &str, size: (u32, u32)) -> Result<(), String> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    draw_scatter(&root, enc, title).map_err(|e| e.to_string())?;
    root.present().map_err(|e| e.to_string())?;
    log::info!("Plot written to {}", path);
    Ok(())
}
