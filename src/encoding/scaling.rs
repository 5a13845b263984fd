// src/encoding/scaling.rs

use std::fmt;

/// Marker size used for every point when the linear rescaling cannot be
/// computed.
pub const FALLBACK_MARKER_SIZE: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ScalingError {
    EmptyColumn,
    /// A value needs interpolating but the clamp window has zero width.
    DegenerateWindow { lower: f64, upper: f64 },
    NonFinite { row: usize },
}

impl fmt::Display for ScalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingError::EmptyColumn => write!(f, "size column is empty"),
            ScalingError::DegenerateWindow { lower, upper } => {
                write!(f, "size window [{}, {}] has zero width", lower, upper)
            }
            ScalingError::NonFinite { row } => write!(f, "non-finite size at row {}", row),
        }
    }
}

impl std::error::Error for ScalingError {}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Map `value` to a range within `size_range` in a linear fashion.
pub fn linear_map(value: f64, value_range: [f64; 2], size_range: [f64; 2]) -> f64 {
    let slope = (size_range[1] - size_range[0]) / (value_range[1] - value_range[0]);
    size_range[0] + slope * (value - value_range[0])
}

/// Rescales raw marker sizes into `size_range`.
///
/// The column is shifted so its minimum is 0. `size_limits` are percentages
/// of the shifted span: values below the lower bound get `size_range[0]`,
/// above the upper bound `size_range[1]`, and values in between are
/// interpolated linearly.
pub fn rescale_sizes(
    raw: &[f64],
    size_range: [f64; 2],
    size_limits: [f64; 2],
) -> Result<Vec<f64>, ScalingError> {
    let (min, _) = min_max(raw).ok_or(ScalingError::EmptyColumn)?;

    let shifted: Vec<f64> = raw.iter().map(|v| v - min).collect();
    let span = shifted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lower = span / 100.0 * size_limits[0];
    let upper = span / 100.0 * size_limits[1];

    // setting linear scale between the limits and flat below and above
    shifted
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            let size = if v < lower {
                size_range[0]
            } else if v > upper {
                size_range[1]
            } else {
                if upper == lower {
                    return Err(ScalingError::DegenerateWindow { lower, upper });
                }
                linear_map(v, [lower, upper], size_range)
            };
            if size.is_finite() {
                Ok(size)
            } else {
                Err(ScalingError::NonFinite { row })
            }
        })
        .collect()
}

/// `rescale_sizes` with the constant fallback; never fails.
pub fn marker_sizes(raw: &[f64], size_range: [f64; 2], size_limits: [f64; 2]) -> (Vec<f64>, bool) {
    match rescale_sizes(raw, size_range, size_limits) {
        Ok(sizes) => (sizes, false),
        Err(e) => {
            log::warn!(
                "Error in scaling marker sizes ({}). Using `{}` for all data points instead.",
                e,
                FALLBACK_MARKER_SIZE
            );
            (vec![FALLBACK_MARKER_SIZE; raw.len()], true)
        }
    }
}

/// Display window of the colour axis, `[cmin, cmax]`, as percentages of
/// the raw value span. Raw colours are not modified.
pub fn color_domain(raw: &[f64], color_limits: [f64; 2]) -> [f64; 2] {
    match min_max(raw) {
        Some((min, max)) => {
            let span = (max - min).abs();
            [
                min + span / 100.0 * color_limits[0],
                min + span / 100.0 * color_limits[1],
            ]
        }
        None => [0.0, 0.0],
    }
}

/// Free-text opacity: unset or empty gives 1.0; unparsable or out of
/// [0, 1] logs a warning and gives 1.0.
pub fn parse_opacity(input: Option<&str>) -> f64 {
    let text = match input {
        None => return 1.0,
        Some(t) if t.trim().is_empty() => return 1.0,
        Some(t) => t.trim(),
    };

    match text.parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => v,
        _ => {
            log::warn!("Marker opacity set: {} ; Invalid, set to 1.0 by default.", text);
            1.0
        }
    }
}
