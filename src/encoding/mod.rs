// src/encoding/mod.rs
//
// Maps feature-table columns onto the scatter plot channels: x, y, marker
// size, marker colour, opacity and colourscale.

pub mod colorscale;
pub mod figure;
pub mod scaling;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::table::FeatureTable;

pub use colorscale::{ColorScale, DEFAULT_SCALE};
pub use figure::Figure;
pub use scaling::{color_domain, marker_sizes, parse_opacity, FALLBACK_MARKER_SIZE};

/// What to do with points whose colour lies outside the colour window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutsideWindowPolicy {
    /// Keep the point, drawn with the boundary colour.
    #[default]
    Clamp,
    /// Size 0, the point disappears from the plot.
    Hide,
}

impl std::str::FromStr for OutsideWindowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clamp" => Ok(OutsideWindowPolicy::Clamp),
            "hide" => Ok(OutsideWindowPolicy::Hide),
            other => Err(format!("unknown outside-window policy '{}'", other)),
        }
    }
}

/// Control values of the plot, as set by the dashboard widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingState {
    pub x: usize,
    pub y: usize,
    pub size: usize,
    pub color: usize,
    pub size_range: [f64; 2],
    pub size_limits: [f64; 2],
    pub color_limits: [f64; 2],
    pub opacity: Option<String>,
    pub colorscale: Option<String>,
    pub outside_window: OutsideWindowPolicy,
}

impl Default for EncodingState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            size: 0,
            color: 0,
            size_range: [5.0, 50.0],
            size_limits: [0.0, 100.0],
            color_limits: [0.0, 100.0],
            opacity: None,
            colorscale: None,
            outside_window: OutsideWindowPolicy::Clamp,
        }
    }
}

impl EncodingState {
    /// Colourscale name to emit; unset or blank gives the default.
    pub fn resolve_colorscale(&self) -> String {
        match self.colorscale.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_SCALE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    NoColumns,
    UnknownColumn { channel: &'static str, index: usize, available: usize },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::NoColumns => write!(f, "the feature table has no columns to plot"),
            EncodingError::UnknownColumn { channel, index, available } => write!(
                f,
                "{} column {} out of range ({} columns available)",
                channel, index, available
            ),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Everything the scatter figure needs, one entry per table row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotEncoding {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub sizes: Vec<f64>,
    pub colors: Vec<f64>,
    pub color_domain: [f64; 2],
    pub opacity: f64,
    pub colorscale: String,
    pub x_title: String,
    pub y_title: String,
    pub size_title: String,
    pub color_title: String,
    pub hover_texts: Vec<String>,
    /// True when the sizes are the constant fallback.
    pub size_fallback: bool,
}

pub fn encode(
    table: &FeatureTable,
    state: &EncodingState,
    hover_texts: Vec<String>,
) -> Result<PlotEncoding, EncodingError> {
    if table.n_columns() == 0 {
        return Err(EncodingError::NoColumns);
    }

    let pick = |channel: &'static str, index: usize| {
        table.column(index).ok_or(EncodingError::UnknownColumn {
            channel,
            index,
            available: table.n_columns(),
        })
    };
    let x = pick("x", state.x)?;
    let y = pick("y", state.y)?;
    let size = pick("size", state.size)?;
    let color = pick("color", state.color)?;

    let (mut sizes, size_fallback) = marker_sizes(&size.values, state.size_range, state.size_limits);
    let domain = color_domain(&color.values, state.color_limits);

    if state.outside_window == OutsideWindowPolicy::Hide {
        let [cmin, cmax] = domain;
        for (s, c) in sizes.iter_mut().zip(&color.values) {
            if *c < cmin || *c > cmax {
                *s = 0.0;
            }
        }
    }

    log::debug!(
        "Encoded {} rows: x='{}' y='{}' size='{}' color='{}'",
        table.n_rows(),
        x.name,
        y.name,
        size.name,
        color.name
    );

    Ok(PlotEncoding {
        x: x.values.clone(),
        y: y.values.clone(),
        sizes,
        colors: color.values.clone(),
        color_domain: domain,
        opacity: parse_opacity(state.opacity.as_deref()),
        colorscale: state.resolve_colorscale(),
        x_title: x.name.clone(),
        y_title: y.name.clone(),
        size_title: size.name.clone(),
        color_title: color.name.clone(),
        hover_texts,
        size_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Atom, InfoValue, Structure};
    use crate::table::Granularity;

    fn table_of(energies: &[f64], volumes: &[f64]) -> (FeatureTable, Vec<Structure>) {
        let structures: Vec<Structure> = energies
            .iter()
            .zip(volumes)
            .map(|(&e, &v)| {
                let mut s = Structure::new(vec![Atom::new("H", [0.0, 0.0, 0.0], 0)], [[0.0; 3]; 3], [false; 3]);
                s.info.insert("energy", InfoValue::Scalar(e));
                s.info.insert("volume", InfoValue::Scalar(v));
                s
            })
            .collect();
        let (table, diagnostics) = FeatureTable::build(&structures, Granularity::Structure);
        assert!(diagnostics.is_empty());
        (table, structures)
    }

    #[test]
    fn test_encode_copies_axes_and_titles() {
        let (table, structures) = table_of(&[1.0, 2.0, 3.0], &[10.0, 20.0, 40.0]);
        let state = EncodingState { x: 0, y: 1, size: 1, color: 0, ..Default::default() };
        let enc = encode(&table, &state, table.hover_texts(&structures)).unwrap();

        assert_eq!(enc.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(enc.y, vec![10.0, 20.0, 40.0]);
        assert_eq!(enc.x_title, "energy");
        assert_eq!(enc.y_title, "volume");
        assert_eq!(enc.colorscale, "Viridis");
        assert_eq!(enc.opacity, 1.0);
        assert_eq!(enc.color_domain, [1.0, 3.0]);
        assert_eq!(enc.hover_texts[2], "structure 2");
        assert!(!enc.size_fallback);
        assert_eq!(enc.sizes[0], 5.0);
        assert_eq!(enc.sizes[2], 50.0);
    }

    #[test]
    fn test_constant_size_column_falls_back() {
        let (table, _) = table_of(&[1.0, 2.0, 3.0], &[7.0, 7.0, 7.0]);
        let state = EncodingState { size: 1, ..Default::default() };
        let enc = encode(&table, &state, Vec::new()).unwrap();
        assert!(enc.size_fallback);
        assert_eq!(enc.sizes, vec![FALLBACK_MARKER_SIZE; 3]);
    }

    #[test]
    fn test_hide_policy_zeroes_sizes_outside_window() {
        let (table, _) = table_of(&[0.0, 5.0, 10.0], &[1.0, 2.0, 3.0]);
        let state = EncodingState {
            size: 1,
            color: 0,
            color_limits: [20.0, 80.0],
            outside_window: OutsideWindowPolicy::Hide,
            ..Default::default()
        };
        let enc = encode(&table, &state, Vec::new()).unwrap();
        assert_eq!(enc.sizes[0], 0.0);
        assert!(enc.sizes[1] > 0.0);
        assert_eq!(enc.sizes[2], 0.0);

        // Default policy keeps every point
        let clamp = EncodingState { outside_window: OutsideWindowPolicy::Clamp, ..state };
        let enc = encode(&table, &clamp, Vec::new()).unwrap();
        assert!(enc.sizes.iter().all(|&s| s > 0.0));
        assert_eq!(enc.colors, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let (table, _) = table_of(&[1.0], &[2.0]);
        let state = EncodingState { color: 9, ..Default::default() };
        assert!(matches!(
            encode(&table, &state, Vec::new()),
            Err(EncodingError::UnknownColumn { channel: "color", index: 9, .. })
        ));
    }

    #[test]
    fn test_blank_colorscale_resolves_to_default() {
        let mut state = EncodingState::default();
        assert_eq!(state.resolve_colorscale(), "Viridis");
        state.colorscale = Some("  ".into());
        assert_eq!(state.resolve_colorscale(), "Viridis");
        state.colorscale = Some("Jet".into());
        assert_eq!(state.resolve_colorscale(), "Jet");
    }

    #[test]
    fn test_figure_document() {
        let (table, _) = table_of(&[1.0, 2.0], &[3.0, 4.0]);
        let state = EncodingState { opacity: Some("0.4".into()), ..Default::default() };
        let enc = encode(&table, &state, vec!["a".into(), "b".into()]).unwrap();
        let json = serde_json::to_value(enc.figure(Some(600))).unwrap();

        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["mode"], "markers");
        assert_eq!(json["data"][0]["marker"]["line"]["color"], "rgb(0, 116, 217)");
        assert_eq!(json["data"][0]["marker"]["line"]["width"], 0.5);
        assert_eq!(json["data"][0]["marker"]["opacity"], 0.4);
        assert_eq!(json["data"][0]["marker"]["colorbar"]["title"], "energy");
        assert_eq!(json["layout"]["hovermode"], "closest");
        assert_eq!(json["layout"]["height"], 600);
        assert_eq!(json["layout"]["xaxis"]["title"], "energy");
    }
}
