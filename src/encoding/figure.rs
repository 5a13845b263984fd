// src/encoding/figure.rs
//
// Plotly-style scatter figure document, the shape the dashboard's graph
// widget consumes.

use serde::Serialize;

use super::PlotEncoding;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<ScatterTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    pub hovertext: Vec<String>,
    pub marker: Marker,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Vec<f64>,
    pub colorscale: String,
    pub size: Vec<f64>,
    pub colorbar: ColorBar,
    pub opacity: f64,
    pub cmin: f64,
    pub cmax: f64,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub hovermode: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub zeroline: bool,
    pub showgrid: bool,
    pub ticks: String,
    pub automargin: bool,
    pub showline: bool,
    pub mirror: bool,
    pub title: String,
}

impl Axis {
    fn titled(title: &str) -> Self {
        Axis {
            zeroline: false,
            showgrid: false,
            ticks: "outside".into(),
            automargin: true,
            showline: true,
            mirror: true,
            title: title.to_string(),
        }
    }
}

impl PlotEncoding {
    pub fn figure(&self, height: Option<u32>) -> Figure {
        let trace = ScatterTrace {
            kind: "scatter".into(),
            x: self.x.clone(),
            y: self.y.clone(),
            mode: "markers".into(),
            hovertext: self.hover_texts.clone(),
            marker: Marker {
                color: self.colors.clone(),
                colorscale: self.colorscale.clone(),
                size: self.sizes.clone(),
                colorbar: ColorBar { title: self.color_title.clone() },
                opacity: self.opacity,
                cmin: self.color_domain[0],
                cmax: self.color_domain[1],
                line: MarkerLine {
                    color: "rgb(0, 116, 217)".into(),
                    width: 0.5,
                },
            },
            name: self.size_title.clone(),
        };

        Figure {
            data: vec![trace],
            layout: Layout {
                hovermode: "closest".into(),
                xaxis: Axis::titled(&self.x_title),
                yaxis: Axis::titled(&self.y_title),
                height,
            },
        }
    }
}
