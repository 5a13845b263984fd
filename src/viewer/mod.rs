// src/viewer/mod.rs
//
// Payload of the 3D molecule viewer: per-atom styles, extra shapes (cell
// frame, cutoff and marker spheres) and the model document.

pub mod cell_box;
pub mod model_data;
pub mod periodic;
pub mod projector;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use cell_box::AxisColors;
pub use model_data::{ModelAtom, ModelData};
pub use periodic::RepetitionSpec;
pub use projector::{project, SelectionError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Point3 { x: p[0], y: p[1], z: p[2] }
    }
}

impl Point3 {
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Sphere {
        color: String,
        center: Point3,
        radius: f64,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        wireframe: bool,
    },
    Cylinder {
        color: String,
        start: Point3,
        end: Point3,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomStyle {
    pub color: String,
    pub visualization_type: String,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerPayload {
    /// Keyed by atom serial ("0", "1", ...).
    pub styles: BTreeMap<String, AtomStyle>,
    pub shapes: Vec<Shape>,
    #[serde(rename = "modelData")]
    pub model_data: ModelData,
    /// Viewer panel size in px, for the host layout.
    pub width: u32,
    pub height: u32,
}

/// Drawing parameters of the viewer shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub soap_cutoff_radius: f64,
    pub marker_radius: f64,
    pub axis_colors: AxisColors,
    pub cell_edge_color: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            soap_cutoff_radius: 4.5,
            marker_radius: 1.0,
            axis_colors: AxisColors::default(),
            cell_edge_color: "#808080".into(),
            width: 500,
            height: 500,
        }
    }
}
