// src/viewer/cell_box.rs
//
// Unit-cell frame drawn as 12 cylinders.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Point3, Shape};
use crate::utils::linalg::add;

/// Colours of the a, b, c edges leaving the origin corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisColors {
    /// a = blue, b = red, c = green
    #[default]
    AbcBlueRedGreen,
    /// a = red, b = green, c = blue
    AbcRedGreenBlue,
}

impl AxisColors {
    pub fn hex(&self) -> [&'static str; 3] {
        const RED: &str = "#ff0000";
        const GREEN: &str = "#00ff00";
        const BLUE: &str = "#0000ff";
        match self {
            AxisColors::AbcBlueRedGreen => [BLUE, RED, GREEN],
            AxisColors::AbcRedGreenBlue => [RED, GREEN, BLUE],
        }
    }
}

impl FromStr for AxisColors {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abc_blue_red_green" => Ok(AxisColors::AbcBlueRedGreen),
            "abc_red_green_blue" => Ok(AxisColors::AbcRedGreenBlue),
            other => Err(format!(
                "unknown axis colours '{}', expected abc_blue_red_green or abc_red_green_blue",
                other
            )),
        }
    }
}

/// Cell frame with its origin corner at `origin`.
///
/// The first three cylinders are a, b, c from the origin; the other nine
/// use `edge_color`.
pub fn cell_box(
    lattice: [[f64; 3]; 3],
    origin: [f64; 3],
    axis_colors: AxisColors,
    edge_color: &str,
) -> Vec<Shape> {
    let [a, b, c] = lattice;

    // Corners
    let p0 = origin;
    let p1 = add(p0, a);
    let p2 = add(p0, b);
    let p3 = add(p0, c);
    let p4 = add(p2, c);
    let p5 = add(p1, b);
    let p6 = add(p1, c);
    let p7 = add(p4, a);

    let cylinder = |color: &str, start: [f64; 3], end: [f64; 3]| Shape::Cylinder {
        color: color.to_string(),
        start: Point3::from(start),
        end: Point3::from(end),
    };

    let [ca, cb, cc] = axis_colors.hex();
    let mut shapes = vec![cylinder(ca, p0, p1), cylinder(cb, p0, p2), cylinder(cc, p0, p3)];

    let edges = [
        (p1, p5),
        (p1, p6),
        (p2, p4),
        (p2, p5),
        (p3, p4),
        (p3, p6),
        (p4, p7),
        (p5, p7),
        (p6, p7),
    ];
    shapes.extend(edges.iter().map(|&(s, e)| cylinder(edge_color, s, e)));
    shapes
}
