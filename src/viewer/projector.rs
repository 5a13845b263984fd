// src/viewer/projector.rs
//
// Selected plot row -> viewer payload.

use std::collections::BTreeMap;
use std::fmt;

use super::cell_box::cell_box;
use super::model_data::ModelData;
use super::periodic::{replicate, RepetitionSpec};
use super::{AtomStyle, Point3, Shape, ViewerPayload, ViewerSettings};
use crate::dataset::Dataset;
use crate::model::{element_data, hex_color};
use crate::utils::linalg::sub;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    RowOutOfRange { row: usize, n_rows: usize },
    MissingStructure { index: usize },
    MissingAtom { structure: usize, atom: usize },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::RowOutOfRange { row, n_rows } => {
                write!(f, "row {} out of range (table has {} rows)", row, n_rows)
            }
            SelectionError::MissingStructure { index } => {
                write!(f, "structure {} does not exist", index)
            }
            SelectionError::MissingAtom { structure, atom } => {
                write!(f, "structure {} has no atom {}", structure, atom)
            }
        }
    }
}

impl std::error::Error for SelectionError {}

pub fn project(
    dataset: &Dataset,
    row: usize,
    repetition: &RepetitionSpec,
    settings: &ViewerSettings,
) -> Result<ViewerPayload, SelectionError> {
    // 1. Which structure (and atom) the row stands for
    let target = dataset.table.resolve(row).ok_or(SelectionError::RowOutOfRange {
        row,
        n_rows: dataset.table.n_rows(),
    })?;
    let structure = dataset
        .structures
        .get(target.structure)
        .ok_or(SelectionError::MissingStructure { index: target.structure })?;

    // 2. Periodic images, then centre on the replicated centre of mass
    let shown = replicate(structure, repetition);
    let (model_data, com) = ModelData::from_structure(&shown);

    // 3. Cutoff and marker spheres around the selected atom (first image)
    let mut shapes = Vec::new();
    if let Some(atom) = target.atom {
        let position = shown
            .atoms
            .get(atom)
            .map(|a| a.position)
            .ok_or(SelectionError::MissingAtom { structure: target.structure, atom })?;
        let center = Point3::from(sub(position, com));

        shapes.push(Shape::Sphere {
            color: "gray".into(),
            center,
            radius: settings.soap_cutoff_radius,
            wireframe: true,
        });
        shapes.push(Shape::Sphere {
            color: "green".into(),
            center,
            radius: settings.marker_radius,
            wireframe: false,
        });
    }

    // 4. Cell frame, periodic structures only
    if shown.is_3d_periodic() {
        shapes.extend(cell_box(
            shown.lattice,
            [-com[0], -com[1], -com[2]],
            settings.axis_colors,
            &settings.cell_edge_color,
        ));
    }

    // 5. Per-atom colour and radius
    let styles: BTreeMap<String, AtomStyle> = shown
        .atoms
        .iter()
        .enumerate()
        .map(|(serial, atom)| {
            let data = element_data(&atom.element);
            let style = AtomStyle {
                color: hex_color(data.color),
                visualization_type: "sphere".into(),
                radius: data.covalent_radius,
            };
            (serial.to_string(), style)
        })
        .collect();

    log::debug!(
        "Viewer payload for row {}: structure {}, atom {:?}, {} atoms, {} shapes",
        row,
        target.structure,
        target.atom,
        shown.len(),
        shapes.len()
    );

    Ok(ViewerPayload {
        styles,
        shapes,
        model_data,
        width: settings.width,
        height: settings.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Atom, AtomArray, InfoValue, Structure};
    use crate::table::Granularity;

    fn rocksalt(energy: f64) -> Structure {
        let mut s = Structure::new(
            vec![
                Atom::new("Na", [0.0, 0.0, 0.0], 0),
                Atom::new("Cl", [2.8, 2.8, 2.8], 1),
            ],
            [[5.6, 0.0, 0.0], [0.0, 5.6, 0.0], [0.0, 0.0, 5.6]],
            [true; 3],
        );
        s.info.insert("energy", InfoValue::Scalar(energy));
        s.arrays.insert("charge", AtomArray::Scalar(vec![0.9, -0.9]));
        s
    }

    fn molecule() -> Structure {
        let mut s = Structure::new(
            vec![Atom::new("H", [0.0, 0.0, 0.0], 0), Atom::new("H", [0.74, 0.0, 0.0], 1)],
            [[0.0; 3]; 3],
            [false; 3],
        );
        s.info.insert("energy", InfoValue::Scalar(-1.0));
        s.arrays.insert("charge", AtomArray::Scalar(vec![0.0, 0.0]));
        s
    }

    #[test]
    fn test_structure_mode_payload() {
        let ds = Dataset::from_structures(vec![rocksalt(1.0), rocksalt(2.0)], Granularity::Structure);
        let payload = project(&ds, 1, &RepetitionSpec::default(), &ViewerSettings::default()).unwrap();

        assert_eq!(payload.model_data.atoms.len(), 2);
        assert_eq!(payload.styles.len(), 2);
        assert_eq!(payload.styles["0"].visualization_type, "sphere");
        assert_eq!(payload.styles["1"].color, "#1ff01f");
        // Only the cell frame in structure mode
        assert_eq!(payload.shapes.len(), 12);
        assert!(payload.shapes.iter().all(|s| matches!(s, Shape::Cylinder { .. })));
        assert_eq!((payload.width, payload.height), (500, 500));
    }

    #[test]
    fn test_atom_mode_adds_spheres_on_selected_atom() {
        let ds = Dataset::from_structures(vec![rocksalt(1.0), rocksalt(2.0)], Granularity::Atom);
        // Row 3 is structure 1, atom 1 (Cl)
        let payload = project(&ds, 3, &RepetitionSpec::default(), &ViewerSettings::default()).unwrap();
        assert_eq!(payload.shapes.len(), 14);

        let com = ds.structures[1].center_of_mass();
        match &payload.shapes[0] {
            Shape::Sphere { color, center, radius, wireframe } => {
                assert_eq!(color, "gray");
                assert!(*wireframe);
                assert_eq!(*radius, 4.5);
                assert!((center.x - (2.8 - com[0])).abs() < 1e-12);
            }
            other => panic!("expected cutoff sphere, got {:?}", other),
        }
        match &payload.shapes[1] {
            Shape::Sphere { color, radius, wireframe, .. } => {
                assert_eq!(color, "green");
                assert!(!*wireframe);
                assert_eq!(*radius, 1.0);
            }
            other => panic!("expected marker sphere, got {:?}", other),
        }
    }

    #[test]
    fn test_box_origin_is_minus_com() {
        let ds = Dataset::from_structures(vec![rocksalt(1.0)], Granularity::Structure);
        let spec: RepetitionSpec = "(0,2) (0,1) (0,1)".parse().unwrap();
        let payload = project(&ds, 0, &spec, &ViewerSettings::default()).unwrap();

        assert_eq!(payload.model_data.atoms.len(), 4);
        let replicated = replicate(&ds.structures[0], &spec);
        let com = replicated.center_of_mass();
        match &payload.shapes[0] {
            Shape::Cylinder { start, end, .. } => {
                assert!((start.x + com[0]).abs() < 1e-12);
                // Lattice stays the unit cell
                assert!((end.x - start.x - 5.6).abs() < 1e-12);
            }
            other => panic!("expected cylinder, got {:?}", other),
        }
    }

    #[test]
    fn test_molecule_has_no_cell_frame() {
        let ds = Dataset::from_structures(vec![molecule()], Granularity::Atom);
        let payload = project(&ds, 1, &RepetitionSpec::default(), &ViewerSettings::default()).unwrap();
        assert_eq!(payload.shapes.len(), 2);
        assert_eq!(payload.model_data.pbc, [false; 3]);
    }

    #[test]
    fn test_out_of_range_row() {
        let ds = Dataset::from_structures(vec![molecule()], Granularity::Structure);
        assert_eq!(
            project(&ds, 5, &RepetitionSpec::default(), &ViewerSettings::default()),
            Err(SelectionError::RowOutOfRange { row: 5, n_rows: 1 })
        );
    }

    #[test]
    fn test_payload_json_keys() {
        let ds = Dataset::from_structures(vec![molecule()], Granularity::Structure);
        let payload = project(&ds, 0, &RepetitionSpec::default(), &ViewerSettings::default()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("modelData").is_some());
        assert_eq!(json["modelData"]["atoms"][1]["serial"], 1);
        assert_eq!(json["styles"]["0"]["radius"], 0.31);
    }
}
