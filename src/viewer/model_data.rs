// src/viewer/model_data.rs
//
// Molecule3dViewer model document: atom list, bonds, periodic flags and
// cell. Positions are stored relative to the centre of mass.

use serde::{Deserialize, Serialize};

use crate::model::{Atom, Structure};
use crate::utils::linalg::sub;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAtom {
    pub name: String,
    pub chain: String,
    pub residue_index: usize,
    pub residue_name: String,
    pub serial: usize,
    pub element: String,
    pub positions: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBond {
    pub atom1_index: usize,
    pub atom2_index: usize,
    pub bond_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub atoms: Vec<ModelAtom>,
    #[serde(default)]
    pub bonds: Vec<ModelBond>,
    #[serde(default)]
    pub pbc: [bool; 3],
    #[serde(default)]
    pub cell: [[f64; 3]; 3],
}

impl ModelData {
    /// Builds the model of `structure` centred on its centre of mass.
    /// Returns the centre that was subtracted.
    pub fn from_structure(structure: &Structure) -> (Self, [f64; 3]) {
        let com = structure.center_of_mass();

        let atoms = structure
            .atoms
            .iter()
            .enumerate()
            .map(|(serial, atom)| ModelAtom {
                name: atom.element.clone(),
                chain: "A".into(),
                residue_index: 0,
                residue_name: "A".into(),
                serial,
                element: atom.element.clone(),
                positions: sub(atom.position, com),
            })
            .collect();

        let model = ModelData {
            atoms,
            bonds: Vec::new(),
            pbc: structure.pbc,
            cell: structure.lattice,
        };
        (model, com)
    }

    /// Back to a structure, keeping the centred coordinates.
    pub fn to_structure(&self) -> Structure {
        let mut sorted: Vec<&ModelAtom> = self.atoms.iter().collect();
        sorted.sort_by_key(|a| a.serial);

        let atoms = sorted
            .iter()
            .enumerate()
            .map(|(i, a)| Atom::new(a.element.clone(), a.positions, i))
            .collect();
        Structure::new(atoms, self.cell, self.pbc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Structure {
        Structure::new(
            vec![
                Atom::new("O", [0.0, 0.0, 0.0], 0),
                Atom::new("H", [0.757, 0.586, 0.0], 1),
                Atom::new("H", [-0.757, 0.586, 0.0], 2),
            ],
            [[0.0; 3]; 3],
            [false; 3],
        )
    }

    #[test]
    fn test_model_fields() {
        let (model, com) = ModelData::from_structure(&water());
        assert_eq!(model.atoms.len(), 3);
        assert!(com[1] > 0.0 && com[1] < 0.586);

        let h = &model.atoms[1];
        assert_eq!(h.serial, 1);
        assert_eq!(h.element, "H");
        assert_eq!(h.name, "H");
        assert_eq!(h.chain, "A");
        assert_eq!(h.residue_name, "A");
        assert_eq!(h.residue_index, 0);
        assert!((h.positions[1] - (0.586 - com[1])).abs() < 1e-12);
        assert!(model.bonds.is_empty());

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["atoms"][0]["positions"].as_array().unwrap().len(), 3);
        assert_eq!(json["pbc"], serde_json::json!([false, false, false]));
    }

    #[test]
    fn test_json_round_trip_keeps_centred_positions() {
        let mut s = water();
        s.lattice = [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]];
        s.pbc = [true; 3];

        let (model, com) = ModelData::from_structure(&s);
        let text = serde_json::to_string(&model).unwrap();
        let back: ModelData = serde_json::from_str(&text).unwrap();
        let restored = back.to_structure();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.pbc, [true; 3]);
        assert_eq!(restored.lattice, s.lattice);
        for (orig, new) in s.atoms.iter().zip(&restored.atoms) {
            assert_eq!(orig.element, new.element);
            for k in 0..3 {
                assert!((orig.position[k] - com[k] - new.position[k]).abs() < 1e-9);
            }
        }
    }
}
