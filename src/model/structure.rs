// src/model/structure.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::elements::get_atomic_mass;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element: String,
    pub position: [f64; 3],
    // Index of the source atom in the unit cell. Periodic images keep
    // pointing at the atom they were copied from.
    #[serde(skip)]
    pub original_index: usize,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3], original_index: usize) -> Self {
        Self {
            element: element.into(),
            position,
            original_index,
        }
    }
}

/// Structure-level annotation value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InfoValue {
    Scalar(f64),
    Vector(Vec<f64>),
    Text(String),
}

/// Per-atom annotation. `Vector` stores `arity` values per atom, row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AtomArray {
    Scalar(Vec<f64>),
    Vector { arity: usize, values: Vec<f64> },
    Text(Vec<String>),
}

impl AtomArray {
    /// Number of atoms covered by this array.
    pub fn len(&self) -> usize {
        match self {
            AtomArray::Scalar(v) => v.len(),
            AtomArray::Vector { arity, values } => {
                if *arity == 0 {
                    0
                } else {
                    values.len() / arity
                }
            }
            AtomArray::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of atom `i` for numeric arrays.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        match self {
            AtomArray::Scalar(v) => v.get(i..i + 1),
            AtomArray::Vector { arity, values } => values.get(i * arity..(i + 1) * arity),
            AtomArray::Text(_) => None,
        }
    }

    /// Copies of the rows selected by `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> AtomArray {
        match self {
            AtomArray::Scalar(v) => AtomArray::Scalar(indices.iter().map(|&i| v[i]).collect()),
            AtomArray::Vector { arity, values } => AtomArray::Vector {
                arity: *arity,
                values: indices
                    .iter()
                    .flat_map(|&i| values[i * arity..(i + 1) * arity].iter().copied())
                    .collect(),
            },
            AtomArray::Text(v) => AtomArray::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Insertion-ordered key/value list. Order is the display order of the
/// feature table, so a hash map is not an option here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotations<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Annotations<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> Annotations<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    // Lattice vectors: [a_vec, b_vec, c_vec]. All zeros when there is no cell.
    pub lattice: [[f64; 3]; 3],
    pub pbc: [bool; 3],
    pub atoms: Vec<Atom>,
    pub info: Annotations<InfoValue>,
    pub arrays: Annotations<AtomArray>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>, lattice: [[f64; 3]; 3], pbc: [bool; 3]) -> Self {
        Self {
            lattice,
            pbc,
            atoms,
            info: Annotations::new(),
            arrays: Annotations::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn cell_lengths(&self) -> [f64; 3] {
        let norm = |v: [f64; 3]| Vector3::from(v).norm();
        [
            norm(self.lattice[0]),
            norm(self.lattice[1]),
            norm(self.lattice[2]),
        ]
    }

    /// True when all three lattice vectors have non-zero length.
    pub fn is_3d_periodic(&self) -> bool {
        self.cell_lengths().iter().all(|&l| l > 0.0)
    }

    /// Mass-weighted centre. Falls back to the plain centroid when every
    /// species is massless, and to the origin for an empty structure.
    pub fn center_of_mass(&self) -> [f64; 3] {
        if self.atoms.is_empty() {
            return [0.0; 3];
        }

        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for atom in &self.atoms {
            let m = get_atomic_mass(&atom.element);
            weighted += Vector3::from(atom.position) * m;
            total += m;
        }

        let center = if total > 0.0 {
            weighted / total
        } else {
            self.atoms
                .iter()
                .fold(Vector3::zeros(), |acc, a| acc + Vector3::from(a.position))
                / self.atoms.len() as f64
        };
        [center.x, center.y, center.z]
    }

    pub fn translate(&mut self, delta: [f64; 3]) {
        for atom in &mut self.atoms {
            atom.position[0] += delta[0];
            atom.position[1] += delta[1];
            atom.position[2] += delta[2];
        }
    }

    /// Hill-ordered formula, e.g. "C2H6O".
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        let mut out = String::new();
        let mut push = |el: &str, n: usize| {
            out.push_str(el);
            if n > 1 {
                out.push_str(&n.to_string());
            }
        };

        if let Some(c) = counts.remove("C") {
            push("C", c);
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (el, n) in counts {
            push(el, n);
        }
        out
    }

    /// Checks that every per-atom array covers exactly the atom list.
    pub fn validate(&self) -> Result<(), String> {
        for (key, array) in self.arrays.iter() {
            if array.len() != self.atoms.len() {
                return Err(format!(
                    "per-atom array '{}' has {} rows but the structure has {} atoms",
                    key,
                    array.len(),
                    self.atoms.len()
                ));
            }
        }
        Ok(())
    }
}
