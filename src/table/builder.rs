// src/table/builder.rs

use rayon::prelude::*;
use std::fmt;

use super::{Column, FeatureTable, Granularity};
use crate::model::elements::get_atomic_number;
use crate::model::{AtomArray, InfoValue, Structure};

/// Why a key was left out of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Missing { structure: usize },
    ShapeMismatch { structure: usize, expected: usize, found: usize },
    NonNumeric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub key: String,
    pub reason: SkipReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::Missing { structure } => {
                write!(f, "Skipping key '{}': missing in structure {}", self.key, structure)
            }
            SkipReason::ShapeMismatch { structure, expected, found } => write!(
                f,
                "Skipping key '{}': structure {} has {} components, expected {}",
                self.key, structure, found, expected
            ),
            SkipReason::NonNumeric => write!(f, "Skipping key '{}': values are not numeric", self.key),
        }
    }
}

// Per-atom arrays every structure has, placed ahead of the annotations
const IMPLICIT_ATOM_KEYS: [&str; 2] = ["numbers", "positions"];

pub(super) fn build(
    structures: &[Structure],
    granularity: Granularity,
    species: Option<&[String]>,
) -> (FeatureTable, Vec<Diagnostic>) {
    // 1. Rows
    let rows: Vec<Vec<usize>> = match granularity {
        Granularity::Structure => Vec::new(),
        Granularity::Atom => structures
            .iter()
            .map(|s| {
                s.atoms
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| species.map_or(true, |sp| sp.iter().any(|e| *e == a.element)))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect(),
    };

    let (system_index, atom_index): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .enumerate()
        .flat_map(|(s_idx, locals)| locals.iter().map(move |&a| (s_idx, a)))
        .unzip();

    let n_rows = match granularity {
        Granularity::Structure => structures.len(),
        Granularity::Atom => system_index.len(),
    };

    // 2. Keys come from the first structure
    let keys: Vec<String> = match (granularity, structures.first()) {
        (_, None) => Vec::new(),
        (Granularity::Structure, Some(first)) => first.info.keys().map(String::from).collect(),
        (Granularity::Atom, Some(first)) => IMPLICIT_ATOM_KEYS
            .iter()
            .map(|k| k.to_string())
            .chain(
                first
                    .arrays
                    .keys()
                    .filter(|k| !IMPLICIT_ATOM_KEYS.contains(k))
                    .map(String::from),
            )
            .collect(),
    };

    // 3. Columns, one key per task; collect keeps key order
    let extracted: Vec<Result<Vec<Column>, Diagnostic>> = keys
        .par_iter()
        .map(|key| match granularity {
            Granularity::Structure => info_columns(key, structures),
            Granularity::Atom => atom_columns(key, structures, &rows),
        })
        .collect();

    let mut columns = Vec::new();
    let mut diagnostics = Vec::new();
    for result in extracted {
        match result {
            Ok(cols) => columns.extend(cols),
            Err(diag) => {
                log::warn!("{}", diag);
                diagnostics.push(diag);
            }
        }
    }

    log::debug!(
        "Feature table ({} mode): {} rows, {} columns",
        granularity,
        n_rows,
        columns.len()
    );

    let table = FeatureTable {
        granularity,
        columns,
        n_rows,
        system_index,
        atom_index,
    };
    (table, diagnostics)
}

fn expanded_names(key: &str, arity: usize, vector: bool) -> Vec<String> {
    if vector {
        (0..arity).map(|i| format!("{}_{}", key, i)).collect()
    } else {
        vec![key.to_string()]
    }
}

fn info_columns(key: &str, structures: &[Structure]) -> Result<Vec<Column>, Diagnostic> {
    let fail = |reason| Diagnostic { key: key.to_string(), reason };

    let (arity, vector) = match structures[0].info.get(key) {
        Some(InfoValue::Scalar(_)) => (1, false),
        Some(InfoValue::Vector(v)) => (v.len(), true),
        Some(InfoValue::Text(_)) => return Err(fail(SkipReason::NonNumeric)),
        None => return Err(fail(SkipReason::Missing { structure: 0 })),
    };

    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(structures.len()); arity];
    for (s_idx, s) in structures.iter().enumerate() {
        match (s.info.get(key), vector) {
            (None, _) => return Err(fail(SkipReason::Missing { structure: s_idx })),
            (Some(InfoValue::Text(_)), _) => return Err(fail(SkipReason::NonNumeric)),
            (Some(InfoValue::Scalar(x)), false) => values[0].push(*x),
            (Some(InfoValue::Vector(v)), true) if v.len() == arity => {
                for (i, x) in v.iter().enumerate() {
                    values[i].push(*x);
                }
            }
            (Some(other), _) => {
                let found = match other {
                    InfoValue::Vector(v) => v.len(),
                    _ => 1,
                };
                return Err(fail(SkipReason::ShapeMismatch {
                    structure: s_idx,
                    expected: arity,
                    found,
                }));
            }
        }
    }

    Ok(expanded_names(key, arity, vector)
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column { name, values })
        .collect())
}

fn atom_columns(
    key: &str,
    structures: &[Structure],
    rows: &[Vec<usize>],
) -> Result<Vec<Column>, Diagnostic> {
    let fail = |reason| Diagnostic { key: key.to_string(), reason };

    // Implicit arrays
    if key == "numbers" {
        let values = structures
            .iter()
            .zip(rows)
            .flat_map(|(s, locals)| locals.iter().map(move |&a| get_atomic_number(&s.atoms[a].element) as f64))
            .collect();
        return Ok(vec![Column { name: key.to_string(), values }]);
    }
    if key == "positions" {
        return Ok((0..3)
            .map(|k| Column {
                name: format!("positions_{}", k),
                values: structures
                    .iter()
                    .zip(rows)
                    .flat_map(|(s, locals)| locals.iter().map(move |&a| s.atoms[a].position[k]))
                    .collect(),
            })
            .collect());
    }

    let (arity, vector) = match structures[0].arrays.get(key) {
        Some(AtomArray::Scalar(_)) => (1, false),
        Some(AtomArray::Vector { arity, .. }) => (*arity, true),
        Some(AtomArray::Text(_)) => return Err(fail(SkipReason::NonNumeric)),
        None => return Err(fail(SkipReason::Missing { structure: 0 })),
    };

    let total: usize = rows.iter().map(Vec::len).sum();
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(total); arity];

    for (s_idx, (s, locals)) in structures.iter().zip(rows).enumerate() {
        let array = s
            .arrays
            .get(key)
            .ok_or_else(|| fail(SkipReason::Missing { structure: s_idx }))?;

        let found = match array {
            AtomArray::Text(_) => return Err(fail(SkipReason::NonNumeric)),
            AtomArray::Scalar(_) => 1,
            AtomArray::Vector { arity, .. } => *arity,
        };
        let same_kind = matches!(array, AtomArray::Vector { .. }) == vector;
        if found != arity || !same_kind {
            return Err(fail(SkipReason::ShapeMismatch { structure: s_idx, expected: arity, found }));
        }

        for &a in locals {
            let row = array
                .row(a)
                .ok_or_else(|| fail(SkipReason::Missing { structure: s_idx }))?;
            for (i, x) in row.iter().enumerate() {
                values[i].push(*x);
            }
        }
    }

    Ok(expanded_names(key, arity, vector)
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column { name, values })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Atom;
    use crate::table::RowRef;

    fn molecule(n: usize, energy: f64, with_charge: bool) -> Structure {
        let atoms = (0..n)
            .map(|i| Atom::new(if i == 0 { "O" } else { "H" }, [i as f64, 0.0, 0.0], i))
            .collect();
        let mut s = Structure::new(atoms, [[0.0; 3]; 3], [false; 3]);
        s.info.insert("energy", InfoValue::Scalar(energy));
        s.info.insert("pca_coord", InfoValue::Vector(vec![energy, -energy]));
        s.info.insert("label", InfoValue::Text("gas".into()));
        s.arrays.insert(
            "soap",
            AtomArray::Vector {
                arity: 2,
                values: (0..2 * n).map(|v| v as f64).collect(),
            },
        );
        if with_charge {
            s.arrays.insert("charge", AtomArray::Scalar(vec![0.5; n]));
        }
        s
    }

    #[test]
    fn test_structure_mode_expands_vectors() {
        let structures = vec![molecule(3, -1.0, true), molecule(2, -2.0, true)];
        let (table, diags) = FeatureTable::build(&structures, Granularity::Structure);

        assert_eq!(table.n_rows(), structures.len());
        assert_eq!(table.column_names(), vec!["energy", "pca_coord_0", "pca_coord_1"]);
        assert_eq!(table.column(1).unwrap().values, vec![-1.0, -2.0]);
        assert_eq!(table.column(2).unwrap().values, vec![1.0, 2.0]);

        // Text info is not plottable
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].key, "label");
        assert_eq!(diags[0].reason, SkipReason::NonNumeric);

        assert_eq!(table.resolve(1), Some(RowRef { structure: 1, atom: None }));
        assert!(table.system_index().is_empty());
    }

    #[test]
    fn test_atom_mode_rows_and_back_references() {
        let structures = vec![molecule(3, -1.0, true), molecule(2, -2.0, true)];
        let (table, diags) = FeatureTable::build(&structures, Granularity::Atom);

        let total: usize = structures.iter().map(Structure::len).sum();
        assert_eq!(table.n_rows(), total);
        assert!(diags.is_empty());
        assert_eq!(
            table.column_names(),
            vec![
                "numbers",
                "positions_0",
                "positions_1",
                "positions_2",
                "soap_0",
                "soap_1",
                "charge"
            ]
        );
        assert_eq!(table.system_index(), &[0, 0, 0, 1, 1]);
        assert_eq!(table.atom_index(), &[0, 1, 2, 0, 1]);
        assert_eq!(table.column_by_name("numbers").unwrap().values, vec![8.0, 1.0, 1.0, 8.0, 1.0]);
        assert_eq!(table.column_by_name("soap_1").unwrap().values, vec![1.0, 3.0, 5.0, 1.0, 3.0]);

        let r = table.resolve(4).unwrap();
        assert_eq!((r.structure, r.atom), (1, Some(1)));
        assert!(table.resolve(5).is_none());
    }

    #[test]
    fn test_missing_key_is_skipped_not_fatal() {
        let structures = vec![molecule(2, -1.0, true), molecule(2, -2.0, false)];
        let (table, diags) = FeatureTable::build(&structures, Granularity::Atom);

        assert!(table.column_by_name("charge").is_none());
        assert!(table.column_by_name("soap_0").is_some());
        assert_eq!(
            diags,
            vec![Diagnostic {
                key: "charge".into(),
                reason: SkipReason::Missing { structure: 1 }
            }]
        );
        assert!(diags[0].to_string().contains("missing in structure 1"));
    }

    #[test]
    fn test_vector_arity_mismatch_is_skipped() {
        let mut odd = molecule(2, -2.0, true);
        odd.info.insert("pca_coord", InfoValue::Vector(vec![1.0, 2.0, 3.0]));
        let structures = vec![molecule(2, -1.0, true), odd];

        let (table, diags) = FeatureTable::build(&structures, Granularity::Structure);
        assert_eq!(table.column_names(), vec!["energy"]);
        assert!(diags.iter().any(|d| d.reason
            == SkipReason::ShapeMismatch { structure: 1, expected: 2, found: 3 }));
    }

    #[test]
    fn test_species_filter_keeps_local_indices() {
        let structures = vec![molecule(3, -1.0, true), molecule(2, -2.0, true)];
        let (table, _) =
            FeatureTable::build_for_species(&structures, Granularity::Atom, &["H".to_string()]);

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.system_index(), &[0, 0, 1]);
        assert_eq!(table.atom_index(), &[1, 2, 1]);
        assert_eq!(table.column_by_name("positions_0").unwrap().values, vec![1.0, 2.0, 1.0]);

        let hover = table.hover_texts(&structures);
        assert_eq!(hover[2], "structure 1, atom 1 (H)");
    }

    #[test]
    fn test_empty_collection() {
        let (table, diags) = FeatureTable::build(&[], Granularity::Atom);
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_columns(), 0);
        assert!(diags.is_empty());
    }
}
