// src/table/mod.rs
//
// Flat numeric feature table built from a structure collection. One row
// per structure, or one row per atom with hidden back-references to the
// owning structure and the atom's local index.

pub mod builder;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Structure;

pub use builder::{Diagnostic, SkipReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One row per structure, features from structure-level info.
    #[default]
    #[serde(alias = "molecular")]
    Structure,
    /// One row per atom, features from per-atom arrays.
    #[serde(alias = "atomic")]
    Atom,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structure" | "molecular" => Ok(Granularity::Structure),
            "atom" | "atomic" => Ok(Granularity::Atom),
            other => Err(format!(
                "unknown mode '{}', expected 'structure' (molecular) or 'atom' (atomic)",
                other
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Structure => write!(f, "structure"),
            Granularity::Atom => write!(f, "atom"),
        }
    }
}

/// Species list from "all" or "Si,O". "all" and blank mean no filter.
pub fn parse_species(text: &str) -> Vec<String> {
    if text.trim().eq_ignore_ascii_case("all") {
        return Vec::new();
    }
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Where a table row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    pub structure: usize,
    /// Local atom index, `None` in structure mode.
    pub atom: Option<usize>,
}

/// Entry of the axis/size/colour dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    granularity: Granularity,
    columns: Vec<Column>,
    n_rows: usize,
    // Atom mode only; never exposed as columns
    system_index: Vec<usize>,
    atom_index: Vec<usize>,
}

impl FeatureTable {
    pub fn build(structures: &[Structure], granularity: Granularity) -> (Self, Vec<Diagnostic>) {
        builder::build(structures, granularity, None)
    }

    /// Atom mode restricted to the given species. Structure mode ignores
    /// the filter, and an empty list keeps every atom.
    pub fn build_for_species(
        structures: &[Structure],
        granularity: Granularity,
        species: &[String],
    ) -> (Self, Vec<Diagnostic>) {
        let filter = if species.is_empty() { None } else { Some(species) };
        builder::build(structures, granularity, filter)
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn dropdown_options(&self) -> Vec<DropdownOption> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| DropdownOption { label: c.name.clone(), value: i })
            .collect()
    }

    /// Back-reference of a row into the structure collection.
    pub fn resolve(&self, row: usize) -> Option<RowRef> {
        if row >= self.n_rows {
            return None;
        }
        match self.granularity {
            Granularity::Structure => Some(RowRef { structure: row, atom: None }),
            Granularity::Atom => Some(RowRef {
                structure: self.system_index[row],
                atom: Some(self.atom_index[row]),
            }),
        }
    }

    pub fn system_index(&self) -> &[usize] {
        &self.system_index
    }

    pub fn atom_index(&self) -> &[usize] {
        &self.atom_index
    }

    /// Hover label per row: "structure 3" or "structure 3, atom 5 (O)".
    pub fn hover_texts(&self, structures: &[Structure]) -> Vec<String> {
        (0..self.n_rows)
            .filter_map(|row| self.resolve(row))
            .map(|r| match r.atom {
                None => format!("structure {}", r.structure),
                Some(a) => {
                    let element = structures
                        .get(r.structure)
                        .and_then(|s| s.atoms.get(a))
                        .map(|atom| atom.element.as_str())
                        .unwrap_or("?");
                    format!("structure {}, atom {} ({})", r.structure, a, element)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("atomic".parse::<Granularity>(), Ok(Granularity::Atom));
        assert_eq!("Atom".parse::<Granularity>(), Ok(Granularity::Atom));
        assert_eq!("molecular".parse::<Granularity>(), Ok(Granularity::Structure));
        assert!("compound".parse::<Granularity>().is_err());
        assert_eq!(Granularity::Atom.to_string(), "atom");

        let g: Granularity = serde_json::from_str("\"atomic\"").unwrap();
        assert_eq!(g, Granularity::Atom);
    }

    #[test]
    fn test_parse_species() {
        assert!(parse_species("all").is_empty());
        assert!(parse_species(" ALL ").is_empty());
        assert!(parse_species("").is_empty());
        assert_eq!(parse_species("Si, O,,"), vec!["Si".to_string(), "O".to_string()]);
    }
}
