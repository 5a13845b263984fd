// src/dataset.rs
//
// Loaded structure collection together with its feature table.

use std::io;

use crate::io::load_structures;
use crate::model::Structure;
use crate::table::{Diagnostic, FeatureTable, Granularity};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub structures: Vec<Structure>,
    pub table: FeatureTable,
    pub diagnostics: Vec<Diagnostic>,
    /// Species kept in atom mode; empty keeps every atom.
    pub species: Vec<String>,
}

impl Dataset {
    pub fn load(path: &str, granularity: Granularity) -> io::Result<Self> {
        Self::load_with_species(path, granularity, &[])
    }

    pub fn load_with_species(
        path: &str,
        granularity: Granularity,
        species: &[String],
    ) -> io::Result<Self> {
        let structures = load_structures(path)?;
        if structures.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} contains no structures", path),
            ));
        }
        Ok(Self::from_structures_with_species(structures, granularity, species))
    }

    pub fn from_structures(structures: Vec<Structure>, granularity: Granularity) -> Self {
        Self::from_structures_with_species(structures, granularity, &[])
    }

    pub fn from_structures_with_species(
        structures: Vec<Structure>,
        granularity: Granularity,
        species: &[String],
    ) -> Self {
        let (table, diagnostics) = FeatureTable::build_for_species(&structures, granularity, species);
        log::info!(
            "Feature table ({} mode): {} rows x {} columns, {} keys skipped",
            granularity,
            table.n_rows(),
            table.n_columns(),
            diagnostics.len()
        );
        if !species.is_empty() && granularity == Granularity::Atom {
            log::info!("Atom rows limited to {}", species.join(","));
        }
        Self {
            structures,
            table,
            diagnostics,
            species: species.to_vec(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.table.granularity()
    }

    pub fn hover_texts(&self) -> Vec<String> {
        self.table.hover_texts(&self.structures)
    }
}
