// src/io/mod.rs
pub mod xyz;

use crate::model::Structure;
use crate::viewer::model_data::ModelData;
use std::fs::File;
use std::io::{self, BufReader};

// A viewer model file holds one model or a list of them
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ModelDocument {
    One(ModelData),
    Many(Vec<ModelData>),
}

/// Loads every frame of a structure file. Extended XYZ is the dataset
/// format; `.json` files are read as viewer model documents.
pub fn load_structures(path: &str) -> io::Result<Vec<Structure>> {
    let p = path.to_lowercase();

    let structures = if p.ends_with(".xyz") || p.ends_with(".extxyz") {
        xyz::parse(path)?
    } else if p.ends_with(".json") {
        let reader = BufReader::new(File::open(path)?);
        let doc: ModelDocument = serde_json::from_reader(reader)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match doc {
            ModelDocument::One(model) => vec![model.to_structure()],
            ModelDocument::Many(models) => models.iter().map(ModelData::to_structure).collect(),
        }
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("Unsupported structure format: {}", path),
        ));
    };

    for (i, s) in structures.iter().enumerate() {
        s.validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("frame {}: {}", i, e)))?;
    }

    log::info!("Loaded {} structures from {}", structures.len(), path);
    Ok(structures)
}

pub fn save_structures(path: &str, structures: &[Structure]) -> io::Result<()> {
    let p = path.to_lowercase();

    if p.ends_with(".json") {
        let file = File::create(path)?;
        let models: Vec<ModelData> = structures.iter().map(|s| ModelData::from_structure(s).0).collect();
        serde_json::to_writer_pretty(file, &models)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    } else {
        // Default fallback
        xyz::write(path, structures)
    }
}
