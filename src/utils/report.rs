// src/utils/report.rs

use crate::dataset::Dataset;
use crate::model::structure::Structure;

/// Text summary of one structure: formula, cell and the first atoms.
pub fn structure_summary(structure: &Structure, label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Structure: {}\n", label));
    out.push_str(&format!("Formula: {}\n", structure.formula()));

    if structure.is_3d_periodic() {
        let [a, b, c] = structure.cell_lengths();
        out.push_str(&format!("Cell: a={:.4} b={:.4} c={:.4} pbc={:?}\n", a, b, c, structure.pbc));
    } else {
        out.push_str("Cell: none\n");
    }

    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!(
        "{:<8} {:<8} {:<10} {:<10} {:<10}\n",
        "Index", "Element", "X", "Y", "Z"
    ));
    out.push_str("--------------------------------------------------\n");

    for (i, atom) in structure.atoms.iter().take(20).enumerate() {
        out.push_str(&format!(
            "{:<8} {:<8} {:<10.4} {:<10.4} {:<10.4}\n",
            i, atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    if structure.atoms.len() > 20 {
        out.push_str(&format!("... and {} more atoms.\n", structure.atoms.len() - 20));
    }

    out
}

/// Generates the text for the `info` command: collection size, table shape,
/// columns in dropdown order and skipped keys.
pub fn dataset_summary(dataset: &Dataset, filename: &str) -> String {
    let table = &dataset.table;
    let n_atoms: usize = dataset.structures.iter().map(Structure::len).sum();

    let mut out = String::new();
    out.push_str(&format!("File: {}\n", filename));
    out.push_str(&format!(
        "Structures: {} ({} atoms in total)\n",
        dataset.structures.len(),
        n_atoms
    ));
    out.push_str(&format!(
        "Feature table: {} mode, {} rows x {} columns\n",
        table.granularity(),
        table.n_rows(),
        table.n_columns()
    ));
    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!("{:<8} {:<24} {:<12} {:<12}\n", "Index", "Column", "Min", "Max"));
    out.push_str("--------------------------------------------------\n");

    for (i, col) in table.columns().iter().enumerate() {
        let min = col.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = col.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!("{:<8} {:<24} {:<12.5} {:<12.5}\n", i, col.name, min, max));
    }

    if !dataset.diagnostics.is_empty() {
        out.push_str("\nSkipped keys:\n");
        for d in &dataset.diagnostics {
            out.push_str(&format!("  {}\n", d));
        }
    }

    if let Some(first) = dataset.structures.first() {
        out.push('\n');
        out.push_str(&structure_summary(first, "0"));
    }

    out
}
