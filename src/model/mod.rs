//src/model/mod.rs
pub mod elements;
pub mod structure;

// Re-exports for cleaner imports
pub use elements::{element_data, get_atom_properties, hex_color};
pub use structure::{Annotations, Atom, AtomArray, InfoValue, Structure};
