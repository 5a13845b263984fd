//! Linked 2D feature projection and 3D structure-viewer payloads for
//! atomistic datasets.
//!
//! A structure collection is flattened into a [`table::FeatureTable`],
//! chosen columns are mapped onto scatter-plot channels by
//! [`encoding::encode`], and a selected row is turned into a
//! Molecule3dViewer payload by [`viewer::project`]. [`session::Session`]
//! ties the three together behind an event -> update interface.

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod io;
pub mod model;
pub mod rendering;
pub mod session;
pub mod table;
pub mod utils;
pub mod viewer;

pub use dataset::Dataset;
pub use session::{Event, Session, Update};
