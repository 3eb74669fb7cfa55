//! Taxonomy CSV import library - shared modules for the importer binary.

pub mod error;
pub mod import;
pub mod models;
pub mod normalize;
pub mod paths;
pub mod progress;
pub mod schema;
pub mod source;
pub mod tags;

pub use error::ImportError;
pub use import::{run, ImportConfig, ImportReport};
