// src/io/mod.rs
pub mod manifest;
pub mod reader;
pub mod writer;

pub use manifest::{load_archive, ArchiveManifest};
pub use reader::{read_band, read_region};
pub use writer::write_json;
