// src/processing/mod.rs
pub mod analysis;
pub mod composite;
pub mod indices;
pub mod reduction;
pub mod timeseries;

// Re-export main components
pub use analysis::{IndexEntry, IndexValues, SoilAnalyzer, SoilReport};
pub use composite::{CompositeSelection, CompositeSelector, SelectorSettings};
pub use reduction::RemoteReduction;
pub use timeseries::{CompositeSeries, SeriesPoint};
