// src/lib.rs
pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod processing;
pub mod region;
pub mod scoring;
pub mod session;
pub mod utils;
pub mod window;

pub use config::EngineConfig;
pub use engine::{LocalArchive, RasterEngine};
pub use processing::{SoilAnalyzer, SoilReport};
pub use region::Region;
pub use scoring::{IndexName, IndexValue};
pub use window::TimeWindow;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
