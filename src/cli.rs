// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "soil-calc")]
#[command(about = "Soil health and vegetation index engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON engine configuration (defaults plus SOIL_CALC_* variables if omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Archive manifest describing the scenes to analyze
    #[arg(short, long, global = true)]
    pub archive: Option<PathBuf>,

    /// Output file path (stdout if omitted)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Worker threads for index evaluation
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Soil health report for one field
    Report {
        /// GeoJSON file with the field polygon
        #[arg(short, long)]
        region: PathBuf,

        /// First day (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Day after the last day (YYYY-MM-DD)
        #[arg(short, long)]
        end: String,
    },

    /// Per-period vegetation index series for one field
    Series {
        /// GeoJSON file with the field polygon
        #[arg(short, long)]
        region: PathBuf,

        /// First day (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Day after the last day (YYYY-MM-DD)
        #[arg(short, long)]
        end: String,

        /// Composite period in days (1-30)
        #[arg(short, long, default_value = "7")]
        period: u32,
    },

    /// Run a JSON batch file of field jobs
    Batch {
        /// Batch file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Interpret a single index value without any imagery
    Interpret {
        /// Index name, e.g. NDVI, pH, "Soil Texture", N
        #[arg(short, long)]
        index: String,

        /// Index value (texture: USDA class 1-12)
        #[arg(short, long, allow_hyphen_values = true)]
        value: f64,
    },
}
