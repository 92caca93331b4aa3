// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::RasterEngine;
use crate::io::write_json;
use crate::processing::SoilAnalyzer;
use crate::region::Region;
use crate::session::DEFAULT_PERIOD_DAYS;
use crate::window::TimeWindow;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub fields: Vec<FieldJob>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    #[default]
    Report,
    Series,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub kind: JobKind,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            kind: JobKind::default(),
            period_days: default_period_days(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_period_days() -> u32 {
    DEFAULT_PERIOD_DAYS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Deserialize, Serialize, Debug)]
pub struct FieldJob {
    pub name: String,
    /// GeoJSON Feature, Polygon or coordinate array.
    pub region: serde_json::Value,
    pub start: Option<String>,
    pub end: Option<String>,
    pub kind: Option<JobKind>,
    pub period_days: Option<u32>,
    pub output: Option<PathBuf>,
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading batch file {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing batch file {}", path.display()))
    }
}

/// Run every field job and write one JSON result per field. Returns the
/// written paths.
pub fn process_batch<E: RasterEngine>(config: &BatchConfig, analyzer: &SoilAnalyzer<E>) -> Result<Vec<PathBuf>> {
    let total = config.fields.len();
    info!("Starting batch processing with {total} fields...");

    let mut written = Vec::with_capacity(total);
    for (i, job) in config.fields.iter().enumerate() {
        // Job values override global ones
        let start = job.start.as_deref().or(config.global.start.as_deref());
        let end = job.end.as_deref().or(config.global.end.as_deref());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(anyhow!("field {}: no start/end date", job.name));
        };
        let window = TimeWindow::parse(start, end).with_context(|| format!("field {}", job.name))?;
        let region = Region::from_geojson(&job.region).with_context(|| format!("field {}", job.name))?;
        let kind = job.kind.unwrap_or(config.global.kind);
        let output = job
            .output
            .clone()
            .unwrap_or_else(|| config.global.output_dir.join(format!("{}.json", job.name)));

        info!("[{}/{}] {:?} {} -> {}", i + 1, total, kind, job.name, output.display());

        match kind {
            JobKind::Report => {
                let report = analyzer.analyze(&region, window);
                write_json(&report, Some(&output))?;
            }
            JobKind::Series => {
                let period_days = job.period_days.unwrap_or(config.global.period_days);
                let series = analyzer
                    .series(&region, window, period_days)
                    .with_context(|| format!("field {}", job.name))?;
                write_json(&series, Some(&output))?;
            }
        }
        written.push(output);
    }

    info!("Batch processing complete!");
    Ok(written)
}
