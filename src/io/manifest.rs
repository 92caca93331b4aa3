// src/io/manifest.rs
//! JSON description of a local archive.
//!
//! ```json
//! {
//!   "scenes": [{
//!     "id": "S2A_20240105", "collection": "COPERNICUS/S2_SR_HARMONIZED",
//!     "date": "2024-01-05", "cloud_cover": 4.2,
//!     "grid": {"width": 2, "height": 1, "geo_transform": [9.0, 0.01, 0.0, 45.0, 0.0, -0.01]},
//!     "bands": {"B4": [1200, 1300], "B8": "tiles/B8.tif"}
//!   }],
//!   "statics": [{"asset": "OpenLandMap/...", "bands": {"b0": "texture.tif"}}]
//! }
//! ```
//!
//! Band paths are relative to the manifest and need the `gdal` feature.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::reader::read_band;
use crate::engine::local::{Grid, Scene, StaticImage};
use crate::engine::LocalArchive;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum BandSource {
    /// Row-major pixel values, `null` for nodata.
    Inline(Vec<Option<f32>>),
    Path(PathBuf),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub id: String,
    pub collection: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    /// Required for inline bands, otherwise taken from the first file.
    #[serde(default)]
    pub grid: Option<Grid>,
    pub bands: BTreeMap<String, BandSource>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StaticEntry {
    pub asset: String,
    #[serde(default)]
    pub grid: Option<Grid>,
    pub bands: BTreeMap<String, BandSource>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ArchiveManifest {
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
    #[serde(default)]
    pub statics: Vec<StaticEntry>,
}

impl ArchiveManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing manifest {}", path.display()))
    }

    /// Build the archive, resolving band paths against `base_dir`.
    pub fn into_archive(self, base_dir: &Path) -> Result<LocalArchive> {
        let mut archive = LocalArchive::new();

        for entry in self.scenes {
            let (grid, bands) = resolve_bands(&entry.id, entry.grid, entry.bands, base_dir)?;
            let mut scene = Scene::new(entry.id, entry.collection, entry.date, grid);
            scene.cloud_cover = entry.cloud_cover;
            scene.bands = bands;
            archive.add_scene(scene)?;
        }

        for entry in self.statics {
            let (grid, bands) = resolve_bands(&entry.asset, entry.grid, entry.bands, base_dir)?;
            archive.add_static(entry.asset, StaticImage { grid, bands })?;
        }

        Ok(archive)
    }
}

fn resolve_bands(
    owner: &str,
    grid: Option<Grid>,
    sources: BTreeMap<String, BandSource>,
    base_dir: &Path,
) -> Result<(Grid, BTreeMap<String, Vec<f32>>)> {
    let mut grid = grid;
    let mut inline = Vec::new();
    let mut bands = BTreeMap::new();

    for (name, source) in sources {
        match source {
            BandSource::Inline(values) => {
                let values = values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect();
                inline.push((name, values));
            }
            BandSource::Path(path) => {
                let path = if path.is_absolute() { path } else { base_dir.join(path) };
                let (values, file_grid) = read_band(&path)?;
                match grid {
                    None => grid = Some(file_grid),
                    Some(g) if g.width != file_grid.width || g.height != file_grid.height => {
                        return Err(anyhow!(
                            "{owner}: band {name} is {}x{}, expected {}x{}",
                            file_grid.width,
                            file_grid.height,
                            g.width,
                            g.height
                        ));
                    }
                    Some(_) => {}
                }
                bands.insert(name, values);
            }
        }
    }

    let grid = grid.ok_or_else(|| anyhow!("{owner}: inline bands need a grid"))?;
    bands.extend(inline);
    Ok((grid, bands))
}

/// Load a manifest file into a [`LocalArchive`].
pub fn load_archive(path: &Path) -> Result<LocalArchive> {
    let manifest = ArchiveManifest::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let archive = manifest.into_archive(base_dir)?;
    info!("Loaded {} scenes from {}", archive.scene_count(), path.display());
    Ok(archive)
}
