// src/io/reader.rs
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::engine::local::Grid;
use crate::region::Region;

/// Read a region from a GeoJSON file (Feature, Polygon or bare ring).
pub fn read_region(path: &Path) -> Result<Region> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading region {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing region {}", path.display()))?;
    Ok(Region::from_geojson(&value)?)
}

/// First band of a raster file with its grid. Nodata pixels become NaN.
#[cfg(feature = "gdal")]
pub fn read_band(path: &Path) -> Result<(Vec<f32>, Grid)> {
    use gdal::Dataset;

    use crate::utils::scaling::mask_nodata;

    let dataset =
        Dataset::open(path).with_context(|| format!("opening raster {}", path.display()))?;
    let (width, height) = dataset.raster_size();
    let geo_transform = dataset.geo_transform()?;
    let band = dataset.rasterband(1)?;

    let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
    let (_, mut data) = buffer.into_shape_and_vec();
    mask_nodata(&mut data, band.no_data_value());

    let grid = Grid {
        width,
        height,
        geo_transform,
    };
    Ok((data, grid))
}

#[cfg(not(feature = "gdal"))]
pub fn read_band(path: &Path) -> Result<(Vec<f32>, Grid)> {
    Err(anyhow::anyhow!(
        "cannot read {}: built without the `gdal` feature",
        path.display()
    ))
}
