// src/engine/local.rs
//! In-process raster engine over scenes held in memory.
//!
//! Implements the same request semantics as a hosted engine: collection
//! filtering, per-pixel median compositing, band algebra and mean/mode
//! reduction over the region. Reductions run on the native grid; the
//! request's `scale` is not used for resampling.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::expression::Expr;
use super::{ImageQuery, ImageSource, RasterEngine, ReduceRequest, Statistic, Statistics};
use crate::error::EngineError;
use crate::region::{BBox, Region};
use crate::utils::scaling::{median, rescale};

/// Pixel grid with a GDAL-style affine geotransform in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub geo_transform: [f64; 6],
}

impl Grid {
    /// North-up grid whose top-left corner is `(lon, lat)`.
    pub fn north_up(width: usize, height: usize, lon: f64, lat: f64, pixel_size: f64) -> Self {
        Self {
            width,
            height,
            geo_transform: [lon, pixel_size, 0.0, lat, 0.0, -pixel_size],
        }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn project(&self, col: f64, row: f64) -> (f64, f64) {
        let gt = &self.geo_transform;
        (
            gt[0] + col * gt[1] + row * gt[2],
            gt[3] + col * gt[4] + row * gt[5],
        )
    }

    /// Coordinates of the centre of pixel `index` (row-major).
    pub fn pixel_center(&self, index: usize) -> (f64, f64) {
        let (row, col) = (index / self.width, index % self.width);
        self.project(col as f64 + 0.5, row as f64 + 0.5)
    }

    pub fn footprint(&self) -> BBox {
        let corners = [
            self.project(0.0, 0.0),
            self.project(self.width as f64, 0.0),
            self.project(0.0, self.height as f64),
            self.project(self.width as f64, self.height as f64),
        ];
        let (lons, lats): (Vec<f64>, Vec<f64>) = corners.into_iter().unzip();
        BBox {
            min_lon: lons.iter().copied().fold(f64::INFINITY, f64::min),
            min_lat: lats.iter().copied().fold(f64::INFINITY, f64::min),
            max_lon: lons.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            max_lat: lats.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// One acquisition of a collection.
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: String,
    pub collection: String,
    pub date: NaiveDate,
    pub cloud_cover: Option<f64>,
    pub grid: Grid,
    pub bands: BTreeMap<String, Vec<f32>>,
}

impl Scene {
    pub fn new(
        id: impl Into<String>,
        collection: impl Into<String>,
        date: NaiveDate,
        grid: Grid,
    ) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            date,
            cloud_cover: None,
            grid,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_cloud_cover(mut self, percent: f64) -> Self {
        self.cloud_cover = Some(percent);
        self
    }

    pub fn with_band(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.bands.insert(name.into(), values);
        self
    }

    /// Every pixel of `name` set to `value`.
    pub fn with_constant_band(self, name: impl Into<String>, value: f32) -> Self {
        let len = self.grid.len();
        self.with_band(name, vec![value; len])
    }

    fn check_bands(&self) -> Result<(), EngineError> {
        check_band_sizes(&self.grid, &self.bands)
    }
}

/// Time-invariant image, e.g. a global soil texture map.
#[derive(Debug, Clone)]
pub struct StaticImage {
    pub grid: Grid,
    pub bands: BTreeMap<String, Vec<f32>>,
}

fn check_band_sizes(grid: &Grid, bands: &BTreeMap<String, Vec<f32>>) -> Result<(), EngineError> {
    for (band, values) in bands {
        if values.len() != grid.len() {
            return Err(EngineError::BandSize {
                band: band.clone(),
                expected: grid.len(),
                found: values.len(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LocalArchive {
    scenes: Vec<Scene>,
    statics: HashMap<String, StaticImage>,
}

impl LocalArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scene(&mut self, scene: Scene) -> Result<(), EngineError> {
        scene.check_bands()?;
        self.scenes.push(scene);
        Ok(())
    }

    pub fn add_static(
        &mut self,
        asset: impl Into<String>,
        image: StaticImage,
    ) -> Result<(), EngineError> {
        check_band_sizes(&image.grid, &image.bands)?;
        self.statics.insert(asset.into(), image);
        Ok(())
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Scenes matching `query`, earliest first.
    fn matching(&self, query: &ImageQuery) -> Vec<&Scene> {
        let area = query.region.bbox().buffered(query.buffer_m);
        self.scenes
            .iter()
            .filter(|scene| scene.collection == query.collection)
            .filter(|scene| query.window.contains(scene.date))
            .filter(|scene| match query.max_cloud {
                Some(max) => scene.cloud_cover.map_or(false, |cloud| cloud < max),
                None => true,
            })
            .filter(|scene| scene.grid.footprint().intersects(&area))
            .sorted_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    /// Per-pixel median composite of `bands` over the matching scenes.
    fn composite_bands(
        &self,
        query: &ImageQuery,
        bands: &[String],
        scale: f64,
        offset: f64,
    ) -> Result<(Grid, Vec<Vec<f32>>), EngineError> {
        let scenes = self.matching(query);
        let first = scenes.first().ok_or_else(|| EngineError::NoImages {
            collection: query.collection.clone(),
        })?;
        let grid = first.grid;
        if scenes.iter().any(|scene| scene.grid != grid) {
            return Err(EngineError::GridMismatch {
                collection: query.collection.clone(),
            });
        }

        let mut composite = Vec::with_capacity(bands.len());
        for band in bands {
            let layers = scenes
                .iter()
                .map(|scene| {
                    scene
                        .bands
                        .get(band)
                        .map(Vec::as_slice)
                        .ok_or_else(|| EngineError::UnknownBand { band: band.clone() })
                })
                .collect::<Result<Vec<&[f32]>, _>>()?;

            let mut data: Vec<f32> = (0..grid.len())
                .into_par_iter()
                .map(|i| {
                    let mut stack: Vec<f32> = layers.iter().map(|layer| layer[i]).collect();
                    median(&mut stack)
                })
                .collect();
            rescale(&mut data, scale, offset);
            composite.push(data);
        }

        Ok((grid, composite))
    }

    fn static_band(&self, asset: &str, band: &str) -> Result<(Grid, Vec<f32>), EngineError> {
        let image = self
            .statics
            .get(asset)
            .ok_or_else(|| EngineError::UnknownSource(asset.to_string()))?;
        let data = image.bands.get(band).ok_or_else(|| EngineError::UnknownBand {
            band: band.to_string(),
        })?;
        Ok((image.grid, data.clone()))
    }
}

/// Pixels of `grid` whose centre lies inside `region`.
fn region_mask(grid: &Grid, region: &Region) -> Vec<usize> {
    (0..grid.len())
        .into_par_iter()
        .filter(|&i| {
            let (lon, lat) = grid.pixel_center(i);
            region.contains(lon, lat)
        })
        .collect()
}

fn reduce_values(values: &[f64], statistic: Statistic) -> Option<f64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    match statistic {
        Statistic::Mean => {
            let (sum, n) = finite.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            (n > 0).then(|| sum / n as f64)
        }
        Statistic::Mode => finite
            .map(|v| v.round() as i64)
            .counts()
            .into_iter()
            // most frequent, ties resolved to the smaller class
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(class, _)| class as f64),
    }
}

fn parse_error(expression: &str, reason: impl ToString) -> EngineError {
    EngineError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

impl RasterEngine for LocalArchive {
    fn count(&self, query: &ImageQuery) -> Result<usize, EngineError> {
        Ok(self.matching(query).len())
    }

    fn band_names(&self, query: &ImageQuery) -> Result<Vec<String>, EngineError> {
        Ok(self
            .matching(query)
            .first()
            .map(|scene| scene.bands.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn reduce(&self, request: &ReduceRequest) -> Result<Statistics, EngineError> {
        let parsed = request
            .outputs
            .iter()
            .map(|output| {
                Expr::parse(&output.expression)
                    .map(|expr| (output.name.as_str(), expr))
                    .map_err(|e| parse_error(&output.expression, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let referenced: Vec<String> = parsed
            .iter()
            .flat_map(|(_, expr)| expr.bands())
            .unique()
            .sorted()
            .collect();

        let (grid, layers) = match &request.source {
            ImageSource::Composite(composite) => {
                if let Some(band) = referenced
                    .iter()
                    .find(|band| !composite.query.bands.contains(band))
                {
                    return Err(EngineError::UnknownBand { band: band.clone() });
                }
                self.composite_bands(
                    &composite.query,
                    &referenced,
                    composite.scale,
                    composite.offset,
                )?
            }
            ImageSource::Static { asset, band } => {
                if let Some(other) = referenced.iter().find(|name| *name != band) {
                    return Err(EngineError::UnknownBand {
                        band: other.clone(),
                    });
                }
                let (grid, data) = self.static_band(asset, band)?;
                let layers = if referenced.is_empty() { Vec::new() } else { vec![data] };
                (grid, layers)
            }
        };

        let mask = region_mask(&grid, &request.region);
        if mask.len() as f64 > request.max_pixels {
            return Err(EngineError::TooManyPixels {
                pixels: mask.len(),
                budget: request.max_pixels,
            });
        }

        let slots: HashMap<String, usize> = referenced
            .iter()
            .enumerate()
            .map(|(slot, band)| (band.clone(), slot))
            .collect();

        let mut stats = Statistics::default();
        for (name, expr) in &parsed {
            let bound = expr
                .bind(&slots)
                .map_err(|e| parse_error(&expr_source(request, name), e))?;
            let values: Vec<f64> = mask
                .par_iter()
                .map(|&i| {
                    let pixel: Vec<f64> = layers.iter().map(|layer| f64::from(layer[i])).collect();
                    bound.eval(&pixel)
                })
                .collect();
            stats.insert(*name, reduce_values(&values, request.statistic));
        }

        Ok(stats)
    }
}

fn expr_source(request: &ReduceRequest, name: &str) -> String {
    request
        .outputs
        .iter()
        .find(|output| output.name == name)
        .map(|output| output.expression.clone())
        .unwrap_or_default()
}
