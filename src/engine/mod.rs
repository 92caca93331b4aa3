// src/engine/mod.rs
//! Interface to the raster-analysis engine that owns the imagery.
//!
//! Requests describe *what* to compute (collection filter, band algebra,
//! reduction); the engine does the per-pixel work and returns statistics.

pub mod expression;
pub mod local;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::region::Region;
use crate::window::TimeWindow;

pub use local::LocalArchive;

/// Filter over an image collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQuery {
    pub collection: String,
    pub region: Region,
    /// Extra margin around the region when matching image footprints.
    #[serde(default)]
    pub buffer_m: f64,
    pub window: TimeWindow,
    /// Keep only images whose cloud percentage is strictly below this.
    pub max_cloud: Option<f64>,
    pub bands: Vec<String>,
}

/// Per-pixel median of an [`ImageQuery`], rescaled as `median * scale + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub query: ImageQuery,
    pub scale: f64,
    pub offset: f64,
    /// Number of frames that qualified when the composite was selected.
    pub frames: usize,
}

impl Composite {
    pub fn window(&self) -> TimeWindow {
        self.query.window
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    Composite(Composite),
    /// A single time-invariant image, e.g. a global soil map.
    Static { asset: String, band: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Mode,
}

/// Output band `name` computed as `expression` over the source bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedExpression {
    pub name: String,
    pub expression: String,
}

impl NamedExpression {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceRequest {
    pub source: ImageSource,
    pub region: Region,
    pub outputs: Vec<NamedExpression>,
    pub statistic: Statistic,
    /// Nominal pixel size in meters.
    pub scale: f64,
    pub max_pixels: f64,
}

/// Engine response: one entry per requested output. `None` means the
/// engine returned null (e.g. no valid pixels inside the region).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics(pub BTreeMap<String, Option<f64>>);

impl Statistics {
    /// `None` if the key is missing, `Some(None)` if present but null.
    pub fn get(&self, name: &str) -> Option<Option<f64>> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.0.insert(name.into(), value);
    }
}

/// A remote (or local) raster-analysis engine.
pub trait RasterEngine: Send + Sync {
    /// Number of images matching the query.
    fn count(&self, query: &ImageQuery) -> Result<usize, EngineError>;

    /// Band names of the earliest image matching the query, empty if none.
    fn band_names(&self, query: &ImageQuery) -> Result<Vec<String>, EngineError>;

    /// Evaluate and spatially reduce the requested expressions.
    fn reduce(&self, request: &ReduceRequest) -> Result<Statistics, EngineError>;
}

impl<T: RasterEngine + ?Sized> RasterEngine for &T {
    fn count(&self, query: &ImageQuery) -> Result<usize, EngineError> {
        (**self).count(query)
    }

    fn band_names(&self, query: &ImageQuery) -> Result<Vec<String>, EngineError> {
        (**self).band_names(query)
    }

    fn reduce(&self, request: &ReduceRequest) -> Result<Statistics, EngineError> {
        (**self).reduce(request)
    }
}

impl<T: RasterEngine + ?Sized> RasterEngine for std::sync::Arc<T> {
    fn count(&self, query: &ImageQuery) -> Result<usize, EngineError> {
        (**self).count(query)
    }

    fn band_names(&self, query: &ImageQuery) -> Result<Vec<String>, EngineError> {
        (**self).band_names(query)
    }

    fn reduce(&self, request: &ReduceRequest) -> Result<Statistics, EngineError> {
        (**self).reduce(request)
    }
}
