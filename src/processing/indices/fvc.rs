// src/processing/indices/fvc.rs
use super::ndi::NDVI;
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// NDVI of bare soil and of full cover.
const NDVI_SOIL: f64 = 0.2;
const NDVI_VEGETATION: f64 = 0.8;

/// Fractional Vegetation Cover: ((NDVI - NDVI_soil) / (NDVI_veg - NDVI_soil))^2
/// clamped to [0, 1]
pub struct FVC {
    name: String,
}

impl FVC {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "FVC".to_string()),
        }
    }

    pub fn expression() -> String {
        format!(
            "clamp(pow(({}-{NDVI_SOIL})/{}, 2), 0, 1)",
            NDVI::expression(),
            NDVI_VEGETATION - NDVI_SOIL
        )
    }
}

impl IndexCalculator for FVC {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Fvc]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B8", "B4"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("fvc", &Self::expression(), 10.0, &self.name))
    }
}
