// src/processing/indices/ndi.rs
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// Normalized difference expression: (A-B)/(A+B).
pub fn normalized_difference(band_a: &str, band_b: &str) -> String {
    format!("({band_a}-{band_b})/({band_a}+{band_b})")
}

/// Empirical NDVI to organic carbon factor.
pub const ORGANIC_CARBON_FACTOR: f64 = 0.05;

/// Normalized Difference Vegetation Index (NIR=B8, RED=B4)
pub struct NDVI {
    name: String,
}

impl NDVI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "NDVI".to_string()),
        }
    }

    pub fn expression() -> String {
        normalized_difference("B8", "B4")
    }
}

impl IndexCalculator for NDVI {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Ndvi]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B8", "B4"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("ndvi", &Self::expression(), 10.0, &self.name))
    }
}

/// Organic carbon estimated as NDVI times a fixed factor.
pub struct OrganicCarbon {
    name: String,
}

impl OrganicCarbon {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "organic carbon".to_string()),
        }
    }

    pub fn expression() -> String {
        format!("{}*{}", NDVI::expression(), ORGANIC_CARBON_FACTOR)
    }
}

impl IndexCalculator for OrganicCarbon {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::OrganicCarbon]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B8", "B4"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("oc", &Self::expression(), 10.0, &self.name))
    }
}
