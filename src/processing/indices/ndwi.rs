// src/processing/indices/ndwi.rs
use super::ndi::normalized_difference;
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// Green/SWIR moisture index used by the composite time series.
pub fn series_expression() -> String {
    normalized_difference("B3", "B11")
}

/// Expression used for the soil report NDWI. It divides green by itself,
/// giving 1 wherever B3 is non-zero.
pub const REPORT_NDWI_EXPRESSION: &str = "(B3)/(B3)";

/// Normalized Difference Water Index (NDWI) for the soil report
pub struct NDWI {
    name: String,
}

impl NDWI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "NDWI".to_string()),
        }
    }
}

impl IndexCalculator for NDWI {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Ndwi]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B3", "B8"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("ndwi", REPORT_NDWI_EXPRESSION, 10.0, &self.name))
    }
}
