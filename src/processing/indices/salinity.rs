// src/processing/indices/salinity.rs
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// Salinity as the SWIR/green ratio (B11/B3)
pub struct Salinity {
    name: String,
}

pub const SALINITY_EXPRESSION: &str = "(B11)/(B3)";

impl Salinity {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "salinity".to_string()),
        }
    }
}

impl IndexCalculator for Salinity {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Salinity]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B11", "B3"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("ndsi", SALINITY_EXPRESSION, 10.0, &self.name))
    }
}
