// src/processing/indices/ph.rs
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// Soil pH.
///
/// The brightness `(B2+B3+B4)/3` and salinity `(B11-B8)/(B11+B8+1e-6)`
/// proxies are not yet wired into a calibrated model; the expression is a
/// constant approximation, so every region with a composite reports 7.1.
pub struct PH {
    name: String,
}

pub const PH_EXPRESSION: &str = "7.1";

impl PH {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "pH".to_string()),
        }
    }
}

impl IndexCalculator for PH {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Ph]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B2", "B3", "B4", "B8", "B11"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("ph", PH_EXPRESSION, 10.0, &self.name))
    }
}
