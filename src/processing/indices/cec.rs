// src/processing/indices/cec.rs
use tracing::debug;

use super::{number, IndexCalculator, IndexContext};
use crate::config::CecCoefficients;
use crate::engine::NamedExpression;
use crate::scoring::{IndexName, IndexValue};

/// Clay proxy. SWIR over itself, so 1 wherever B11 is non-zero.
pub const CLAY_EXPRESSION: &str = "(B11)/(B11)";
/// Organic matter proxy: (NIR - RED) / NIR.
pub const ORGANIC_MATTER_EXPRESSION: &str = "(B8-B4)/(B8)";

/// Cation Exchange Capacity from a linear regression on clay and organic
/// matter proxies, both reduced at 20 m.
pub struct CEC {
    coefficients: CecCoefficients,
    name: String,
}

impl CEC {
    pub fn new(coefficients: CecCoefficients, name: Option<String>) -> Self {
        Self {
            coefficients,
            name: name.unwrap_or_else(|| "CEC".to_string()),
        }
    }

    pub fn estimate(&self, clay: f64, organic_matter: f64) -> f64 {
        let c = &self.coefficients;
        c.intercept + c.slope_clay * clay + c.slope_om * organic_matter
    }
}

impl IndexCalculator for CEC {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Cec]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B11", "B8", "B4"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        let composite = match ctx.require_composite() {
            Ok(composite) => composite,
            Err(e) => {
                debug!("{}: {e}", self.name);
                return vec![None];
            }
        };
        let request = ctx.composite_request(
            composite,
            vec![
                NamedExpression::new("clay", CLAY_EXPRESSION),
                NamedExpression::new("om", ORGANIC_MATTER_EXPRESSION),
            ],
            20.0,
            ctx.config.max_pixels,
        );
        let proxies = ctx.reduction.scalars(&request, &["clay", "om"], &self.name);
        match proxies[..] {
            [Some(clay), Some(om)] => number(Some(self.estimate(clay, om))),
            _ => vec![None],
        }
    }
}
