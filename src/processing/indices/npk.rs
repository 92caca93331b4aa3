// src/processing/indices/npk.rs
use tracing::{debug, warn};

use super::{IndexCalculator, IndexContext};
use crate::engine::NamedExpression;
use crate::error::IndexError;
use crate::scoring::{IndexName, IndexValue};

/// Pixel budget for the combined N/P/K reduction.
const NPK_MAX_PIXELS: f64 = 1e9;

/// Output band, per-pixel expression and plausible range for each nutrient.
///
/// The expressions are constant estimates; the brightness and salinity
/// proxies they were meant to combine are not part of the model yet.
pub const NUTRIENTS: [(&str, &str, f64, f64); 3] = [
    ("N", "clamp(5, 0, 1000)", 0.0, 1000.0),
    ("P", "clamp(3, 0, 500)", 0.0, 500.0),
    ("K", "clamp(5, 0, 1000)", 0.0, 1000.0),
];

/// Keep `value` only if it lies within `[min, max]`.
pub fn plausible(index: IndexName, value: f64, min: f64, max: f64) -> Result<f64, IndexError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(IndexError::OutOfRange {
            index: index.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Nitrogen, phosphorus and potassium estimates reduced in a single call.
pub struct NPK {
    name: String,
}

impl NPK {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "NPK".to_string()),
        }
    }
}

impl IndexCalculator for NPK {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Nitrogen, IndexName::Phosphorus, IndexName::Potassium]
    }

    fn required_bands(&self) -> &'static [&'static str] {
        &["B2", "B3", "B4", "B8", "B11"]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        let composite = match ctx.require_composite() {
            Ok(composite) => composite,
            Err(e) => {
                debug!("{}: {e}", self.name);
                return vec![None; NUTRIENTS.len()];
            }
        };
        let request = ctx.composite_request(
            composite,
            NUTRIENTS
                .iter()
                .map(|(band, expression, _, _)| NamedExpression::new(*band, *expression))
                .collect(),
            10.0,
            NPK_MAX_PIXELS,
        );
        let bands: Vec<&str> = NUTRIENTS.iter().map(|(band, ..)| *band).collect();
        let values = ctx.reduction.scalars(&request, &bands, &self.name);

        values
            .into_iter()
            .zip(self.outputs())
            .zip(NUTRIENTS.iter())
            .map(|((value, &index), &(_, _, min, max))| {
                let value = value?;
                match plausible(index, value, min, max) {
                    Ok(value) => Some(IndexValue::Number(value)),
                    Err(e) => {
                        warn!("Unrealistic {index} value: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}
