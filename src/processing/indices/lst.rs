// src/processing/indices/lst.rs
use tracing::{info, warn};

use super::{number, IndexCalculator, IndexContext};
use crate::config::MODIS_LST;
use crate::engine::{Composite, ImageQuery, ImageSource, NamedExpression, ReduceRequest, Statistic};
use crate::scoring::{IndexName, IndexValue};

/// MOD11A2 digital numbers to Kelvin.
const LST_SCALE: f64 = 0.02;
const KELVIN_OFFSET: f64 = -273.15;
/// Margin around the region when selecting MODIS tiles.
const LST_BUFFER_M: f64 = 5000.0;
const LST_BAND: &str = "LST_Day_1km";

/// Land Surface Temperature in °C: median of 8-day MODIS daytime LST over
/// the month ending at the window end, mean over the region at 1 km.
pub struct LST {
    name: String,
}

impl LST {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| "LST".to_string()),
        }
    }
}

impl IndexCalculator for LST {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::Lst]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        let window = ctx.window.month_ending();
        info!("Fetching MODIS LST for {window}");

        let query = ImageQuery {
            collection: MODIS_LST.to_string(),
            region: ctx.region.clone(),
            buffer_m: LST_BUFFER_M,
            window,
            max_cloud: None,
            bands: vec![LST_BAND.to_string()],
        };

        let frames = match ctx.reduction.try_count(&query) {
            Ok(0) => {
                warn!("No LST images in {window}");
                return vec![None];
            }
            Ok(frames) => frames,
            Err(e) => {
                warn!("Failed to fetch {}: {e}", self.name);
                return vec![None];
            }
        };

        let request = ReduceRequest {
            source: ImageSource::Composite(Composite {
                query,
                scale: LST_SCALE,
                offset: KELVIN_OFFSET,
                frames,
            }),
            region: ctx.region.clone(),
            outputs: vec![NamedExpression::new("lst", LST_BAND)],
            statistic: Statistic::Mean,
            scale: 1000.0,
            max_pixels: ctx.config.max_pixels,
        };
        number(ctx.reduction.scalar(&request, "lst", &self.name))
    }
}
