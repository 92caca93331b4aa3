// src/processing/indices/texture.rs
use tracing::warn;

use super::{IndexCalculator, IndexContext};
use crate::config::SOIL_TEXTURE_ASSET;
use crate::engine::{ImageSource, NamedExpression, ReduceRequest, Statistic};
use crate::scoring::{IndexName, IndexValue};

/// Dominant USDA texture class of the region, the mode of a static global
/// texture map at 250 m. Independent of the optical composite.
pub struct SoilTexture {
    asset: String,
    band: String,
    name: String,
}

impl SoilTexture {
    pub fn new(name: Option<String>) -> Self {
        Self {
            asset: SOIL_TEXTURE_ASSET.to_string(),
            band: "b0".to_string(),
            name: name.unwrap_or_else(|| "texture".to_string()),
        }
    }
}

impl IndexCalculator for SoilTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn outputs(&self) -> &'static [IndexName] {
        &[IndexName::SoilTexture]
    }

    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>> {
        let request = ReduceRequest {
            source: ImageSource::Static {
                asset: self.asset.clone(),
                band: self.band.clone(),
            },
            region: ctx.region.clone(),
            outputs: vec![NamedExpression::new(self.band.clone(), self.band.clone())],
            statistic: Statistic::Mode,
            scale: 250.0,
            max_pixels: ctx.config.max_pixels,
        };

        let class = ctx
            .reduction
            .scalar(&request, &self.band, &self.name)
            .and_then(|mode| {
                let code = mode.trunc();
                if (0.0..=f64::from(u8::MAX)).contains(&code) {
                    Some(code as u8)
                } else {
                    warn!("Texture class {mode} is not a class code");
                    None
                }
            });
        vec![class.map(IndexValue::Class)]
    }
}
