// src/processing/indices/mod.rs
pub mod bsi;
pub mod cec;
pub mod evi;
pub mod fvc;
pub mod lst;
pub mod msavi2;
pub mod ndi;
pub mod ndwi;
pub mod npk;
pub mod ph;
pub mod salinity;
pub mod savi;
pub mod texture;

use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::{Composite, ImageSource, NamedExpression, ReduceRequest, Statistic};
use crate::error::IndexError;
use crate::processing::reduction::RemoteReduction;
use crate::region::Region;
use crate::scoring::{IndexName, IndexValue};
use crate::window::TimeWindow;

// Re-export indices
pub use cec::CEC;
pub use evi::EVI;
pub use fvc::FVC;
pub use lst::LST;
pub use ndi::{OrganicCarbon, NDVI};
pub use ndwi::NDWI;
pub use npk::NPK;
pub use ph::PH;
pub use salinity::Salinity;
pub use texture::SoilTexture;

/// Everything an index calculator may read. Shared read-only between
/// calculators running concurrently.
pub struct IndexContext<'a> {
    pub reduction: &'a RemoteReduction<'a>,
    pub composite: Option<&'a Composite>,
    pub region: &'a Region,
    pub window: TimeWindow,
    pub config: &'a EngineConfig,
}

impl<'a> IndexContext<'a> {
    pub fn require_composite(&self) -> Result<&'a Composite, IndexError> {
        self.composite.ok_or(IndexError::NoComposite)
    }

    /// Mean-reduction request over the optical composite.
    pub fn composite_request(
        &self,
        composite: &Composite,
        outputs: Vec<NamedExpression>,
        scale: f64,
        max_pixels: f64,
    ) -> ReduceRequest {
        ReduceRequest {
            source: ImageSource::Composite(composite.clone()),
            region: self.region.clone(),
            outputs,
            statistic: Statistic::Mean,
            scale,
            max_pixels,
        }
    }

    /// Mean of one band expression over the region, absent without a
    /// composite or on any engine failure.
    pub fn composite_mean(&self, output: &str, expression: &str, scale: f64, label: &str) -> Option<f64> {
        let composite = match self.require_composite() {
            Ok(composite) => composite,
            Err(e) => {
                debug!("{label}: {e}");
                return None;
            }
        };
        let request = self.composite_request(
            composite,
            vec![NamedExpression::new(output, expression)],
            scale,
            self.config.max_pixels,
        );
        self.reduction.scalar(&request, output, label)
    }
}

/// A soil or vegetation index derived from remote band algebra.
pub trait IndexCalculator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Index slots this calculator fills, in the order returned by `calculate`.
    fn outputs(&self) -> &'static [IndexName];

    /// Composite bands the expressions read. Empty for calculators with
    /// their own image source.
    fn required_bands(&self) -> &'static [&'static str] {
        &[]
    }

    /// Never fails: every problem is reported as an absent value.
    fn calculate(&self, ctx: &IndexContext<'_>) -> Vec<Option<IndexValue>>;
}

fn number(value: Option<f64>) -> Vec<Option<IndexValue>> {
    vec![value.map(IndexValue::Number)]
}

/// The calculators of a full soil report, in report order.
pub fn soil_calculators(config: &EngineConfig) -> Vec<Box<dyn IndexCalculator>> {
    vec![
        Box::new(PH::new(None)),
        Box::new(SoilTexture::new(None)),
        Box::new(Salinity::new(None)),
        Box::new(OrganicCarbon::new(None)),
        Box::new(CEC::new(config.cec, None)),
        Box::new(LST::new(None)),
        Box::new(NDVI::new(None)),
        Box::new(EVI::new(None)),
        Box::new(FVC::new(None)),
        Box::new(NDWI::new(None)),
        Box::new(NPK::new(None)),
    ]
}
