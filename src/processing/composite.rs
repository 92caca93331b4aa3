// src/processing/composite.rs
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::reduction::RemoteReduction;
use crate::config::EngineConfig;
use crate::engine::{Composite, ImageQuery};
use crate::region::Region;
use crate::window::TimeWindow;

/// Optical bands every soil index draws from.
pub const SOIL_BANDS: [&str; 5] = ["B2", "B3", "B4", "B8", "B11"];

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSettings {
    pub collection: String,
    pub cloud_threshold: f64,
    pub relaxed_cloud_threshold: f64,
    pub fallback_step_days: u32,
    pub max_fallback_days: u32,
    pub scale: f64,
}

impl From<&EngineConfig> for SelectorSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            collection: config.collection.clone(),
            cloud_threshold: config.cloud_threshold,
            relaxed_cloud_threshold: config.relaxed_cloud_threshold,
            fallback_step_days: config.fallback_step_days,
            max_fallback_days: config.max_fallback_days,
            scale: config.reflectance_scale,
        }
    }
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl SelectorSettings {
    /// Widening offsets tried after the requested window: step, 2*step, ...
    /// up to the maximum. Empty when the step is 0.
    pub fn widenings(&self) -> Vec<u32> {
        if self.fallback_step_days == 0 {
            return Vec::new();
        }
        (1u32..)
            .map_while(|k| k.checked_mul(self.fallback_step_days))
            .take_while(|days| *days <= self.max_fallback_days)
            .collect()
    }
}

/// One image-count query made while selecting a composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionAttempt {
    pub window: TimeWindow,
    pub cloud_threshold: f64,
    /// `None` if the engine failed to answer.
    pub frames: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSelection {
    pub composite: Option<Composite>,
    pub attempts: Vec<SelectionAttempt>,
}

pub struct CompositeSelector<'a> {
    reduction: &'a RemoteReduction<'a>,
    settings: SelectorSettings,
}

impl<'a> CompositeSelector<'a> {
    pub fn new(reduction: &'a RemoteReduction<'a>, settings: SelectorSettings) -> Self {
        Self {
            reduction,
            settings,
        }
    }

    /// Pick a median composite for `region` over `window`, widening the
    /// window with a relaxed cloud filter when nothing qualifies.
    pub fn select(&self, region: &Region, window: TimeWindow, bands: &[&str]) -> CompositeSelection {
        let mut attempts = Vec::new();

        let candidates = std::iter::once((window, self.settings.cloud_threshold)).chain(
            self.settings
                .widenings()
                .into_iter()
                .map(|days| (window.widen(days), self.settings.relaxed_cloud_threshold)),
        );

        for (i, (candidate, threshold)) in candidates.enumerate() {
            let query = ImageQuery {
                collection: self.settings.collection.clone(),
                region: region.clone(),
                buffer_m: 0.0,
                window: candidate,
                max_cloud: Some(threshold),
                bands: bands.iter().map(|b| b.to_string()).collect(),
            };

            let frames = match self.reduction.try_count(&query) {
                Ok(frames) => frames,
                Err(e) => {
                    error!("Error selecting composite for {candidate}: {e}");
                    attempts.push(SelectionAttempt {
                        window: candidate,
                        cloud_threshold: threshold,
                        frames: None,
                    });
                    return CompositeSelection {
                        composite: None,
                        attempts,
                    };
                }
            };

            attempts.push(SelectionAttempt {
                window: candidate,
                cloud_threshold: threshold,
                frames: Some(frames),
            });

            if frames > 0 {
                if i > 0 {
                    info!("Composite window expanded to {candidate} ({frames} frames)");
                }
                return CompositeSelection {
                    composite: Some(Composite {
                        query,
                        scale: self.settings.scale,
                        offset: 0.0,
                        frames,
                    }),
                    attempts,
                };
            }
        }

        warn!("No {} data available around {window}", self.settings.collection);
        CompositeSelection {
            composite: None,
            attempts,
        }
    }
}
