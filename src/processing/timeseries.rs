// src/processing/timeseries.rs
//! Per-period vegetation and bare-soil index series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::indices::bsi::BSI_EXPRESSION;
use super::indices::evi::EVI_EXPRESSION;
use super::indices::msavi2::MSAVI2_EXPRESSION;
use super::indices::ndi::normalized_difference;
use super::indices::ndwi::series_expression;
use super::indices::savi::{savi_expression, DEFAULT_SOIL_FACTOR};
use super::reduction::RemoteReduction;
use crate::config::{EngineConfig, SENTINEL2_L1C, SENTINEL2_L2A};
use crate::engine::{Composite, ImageQuery, ImageSource, NamedExpression, ReduceRequest, Statistic};
use crate::error::InputError;
use crate::region::Region;
use crate::window::TimeWindow;

pub const SERIES_BANDS: [&str; 6] = ["B2", "B3", "B4", "B5", "B8", "B11"];
pub const SERIES_SCALE: f64 = 20.0;
pub const SERIES_MAX_PIXELS: f64 = 1e9;
pub const MAX_PERIOD_DAYS: u32 = 30;

const OUTPUTS: [&str; 7] = ["ndvi", "ndwi", "evi", "savi", "ndre", "msavi", "bsi"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// First day of the period.
    pub date: NaiveDate,
    pub ndvi: f64,
    pub ndwi: f64,
    pub evi: f64,
    pub savi: f64,
    pub ndre: f64,
    pub msavi: f64,
    pub bsi: f64,
    /// MSAVI minus BSI.
    pub fertility: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompositeSeries {
    pub collection: String,
    pub period_days: u32,
    pub points: Vec<SeriesPoint>,
    /// Start dates of periods with no qualifying frames or incomplete statistics.
    pub skipped: Vec<NaiveDate>,
}

pub fn series_outputs() -> Vec<NamedExpression> {
    let expressions = [
        normalized_difference("B8", "B4"),
        series_expression(),
        EVI_EXPRESSION.to_string(),
        savi_expression(DEFAULT_SOIL_FACTOR),
        normalized_difference("B8", "B5"),
        MSAVI2_EXPRESSION.to_string(),
        BSI_EXPRESSION.to_string(),
    ];
    OUTPUTS
        .iter()
        .zip(expressions)
        .map(|(name, expression)| NamedExpression::new(*name, expression))
        .collect()
}

fn series_query(collection: &str, region: &Region, window: TimeWindow, max_cloud: Option<f64>) -> ImageQuery {
    ImageQuery {
        collection: collection.to_string(),
        region: region.clone(),
        buffer_m: 0.0,
        window,
        max_cloud,
        bands: SERIES_BANDS.iter().map(|b| b.to_string()).collect(),
    }
}

/// Surface reflectance if its first image in the window carries every
/// series band, top-of-atmosphere otherwise.
pub fn choose_collection(reduction: &RemoteReduction<'_>, region: &Region, window: TimeWindow) -> String {
    let probe = series_query(SENTINEL2_L2A, region, window.first_day(), None);
    match reduction.engine().band_names(&probe) {
        Ok(bands) if bands.is_empty() => {
            warn!("No {SENTINEL2_L2A} image on {}, using {SENTINEL2_L1C}", window.start);
        }
        Ok(bands) => {
            let missing: Vec<&str> = SERIES_BANDS
                .iter()
                .copied()
                .filter(|band| !bands.iter().any(|b| b == band))
                .collect();
            if missing.is_empty() {
                return SENTINEL2_L2A.to_string();
            }
            warn!("{SENTINEL2_L2A} lacks bands {missing:?}, using {SENTINEL2_L1C}");
        }
        Err(e) => {
            warn!("Probing {SENTINEL2_L2A} failed: {e}, using {SENTINEL2_L1C}");
        }
    }
    SENTINEL2_L1C.to_string()
}

pub fn composite_series(
    reduction: &RemoteReduction<'_>,
    region: &Region,
    window: TimeWindow,
    period_days: u32,
    config: &EngineConfig,
) -> Result<CompositeSeries, InputError> {
    if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
        return Err(InputError::BadPeriod(period_days));
    }

    let collection = choose_collection(reduction, region, window);
    let outputs = series_outputs();
    let mut points = Vec::new();
    let mut skipped = Vec::new();

    for period in window.periods(period_days) {
        let query = series_query(&collection, region, period, Some(config.cloud_threshold));
        let frames = match reduction.try_count(&query) {
            Ok(0) => {
                debug!("No frames for {period}");
                skipped.push(period.start);
                continue;
            }
            Ok(frames) => frames,
            Err(e) => {
                warn!("Failed to count frames for {period}: {e}");
                skipped.push(period.start);
                continue;
            }
        };

        let request = ReduceRequest {
            source: ImageSource::Composite(Composite {
                query,
                scale: config.series_scale,
                offset: 0.0,
                frames,
            }),
            region: region.clone(),
            outputs: outputs.clone(),
            statistic: Statistic::Mean,
            scale: SERIES_SCALE,
            max_pixels: SERIES_MAX_PIXELS,
        };

        let values: Option<Vec<f64>> = reduction
            .scalars(&request, &OUTPUTS, &format!("indices for {period}"))
            .into_iter()
            .collect();
        match values.as_deref() {
            Some(&[ndvi, ndwi, evi, savi, ndre, msavi, bsi]) => points.push(SeriesPoint {
                date: period.start,
                ndvi,
                ndwi,
                evi,
                savi,
                ndre,
                msavi,
                bsi,
                fertility: msavi - bsi,
            }),
            _ => skipped.push(period.start),
        }
    }

    info!(
        "{} of {} periods from {collection}",
        points.len(),
        points.len() + skipped.len()
    );

    Ok(CompositeSeries {
        collection,
        period_days,
        points,
        skipped,
    })
}
