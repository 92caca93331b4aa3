// src/processing/indices/savi.rs

/// Soil Adjusted Vegetation Index: ((NIR - RED) / (NIR + RED + L)) * (1 + L)
/// over NIR=B8, RED=B4.
pub fn savi_expression(soil_factor: f64) -> String {
    format!("((B8-B4)/(B8+B4+{soil_factor}))*{}", 1.0 + soil_factor)
}

/// Soil adjustment factor for intermediate vegetation cover.
pub const DEFAULT_SOIL_FACTOR: f64 = 0.5;
