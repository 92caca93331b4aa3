// src/processing/indices/bsi.rs

/// Bare Soil Index: ((SWIR + RED) - (NIR + BLUE)) / ((SWIR + RED) + (NIR + BLUE))
/// over SWIR=B11, RED=B4, NIR=B8, BLUE=B2.
pub const BSI_EXPRESSION: &str = "((B4+B11)-(B8+B2))/((B4+B11)+(B8+B2))";
