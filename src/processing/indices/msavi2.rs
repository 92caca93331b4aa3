// src/processing/indices/msavi2.rs

/// Modified Soil Adjusted Vegetation Index 2, self-adjusting L:
/// (2*NIR + 1 - sqrt((2*NIR + 1)^2 - 8*(NIR - RED))) / 2
pub const MSAVI2_EXPRESSION: &str = "(2*B8+1-sqrt(pow(2*B8+1,2)-8*(B8-B4)))/2";
