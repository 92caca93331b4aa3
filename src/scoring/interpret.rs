// src/scoring/interpret.rs
use super::ranges::{bound_labels, ideal_range, texture_name, IdealRange};
use super::{IndexName, IndexValue};

pub const DATA_UNAVAILABLE: &str = "Data unavailable.";
pub const UNKNOWN_TEXTURE: &str = "Unknown texture.";

/// Irrigation advice from NDWI.
///
/// Branches are checked in order. Values in (-0.15, -0.10), and -0.15
/// itself, match none of the stress bands and fall through to "Severe".
fn ndwi_advice(v: f64) -> &'static str {
    if v >= -0.10 {
        "Good moisture; no irrigation needed."
    } else if (-0.30..-0.15).contains(&v) {
        "Mild stress; light irrigation soon."
    } else if (-0.40..-0.30).contains(&v) {
        "Moderate stress; irrigate in 1–2 days."
    } else {
        "Severe stress; irrigate immediately."
    }
}

/// Human-readable verdict for one index value.
pub fn interpret(name: IndexName, value: Option<IndexValue>) -> String {
    let Some(value) = value else {
        return DATA_UNAVAILABLE.to_string();
    };

    match name {
        IndexName::SoilTexture => {
            return value
                .as_class()
                .and_then(texture_name)
                .unwrap_or(UNKNOWN_TEXTURE)
                .to_string();
        }
        IndexName::Ndwi => return ndwi_advice(value.as_f64()).to_string(),
        _ => {}
    }

    let (min, max) = match ideal_range(name) {
        IdealRange::Interval { min, max } => (min, max),
        IdealRange::Class(_) => (None, None),
    };
    let (low, high) = bound_labels(name);
    let v = value.as_f64();

    match (min.zip(low), max.zip(high)) {
        (None, Some((max, high))) if v <= max => format!("Optimal (≤{high})."),
        (None, Some((max, high))) if v > max => format!("High (>{high})."),
        (Some((min, low)), None) if v >= min => format!("Optimal (≥{low})."),
        (Some((min, low)), None) if v < min => format!("Low (<{low})."),
        (Some((min, low)), Some((max, high))) if min <= v && v <= max => format!("Optimal ({low}-{high})."),
        (Some((min, low)), Some(_)) if v < min => format!("Low (<{low})."),
        (Some(_), Some((max, high))) if v > max => format!("High (>{high})."),
        _ => format!("No interpretation for {name}."),
    }
}
