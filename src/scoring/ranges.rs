// src/scoring/ranges.rs
use super::IndexName;

/// Acceptance criterion for an index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdealRange {
    /// Inclusive interval; either bound may be open-ended.
    Interval { min: Option<f64>, max: Option<f64> },
    /// Exactly one accepted class code.
    Class(u8),
}

impl IdealRange {
    const fn between(min: f64, max: f64) -> Self {
        IdealRange::Interval {
            min: Some(min),
            max: Some(max),
        }
    }

    const fn at_most(max: f64) -> Self {
        IdealRange::Interval {
            min: None,
            max: Some(max),
        }
    }

    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match *self {
            IdealRange::Interval { min, max } => (min, max),
            IdealRange::Class(_) => (None, None),
        }
    }
}

/// USDA texture classes of the soil texture map, code 1..=12.
pub const TEXTURE_CLASSES: [(u8, &str); 12] = [
    (1, "Clay"),
    (2, "Silty Clay"),
    (3, "Sandy Clay"),
    (4, "Clay Loam"),
    (5, "Silty Clay Loam"),
    (6, "Sandy Clay Loam"),
    (7, "Loam"),
    (8, "Silty Loam"),
    (9, "Sandy Loam"),
    (10, "Silt"),
    (11, "Loamy Sand"),
    (12, "Sand"),
];

pub fn texture_name(code: u8) -> Option<&'static str> {
    TEXTURE_CLASSES
        .iter()
        .find(|(class, _)| *class == code)
        .map(|(_, name)| *name)
}

pub fn ideal_range(name: IndexName) -> IdealRange {
    match name {
        IndexName::Ph => IdealRange::between(6.0, 7.5),
        IndexName::SoilTexture => IdealRange::Class(7),
        IndexName::Salinity => IdealRange::at_most(0.2),
        IndexName::OrganicCarbon => IdealRange::between(0.02, 0.05),
        IndexName::Cec => IdealRange::between(10.0, 30.0),
        IndexName::Lst => IdealRange::between(10.0, 30.0),
        IndexName::Ndvi => IdealRange::between(0.2, 0.8),
        IndexName::Evi => IdealRange::between(0.2, 0.8),
        IndexName::Fvc => IdealRange::between(0.3, 0.8),
        IndexName::Ndwi => IdealRange::between(-0.5, 0.5),
        IndexName::Nitrogen => IdealRange::between(280.0, 450.0),
        IndexName::Phosphorus => IdealRange::between(20.0, 50.0),
        IndexName::Potassium => IdealRange::between(150.0, 300.0),
    }
}

/// Bounds as written in interpretations. pH keeps its decimal point.
pub fn bound_labels(name: IndexName) -> (Option<&'static str>, Option<&'static str>) {
    match name {
        IndexName::Ph => (Some("6.0"), Some("7.5")),
        IndexName::SoilTexture => (None, None),
        IndexName::Salinity => (None, Some("0.2")),
        IndexName::OrganicCarbon => (Some("0.02"), Some("0.05")),
        IndexName::Cec | IndexName::Lst => (Some("10"), Some("30")),
        IndexName::Ndvi | IndexName::Evi => (Some("0.2"), Some("0.8")),
        IndexName::Fvc => (Some("0.3"), Some("0.8")),
        IndexName::Ndwi => (Some("-0.5"), Some("0.5")),
        IndexName::Nitrogen => (Some("280"), Some("450")),
        IndexName::Phosphorus => (Some("20"), Some("50")),
        IndexName::Potassium => (Some("150"), Some("300")),
    }
}
