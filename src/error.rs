// src/error.rs
use thiserror::Error;

/// Failures reported by a raster engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("unknown collection or asset: {0}")]
    UnknownSource(String),

    #[error("band {band} is not present in the selected image")]
    UnknownBand { band: String },

    #[error("invalid expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("no images match the query for {collection}")]
    NoImages { collection: String },

    #[error("band {band} has {found} pixels, grid has {expected}")]
    BandSize {
        band: String,
        expected: usize,
        found: usize,
    },

    #[error("images for {collection} are not on a common grid")]
    GridMismatch { collection: String },

    #[error("region covers {pixels} pixels, budget is {budget}")]
    TooManyPixels { pixels: usize, budget: f64 },
}

/// Why an index value ended up absent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("no composite available")]
    NoComposite,

    #[error("remote engine failed: {0}")]
    RemoteUnavailable(#[from] EngineError),

    #[error("statistic `{statistic}` missing from engine response")]
    MalformedResponse { statistic: String },

    #[error("statistic `{statistic}` is empty over the region")]
    Empty { statistic: String },

    #[error("{index} value {value} outside plausible range [{min}, {max}]")]
    OutOfRange {
        index: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Rejected user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("region needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("region coordinate ({lon}, {lat}) is not finite or out of range")]
    BadCoordinate { lon: f64, lat: f64 },

    #[error("unsupported region geometry: {0}")]
    Geometry(String),

    #[error("window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    BadDate(String),

    #[error("composite period must be 1..=30 days, got {0}")]
    BadPeriod(u32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session has no {0} selected")]
    Unselected(&'static str),

    #[error("unknown index `{0}`")]
    UnknownIndex(String),
}
