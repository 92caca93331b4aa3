// src/scoring/mod.rs
//! Ideal-range scoring, interpretation and severity colors.

pub mod color;
pub mod interpret;
pub mod ranges;
pub mod score;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

pub use color::{colorize, Color};
pub use interpret::interpret;
pub use ranges::{bound_labels, ideal_range, texture_name, IdealRange, TEXTURE_CLASSES};
pub use score::{score, Rating, ScoreSummary};

/// Every index reported by a soil analysis, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexName {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "Soil Texture")]
    SoilTexture,
    Salinity,
    #[serde(rename = "Organic Carbon")]
    OrganicCarbon,
    #[serde(rename = "CEC")]
    Cec,
    #[serde(rename = "LST")]
    Lst,
    #[serde(rename = "NDVI")]
    Ndvi,
    #[serde(rename = "EVI")]
    Evi,
    #[serde(rename = "FVC")]
    Fvc,
    #[serde(rename = "NDWI")]
    Ndwi,
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl IndexName {
    pub const ALL: [IndexName; 13] = [
        IndexName::Ph,
        IndexName::SoilTexture,
        IndexName::Salinity,
        IndexName::OrganicCarbon,
        IndexName::Cec,
        IndexName::Lst,
        IndexName::Ndvi,
        IndexName::Evi,
        IndexName::Fvc,
        IndexName::Ndwi,
        IndexName::Nitrogen,
        IndexName::Phosphorus,
        IndexName::Potassium,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexName::Ph => "pH",
            IndexName::SoilTexture => "Soil Texture",
            IndexName::Salinity => "Salinity",
            IndexName::OrganicCarbon => "Organic Carbon",
            IndexName::Cec => "CEC",
            IndexName::Lst => "LST",
            IndexName::Ndvi => "NDVI",
            IndexName::Evi => "EVI",
            IndexName::Fvc => "FVC",
            IndexName::Ndwi => "NDWI",
            IndexName::Nitrogen => "Nitrogen",
            IndexName::Phosphorus => "Phosphorus",
            IndexName::Potassium => "Potassium",
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexName {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-'], " ");
        Ok(match key.as_str() {
            "ph" => IndexName::Ph,
            "soil texture" | "texture" => IndexName::SoilTexture,
            "salinity" => IndexName::Salinity,
            "organic carbon" | "oc" => IndexName::OrganicCarbon,
            "cec" => IndexName::Cec,
            "lst" => IndexName::Lst,
            "ndvi" => IndexName::Ndvi,
            "evi" => IndexName::Evi,
            "fvc" => IndexName::Fvc,
            "ndwi" => IndexName::Ndwi,
            "nitrogen" | "n" => IndexName::Nitrogen,
            "phosphorus" | "p" => IndexName::Phosphorus,
            "potassium" | "k" => IndexName::Potassium,
            _ => return Err(InputError::UnknownIndex(s.to_string())),
        })
    }
}

/// A present index value: a measurement or a categorical class code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Number(f64),
    Class(u8),
}

impl IndexValue {
    pub fn as_f64(self) -> f64 {
        match self {
            IndexValue::Number(value) => value,
            IndexValue::Class(code) => f64::from(code),
        }
    }

    /// Class code, if this value is a whole number in `u8` range.
    pub fn as_class(self) -> Option<u8> {
        match self {
            IndexValue::Class(code) => Some(code),
            IndexValue::Number(value)
                if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) =>
            {
                Some(value as u8)
            }
            IndexValue::Number(_) => None,
        }
    }
}

impl From<f64> for IndexValue {
    fn from(value: f64) -> Self {
        IndexValue::Number(value)
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Number(value) => write!(f, "{value}"),
            IndexValue::Class(code) => write!(f, "{code}"),
        }
    }
}
