// src/config.rs
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

pub const SENTINEL2_HARMONIZED: &str = "COPERNICUS/S2_SR_HARMONIZED";
pub const SENTINEL2_L2A: &str = "COPERNICUS/S2_SR";
pub const SENTINEL2_L1C: &str = "COPERNICUS/S2";
pub const MODIS_LST: &str = "MODIS/061/MOD11A2";
pub const SOIL_TEXTURE_ASSET: &str = "OpenLandMap/SOL/SOL_TEXTURE-CLASS_USDA-TT_M/v02";

/// Linear CEC model: `intercept + slope_clay * clay + slope_om * om`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct CecCoefficients {
    #[serde(default = "default_cec_intercept")]
    pub intercept: f64,
    #[serde(default = "default_cec_slope_clay")]
    pub slope_clay: f64,
    #[serde(default = "default_cec_slope_om")]
    pub slope_om: f64,
}

impl Default for CecCoefficients {
    fn default() -> Self {
        Self {
            intercept: default_cec_intercept(),
            slope_clay: default_cec_slope_clay(),
            slope_om: default_cec_slope_om(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Credentials for the hosted endpoints. Never logged.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_cloud_threshold")]
    pub cloud_threshold: f64,
    #[serde(default = "default_relaxed_cloud_threshold")]
    pub relaxed_cloud_threshold: f64,
    #[serde(default = "default_fallback_step_days")]
    pub fallback_step_days: u32,
    #[serde(default = "default_max_fallback_days")]
    pub max_fallback_days: u32,
    #[serde(default = "default_reflectance_scale")]
    pub reflectance_scale: f64,
    /// Multiplier applied to the time series composite. 1.0 keeps raw
    /// digital numbers.
    #[serde(default = "default_series_scale")]
    pub series_scale: f64,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: f64,
    #[serde(default)]
    pub cec: CecCoefficients,
    /// Worker threads for concurrent index evaluation, `None` = all CPUs.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default = "default_true")]
    pub cache_reductions: bool,
}

fn default_model() -> String {
    "models/gemini-1.5-flash".to_string()
}

fn default_collection() -> String {
    SENTINEL2_HARMONIZED.to_string()
}

fn default_cloud_threshold() -> f64 {
    20.0
}

fn default_relaxed_cloud_threshold() -> f64 {
    30.0
}

fn default_fallback_step_days() -> u32 {
    5
}

fn default_max_fallback_days() -> u32 {
    30
}

fn default_reflectance_scale() -> f64 {
    0.0001
}

fn default_series_scale() -> f64 {
    1.0
}

fn default_max_pixels() -> f64 {
    1e13
}

fn default_cec_intercept() -> f64 {
    5.0
}

fn default_cec_slope_clay() -> f64 {
    20.0
}

fn default_cec_slope_om() -> f64 {
    15.0
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            collection: default_collection(),
            cloud_threshold: default_cloud_threshold(),
            relaxed_cloud_threshold: default_relaxed_cloud_threshold(),
            fallback_step_days: default_fallback_step_days(),
            max_fallback_days: default_max_fallback_days(),
            reflectance_scale: default_reflectance_scale(),
            series_scale: default_series_scale(),
            max_pixels: default_max_pixels(),
            cec: CecCoefficients::default(),
            threads: None,
            cache_reductions: true,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("SOIL_CALC_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("SOIL_CALC_MODEL") {
            self.model = model;
        }
        if let Some(threshold) = lookup("SOIL_CALC_CLOUD_THRESHOLD") {
            self.cloud_threshold = threshold
                .parse()
                .with_context(|| format!("SOIL_CALC_CLOUD_THRESHOLD={threshold}"))?;
        }
        if let Some(step) = lookup("SOIL_CALC_FALLBACK_STEP") {
            self.fallback_step_days = step
                .parse()
                .with_context(|| format!("SOIL_CALC_FALLBACK_STEP={step}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), InputError> {
        for (name, value) in [
            ("cloud_threshold", self.cloud_threshold),
            ("relaxed_cloud_threshold", self.relaxed_cloud_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(InputError::Config(format!("{name} must be within 0..=100, got {value}")));
            }
        }
        for (name, value) in [
            ("reflectance_scale", self.reflectance_scale),
            ("series_scale", self.series_scale),
        ] {
            if !(value > 0.0) {
                return Err(InputError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.max_pixels > 0.0) {
            return Err(InputError::Config(format!(
                "max_pixels must be positive, got {}",
                self.max_pixels
            )));
        }
        if self.threads == Some(0) {
            return Err(InputError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }

    pub fn threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}
