// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::NaiveDate;

use soil_calc::config::{EngineConfig, MODIS_LST, SENTINEL2_HARMONIZED, SOIL_TEXTURE_ASSET};
use soil_calc::engine::local::{Grid, Scene, StaticImage};
use soil_calc::engine::LocalArchive;
use soil_calc::region::Region;
use soil_calc::window::TimeWindow;

/// Digital numbers of a typical vegetated field: reflectance B2 0.05,
/// B3 0.08, B4 0.1, B5 0.15, B8 0.3, B11 0.15.
pub const FIELD_DN: [(&str, f32); 6] = [
    ("B2", 500.0),
    ("B3", 800.0),
    ("B4", 1000.0),
    ("B5", 1500.0),
    ("B8", 3000.0),
    ("B11", 1500.0),
];

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// 4x4 grid of 0.01 degree pixels, top-left at (9.0, 45.04)
pub fn grid() -> Grid {
    Grid::north_up(4, 4, 9.0, 45.04, 0.01)
}

/// Field covering every pixel centre of [`grid`]
pub fn field() -> Region {
    Region::new(vec![
        [8.999, 44.999],
        [9.041, 44.999],
        [9.041, 45.041],
        [8.999, 45.041],
    ])
    .unwrap()
}

pub fn window() -> TimeWindow {
    TimeWindow::parse("2024-06-01", "2024-06-15").unwrap()
}

/// Sentinel-2 scene with constant bands
pub fn optical_scene(collection: &str, id: &str, day: &str, cloud: f64, bands: &[(&str, f32)]) -> Scene {
    bands.iter().fold(
        Scene::new(id, collection, date(day), grid()).with_cloud_cover(cloud),
        |scene, &(band, value)| scene.with_constant_band(band, value),
    )
}

/// Harmonized scene over the field with [`FIELD_DN`]
pub fn field_scene(id: &str, day: &str, cloud: f64) -> Scene {
    optical_scene(SENTINEL2_HARMONIZED, id, day, cloud, &FIELD_DN)
}

/// MODIS LST scene; 15000 DN is 26.85 °C
pub fn lst_scene(day: &str, dn: f32) -> Scene {
    Scene::new(format!("MOD11A2_{day}"), MODIS_LST, date(day), grid()).with_constant_band("LST_Day_1km", dn)
}

/// Texture map where 10 of 16 pixels are Loam (7)
pub fn texture_map() -> StaticImage {
    let mut classes = vec![7.0f32; 10];
    classes.extend([9.0; 6]);
    StaticImage {
        grid: grid(),
        bands: BTreeMap::from([("b0".to_string(), classes)]),
    }
}

/// Archive with one clear optical scene, one LST scene and the texture map
pub fn full_archive() -> LocalArchive {
    let mut archive = LocalArchive::new();
    archive.add_scene(field_scene("S2_0605", "2024-06-05", 5.0)).unwrap();
    archive.add_scene(lst_scene("2024-06-01", 15000.0)).unwrap();
    archive.add_static(SOIL_TEXTURE_ASSET, texture_map()).unwrap();
    archive
}

pub fn config() -> EngineConfig {
    EngineConfig {
        threads: Some(2),
        ..EngineConfig::default()
    }
}
