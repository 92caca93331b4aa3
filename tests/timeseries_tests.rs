// tests/timeseries_tests.rs
mod common;

use approx::assert_relative_eq;

use common::*;
use soil_calc::config::{EngineConfig, SENTINEL2_L1C, SENTINEL2_L2A};
use soil_calc::engine::LocalArchive;
use soil_calc::error::InputError;
use soil_calc::processing::timeseries::{choose_collection, series_outputs};
use soil_calc::processing::{RemoteReduction, SoilAnalyzer};

fn archive_with(collection: &str, scenes: &[(&str, &str, f64)], bands: &[(&str, f32)]) -> LocalArchive {
    let mut archive = LocalArchive::new();
    for &(id, day, cloud) in scenes {
        archive
            .add_scene(optical_scene(collection, id, day, cloud, bands))
            .unwrap();
    }
    archive
}

/// One clear scene in the first week: one point, one skipped period
#[test]
fn test_series_points() {
    let archive = archive_with(SENTINEL2_L2A, &[("s1", "2024-06-01", 3.0)], &FIELD_DN);
    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();

    let series = analyzer.series(&field(), window(), 7).unwrap();
    assert_eq!(series.collection, SENTINEL2_L2A);
    assert_eq!(series.points.len(), 1);
    assert_eq!(series.skipped, vec![date("2024-06-08")]);

    let point = &series.points[0];
    assert_eq!(point.date, date("2024-06-01"));
    assert_relative_eq!(point.ndvi, 0.5, epsilon = 1e-5);
    assert_relative_eq!(point.ndwi, (0.08 - 0.15) / (0.08 + 0.15), epsilon = 1e-5);
    assert_relative_eq!(point.ndre, 1500.0 / 4500.0, epsilon = 1e-9);
    assert_relative_eq!(point.bsi, -1.0 / 6.0, epsilon = 1e-9);
}

/// Index constants apply to raw digital numbers, not reflectance
#[test]
fn test_series_raw_digital_numbers() {
    let archive = archive_with(
        SENTINEL2_L2A,
        &[("s1", "2024-06-01", 3.0), ("s2", "2024-06-03", 5.0)],
        &FIELD_DN,
    );
    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();

    let series = analyzer.series(&field(), window(), 7).unwrap();
    let point = &series.points[0];
    assert_relative_eq!(point.evi, 5000.0 / 5251.0, epsilon = 1e-9);
    assert_relative_eq!(point.savi, 2000.0 / 4000.5 * 1.5, epsilon = 1e-9);
    assert_relative_eq!(point.msavi, 0.666_629_627_572, epsilon = 1e-6);
    assert_relative_eq!(point.fertility, 0.833_296_294_239, epsilon = 1e-6);
    assert_relative_eq!(point.fertility, point.msavi - point.bsi);
}

/// A reflectance series scale changes the scale-dependent indices only
#[test]
fn test_series_reflectance_scale() {
    let archive = archive_with(SENTINEL2_L2A, &[("s1", "2024-06-01", 3.0)], &FIELD_DN);
    let reflectance = EngineConfig {
        series_scale: 0.0001,
        ..config()
    };
    let analyzer = SoilAnalyzer::new(archive, reflectance).unwrap();

    let point = analyzer.series(&field(), window(), 7).unwrap().points[0].clone();
    assert_relative_eq!(point.ndvi, 0.5, epsilon = 1e-5);
    assert_relative_eq!(point.savi, 0.2 / 0.9 * 1.5, epsilon = 1e-5);
    assert_relative_eq!(point.evi, 2.5 * 0.2 / 1.525, epsilon = 1e-5);
}

/// Scenes above the cloud threshold do not count
#[test]
fn test_series_skips_cloudy_periods() {
    let archive = archive_with(
        SENTINEL2_L2A,
        &[("s1", "2024-06-01", 3.0), ("s2", "2024-06-09", 45.0)],
        &FIELD_DN,
    );
    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();

    let series = analyzer.series(&field(), window(), 7).unwrap();
    assert_eq!(series.points.len(), 1);
    assert_eq!(series.skipped, vec![date("2024-06-08")]);
}

/// Surface reflectance without the red-edge band falls back to top-of-atmosphere
#[test]
fn test_collection_fallback_missing_band() {
    let without_b5: Vec<(&str, f32)> = FIELD_DN.iter().copied().filter(|(b, _)| *b != "B5").collect();
    let mut archive = archive_with(SENTINEL2_L2A, &[("sr", "2024-06-01", 3.0)], &without_b5);
    archive
        .add_scene(optical_scene(SENTINEL2_L1C, "toa", "2024-06-02", 3.0, &FIELD_DN))
        .unwrap();

    let reduction = RemoteReduction::new(&archive);
    assert_eq!(choose_collection(&reduction, &field(), window()), SENTINEL2_L1C);

    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();
    let series = analyzer.series(&field(), window(), 7).unwrap();
    assert_eq!(series.collection, SENTINEL2_L1C);
    assert_eq!(series.points.len(), 1);
}

/// No surface reflectance image on the first day also falls back
#[test]
fn test_collection_fallback_no_image() {
    let archive = archive_with(SENTINEL2_L2A, &[("late", "2024-06-05", 3.0)], &FIELD_DN);
    let reduction = RemoteReduction::new(&archive);
    assert_eq!(choose_collection(&reduction, &field(), window()), SENTINEL2_L1C);
}

/// Period length is limited to 1..=30 days
#[test]
fn test_series_period_validation() {
    let analyzer = SoilAnalyzer::new(LocalArchive::new(), config()).unwrap();
    assert_eq!(
        analyzer.series(&field(), window(), 0),
        Err(InputError::BadPeriod(0))
    );
    assert_eq!(
        analyzer.series(&field(), window(), 31),
        Err(InputError::BadPeriod(31))
    );

    let empty = analyzer.series(&field(), window(), 30).unwrap();
    assert!(empty.points.is_empty());
    assert_eq!(empty.skipped, vec![date("2024-06-01")]);
}

/// The seven series expressions, in output order
#[test]
fn test_series_outputs() {
    let names: Vec<String> = series_outputs().into_iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["ndvi", "ndwi", "evi", "savi", "ndre", "msavi", "bsi"]);
    assert_eq!(series_outputs()[4].expression, "(B8-B5)/(B8+B5)");
}
