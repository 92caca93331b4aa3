// tests/analysis_tests.rs
mod common;

use approx::assert_relative_eq;

use common::*;
use soil_calc::config::SOIL_TEXTURE_ASSET;
use soil_calc::engine::{
    Composite, ImageQuery, ImageSource, LocalArchive, NamedExpression, RasterEngine, ReduceRequest, Statistic,
    Statistics,
};
use soil_calc::error::{EngineError, IndexError};
use soil_calc::processing::indices::npk::plausible;
use soil_calc::processing::indices::{IndexCalculator, IndexContext, NDVI, NPK};
use soil_calc::processing::{RemoteReduction, SoilAnalyzer};
use soil_calc::scoring::score::Rating;
use soil_calc::scoring::{Color, IndexName, IndexValue};

fn number(report_value: Option<IndexValue>) -> f64 {
    report_value.expect("value present").as_f64()
}

/// Full report over a clear scene: every index present with the expected value
#[test]
fn test_report_values() {
    let analyzer = SoilAnalyzer::new(full_archive(), config()).unwrap();
    let report = analyzer.analyze(&field(), window());

    assert_eq!(report.entries.len(), 13);
    assert_eq!(report.composite_window, Some(window()));
    assert_eq!(report.composite_frames, 1);

    assert_relative_eq!(number(report.value(IndexName::Ph)), 7.1, epsilon = 1e-9);
    assert_relative_eq!(number(report.value(IndexName::Ndvi)), 0.5, epsilon = 1e-5);
    assert_relative_eq!(number(report.value(IndexName::OrganicCarbon)), 0.025, epsilon = 1e-6);
    assert_relative_eq!(number(report.value(IndexName::Salinity)), 1.875, epsilon = 1e-5);
    assert_relative_eq!(number(report.value(IndexName::Evi)), 2.5, epsilon = 1e-9);
    assert_relative_eq!(number(report.value(IndexName::Ndwi)), 1.0, epsilon = 1e-9);
    assert_relative_eq!(number(report.value(IndexName::Fvc)), 0.25, epsilon = 1e-5);
    assert_relative_eq!(number(report.value(IndexName::Cec)), 35.0, epsilon = 1e-4);
    assert_relative_eq!(number(report.value(IndexName::Lst)), 26.85, epsilon = 1e-3);
    assert_eq!(report.value(IndexName::SoilTexture), Some(IndexValue::Class(7)));
    assert_relative_eq!(number(report.value(IndexName::Nitrogen)), 5.0, epsilon = 1e-9);
    assert_relative_eq!(number(report.value(IndexName::Phosphorus)), 3.0, epsilon = 1e-9);
    assert_relative_eq!(number(report.value(IndexName::Potassium)), 5.0, epsilon = 1e-9);

    // pH, texture, organic carbon, LST and NDVI are in range
    assert_eq!(report.score.in_range, 5);
    assert_eq!(report.score.evaluated, 13);
    assert_eq!(report.score.rating, Rating::Poor);

    let texture = report.entry(IndexName::SoilTexture).unwrap();
    assert_eq!(texture.interpretation, "Loam");
    assert_eq!(texture.color, Color::Green);
    assert_eq!(
        report.entry(IndexName::Ndwi).unwrap().interpretation,
        "Good moisture; no irrigation needed."
    );
}

/// Without any optical imagery every composite index is absent, but
/// texture still comes from the static map
#[test]
fn test_report_without_composite() {
    let mut archive = LocalArchive::new();
    archive.add_static(SOIL_TEXTURE_ASSET, texture_map()).unwrap();
    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();

    let report = analyzer.analyze(&field(), window());
    assert_eq!(report.composite_window, None);
    assert_eq!(report.composite_frames, 0);
    assert_eq!(report.attempts.len(), 7);

    for entry in &report.entries {
        if entry.index == IndexName::SoilTexture {
            assert_eq!(entry.value, Some(IndexValue::Class(7)));
        } else {
            assert_eq!(entry.value, None, "{} should be absent", entry.index);
            assert_eq!(entry.interpretation, "Data unavailable.");
            assert_eq!(entry.color, Color::Grey);
        }
    }
    assert_eq!(report.score.evaluated, 1);
    assert_eq!(report.score.in_range, 1);
}

/// Cloudy scenes in the requested window are skipped; a clear scene found
/// by widening is used instead
#[test]
fn test_report_uses_widened_window() {
    let mut archive = full_archive();
    archive.add_scene(field_scene("S2_cloudy", "2024-06-10", 60.0)).unwrap();
    let window = soil_calc::TimeWindow::parse("2024-06-08", "2024-06-12").unwrap();

    let analyzer = SoilAnalyzer::new(archive, config()).unwrap();
    let report = analyzer.analyze(&field(), window);

    // 2024-06-05 lies in the window widened by 5 days
    assert_eq!(report.composite_window, Some(window.widen(5)));
    assert_eq!(report.attempts.len(), 2);
    assert_relative_eq!(number(report.value(IndexName::Ndvi)), 0.5, epsilon = 1e-5);
}

/// Same inputs, same report
#[test]
fn test_report_idempotent() {
    let analyzer = SoilAnalyzer::new(full_archive(), config()).unwrap();
    let first = analyzer.analyze(&field(), window());
    let second = analyzer.analyze(&field(), window());
    assert_eq!(first, second);
    assert!(analyzer.cache_size() > 0);

    analyzer.clear_cache();
    assert_eq!(analyzer.cache_size(), 0);
    assert_eq!(analyzer.analyze(&field(), window()), first);
}

/// Custom calculator sets only fill their own slots
#[test]
fn test_custom_calculators() {
    let calculators: Vec<Box<dyn IndexCalculator>> = vec![Box::new(NDVI::new(None)), Box::new(NPK::new(None))];
    let analyzer = SoilAnalyzer::new(full_archive(), config())
        .unwrap()
        .with_calculators(calculators);

    let report = analyzer.analyze(&field(), window());
    let names: Vec<IndexName> = report.entries.iter().map(|e| e.index).collect();
    assert_eq!(
        names,
        vec![
            IndexName::Ndvi,
            IndexName::Nitrogen,
            IndexName::Phosphorus,
            IndexName::Potassium
        ]
    );
}

/// The median composite ignores a single outlier scene
#[test]
fn test_median_composite() {
    let mut archive = LocalArchive::new();
    for (id, day, b8) in [("a", "2024-06-02", 3000.0), ("b", "2024-06-04", 3000.0), ("c", "2024-06-06", 9000.0)] {
        let bands = [("B4", 1000.0), ("B8", b8)];
        archive
            .add_scene(optical_scene("COPERNICUS/S2_SR_HARMONIZED", id, day, 1.0, &bands))
            .unwrap();
    }

    let query = ImageQuery {
        collection: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
        region: field(),
        buffer_m: 0.0,
        window: window(),
        max_cloud: Some(20.0),
        bands: vec!["B4".to_string(), "B8".to_string()],
    };
    assert_eq!(archive.count(&query).unwrap(), 3);

    let request = ReduceRequest {
        source: ImageSource::Composite(Composite {
            query,
            scale: 0.0001,
            offset: 0.0,
            frames: 3,
        }),
        region: field(),
        outputs: vec![NamedExpression::new("ndvi", NDVI::expression())],
        statistic: Statistic::Mean,
        scale: 10.0,
        max_pixels: 1e9,
    };
    let stats = archive.reduce(&request).unwrap();
    assert_relative_eq!(stats.get("ndvi").flatten().unwrap(), 0.5, epsilon = 1e-5);
}

/// Local reductions enforce the pixel budget and report unknown bands
#[test]
fn test_local_reduce_errors() {
    let archive = full_archive();
    let query = ImageQuery {
        collection: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
        region: field(),
        buffer_m: 0.0,
        window: window(),
        max_cloud: Some(20.0),
        bands: vec!["B4".to_string(), "B8".to_string()],
    };
    let request = |expression: &str, max_pixels: f64| ReduceRequest {
        source: ImageSource::Composite(Composite {
            query: query.clone(),
            scale: 0.0001,
            offset: 0.0,
            frames: 1,
        }),
        region: field(),
        outputs: vec![NamedExpression::new("out", expression)],
        statistic: Statistic::Mean,
        scale: 10.0,
        max_pixels,
    };

    assert_eq!(
        archive.reduce(&request("B8", 4.0)),
        Err(EngineError::TooManyPixels {
            pixels: 16,
            budget: 4.0
        })
    );
    assert_eq!(
        archive.reduce(&request("B11", 1e9)),
        Err(EngineError::UnknownBand {
            band: "B11".to_string()
        })
    );
    assert!(matches!(
        archive.reduce(&request("B8 +", 1e9)),
        Err(EngineError::InvalidExpression { .. })
    ));
}

/// A region outside the grid reduces to a null statistic
#[test]
fn test_local_reduce_empty_region() {
    let archive = full_archive();
    let elsewhere = soil_calc::Region::new(vec![[10.0, 46.0], [10.01, 46.0], [10.01, 46.01]]).unwrap();
    let request = ReduceRequest {
        source: ImageSource::Static {
            asset: SOIL_TEXTURE_ASSET.to_string(),
            band: "b0".to_string(),
        },
        region: elsewhere,
        outputs: vec![NamedExpression::new("b0", "b0")],
        statistic: Statistic::Mode,
        scale: 250.0,
        max_pixels: 1e9,
    };
    let stats = archive.reduce(&request).unwrap();
    assert_eq!(stats.get("b0"), Some(None));
    assert_eq!(stats.get("missing"), None);
}

/// Local archive whose N/P/K reduction returns fixed nutrient values
struct NutrientEngine {
    archive: LocalArchive,
    nutrients: [(&'static str, f64); 3],
}

impl RasterEngine for NutrientEngine {
    fn count(&self, query: &ImageQuery) -> Result<usize, EngineError> {
        self.archive.count(query)
    }

    fn band_names(&self, query: &ImageQuery) -> Result<Vec<String>, EngineError> {
        self.archive.band_names(query)
    }

    fn reduce(&self, request: &ReduceRequest) -> Result<Statistics, EngineError> {
        let names: Vec<&str> = request.outputs.iter().map(|o| o.name.as_str()).collect();
        if names != ["N", "P", "K"] {
            return self.archive.reduce(request);
        }
        let mut stats = Statistics::default();
        for (name, value) in self.nutrients {
            stats.insert(name, Some(value));
        }
        Ok(stats)
    }
}

/// Implausible nutrient values become absent; the rest of the report stands
#[test]
fn test_npk_out_of_range() {
    let engine = NutrientEngine {
        archive: full_archive(),
        nutrients: [("N", 1500.0), ("P", 30.0), ("K", -1.0)],
    };
    let analyzer = SoilAnalyzer::new(engine, config()).unwrap();
    let report = analyzer.analyze(&field(), window());

    assert_eq!(report.value(IndexName::Nitrogen), None);
    assert_eq!(report.value(IndexName::Phosphorus), Some(IndexValue::Number(30.0)));
    assert_eq!(report.value(IndexName::Potassium), None);
    assert_eq!(
        report.entry(IndexName::Nitrogen).unwrap().interpretation,
        "Data unavailable."
    );

    assert_relative_eq!(number(report.value(IndexName::Ndvi)), 0.5, epsilon = 1e-5);
    assert_eq!(report.value(IndexName::SoilTexture), Some(IndexValue::Class(7)));

    // the previous five plus phosphorus, out of the eleven present
    assert_eq!(report.score.evaluated, 11);
    assert_eq!(report.score.in_range, 6);
    assert_eq!(report.score.rating, Rating::Fair);
}

/// The plausibility bounds are inclusive
#[test]
fn test_npk_plausible_bounds() {
    assert_eq!(plausible(IndexName::Phosphorus, 500.0, 0.0, 500.0), Ok(500.0));
    assert_eq!(plausible(IndexName::Nitrogen, 0.0, 0.0, 1000.0), Ok(0.0));
    assert!(matches!(
        plausible(IndexName::Potassium, 1000.5, 0.0, 1000.0),
        Err(IndexError::OutOfRange { .. })
    ));
}

/// Composite-based calculators report absence without a composite
#[test]
fn test_calculators_without_composite() {
    let archive = full_archive();
    let reduction = RemoteReduction::new(&archive);
    let region = field();
    let config = config();
    let ctx = IndexContext {
        reduction: &reduction,
        composite: None,
        region: &region,
        window: window(),
        config: &config,
    };

    assert_eq!(ctx.require_composite().err(), Some(IndexError::NoComposite));
    assert_eq!(NPK::new(None).calculate(&ctx), vec![None, None, None]);
    assert_eq!(NDVI::new(None).calculate(&ctx), vec![None]);
}
