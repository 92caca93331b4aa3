use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use soil_calc::config::{EngineConfig, SENTINEL2_HARMONIZED};
use soil_calc::engine::expression::Expr;
use soil_calc::engine::local::{Grid, Scene};
use soil_calc::engine::{
    Composite, ImageQuery, ImageSource, LocalArchive, NamedExpression, RasterEngine, ReduceRequest, Statistic,
};
use soil_calc::processing::indices::NDVI;
use soil_calc::processing::SoilAnalyzer;
use soil_calc::region::Region;
use soil_calc::window::TimeWindow;

const SIZE: usize = 512;

/// Synthetic archive of five 512x512 scenes with a vegetation gradient
fn synthetic_archive() -> LocalArchive {
    let grid = Grid::north_up(SIZE, SIZE, 9.0, 45.0 + SIZE as f64 * 1e-4, 1e-4);
    let mut archive = LocalArchive::new();
    for day in 1..=5 {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let nir: Vec<f32> = (0..grid.len()).map(|i| 2500.0 + (i % 100) as f32 * 10.0).collect();
        let red: Vec<f32> = (0..grid.len()).map(|i| 800.0 + (i % 50) as f32 * 5.0).collect();
        let scene = Scene::new(format!("S2_{day}"), SENTINEL2_HARMONIZED, date, grid)
            .with_cloud_cover(f64::from(day))
            .with_band("B8", nir)
            .with_band("B4", red)
            .with_constant_band("B2", 500.0)
            .with_constant_band("B3", 800.0)
            .with_constant_band("B11", 1500.0);
        archive.add_scene(scene).unwrap();
    }
    archive
}

fn field() -> Region {
    let span = SIZE as f64 * 1e-4;
    Region::new(vec![
        [9.0, 45.0],
        [9.0 + span, 45.0],
        [9.0 + span, 45.0 + span],
        [9.0, 45.0 + span],
    ])
    .unwrap()
}

fn window() -> TimeWindow {
    TimeWindow::parse("2024-06-01", "2024-06-10").unwrap()
}

/// Benchmark expression evaluation over one pixel in isolation
fn benchmark_expression(c: &mut Criterion) {
    let expr = Expr::parse("(2*B8+1-sqrt(pow(2*B8+1,2)-8*(B8-B4)))/2").unwrap();
    let slots = [("B4".to_string(), 0), ("B8".to_string(), 1)].into_iter().collect();
    let bound = expr.bind(&slots).unwrap();
    let pixel = [0.1, 0.3];

    c.bench_function("msavi2_pixel_eval", |b| b.iter(|| bound.eval(black_box(&pixel))));
}

/// Benchmark one median composite plus NDVI reduction
fn benchmark_local_reduce(c: &mut Criterion) {
    let archive = synthetic_archive();
    let request = ReduceRequest {
        source: ImageSource::Composite(Composite {
            query: ImageQuery {
                collection: SENTINEL2_HARMONIZED.to_string(),
                region: field(),
                buffer_m: 0.0,
                window: window(),
                max_cloud: Some(20.0),
                bands: vec!["B4".to_string(), "B8".to_string()],
            },
            scale: 0.0001,
            offset: 0.0,
            frames: 5,
        }),
        region: field(),
        outputs: vec![NamedExpression::new("ndvi", NDVI::expression())],
        statistic: Statistic::Mean,
        scale: 10.0,
        max_pixels: 1e9,
    };

    let mut group = c.benchmark_group("local_reduce");
    group.sample_size(10);
    group.bench_function("ndvi_median_composite", |b| {
        b.iter(|| archive.reduce(black_box(&request)).unwrap())
    });
    group.finish();
}

/// Benchmark a full soil report without the reduction cache
fn benchmark_report(c: &mut Criterion) {
    let config = EngineConfig {
        cache_reductions: false,
        ..EngineConfig::default()
    };
    let analyzer = SoilAnalyzer::new(synthetic_archive(), config).unwrap();
    let region = field();

    let mut group = c.benchmark_group("soil_report");
    group.sample_size(10);
    group.bench_function("full_report", |b| {
        b.iter(|| analyzer.analyze(black_box(&region), window()))
    });
    group.finish();
}

criterion_group!(benches, benchmark_expression, benchmark_local_reduce, benchmark_report);
criterion_main!(benches);
