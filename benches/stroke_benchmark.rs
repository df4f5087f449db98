//! Stroke pipeline and flood fill benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use patternbrush_lib::brush::{BrushConfiguration, PatternType, StrokeEngine, StrokeOptions};
use patternbrush_lib::fill::{FillMode, FillRequest, FloodFillEngine, RasterBuffer, Rgba};
use patternbrush_lib::geometry::PatternGeometryGenerator;
use patternbrush_lib::input::InputSample;

fn generate_stroke(count: usize) -> Vec<InputSample> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            InputSample::new(
                t * 1000.0,
                (t * std::f32::consts::PI * 4.0).sin() * 100.0 + 500.0,
                0.3 + t * 0.4,
                i as f64 * 0.004,
            )
        })
        .collect()
}

fn run_stroke(config: &BrushConfiguration, samples: &[InputSample]) -> usize {
    let mut engine = StrokeEngine::with_seed(7);
    let Some((first, rest)) = samples.split_first() else {
        return 0;
    };
    engine.begin_stroke(*first, config.clone(), StrokeOptions::default());
    for sample in rest {
        engine.add_point(*sample);
    }
    engine.end_stroke().map_or(0, |stroke| stroke.stamps().len())
}

fn benchmark_stroke_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stroke Processing");
    let config = BrushConfiguration::default();

    for count in [10, 100, 1000].iter() {
        let samples = generate_stroke(*count);
        group.bench_with_input(BenchmarkId::new("process", count), &samples, |b, samples| {
            b.iter(|| run_stroke(&config, samples))
        });
    }

    group.finish();
}

fn benchmark_brush_settings(c: &mut Criterion) {
    let mut group = c.benchmark_group("Brush Settings Impact");
    let samples = generate_stroke(200);

    let plain = BrushConfiguration::default();
    group.bench_function("default", |b| b.iter(|| run_stroke(&plain, &samples)));

    let mut smoothed = BrushConfiguration::default();
    smoothed.stabilization = 80.0;
    smoothed.prediction = 60.0;
    group.bench_function("stabilized_predicted", |b| {
        b.iter(|| run_stroke(&smoothed, &samples))
    });

    let mut dense = BrushConfiguration::default();
    dense.brush.spacing = 1.0;
    dense.jitter.size_enabled = true;
    dense.jitter.size_amount = 0.3;
    group.bench_function("dense_jitter", |b| b.iter(|| run_stroke(&dense, &samples)));

    group.finish();
}

fn benchmark_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pattern Geometry");
    let mut config = BrushConfiguration::default();
    config.brush.spacing = 2.0;

    for pattern in [PatternType::CrossHatch, PatternType::Dots, PatternType::Waves] {
        config.pattern = pattern;
        let mut engine = StrokeEngine::with_seed(3);
        let samples = generate_stroke(100);
        let mut stamps = engine
            .begin_stroke(samples[0], config.clone(), StrokeOptions::default())
            .stamps;
        for sample in &samples[1..] {
            stamps.extend(engine.add_point(*sample).stamps);
        }
        let generator = PatternGeometryGenerator::new(config.pattern_params);

        group.bench_function(format!("{pattern:?}"), |b| {
            b.iter(|| {
                stamps
                    .iter()
                    .map(|stamp| generator.for_stamp(stamp).primitive_count())
                    .sum::<usize>()
            })
        });
    }

    group.finish();
}

fn benchmark_flood_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flood Fill");
    group.sample_size(20);
    let engine = FloodFillEngine::new();

    for size in [256u32, 1024].iter() {
        let canvas = RasterBuffer::filled(*size, *size, Rgba::WHITE);
        for mode in [FillMode::Contiguous, FillMode::Global] {
            let request = FillRequest::new(0, 0, Rgba::BLACK).with_mode(mode);
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), size),
                &canvas,
                |b, canvas| b.iter(|| engine.fill(canvas, &request)),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_stroke_processing,
    benchmark_brush_settings,
    benchmark_geometry,
    benchmark_flood_fill
);
criterion_main!(benches);
