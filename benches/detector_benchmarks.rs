use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use seis_core::detect::stalta::classic_sta_lta;
use seis_core::{
    AicPicker, ChannelId, CoincidenceDetector, PipelineConfig, QualityFilter, Trace, Waveform,
};

const SPAN_SECONDS: &[usize] = &[600, 3600];
const SAMPRATE: f64 = 100.0;

fn synthetic_channel(n: usize, impulse_every: usize) -> Vec<f64> {
    let mut data: Vec<f64> = (0..n)
        .map(|i| (i as f64 * 0.37).sin() + 0.3 * (i as f64 * 1.93).cos())
        .collect();
    let mut at = impulse_every;
    while at < n {
        data[at] = 120.0;
        at += impulse_every;
    }
    data
}

fn benchmark_characteristic_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("stalta");

    for &seconds in SPAN_SECONDS {
        let n = seconds * SAMPRATE as usize;
        let data = synthetic_channel(n, n / 4);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("classic", seconds), &data, |b, data| {
            b.iter(|| classic_sta_lta(black_box(data), 80, 700));
        });
    }
    group.finish();
}

fn benchmark_coincidence_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("coincidence");
    let cfg = PipelineConfig::default();
    let detector = CoincidenceDetector::new(&cfg.trigger);

    for &channels in &[1usize, 4, 8] {
        let n = 600 * SAMPRATE as usize;
        let traces: Vec<Trace> = (0..channels)
            .map(|ch| Trace {
                id: ChannelId::new("UW", &format!("ST{ch}"), "--", "EHZ"),
                start: 0.0,
                samprate: SAMPRATE,
                data: synthetic_channel(n, n / 3),
            })
            .collect();
        let waveform = Waveform::new(0.0, SAMPRATE, traces).unwrap();

        group.bench_with_input(
            BenchmarkId::new("detect", format!("{channels}ch")),
            &waveform,
            |b, w| {
                b.iter(|| detector.detect(black_box(w)));
            },
        );
    }
    group.finish();
}

fn benchmark_quality_filter(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let filter = QualityFilter::new(&cfg);
    let wshape = cfg.window.wshape(cfg.station.samprate);
    let segment = synthetic_channel(wshape, wshape / 2);

    c.bench_function("quality/assess_channel", |b| {
        b.iter(|| filter.assess_channel(black_box(&segment)));
    });
}

fn benchmark_aic_picker(c: &mut Criterion) {
    let cfg = PipelineConfig::default();
    let picker = AicPicker::new(&cfg);
    let data = synthetic_channel(4000, 2000);

    c.bench_function("picker/refine", |b| {
        b.iter(|| picker.refine(black_box(&data), 2000));
    });
}

criterion_group!(
    benches,
    benchmark_characteristic_function,
    benchmark_coincidence_detector,
    benchmark_quality_filter,
    benchmark_aic_picker
);
criterion_main!(benches);
