use chart_layers::api::{ChartGroup, ChartConfiguration, ChartEngine};
use chart_layers::core::{ChartLayout, ExtremePoint, Insets, Point, Quote, Rect, Size, ValueTransform};
use chart_layers::extensions::{
    CandlestickRenderer, LatestPriceIndicator, MovingAverageIndicator, TimeAnnotation,
    ValueAnnotation,
};
use chart_layers::render::{
    DrawablePool, DrawableSetup, LayerId, LayerSurface, NullRenderer, RecordingSurface,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn generated_quotes(count: usize) -> Vec<Quote> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let base = 100.0 + t * 0.05;
            let open = base;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            Quote::new(t * 60.0, open, high, low, close).expect("valid generated quote")
        })
        .collect()
}

fn bench_value_transform_round_trip(c: &mut Criterion) {
    let transform = ValueTransform::new(
        Rect::new(0.0, 10.0, 1920.0, 1060.0),
        Some(ExtremePoint::new(0.0, 10_000.0)),
    )
    .expect("valid transform");

    c.bench_function("value_transform_round_trip", |b| {
        b.iter(|| {
            let y = transform.price_to_y(black_box(4_321.123));
            let _ = transform.y_to_price(y);
        })
    });
}

fn bench_visible_range_sweep(c: &mut Criterion) {
    let layout = ChartLayout::new(ChartConfiguration::default().layout_metrics(), 100_000)
        .expect("valid layout");

    c.bench_function("visible_range_sweep_1k_offsets", |b| {
        b.iter(|| {
            for step in 0..1_000 {
                let _ = layout.visible_index_range(black_box(step as f64 * 731.0), 1920.0);
            }
        })
    });
}

fn bench_pool_recycle_frames(c: &mut Criterion) {
    let mut host = RecordingSurface::new(Size::new(1920.0, 1080.0));
    let mut pool = DrawablePool::new(DrawableSetup::default());

    c.bench_function("drawable_pool_recycle_240", |b| {
        b.iter(|| {
            let mut surface = LayerSurface::new(&mut host, LayerId::new(0));
            pool.recycle_visible(&mut surface);
            for _ in 0..black_box(240) {
                pool.dequeue(&mut surface);
            }
        })
    });
}

fn bench_engine_render_10k(c: &mut Criterion) {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartConfiguration::default())
        .expect("engine init");
    let price = engine
        .add_group(ChartGroup::new(1000.0).with_padding(Insets::new(10.0, 0.0, 10.0, 0.0)))
        .expect("price group");
    let axis = engine.add_group(ChartGroup::new(40.0)).expect("axis group");
    engine
        .register_plugin(price, Box::new(CandlestickRenderer::new("candles")))
        .expect("candles");
    engine
        .register_plugin(
            price,
            Box::new(MovingAverageIndicator::new("ma-20", 20).expect("valid period")),
        )
        .expect("moving average");
    engine
        .register_plugin(price, Box::new(ValueAnnotation::new("values")))
        .expect("values");
    engine
        .register_plugin(price, Box::new(LatestPriceIndicator::new("latest")))
        .expect("latest");
    engine
        .register_plugin(axis, Box::new(TimeAnnotation::new("times")))
        .expect("times");
    engine.set_quotes(generated_quotes(10_000));

    let mut host = RecordingSurface::new(Size::new(1920.0, 1040.0));
    engine.attach(&mut host);
    let trailing = engine.trailing_offset(1920.0).expect("trailing offset");
    let mut step = 0.0;

    c.bench_function("engine_render_scrolling_10k", |b| {
        b.iter(|| {
            step = (step + 37.0) % 4_000.0;
            host.set_content_offset(Point::new(trailing - step, 0.0));
            let _ = engine
                .render(black_box(&mut host))
                .expect("frame should render");
        })
    });
}

criterion_group!(
    benches,
    bench_value_transform_round_trip,
    bench_visible_range_sweep,
    bench_pool_recycle_frames,
    bench_engine_render_10k
);
criterion_main!(benches);
