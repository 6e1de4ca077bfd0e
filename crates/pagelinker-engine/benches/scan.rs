use criterion::{Criterion, criterion_group, criterion_main};
use pagelinker_engine::markup::{parse, render};
use pagelinker_engine::{Annotator, PatternRule, Preset, RuleSet};
mod common;

fn annotator() -> Annotator {
    let invoice = PatternRule::builder(
        "invoice",
        r"(Inv(?:oice)?\s*#?\s*)?(6[1-9]\d{3}|7[0-4]\d{3}|75000)",
    )
    .capture_group(2)
    .case_insensitive(true)
    .url_template("qbxml://open-invoice?number={value}")
    .build()
    .unwrap();
    let rules = Preset::Tracking.rules().into_iter().chain([invoice]);
    Annotator::new(RuleSet::new(rules).unwrap())
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(10);

    let annotator = annotator();
    let orders = common::generate_order_page(500);
    let plain = common::generate_plain_page(2000);

    group.bench_function("parse_orders", |b| {
        b.iter(|| std::hint::black_box(parse(std::hint::black_box(&orders))));
    });

    group.bench_function("scan_orders", |b| {
        b.iter_batched(
            || parse(&orders),
            |mut doc| {
                let body = doc.body();
                std::hint::black_box(annotator.scan(&mut doc, body))
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("scan_without_matches", |b| {
        let doc = parse(&plain);
        b.iter(|| std::hint::black_box(annotator.plan(&doc, doc.root())));
    });

    group.bench_function("linkify_and_render", |b| {
        b.iter(|| {
            let (html, report) = annotator.linkify_html(&orders);
            std::hint::black_box((html, report))
        });
    });

    group.bench_function("render_orders", |b| {
        let doc = parse(&orders);
        b.iter(|| std::hint::black_box(render(&doc, doc.root())));
    });

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
