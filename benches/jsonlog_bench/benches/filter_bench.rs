//! Key filtering and formatting benchmarks
//!
//! Measures rule matching, tree assembly and full request formatting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonlog_core::{
    Assembler, EncoderChain, JsonLogConfig, KeyFilter, KeyPath, LogFormatter, LogRecord,
};
use jsonlog_extras::HttpRequestSource;
use serde_json::{json, Map, Value};
use tracing::Level;

/// Object with `width` keys per level, `depth` levels deep
fn wide_tree(width: usize, depth: usize) -> Value {
    if depth == 0 {
        return json!("leaf");
    }
    let mut map = Map::new();
    for i in 0..width {
        map.insert(format!("key_{}", i), wide_tree(width, depth - 1));
    }
    Value::Object(map)
}

/// Benchmark include/exclude decisions for single paths
fn bench_rule_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_matching");

    let filter = KeyFilter::from_rules(
        [
            "request.META.REQUEST_METHOD",
            "request.META.SERVER_NAME",
            "request.environ",
        ],
        ["request.META.SERVER_NAME", "request.environ.wsgi"],
    )
    .unwrap();

    let paths = [
        ("ancestor", "request.META"),
        ("exact", "request.META.REQUEST_METHOD"),
        ("descendant", "request.environ.PATH_INFO"),
        ("excluded", "request.environ.wsgi.version"),
        ("sibling", "request.path"),
    ];

    for (name, path) in paths {
        let path = KeyPath::parse(path).unwrap();
        group.bench_function(name, |b| b.iter(|| filter.allows(black_box(&path))));
    }

    group.finish();
}

/// Benchmark assembly of growing trees
fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    let encoders = EncoderChain::new();
    let filter = KeyFilter::from_rules(["root.key_0", "root.key_1.key_2"], ["root.key_0.key_3"])
        .unwrap();

    for width in [4usize, 8, 16] {
        let tree = wide_tree(width, 3);
        group.throughput(Throughput::Elements((width * width * width) as u64));
        group.bench_with_input(BenchmarkId::new("filtered", width), &tree, |b, tree| {
            let assembler = Assembler::new(&filter, &encoders);
            b.iter(|| assembler.assemble("root", black_box(tree)))
        });
    }

    group.finish();
}

/// Benchmark a full request record, filter and format included
fn bench_request_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_record");

    let config = JsonLogConfig::builder()
        .include_keys([
            "request.META.REQUEST_METHOD",
            "request.META.SERVER_NAME",
            "request.environ",
        ])
        .exclude_keys(["request.META.SERVER_NAME", "request.environ.wsgi"])
        .remove_empty(true)
        .build();
    let encoders = EncoderChain::new();
    let filter = config.record_filter(&encoders).unwrap();
    let formatter = config.formatter(&encoders).unwrap();

    let request = http::Request::builder()
        .method("GET")
        .uri("/my_path?test=true&test_2=false")
        .header("host", "testserver")
        .header("accept", "application/json")
        .header("user-agent", "bench/1.0")
        .body(())
        .unwrap();

    group.bench_function("typical_request", |b| {
        b.iter(|| {
            let source = HttpRequestSource::new(black_box(&request));
            let mut record =
                LogRecord::new(Level::INFO, "Simple message").with_source("request", &source);
            filter.apply(&mut record);
            formatter.format(&record)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rule_matching,
    bench_assembly,
    bench_request_record,
);

criterion_main!(benches);
