use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docblock_core::{extract, Batch, Language};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

const TINY_SRC: &str = "// <api method=\"GET\" />\n";

const SMALL_SRC: &str = concat!(
    "package small\n",
    "\n",
    "// <api method=\"GET\" summary=\"ping\">\n",
    "// <path path=\"/ping\" />\n",
    "// <response status=\"200\" mimetype=\"application/json\" />\n",
    "// </api>\n",
    "func ping() {}\n",
);

const MEDIUM_SRC: &str = concat!(
    "package medium\n",
    "\n",
    "// <apidoc version=\"1.0.0\">\n",
    "// <title>Medium</title>\n",
    "// <tag name=\"users\" title=\"User management\" />\n",
    "// <server name=\"prod\" url=\"https://api.example.com\" />\n",
    "// </apidoc>\n",
    "\n",
    "// <api method=\"GET\" summary=\"list users\">\n",
    "// <path path=\"/users\">\n",
    "// <query name=\"page\" type=\"number\" optional=\"true\" default=\"0\" />\n",
    "// <query name=\"size\" type=\"number\" optional=\"true\" default=\"20\" />\n",
    "// </path>\n",
    "// <tag>users</tag>\n",
    "// <response status=\"200\" mimetype=\"application/json\" type=\"object\">\n",
    "// <param name=\"total\" type=\"number\" summary=\"user count\" />\n",
    "// <param name=\"items\" type=\"object\" array=\"true\" summary=\"users\">\n",
    "// <param name=\"id\" type=\"number\" summary=\"id\" />\n",
    "// <param name=\"name\" type=\"string\" summary=\"name\" />\n",
    "// </param>\n",
    "// </response>\n",
    "// </api>\n",
    "\n",
    "// <api method=\"POST\" summary=\"create user\">\n",
    "// <path path=\"/users\" />\n",
    "// <request mimetype=\"application/json\" type=\"object\">\n",
    "// <param name=\"name\" type=\"string\" summary=\"name\" />\n",
    "// </request>\n",
    "// <response status=\"201\" mimetype=\"application/json\" />\n",
    "// </api>\n",
);

// Many endpoints spread through interleaving code, for scaling runs.
fn generate_large_source(endpoints: usize) -> String {
    let mut src = String::from("package large\n\n");
    for i in 0..endpoints {
        src.push_str(&format!(
            concat!(
                "// <api method=\"GET\" summary=\"endpoint {i}\">\n",
                "// <path path=\"/endpoint/{i}/{{id}}\">\n",
                "// <param name=\"id\" type=\"number\" summary=\"id\" />\n",
                "// </path>\n",
                "// <response status=\"200\" mimetype=\"application/json\" />\n",
                "// </api>\n",
                "func endpoint{i}() {{ s := \"// not a comment\" }}\n",
                "\n",
            ),
            i = i
        ));
    }
    src
}

fn go() -> &'static Language {
    Language::find("go").unwrap()
}

// ============================================================================
// Scanner Benchmarks
// ============================================================================

fn bench_scan_tiny(c: &mut Criterion) {
    c.bench_function("scan_tiny", |b| {
        b.iter(|| extract(black_box(TINY_SRC), go(), "bench.go"))
    });
}

fn bench_scan_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_by_size");

    for (name, source) in [
        ("tiny", TINY_SRC),
        ("small", SMALL_SRC),
        ("medium", MEDIUM_SRC),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| extract(black_box(src), go(), "bench.go"))
        });
    }

    group.finish();
}

fn bench_scan_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_endpoint_scaling");

    for size in [10, 50, 100, 500] {
        let source = generate_large_source(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| extract(black_box(src), go(), "bench.go"))
        });
    }

    group.finish();
}

// ============================================================================
// End-to-End Batch Benchmarks
// ============================================================================

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_by_size");

    for (name, source) in [
        ("tiny", TINY_SRC),
        ("small", SMALL_SRC),
        ("medium", MEDIUM_SRC),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, src| {
            b.iter(|| {
                let batch = Batch::new();
                batch.add_file(black_box(src), go(), "bench.go");
                batch.finish()
            })
        });
    }

    group.finish();
}

fn bench_batch_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_endpoint_scaling");

    for size in [10, 50, 100, 500] {
        let source = generate_large_source(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, src| {
            b.iter(|| {
                let batch = Batch::new();
                batch.add_file(black_box(src), go(), "bench.go");
                batch.finish()
            })
        });
    }

    group.finish();
}

fn bench_batch_with_serialization(c: &mut Criterion) {
    let source = generate_large_source(100);
    c.bench_function("batch_100_with_json", |b| {
        b.iter(|| {
            let batch = Batch::new();
            batch.add_file(black_box(&source), go(), "bench.go");
            let (doc, _) = batch.finish();
            doc.to_json()
        })
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    scanner_benches,
    bench_scan_tiny,
    bench_scan_sizes,
    bench_scan_scaling
);

criterion_group!(
    batch_benches,
    bench_batch_sizes,
    bench_batch_scaling,
    bench_batch_with_serialization
);

criterion_main!(scanner_benches, batch_benches);
