use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use onboarder_ai::{RepositoryIdentity, RetryConfig, clean_response, estimate_tokens};
use std::hint::black_box;

fn extract_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for size in [1_000, 50_000].iter() {
        let body = "Some generated documentation line.\n".repeat(size / 35);
        let raw = format!("<analysis>scratch notes</analysis>\n```markdown\n{body}\n```");
        group.bench_with_input(BenchmarkId::new("clean_response", size), &raw, |b, raw| {
            b.iter(|| clean_response(black_box(raw)))
        });
    }

    group.finish();
}

fn identity_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity");

    group.bench_function("from_https_url", |b| {
        b.iter(|| RepositoryIdentity::from_url(black_box("https://github.com/acme/widgets.git")))
    });
    group.bench_function("from_scp_url", |b| {
        b.iter(|| RepositoryIdentity::from_url(black_box("git@github.com:acme/widgets.git")))
    });

    group.finish();
}

fn misc_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("misc");
    let payload = "x".repeat(500_000);
    let config = RetryConfig::default();

    group.bench_function("estimate_tokens_500k", |b| {
        b.iter(|| estimate_tokens(black_box(&payload)))
    });
    group.bench_function("delay_for_attempt", |b| {
        b.iter(|| config.delay_for_attempt(black_box(7)))
    });

    group.finish();
}

criterion_group!(benches, extract_benchmarks, identity_benchmarks, misc_benchmarks);
criterion_main!(benches);
