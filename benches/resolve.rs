//! Resolution benchmark suite.
//!
//! Benchmarks the resolver against an in-memory page:
//! - Lookup set sizes: 1, 10, 100
//! - Concurrent sessions: 10, 100
//! - Synthetic typing sequence generation
//!
//! Run with: cargo bench --bench resolve
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use form_pilot::page::keyboard::input_events;
use form_pilot::{By, LookupSet, MemoryPage, Resolver};
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LOOKUP_COUNTS: &[usize] = &[1, 10, 100];
const SESSION_COUNTS: &[usize] = &[10, 100];

// ============================================================================
// Benchmark: Single Session
// ============================================================================

fn bench_resolve_present(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("resolve_present");

    for &count in LOOKUP_COUNTS {
        let page = populated_page(count);
        group.bench_with_input(BenchmarkId::new("lookups", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| resolve_all(&page, count));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Concurrent Sessions
// ============================================================================

fn bench_concurrent_sessions(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("concurrent_sessions");
    group.sample_size(20);

    for &sessions in SESSION_COUNTS {
        let page = populated_page(10);
        group.bench_with_input(
            BenchmarkId::new("sessions", sessions),
            &sessions,
            |b, &sessions| {
                b.to_async(&rt).iter(|| async {
                    let futures: Vec<_> = (0..sessions).map(|_| resolve_all(&page, 10)).collect();
                    futures_util::future::join_all(futures).await
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: Typing Sequence
// ============================================================================

fn bench_input_events(c: &mut Criterion) {
    c.bench_function("input_events_totp", |b| {
        b.iter(|| input_events(std::hint::black_box("483920")));
    });
    c.bench_function("input_events_mixed", |b| {
        b.iter(|| input_events(std::hint::black_box("Pa$$w0rd!Example")));
    });
}

// ============================================================================
// Helper Functions
// ============================================================================

fn selector(i: usize) -> By {
    By::id(format!("field-{i}"))
}

fn populated_page(count: usize) -> MemoryPage {
    let page = MemoryPage::new("https://mail.example.com/login");
    for i in 0..count {
        page.insert(selector(i));
    }
    page
}

async fn resolve_all(page: &MemoryPage, count: usize) -> usize {
    let mut lookups = LookupSet::new();
    for i in 0..count {
        lookups
            .query(format!("field-{i}"), page, selector(i))
            .expect("unique key");
    }

    Resolver::new()
        .resolve(lookups)
        .await
        .map(|resolved| resolved.len())
        .unwrap_or(0)
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_resolve_present,
    bench_concurrent_sessions,
    bench_input_events
);
criterion_main!(benches);
