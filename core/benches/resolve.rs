//! Resolve benchmarks — request → handler lookup.
//!
//! Separates the direct-URL fast path from the full pattern scan, and shows
//! how the scan behaves as the route table grows.

use ruta::prelude::*;

fn main() {
    divan::main();
}

fn dispatcher_with_routes(n: usize) -> Dispatcher {
    let dispatcher = Dispatcher::new();
    for i in 0..n {
        dispatcher
            .register(
                Mapping::builder()
                    .paths([format!("/svc{i}/items")])
                    .methods([HttpMethod::Get])
                    .build()
                    .unwrap(),
                HandlerRef::new(format!("svc{i}"), "list"),
            )
            .unwrap();
        dispatcher
            .register(
                Mapping::builder()
                    .paths([format!("/svc{i}/items/{{id}}")])
                    .methods([HttpMethod::Get])
                    .build()
                    .unwrap(),
                HandlerRef::new(format!("svc{i}"), "get"),
            )
            .unwrap();
    }
    dispatcher
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fast path vs full scan
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 500])]
fn resolve_direct_url(bencher: divan::Bencher, n: usize) {
    let dispatcher = dispatcher_with_routes(n);
    let request = RouteRequest::builder(HttpMethod::Get, "/svc0/items").build();
    bencher.bench_local(|| dispatcher.resolve(divan::black_box(&request)));
}

#[divan::bench(args = [10, 100, 500])]
fn resolve_pattern_scan(bencher: divan::Bencher, n: usize) {
    let dispatcher = dispatcher_with_routes(n);
    let request = RouteRequest::builder(HttpMethod::Get, "/svc0/items/42").build();
    bencher.bench_local(|| dispatcher.resolve(divan::black_box(&request)));
}

#[divan::bench(args = [10, 100, 500])]
fn resolve_miss_with_diagnosis(bencher: divan::Bencher, n: usize) {
    let dispatcher = dispatcher_with_routes(n);
    let request = RouteRequest::builder(HttpMethod::Delete, "/svc0/items").build();
    bencher.bench_local(|| dispatcher.resolve(divan::black_box(&request)));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern matching in isolation
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn match_literal(bencher: divan::Bencher) {
    bencher.bench_local(|| ruta::path::matches("/api/v1/users", divan::black_box("/api/v1/users")));
}

#[divan::bench]
fn match_variable(bencher: divan::Bencher) {
    bencher.bench_local(|| {
        ruta::path::extract_variables("/api/v1/users/{id}", divan::black_box("/api/v1/users/42"))
    });
}

#[divan::bench]
fn match_double_wildcard(bencher: divan::Bencher) {
    bencher.bench_local(|| {
        ruta::path::matches("/api/**/detail/*.html", divan::black_box("/api/a/b/c/detail/x.html"))
    });
}
