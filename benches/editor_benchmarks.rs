//! Benchmarks for the editor core hot paths.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pitchpad_text::{merge_spans, DiffWindow, Span};

/// Generates pitch-like text for benchmarking.
fn generate_text(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "Paragraph {}: we often deal with disputes such as yours and \
                 my hourly rate is [RATE] as a [ROLE], budget [INSERT].\n",
                i
            )
        })
        .collect()
}

/// Benchmarks diff-window location at various text sizes.
fn bench_diff_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_window");

    for size in [10, 100, 1000].iter() {
        let old = generate_text(*size);

        // Worst case for the scans: a one-char edit in the middle
        let mid = old.len() / 2;
        let mut new = old.clone();
        new.insert(mid, 'x');

        group.bench_with_input(
            BenchmarkId::new("mid_insertion", size),
            &(old.clone(), new),
            |b, (old, new)| {
                b.iter(|| {
                    let window = DiffWindow::between(black_box(old), black_box(new));
                    black_box(window)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("identical", size),
            &old,
            |b, text| {
                b.iter(|| {
                    let window = DiffWindow::between(black_box(text), black_box(text));
                    black_box(window)
                })
            },
        );
    }

    group.finish();
}

/// Benchmarks span remapping over many tracked spans.
fn bench_span_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_mapping");

    let spans: Vec<Span> = (0..1000).map(|i| Span::new(i * 10, i * 10 + 6)).collect();
    let window = DiffWindow::replacement(Span::new(5000, 5006), 9);

    group.bench_function("map_1000_spans", |b| {
        b.iter(|| {
            let mapped: Vec<Span> = spans
                .iter()
                .filter_map(|s| window.map_span(black_box(*s)))
                .collect();
            black_box(mapped)
        })
    });

    group.bench_function("merge_1000_spans", |b| {
        b.iter_with_setup(
            || spans.clone(),
            |spans| black_box(merge_spans(spans)),
        )
    });

    group.finish();
}

/// Benchmarks the token scanner.
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [10, 100, 1000].iter() {
        let text = generate_text(*size);
        group.bench_with_input(BenchmarkId::new("tokens", size), &text, |b, text| {
            b.iter(|| black_box(pitchpad_scan::scan(black_box(text))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff_window, bench_span_mapping, bench_scan);
criterion_main!(benches);
