//! Benchmarks for reading-order reconstruction.
//!
//! Run with: cargo bench
//!
//! Pages are synthetic fragment lists in scrambled content-stream order.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docmark::model::PageFragments;
use docmark::parser::{reconstruct, reconstruct_pages};
use docmark::render::annotate;

/// A page with `lines` rows of four words each, emitted bottom-up and
/// right-to-left.
fn scrambled_page(number: u32, lines: usize) -> PageFragments {
    let mut page = PageFragments::new(number);
    for row in (0..lines).rev() {
        let y = 750.0 - row as f64 * 14.0;
        for col in (0..4).rev() {
            // small baseline jitter within the same line
            let jitter = (col % 2) as f64 * 1.5;
            page.push(format!("word{}-{}", row, col), 72.0 + col as f64 * 90.0, y + jitter);
        }
    }
    page
}

fn bench_single_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct_page");

    for lines in [10, 50, 200].iter() {
        let page = scrambled_page(1, *lines);
        group.bench_function(format!("{}_lines", lines), |b| {
            b.iter(|| reconstruct(black_box(&page.fragments)));
        });
    }

    group.finish();
}

fn bench_document(c: &mut Criterion) {
    let pages: Vec<PageFragments> = (1..=32).map(|n| scrambled_page(n, 50)).collect();
    let mut group = c.benchmark_group("reconstruct_document");

    group.bench_function("sequential", |b| {
        b.iter(|| reconstruct_pages(black_box(&pages), false));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| reconstruct_pages(black_box(&pages), true));
    });

    group.finish();
}

fn bench_heading_annotation(c: &mut Criterion) {
    let pages: Vec<PageFragments> = (1..=8).map(|n| scrambled_page(n, 50)).collect();
    let text = reconstruct_pages(&pages, false);

    c.bench_function("annotate_headings", |b| {
        b.iter(|| annotate(black_box(&text)));
    });
}

criterion_group!(
    benches,
    bench_single_page,
    bench_document,
    bench_heading_annotation,
);
criterion_main!(benches);
