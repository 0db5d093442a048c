use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossfill::autofill::{autofill, FillOptions};
use crossfill::grid::Grid;
use crossfill::matcher::{Matcher, Pattern, RatingFilter, SortOrder};
use crossfill::word_list::WordList;

/// A synthetic dictionary that crosses well: every word over a small
/// alphabet at each length, so fill benchmarks measure search overhead
/// rather than dictionary luck.
fn synthetic_words(alphabet: &[u8], max_len: usize) -> WordList {
    fn extend(prefix: &mut Vec<u8>, alphabet: &[u8], len: usize, out: &mut String) {
        if prefix.len() == len {
            out.push_str(std::str::from_utf8(prefix).unwrap());
            out.push('\n');
            return;
        }
        for &b in alphabet {
            prefix.push(b);
            extend(prefix, alphabet, len, out);
            prefix.pop();
        }
    }

    let mut text = String::new();
    for len in 2..=max_len {
        extend(&mut Vec::new(), alphabet, len, &mut text);
    }
    WordList::parse_from_str(&text)
}

fn fill_squares(c: &mut Criterion) {
    let words = synthetic_words(b"aeinrst", 5);
    let mut group = c.benchmark_group("fill");

    for size in [3usize, 4, 5] {
        let grid = Grid::new(size, size).unwrap();
        group.bench_function(format!("{size}x{size}"), |b| {
            b.iter(|| {
                black_box(autofill(
                    &words,
                    &grid,
                    FillOptions { max_variations: 10, ..FillOptions::default() },
                ))
            });
        });
    }

    group.finish();
}

fn pattern_queries(c: &mut Criterion) {
    let words = synthetic_words(b"aeinrst", 5);
    let mut group = c.benchmark_group("match");

    let pattern: Pattern = "a..t.".parse().unwrap();
    let scan = Matcher::new(&words);
    group.bench_function("scan", |b| {
        b.iter(|| {
            black_box(scan.candidates(
                black_box(&pattern),
                RatingFilter::any(),
                SortOrder::Alphabetical,
            ))
        });
    });

    let indexed = Matcher::with_index(&words);
    indexed.candidates(&pattern, RatingFilter::any(), SortOrder::Alphabetical); // build
    group.bench_function("bitset", |b| {
        b.iter(|| {
            black_box(indexed.candidates(
                black_box(&pattern),
                RatingFilter::any(),
                SortOrder::Alphabetical,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, fill_squares, pattern_queries);
criterion_main!(benches);
