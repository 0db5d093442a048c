//! `bench_local.rs` — quick local timing runner (no Criterion)
//!
//! PURPOSE
//! -------
//! - Fast, ad-hoc timing of the autofill engine on a few grid shapes.
//! - Loads the word list once, runs each shape several times, reports the
//!   median wall time and node count.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:    `cargo run --bin bench_local --release -- -w words.dict`
//! - Multiple repeats:   `cargo run --bin bench_local --release -- -w words.dict -r 5`
//! - See all flags:      `cargo run --bin bench_local -- --help`
//!
//! NOTES
//! -----
//! - This is *not* Criterion. It's quick and convenient, not
//!   statistically rigorous. Use the same machine and `--release` for
//!   comparable numbers.
//! - One warm-up run per shape is done (not included in timing).

use clap::Parser;
use crossfill::autofill::{autofill, FillOptions};
use crossfill::grid::Grid;
use crossfill::word_list::WordList;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Ad-hoc autofill timing")]
struct Cli {
    /// Path to the word list file
    #[arg(short, long)]
    word_list: PathBuf,

    /// Repeats per shape (median is reported)
    #[arg(short, long, default_value_t = 3)]
    repeats: usize,

    /// Fills requested per run
    #[arg(short = 'n', long, default_value_t = 10)]
    num_results: usize,
}

/// Grid shapes worth timing: open squares and a blocked midweek-ish 7x7.
fn cases() -> Vec<(&'static str, &'static str)> {
    vec![
        ("open-4x4", "....\n....\n....\n...."),
        ("open-5x5", ".....\n.....\n.....\n.....\n....."),
        (
            "blocked-7x7",
            "...#...\n.......\n.......\n#.....#\n.......\n.......\n...#...",
        ),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let words = WordList::load_from_paths(&[&cli.word_list])?;
    eprintln!("{} words loaded", words.len());

    for (name, template) in cases() {
        let grid = Grid::from_template(template)?;

        // Warm-up, untimed.
        black_box(autofill(
            &words,
            &grid,
            FillOptions { max_variations: cli.num_results, ..FillOptions::default() },
        ));

        let mut timings = Vec::with_capacity(cli.repeats);
        let mut nodes = 0;
        let mut found = 0;
        for _ in 0..cli.repeats {
            let t = Instant::now();
            let result = black_box(autofill(
                &words,
                &grid,
                FillOptions { max_variations: cli.num_results, ..FillOptions::default() },
            ));
            timings.push(t.elapsed());
            nodes = result.stats.nodes;
            found = result.grids.len();
        }
        timings.sort();
        let median = timings[timings.len() / 2];

        println!(
            "{name:>12}: {:>8.3}ms median, {found} fill(s), {nodes} node(s)",
            median.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
