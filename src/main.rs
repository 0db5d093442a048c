use clap::{Parser, Subcommand};
use crossfill::autofill::{FillOptions, FillStatus};
use crossfill::grid::Grid;
use crossfill::matcher::{Matcher, Pattern, RatingFilter, SortOrder};
use crossfill::puz::Puzzle;
use crossfill::word_list::WordList;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Crossword construction toolkit: suggestions, autofill, .puz conversion
#[derive(Parser, Debug)]
#[command(
    author,
    about,
    long_about = None,
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_HASH"), ", built ", env!("BUILD_TIMESTAMP"), ")"
    )
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (RUST_LOG still overrides)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List dictionary words matching a pattern (e.g. "A.T")
    Suggest {
        /// The pattern: letters fix a slot, '.'/'_'/'?' are wildcards
        pattern: String,

        /// Path to a word list file (WORD or WORD;RATING per line); repeatable
        #[arg(short, long, required = true)]
        word_list: Vec<PathBuf>,

        /// Minimum rating filter (excludes unranked words)
        #[arg(short = 'm', long)]
        min_rating: Option<u32>,

        /// Maximum number of results to print
        #[arg(short = 'n', long, default_value_t = 100)]
        num_results: usize,
    },

    /// Enumerate fills for a grid template ('#' block, '.' empty, letters fixed)
    Autofill {
        /// Path to the template file
        template: PathBuf,

        /// Path to a word list file; repeatable
        #[arg(short, long, required = true)]
        word_list: Vec<PathBuf>,

        /// Maximum number of fills to enumerate
        #[arg(short = 'n', long, default_value_t = 10)]
        num_results: usize,

        /// Wall-clock limit in seconds
        #[arg(short = 't', long)]
        time_limit: Option<u64>,

        /// Maximum number of search steps
        #[arg(long)]
        node_budget: Option<u64>,
    },

    /// Decode a .puz file, print a summary, optionally re-encode
    Convert {
        /// Path to the input .puz file
        input: PathBuf,

        /// Re-encode to this path after decoding
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    crossfill::log::init_logger(cli.debug);

    match cli.command {
        Command::Suggest { pattern, word_list, min_rating, num_results } => {
            let words = load_words(&word_list)?;
            let pattern: Pattern = pattern.parse()?;
            let filter = min_rating.map_or(RatingFilter::any(), RatingFilter::at_least);

            let t_query = Instant::now();
            let found = Matcher::new(&words).candidates(&pattern, filter, SortOrder::RatingDesc);
            let query_secs = t_query.elapsed().as_secs_f64();

            for entry in found.iter().take(num_results) {
                match entry.rating {
                    Some(r) => println!("{};{r}", entry.word),
                    None => println!("{}", entry.word),
                }
            }
            eprintln!(
                "{} match(es) for {pattern} across {} words in {query_secs:.3}s.",
                found.len(),
                words.len()
            );
        }

        Command::Autofill { template, word_list, num_results, time_limit, node_budget } => {
            let words = load_words(&word_list)?;
            let grid = Grid::from_template(&std::fs::read_to_string(&template)?)?;

            let mut progress = |p: crossfill::autofill::FillProgress| {
                log::debug!(
                    "autofill: {}/{} entries assigned, {} solution(s)",
                    p.assigned,
                    p.total,
                    p.solutions
                );
            };
            let t_solve = Instant::now();
            let result = crossfill::autofill::autofill(
                &words,
                &grid,
                FillOptions {
                    max_variations: num_results,
                    node_budget,
                    deadline: time_limit.map(Duration::from_secs),
                    progress: Some(&mut progress),
                    ..FillOptions::default()
                },
            );
            let solve_secs = t_solve.elapsed().as_secs_f64();

            for (i, filled) in result.grids.iter().enumerate() {
                println!("--- fill {} ---", i + 1);
                print!("{filled:?}");
            }
            match result.status {
                FillStatus::FoundEnough => {
                    eprintln!("✓ Stopped after finding {num_results} requested fill(s)");
                }
                FillStatus::Exhausted => {
                    eprintln!("✓ Search space exhausted ({} fill(s))", result.grids.len());
                }
                FillStatus::NoFill => eprintln!("✗ No valid fill for this grid"),
                FillStatus::TimedOut => {
                    eprintln!("⚠️  Timed out; {} fill(s) found in time", result.grids.len());
                }
                FillStatus::Cancelled => eprintln!("⚠️  Cancelled"),
                FillStatus::NodeBudgetExhausted => {
                    eprintln!("⚠️  Node budget exhausted after {} step(s)", result.stats.nodes);
                }
            }
            eprintln!(
                "Searched {} node(s) in {solve_secs:.3}s with {} dictionary words.",
                result.stats.nodes,
                words.len()
            );
        }

        Command::Convert { input, output } => {
            let puzzle = Puzzle::decode(&std::fs::read(&input)?)?;
            let grid = &puzzle.grid;
            println!("title:     {}", puzzle.title);
            println!("author:    {}", puzzle.author);
            println!("copyright: {}", puzzle.copyright);
            println!("size:      {}x{}", grid.rows(), grid.cols());
            println!("clues:     {}", puzzle.clues.len());
            print!("{grid:?}");

            if let Some(path) = output {
                std::fs::write(&path, puzzle.encode()?)?;
                eprintln!("Re-encoded to {}", path.display());
            }
        }
    }

    Ok(())
}

fn load_words(paths: &[PathBuf]) -> std::io::Result<WordList> {
    let t_load = Instant::now();
    let words = WordList::load_from_paths(paths)?;
    log::info!(
        "loaded {} words from {} file(s) in {:.3}s",
        words.len(),
        paths.len(),
        t_load.elapsed().as_secs_f64()
    );
    Ok(words)
}
