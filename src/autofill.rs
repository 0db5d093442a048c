//! `autofill` — backtracking fill search over the incomplete entries of a
//! grid.
//!
//! Variables are the incomplete entries (length >= 2); their domains are
//! dictionary candidates matching the entry's current pattern, ranked
//! best-first. The search assigns words with a minimum-remaining-values
//! heuristic, propagates letters through crossings via a single
//! `(row, col) -> letter` map, and enumerates distinct solutions up to a
//! cap. Exhaustion, truncation, and "no fill exists" are all ordinary
//! return values; the solver itself never fails.
//!
//! With fixed inputs the enumeration order is deterministic: candidates
//! are sorted rating-descending then alphabetical, and MRV ties break by
//! entry number with across before down.

use crate::cell::Cell;
use crate::errors::FillError;
use crate::grid::Grid;
use crate::matcher::{rating_desc, Matcher};
use crate::word_index::{Direction, EntryId, WordIndex};
use crate::word_list::WordList;
use instant::Instant;
use smallvec::SmallVec;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

/// Default cap on the number of distinct fills enumerated in one run.
pub const MAX_VARIATIONS: usize = 100;

// Budget/cancellation/progress checks happen once per this many nodes.
const CHECK_INTERVAL: u64 = 50;
// Progress is also reported every time this many solutions accumulate.
const SOLUTION_REPORT_INTERVAL: usize = 10;
// Separator folded between assignments when fingerprinting a solution.
const HASH_SPLIT: u16 = 0xFFFF;

/// Snapshot handed to the progress sink at batched intervals. In a
/// cooperatively scheduled host the sink is the solver's only suspension
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillProgress {
    /// Variables assigned on the current search path.
    pub assigned: usize,
    /// Total variables in this search.
    pub total: usize,
    /// Distinct solutions found so far.
    pub solutions: usize,
}

/// How a fill run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// Stopped at the requested variation cap.
    FoundEnough,
    /// The whole search space was enumerated; `grids` holds every
    /// distinct fill.
    Exhausted,
    /// No completion exists in this dictionary. Success with an empty
    /// result set, not an error.
    NoFill,
    /// The deadline tripped; `grids` holds what was found in time.
    TimedOut,
    /// The cancellation flag tripped.
    Cancelled,
    /// The node budget ran out.
    NodeBudgetExhausted,
}

impl FillStatus {
    /// Whether the run ended before the search space was covered.
    #[must_use]
    pub fn is_truncated(self) -> bool {
        matches!(self, Self::TimedOut | Self::Cancelled | Self::NodeBudgetExhausted)
    }
}

/// Search diagnostics, reported alongside the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStats {
    /// Recursion steps taken.
    pub nodes: u64,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
}

/// Everything a fill run returns.
#[derive(Debug)]
pub struct FillResult {
    /// Completed grids in enumeration order.
    pub grids: Vec<Grid>,
    pub status: FillStatus,
    pub stats: FillStats,
}

/// Tuning knobs and host hooks for one fill run.
pub struct FillOptions<'a> {
    /// Stop after this many distinct solutions.
    pub max_variations: usize,
    /// Stop after this many recursion steps.
    pub node_budget: Option<u64>,
    /// Stop once this much wall-clock time has elapsed.
    pub deadline: Option<Duration>,
    /// Checked at the same batch points as the deadline.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Batched progress sink.
    pub progress: Option<&'a mut dyn FnMut(FillProgress)>,
}

impl Default for FillOptions<'_> {
    fn default() -> Self {
        Self {
            max_variations: MAX_VARIATIONS,
            node_budget: None,
            deadline: None,
            cancel: None,
            progress: None,
        }
    }
}

/// One unassigned slot of the search: an incomplete entry plus its
/// candidate words.
#[derive(Debug)]
struct Variable {
    id: EntryId,
    number: u32,
    cells: SmallVec<[(usize, usize); 8]>,
    /// Word-list indices, rating-descending then alphabetical.
    candidates: Vec<usize>,
}

/// Wall-clock budget, checked at batch points only.
struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }
}

/// Why the recursion unwound early. `None` from the step function means
/// this subtree is exhausted and the caller should keep trying values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    FoundEnough,
    TimedOut,
    Cancelled,
    NodeBudget,
}

struct Search<'a, 'o> {
    words: &'a WordList,
    grid: &'a Grid,
    vars: Vec<Variable>,
    /// Candidate index chosen per variable, `None` while unassigned.
    assignment: Vec<Option<usize>>,
    /// Letter implied at each constrained cell by the grid or by the
    /// current path. The single source of crossing consistency.
    letters: HashMap<(usize, usize), char>,
    results: Vec<Grid>,
    seen: HashSet<u64>,
    budget: TimeBudget,
    options: FillOptions<'o>,
    nodes: u64,
}

/// Fill every incomplete entry of `grid` with words from `words`,
/// enumerating up to `options.max_variations` distinct solutions.
///
/// Already-placed letters are fixed constraints and survive into every
/// returned grid; complete entries are never modified. Entries of length
/// 1 carry no dictionary obligation and are left as they are.
#[must_use]
pub fn autofill(words: &WordList, grid: &Grid, options: FillOptions<'_>) -> FillResult {
    let budget = TimeBudget::new(options.deadline);
    let index = WordIndex::build(grid);

    let vars = match build_variables(words, grid, &index) {
        Ok(vars) => vars,
        Err(FillError::NoCandidates { entry }) => {
            log::info!("autofill: entry {entry} has no candidates; no fill possible");
            return FillResult {
                grids: Vec::new(),
                status: FillStatus::NoFill,
                stats: FillStats { nodes: 0, elapsed: budget.start.elapsed() },
            };
        }
        Err(e) => unreachable!("variable construction only reports NoCandidates: {e}"),
    };

    let assignment = vec![None; vars.len()];
    let letters = grid
        .positions()
        .filter_map(|(r, c)| match grid.get(r, c) {
            Ok(Cell::Letter(ch)) => Some(((r, c), ch)),
            _ => None,
        })
        .collect();

    let mut search = Search {
        words,
        grid,
        vars,
        assignment,
        letters,
        results: Vec::new(),
        seen: HashSet::new(),
        budget,
        options,
        nodes: 0,
    };

    let halt = search.step();
    search.finish(halt)
}

/// Collect the incomplete entries and their pattern-matching candidates.
///
/// # Errors
///
/// `NoCandidates` when some variable's domain is empty, either before or
/// after the arc-consistency pass; the named entry is the unfillable one.
fn build_variables(
    words: &WordList,
    grid: &Grid,
    index: &WordIndex,
) -> Result<Vec<Variable>, FillError> {
    let matcher = Matcher::new(words);
    let mut vars: Vec<Variable> = Vec::new();

    for entry in index.entries() {
        if entry.length < 2 {
            continue;
        }
        let pattern = index.pattern_of(grid, entry);
        if pattern.is_complete() {
            continue;
        }

        // Ranked-descending candidate order drives value selection.
        let mut candidates = matcher.matching_indices(&pattern);
        candidates.sort_by(|&a, &b| rating_desc(words.entry(a), words.entry(b)));

        if candidates.is_empty() {
            return Err(FillError::NoCandidates { entry: entry.id });
        }
        vars.push(Variable {
            id: entry.id,
            number: entry.number,
            cells: entry.cells().collect(),
            candidates,
        });
    }

    prune_arc_inconsistent(words, vars)
}

/// One-pass arc-consistency prune: drop any candidate whose letter at a
/// crossing has no counterpart in the crossing variable's initial domain.
/// Not maintained during search; the letter map handles that.
fn prune_arc_inconsistent(
    words: &WordList,
    mut vars: Vec<Variable>,
) -> Result<Vec<Variable>, FillError> {
    // Per variable, per cell offset: bitmask of letters its candidates
    // allow there. Computed against the unpruned domains.
    let letter_masks: Vec<Vec<u32>> = vars
        .iter()
        .map(|v| {
            let mut masks = vec![0u32; v.cells.len()];
            for &cand in &v.candidates {
                for (pos, b) in words.entry(cand).word.bytes().enumerate() {
                    masks[pos] |= 1 << (b - b'A');
                }
            }
            masks
        })
        .collect();

    // cell -> (variable, offset) pairs, to find crossings.
    let mut cell_vars: HashMap<(usize, usize), SmallVec<[(usize, usize); 2]>> = HashMap::new();
    for (vi, v) in vars.iter().enumerate() {
        for (pos, &cell) in v.cells.iter().enumerate() {
            cell_vars.entry(cell).or_default().push((vi, pos));
        }
    }

    for vi in 0..vars.len() {
        let cells = vars[vi].cells.clone();
        vars[vi].candidates.retain(|&cand| {
            let word = words.entry(cand).word.as_bytes();
            cells.iter().enumerate().all(|(pos, cell)| {
                cell_vars[cell].iter().all(|&(ui, upos)| {
                    ui == vi || letter_masks[ui][upos] & (1 << (word[pos] - b'A')) != 0
                })
            })
        });
        if vars[vi].candidates.is_empty() {
            return Err(FillError::NoCandidates { entry: vars[vi].id });
        }
    }

    Ok(vars)
}

impl Search<'_, '_> {
    /// Recursive search step. Returns `Some` only when the whole run
    /// should stop; `None` means this subtree is exhausted.
    fn step(&mut self) -> Option<Halt> {
        self.nodes += 1;
        if self.nodes % CHECK_INTERVAL == 0 {
            if let Some(halt) = self.check_budgets() {
                return Some(halt);
            }
            self.report_progress();
        }

        let Some(vi) = self.pick_variable() else {
            return self.commit_solution();
        };

        // Candidate order is fixed, so iterating by position keeps the
        // enumeration deterministic.
        for ci in 0..self.vars[vi].candidates.len() {
            let cand = self.vars[vi].candidates[ci];
            let Some(added) = self.try_assign(vi, cand) else {
                continue;
            };

            self.assignment[vi] = Some(cand);
            let halt = self.step();
            self.assignment[vi] = None;
            for cell in added {
                self.letters.remove(&cell);
            }
            if halt.is_some() {
                return halt;
            }
        }
        None
    }

    /// Minimum-remaining-values choice over unassigned variables; ties
    /// break by entry number, then across before down.
    fn pick_variable(&self) -> Option<usize> {
        (0..self.vars.len())
            .filter(|&vi| self.assignment[vi].is_none())
            .min_by_key(|&vi| {
                let v = &self.vars[vi];
                let remaining = v
                    .candidates
                    .iter()
                    .filter(|&&cand| self.compatible(vi, cand))
                    .count();
                let across_first = match v.id.direction {
                    Direction::Across => 0u8,
                    Direction::Down => 1u8,
                };
                (remaining, v.number, across_first)
            })
    }

    /// Whether `cand` agrees with every letter currently implied on the
    /// variable's cells.
    fn compatible(&self, vi: usize, cand: usize) -> bool {
        let word = self.words.entry(cand).word.as_bytes();
        self.vars[vi]
            .cells
            .iter()
            .zip(word)
            .all(|(cell, &b)| self.letters.get(cell).map_or(true, |&ch| ch as u8 == b))
    }

    /// Write `cand`'s letters into the letter map, returning the cells
    /// newly constrained (for backtracking), or `None` on conflict.
    fn try_assign(&mut self, vi: usize, cand: usize) -> Option<SmallVec<[(usize, usize); 8]>> {
        if !self.compatible(vi, cand) {
            return None;
        }
        let words = self.words;
        let word = words.entry(cand).word.as_bytes();
        let mut added: SmallVec<[(usize, usize); 8]> = SmallVec::new();
        for i in 0..word.len() {
            let cell = self.vars[vi].cells[i];
            if self.letters.insert(cell, word[i] as char).is_none() {
                added.push(cell);
            }
        }
        Some(added)
    }

    /// Base case: every variable assigned. Commit a grid, dedup by
    /// fingerprint, and stop the run once the cap is reached.
    fn commit_solution(&mut self) -> Option<Halt> {
        if !self.seen.insert(self.fingerprint()) {
            return None;
        }

        let mut filled = self.grid.clone();
        for (vi, v) in self.vars.iter().enumerate() {
            let cand = self.assignment[vi].expect("base case reached with unassigned variable");
            let word = &self.words.entry(cand).word;
            for (&(r, c), b) in v.cells.iter().zip(word.bytes()) {
                // Never clobber a pre-placed letter; assignments agree
                // with the letter map by construction.
                if filled.get(r, c) == Ok(Cell::Empty) {
                    filled
                        .set_cell(r, c, Cell::Letter(b as char), crate::cell::Symmetry::None)
                        .expect("assignment cell in bounds");
                }
            }
        }
        self.results.push(filled);

        if self.results.len() % SOLUTION_REPORT_INTERVAL == 0 {
            self.report_progress();
        }
        if self.results.len() >= self.options.max_variations {
            return Some(Halt::FoundEnough);
        }
        None
    }

    /// Stable fingerprint of the full assignment: `(entry, word)` pairs in
    /// variable order with a separator folded between them.
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (vi, v) in self.vars.iter().enumerate() {
            let cand = self.assignment[vi].expect("fingerprinting a partial assignment");
            v.id.hash(&mut hasher);
            self.words.entry(cand).word.hash(&mut hasher);
            HASH_SPLIT.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn check_budgets(&self) -> Option<Halt> {
        if self.budget.expired() {
            return Some(Halt::TimedOut);
        }
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
        {
            return Some(Halt::Cancelled);
        }
        if self.options.node_budget.is_some_and(|budget| self.nodes >= budget) {
            return Some(Halt::NodeBudget);
        }
        None
    }

    fn report_progress(&mut self) {
        if let Some(sink) = self.options.progress.as_mut() {
            let assigned = self.assignment.iter().filter(|a| a.is_some()).count();
            sink(FillProgress {
                assigned,
                total: self.vars.len(),
                solutions: self.results.len(),
            });
        }
    }

    fn finish(mut self, halt: Option<Halt>) -> FillResult {
        let status = match halt {
            Some(Halt::FoundEnough) => FillStatus::FoundEnough,
            Some(Halt::TimedOut) => FillStatus::TimedOut,
            Some(Halt::Cancelled) => FillStatus::Cancelled,
            Some(Halt::NodeBudget) => FillStatus::NodeBudgetExhausted,
            None if self.results.is_empty() => FillStatus::NoFill,
            None => FillStatus::Exhausted,
        };
        // Final report so the sink sees the closing counts.
        self.report_progress();

        FillResult {
            grids: std::mem::take(&mut self.results),
            status,
            stats: FillStats { nodes: self.nodes, elapsed: self.budget.start.elapsed() },
        }
    }
}
