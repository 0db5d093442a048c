use crate::autofill::{autofill, FillOptions, FillStatus};
use crate::errors::PuzError;
use crate::grid::Grid;
use crate::matcher::{Matcher, Pattern, RatingFilter, SortOrder};
use crate::word_list::WordList;
use wasm_bindgen::prelude::*;

/// Surface `.puz` codec failures as plain JS error strings.
impl From<PuzError> for JsValue {
    fn from(e: PuzError) -> JsValue {
        JsValue::from_str(format!("[puz error] {e}").as_str())
    }
}

#[wasm_bindgen(start)]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[derive(serde::Serialize)]
struct WasmSuggestion {
    word: String,
    rating: Option<u32>,
}

#[derive(serde::Serialize)]
struct WasmFillResult {
    /// Each fill rendered as newline-separated template rows.
    grids: Vec<String>,
    status: String,
    nodes: u64,
}

/// JS entry: parse a word-list text (`WORD` or `WORD;RATING` per line)
/// and return the surviving entries as Array<{word, rating}>.
///
/// # Errors
///
/// Returns a `JsValue` error if serialization fails.
#[wasm_bindgen]
pub fn parse_word_list(text: &str) -> Result<JsValue, JsValue> {
    let words = WordList::parse_from_str(text);
    let entries: Vec<WasmSuggestion> = words
        .entries()
        .iter()
        .map(|e| WasmSuggestion { word: e.word.clone(), rating: e.rating })
        .collect();
    serde_wasm_bindgen::to_value(&entries)
        .map_err(|e| JsValue::from_str(&format!("serialization failed: {e}")))
}

/// JS entry: (pattern: string, word_list_text: string, min_rating?: number)
/// returns Array<{word, rating}> sorted best-first.
#[wasm_bindgen]
pub fn suggest_wasm(
    pattern: &str,
    word_list_text: &str,
    min_rating: Option<u32>,
) -> Result<JsValue, JsValue> {
    let pattern: Pattern = pattern
        .parse()
        .map_err(|e| JsValue::from_str(&format!("bad pattern: {e}")))?;
    let words = WordList::parse_from_str(word_list_text);
    let filter = min_rating.map_or(RatingFilter::any(), RatingFilter::at_least);

    let found: Vec<WasmSuggestion> = Matcher::new(&words)
        .candidates(&pattern, filter, SortOrder::RatingDesc)
        .into_iter()
        .map(|e| WasmSuggestion { word: e.word.clone(), rating: e.rating })
        .collect();

    serde_wasm_bindgen::to_value(&found)
        .map_err(|e| JsValue::from_str(&format!("serialization failed: {e}")))
}

/// JS entry: (template: string, word_list_text: string, max_variations: number)
/// returns {grids, status, nodes}. The template uses '#' for blocks, '.'
/// for empty cells, letters for themselves.
#[wasm_bindgen]
pub fn autofill_wasm(
    template: &str,
    word_list_text: &str,
    max_variations: usize,
) -> Result<JsValue, JsValue> {
    let grid = Grid::from_template(template)
        .map_err(|e| JsValue::from_str(&format!("bad template: {e}")))?;
    let words = WordList::parse_from_str(word_list_text);

    let result = autofill(
        &words,
        &grid,
        FillOptions { max_variations, ..FillOptions::default() },
    );

    let status = match result.status {
        FillStatus::FoundEnough => "found_enough",
        FillStatus::Exhausted => "exhausted",
        FillStatus::NoFill => "no_fill",
        FillStatus::TimedOut => "timed_out",
        FillStatus::Cancelled => "cancelled",
        FillStatus::NodeBudgetExhausted => "node_budget_exhausted",
    };

    let wasm_result = WasmFillResult {
        grids: result.grids.iter().map(|g| format!("{g:?}")).collect(),
        status: status.to_string(),
        nodes: result.stats.nodes,
    };

    serde_wasm_bindgen::to_value(&wasm_result)
        .map_err(|e| JsValue::from_str(&format!("serialization failed: {e}")))
}
