extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{Analysis, Grammar, GrammarError, ParseResult, ParsingTable, TableError};

fn error_to_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// FIRST/FOLLOW sets, LL(1) verdict, conflicts and parsing table as JSON.
#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    let analysis = g.analyze();
    analysis
        .to_output(&g)
        .to_json()
        .unwrap_or_else(error_to_json)
}

/// Parse outcome, step trace and tree as JSON. Grammars that are not
/// LL(1) are refused.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    let first = g.calculate_first();
    let follow = g.calculate_follow(&first);
    match g.build_ll1_table(&first, &follow) {
        Ok(table) => table.parse(&g, input).to_json().unwrap_or_else(error_to_json),
        Err(e) => error_to_json(e),
    }
}
