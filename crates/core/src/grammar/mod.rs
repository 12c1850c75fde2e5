/// Record accumulator: in-progress record and finalized results.
mod accumulator;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for parse results.
pub mod dump;
/// Line splitter and tokenizer.
pub mod lexer;
/// Hierarchy tracker for tag paths.
pub mod lineage;
/// Record parser: drives the tokenizer, lineage and accumulator.
pub mod parser;
/// Record and field types.
pub mod record;
