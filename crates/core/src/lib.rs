//! GEDCOM toolchain core library.
//!
//! Turns the raw text of a hierarchical `LEVEL TAG VALUE` record file into
//! ordered records, each keyed by its `@XREF@` identifier and holding a flat
//! mapping of tag paths (`BIRT` + `DATE` → `BIRTDATE`) to values. The main
//! entry points are [`parse`] and [`parse_str`]; [`to_table`] flattens the
//! result for grid views and exporters.

#![warn(missing_docs)]

/// Parse errors and their diagnostic form.
pub mod error;
/// Record grammar: tokenizer, hierarchy tracker, parser, record types.
pub mod grammar;
/// Parse options and the JSONC options loader.
pub mod options;
/// Tabular projection of records.
pub mod table;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Parser
pub use grammar::parser::{ParseResult, parse, parse_str};

// Records
pub use grammar::record::{Fields, Record};

// Options
pub use options::{
    DuplicateIdPolicy, MalformedLinePolicy, OptionsError, ParseOptions, load_options_from_str,
};

// Errors
pub use error::ParseError;

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};

// Tables
pub use table::{ID_COLUMN, Table, to_table};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
