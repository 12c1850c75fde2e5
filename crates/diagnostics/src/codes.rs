//! Diagnostic ID constants.
//!
//! Generated from `data/diagnostics.jsonc` at build time. Prefer these over
//! string literals so typos fail to compile.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
