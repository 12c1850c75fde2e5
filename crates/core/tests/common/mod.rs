//! Shared test helpers for `gedcom_toolchain_core` integration tests.

#![allow(unreachable_pub)]

use gedcom_toolchain_core::{ParseOptions, ParseResult, Record};

/// The two-record, two-level example used throughout the docs.
#[allow(dead_code)]
pub const TWO_RECORDS: &str = "\
0 @I1@ INDI
1 NAME John /Doe/
1 BIRT
2 DATE 1 JAN 1900
0 @I2@ INDI
1 NAME Jane /Doe/
";

/// A small but realistic family file (header, three people, a family, trailer).
#[allow(dead_code)]
pub const FAMILY: &str = include_str!("../fixtures/family.ged");

/// Collect diagnostic codes in order.
#[allow(dead_code)]
pub fn diag_codes(result: &ParseResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| d.id.to_string())
        .collect()
}

/// Collect diagnostic line numbers in order.
#[allow(dead_code)]
pub fn diag_lines(result: &ParseResult) -> Vec<Option<usize>> {
    result.diagnostics.iter().map(|d| d.line).collect()
}

/// Record ids in result order.
#[allow(dead_code)]
pub fn ids(result: &ParseResult) -> Vec<String> {
    result.records.iter().map(|r| r.id.clone()).collect()
}

/// `(path, value)` pairs of a record, in insertion order.
#[allow(dead_code)]
pub fn fields(record: &Record) -> Vec<(String, String)> {
    record
        .fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Owned `(path, value)` pairs from string literals.
#[allow(dead_code)]
pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Default options adjusted by `f`.
#[allow(dead_code)]
pub fn options(f: impl FnOnce(&mut ParseOptions)) -> ParseOptions {
    let mut o = ParseOptions::default();
    f(&mut o);
    o
}
