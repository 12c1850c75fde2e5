//! Diagnostics for the GEDCOM toolchain.
//!
//! Provides [`Diagnostic`], [`Severity`] and [`Span`], the types the record
//! parser uses to report skipped or malformed lines. Every diagnostic carries
//! a stable code from the [`codes`] module and, for line-level problems, the
//! 1-based source line number.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from the catalogue.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// The parse could not produce the requested result.
    Error,
    /// Data was skipped or altered; the result is still usable.
    Warn,
    /// Informational note about a policy decision.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        })
    }
}

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic produced while parsing a record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g. `"GED1002"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// 1-based line number in the source, when the diagnostic concerns one line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Byte span of the offending text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable details (`"tag"`, `"level"`, `"id"`, ...).
    ///
    /// `BTreeMap` keeps serialized key order deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with an explicit severity.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            line: None,
            span,
            context: None,
        }
    }

    /// Create a diagnostic using the catalogue's default severity for `id`.
    ///
    /// Unknown ids fall back to [`Severity::Warn`].
    pub fn from_code(id: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Warn);
        Self::new(id, severity, message, span)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach the 1-based source line (builder pattern).
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach machine-readable context (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Whether this diagnostic is at least as severe as a warning.
    pub fn is_warning_or_worse(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Warn)
    }

    /// Long-form explanation of this diagnostic's code, if known.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.severity, self.id)?;
        if let Some(line) = self.line {
            write!(f, " line {line}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Long-form explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Default severity the catalogue assigns to a diagnostic code.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_empty() {
        let s = Span::new(5, 10);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert!(Span::empty(7).is_empty());
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn from_code_uses_catalogue_severity() {
        let d = Diagnostic::from_code(codes::ORPHAN_LEVEL, "orphan", None);
        assert_eq!(d.severity, Severity::Warn);
        let d = Diagnostic::from_code(codes::DUPLICATE_ID, "dup", None);
        assert_eq!(d.severity, Severity::Info);
        let d = Diagnostic::from_code(codes::EMPTY_INPUT, "empty", None);
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn display_includes_line_when_present() {
        let d = Diagnostic::warn(codes::MALFORMED_LINE, "level is not a number", None);
        assert_eq!(d.to_string(), "warn[GED1001]: level is not a number");
        let d = d.at_line(12);
        assert_eq!(d.to_string(), "warn[GED1001] line 12: level is not a number");
    }

    #[test]
    fn every_code_is_explained_and_has_severity() {
        assert!(!codes::ALL.is_empty());
        for code in codes::ALL {
            assert!(explain(code).is_some(), "{code} has no explanation");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
    }

    #[test]
    fn unknown_code_has_no_explanation() {
        let d = Diagnostic::error("GED9999", "test", None);
        assert!(d.explain().is_none());
        assert!(default_severity("GED9999").is_none());
    }

    #[test]
    fn warning_or_worse() {
        assert!(Diagnostic::error(codes::EMPTY_INPUT, "x", None).is_warning_or_worse());
        assert!(Diagnostic::warn(codes::ORPHAN_LEVEL, "x", None).is_warning_or_worse());
        assert!(!Diagnostic::info(codes::DUPLICATE_ID, "x", None).is_warning_or_worse());
    }

    #[test]
    fn serde_omits_absent_optionals() {
        let d = Diagnostic::warn(codes::ORPHAN_LEVEL, "orphan", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "{json}");
        assert!(!json.contains("line"), "{json}");
        assert!(!json.contains("context"), "{json}");
    }

    #[test]
    fn serde_roundtrip_with_line_and_context() {
        let d = Diagnostic::warn(codes::ORPHAN_LEVEL, "orphan", Some(Span::new(10, 20)))
            .at_line(3)
            .with_context(BTreeMap::from([
                ("tag".into(), "DATE".into()),
                ("level".into(), "2".into()),
            ]));
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"line\":3"), "{json}");
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn context_serializes_in_key_order() {
        let d = Diagnostic::warn(codes::MALFORMED_LINE, "x", None).with_context(BTreeMap::from([
            ("z_last".into(), "1".into()),
            ("a_first".into(), "2".into()),
        ]));
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.find("a_first").unwrap() < json.find("z_last").unwrap());
    }
}
