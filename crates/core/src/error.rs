//! Conditions that stop a line (or, under `Abort`, the whole parse).

use std::collections::BTreeMap;

use thiserror::Error;

use crate::grammar::diag::{Diagnostic, Span, codes};

/// A line that could not be placed, or an empty result the caller refused.
///
/// Under [`MalformedLinePolicy::CollectWarning`](crate::MalformedLinePolicy)
/// these become diagnostics via [`ParseError::to_diagnostic`]; under
/// `Abort` the first one is returned from [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The first token of the line is not a non-negative integer.
    #[error("line {line}: level `{token}` is not a non-negative integer")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Span of the trimmed line.
        span: Span,
        /// The offending first token.
        token: String,
    },

    /// No tag at the level directly above this line in the current record.
    #[error("line {line}: level-{level} `{tag}` has no enclosing level-{} line", .level - 1)]
    OrphanLevel {
        /// 1-based line number.
        line: usize,
        /// Span of the trimmed line.
        span: Span,
        /// Level of the orphaned line.
        level: u32,
        /// Tag of the orphaned line.
        tag: String,
    },

    /// A level-0 line without an `@XREF@` marker.
    #[error("line {line}: level-0 line has no @XREF@ identifier")]
    InvalidIdentifier {
        /// 1-based line number.
        line: usize,
        /// Span of the trimmed line.
        span: Span,
        /// Text after the level token (e.g. `HEAD`).
        text: String,
    },

    /// The line's level is above the configured `max_depth`.
    #[error("line {line}: level {level} exceeds maximum depth {max_depth}")]
    DepthExceeded {
        /// 1-based line number.
        line: usize,
        /// Span of the trimmed line.
        span: Span,
        /// Level of the line.
        level: u32,
        /// Configured maximum.
        max_depth: u32,
    },

    /// No record was produced and the caller required at least one.
    #[error("input contains no records")]
    EmptyInput,
}

impl ParseError {
    /// Diagnostic code for this condition.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::MalformedLine { .. } => codes::MALFORMED_LINE,
            ParseError::OrphanLevel { .. } => codes::ORPHAN_LEVEL,
            ParseError::InvalidIdentifier { .. } => codes::INVALID_IDENTIFIER,
            ParseError::DepthExceeded { .. } => codes::DEPTH_EXCEEDED,
            ParseError::EmptyInput => codes::EMPTY_INPUT,
        }
    }

    /// 1-based line number, when the condition concerns one line.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line, .. }
            | ParseError::OrphanLevel { line, .. }
            | ParseError::InvalidIdentifier { line, .. }
            | ParseError::DepthExceeded { line, .. } => Some(*line),
            ParseError::EmptyInput => None,
        }
    }

    /// Span of the offending line.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::MalformedLine { span, .. }
            | ParseError::OrphanLevel { span, .. }
            | ParseError::InvalidIdentifier { span, .. }
            | ParseError::DepthExceeded { span, .. } => Some(*span),
            ParseError::EmptyInput => None,
        }
    }

    /// Message without the `line N:` prefix (the diagnostic carries the line).
    fn message(&self) -> String {
        match self {
            ParseError::MalformedLine { token, .. } => {
                format!("level `{token}` is not a non-negative integer; line skipped")
            }
            ParseError::OrphanLevel { level, tag, .. } => format!(
                "level-{level} `{tag}` has no enclosing level-{} line; line skipped",
                level - 1
            ),
            ParseError::InvalidIdentifier { text, .. } => {
                format!("level-0 line `{text}` has no @XREF@ identifier; record dropped")
            }
            ParseError::DepthExceeded {
                level, max_depth, ..
            } => format!("level {level} exceeds maximum depth {max_depth}; line skipped"),
            ParseError::EmptyInput => "input contains no records".into(),
        }
    }

    fn context(&self) -> Option<BTreeMap<String, String>> {
        let ctx: BTreeMap<String, String> = match self {
            ParseError::MalformedLine { token, .. } => {
                BTreeMap::from([("token".into(), token.clone())])
            }
            ParseError::OrphanLevel { level, tag, .. } => BTreeMap::from([
                ("level".into(), level.to_string()),
                ("tag".into(), tag.clone()),
            ]),
            ParseError::InvalidIdentifier { text, .. } => {
                BTreeMap::from([("text".into(), text.clone())])
            }
            ParseError::DepthExceeded {
                level, max_depth, ..
            } => BTreeMap::from([
                ("level".into(), level.to_string()),
                ("max_depth".into(), max_depth.to_string()),
            ]),
            ParseError::EmptyInput => return None,
        };
        Some(ctx)
    }

    /// Convert to a diagnostic with the catalogue's default severity.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut d = Diagnostic::from_code(self.code(), self.message(), self.span());
        if let Some(line) = self.line() {
            d = d.at_line(line);
        }
        if let Some(ctx) = self.context() {
            d = d.with_context(ctx);
        }
        d
    }
}
