use std::collections::BTreeMap;

use log::{debug, info, trace};

use super::{
    accumulator::{Accumulator, Duplicate},
    diag::{Diagnostic, codes},
    lexer::{LineError, LineTokens, SourceLine, split_lines, split_xref, tokenize_line},
    lineage::Lineage,
    record::Record,
};
use crate::error::ParseError;
use crate::options::{DuplicateIdPolicy, MalformedLinePolicy, ParseOptions};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Result of parsing a record file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseResult {
    /// Records in first-seen order.
    pub records: Vec<Record>,
    /// Skipped lines, dropped records and policy notes, in the order found.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Look up a record by id.
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Diagnostics of warning severity or worse.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning_or_worse())
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse with default options.
///
/// Defaults never abort and do not require records, so this cannot fail.
pub fn parse_str(input: &str) -> ParseResult {
    match parse(input, &ParseOptions::default()) {
        Ok(result) => result,
        Err(e) => unreachable!("default options collect warnings instead of failing: {e}"),
    }
}

/// Parse a record file.
///
/// Fails only under [`MalformedLinePolicy::Abort`] (first unplaceable line)
/// or when `require_records` is set and no record was produced.
pub fn parse(input: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
    Parser::new(options).run(input)
}

// ─── Parser Implementation ─────────────────────────────────────────────────

/// Where the scan is relative to record boundaries.
enum Cursor {
    /// No level-0 line seen yet; nested lines are orphans.
    BeforeFirstRecord,
    /// Inside a record; the lineage tracks its nesting.
    InRecord(Lineage),
    /// Inside a record that was dropped (no identifier, or filtered by kind);
    /// its nested lines are skipped without diagnostics.
    Dropped,
}

struct Parser<'o> {
    options: &'o ParseOptions,
    acc: Accumulator,
    cursor: Cursor,
    diags: Vec<Diagnostic>,
    lines_seen: usize,
}

impl<'o> Parser<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            acc: Accumulator::new(options.duplicate_id_policy),
            cursor: Cursor::BeforeFirstRecord,
            diags: Vec::new(),
            lines_seen: 0,
        }
    }

    fn run(mut self, input: &str) -> Result<ParseResult, ParseError> {
        for line in split_lines(input) {
            self.lines_seen = line.number;
            self.line(line)?;
        }
        self.finish_record();

        if self.acc.len() == 0 && self.options.require_records {
            return Err(ParseError::EmptyInput);
        }

        info!(
            "parsed {} records from {} lines ({} diagnostics)",
            self.acc.len(),
            self.lines_seen,
            self.diags.len()
        );
        Ok(ParseResult {
            records: self.acc.into_records(),
            diagnostics: self.diags,
        })
    }

    fn line(&mut self, line: SourceLine<'_>) -> Result<(), ParseError> {
        let tokens = match tokenize_line(line.text) {
            Ok(tokens) => tokens,
            Err(LineError::Blank) => return Ok(()),
            Err(LineError::InvalidLevel(token)) => {
                return self.reject(ParseError::MalformedLine {
                    line: line.number,
                    span: line.span,
                    token,
                });
            }
        };

        if tokens.level == 0 {
            return self.start_record(&line, &tokens);
        }

        if matches!(self.cursor, Cursor::Dropped) {
            trace!("line {}: inside dropped record, skipped", line.number);
            return Ok(());
        }

        if let Some(max_depth) = self.options.max_depth
            && tokens.level > max_depth
        {
            return self.reject(ParseError::DepthExceeded {
                line: line.number,
                span: line.span,
                level: tokens.level,
                max_depth,
            });
        }

        self.nested(&line, tokens)
    }

    // ── Level-0 lines ───────────────────────────────────────────────────

    fn start_record(
        &mut self,
        line: &SourceLine<'_>,
        tokens: &LineTokens<'_>,
    ) -> Result<(), ParseError> {
        self.finish_record();

        let Some(xref) = split_xref(tokens.rest) else {
            self.cursor = Cursor::Dropped;
            return self.reject(ParseError::InvalidIdentifier {
                line: line.number,
                span: line.span,
                text: tokens.rest.to_string(),
            });
        };

        if !self.options.keeps_kind(xref.kind) {
            debug!(
                "line {}: record {} of kind `{}` filtered out",
                line.number, xref.id, xref.kind
            );
            self.cursor = Cursor::Dropped;
            return Ok(());
        }

        let mut record = Record::new(xref.id, xref.kind, line.number);
        record.value = xref.value;
        self.acc.open(record);
        self.cursor = Cursor::InRecord(Lineage::new());
        Ok(())
    }

    fn finish_record(&mut self) {
        if let Some(dup) = self.acc.finalize() {
            self.note_duplicate(dup);
        }
    }

    fn note_duplicate(&mut self, dup: Duplicate) {
        if self.options.on_malformed_line == MalformedLinePolicy::Skip {
            return;
        }
        let outcome = match (&dup.policy, &dup.renamed_to) {
            (DuplicateIdPolicy::Overwrite, _) => "replaces the earlier record".to_string(),
            (DuplicateIdPolicy::KeepFirst, _) => "was discarded; the earlier record is kept".into(),
            (DuplicateIdPolicy::AppendSuffix, Some(new_id)) => format!("was kept as `{new_id}`"),
            (DuplicateIdPolicy::AppendSuffix, None) => "was kept".into(),
        };
        let mut context: BTreeMap<String, String> = ctx!(
            "id" => dup.id.clone(),
            "first_line" => dup.first_line.to_string(),
        );
        if let Some(new_id) = &dup.renamed_to {
            context.insert("renamed_to".into(), new_id.clone());
        }
        self.diags.push(
            Diagnostic::from_code(
                codes::DUPLICATE_ID,
                format!(
                    "record `{}` already defined at line {}; this one {outcome}",
                    dup.id, dup.first_line
                ),
                None,
            )
            .at_line(dup.line)
            .with_context(context),
        );
    }

    // ── Level ≥ 1 lines ─────────────────────────────────────────────────

    fn nested(
        &mut self,
        line: &SourceLine<'_>,
        tokens: LineTokens<'_>,
    ) -> Result<(), ParseError> {
        let options = self.options;
        let separator = options.path_separator.as_str();
        let Cursor::InRecord(lineage) = &mut self.cursor else {
            return self.reject(ParseError::OrphanLevel {
                line: line.number,
                span: line.span,
                level: tokens.level,
                tag: tokens.tag.to_string(),
            });
        };

        let path = match lineage.descend(tokens.level, tokens.tag, separator) {
            Ok(path) => path,
            Err(_) => {
                return self.reject(ParseError::OrphanLevel {
                    line: line.number,
                    span: line.span,
                    level: tokens.level,
                    tag: tokens.tag.to_string(),
                });
            }
        };

        if tokens.tag.is_empty() {
            trace!(
                "line {}: level-only line holds level {}",
                line.number, tokens.level
            );
            return Ok(());
        }

        if options.join_continuations && matches!(tokens.tag, "CONT" | "CONC") {
            let joiner = if tokens.tag == "CONT" { "\n" } else { "" };
            let text = format!("{joiner}{}", tokens.value);
            // `None` at level 1: the parent is the record line itself.
            match lineage.path_at(tokens.level - 1, separator) {
                None => {
                    self.acc.append_record_value(&text);
                    return Ok(());
                }
                Some(parent) if !parent.is_empty() => {
                    self.acc.append(&parent, &text);
                    return Ok(());
                }
                // Only level-only ancestors: nothing to fold into, keep as a field.
                Some(_) => trace!(
                    "line {}: {} has no named parent, kept as a field",
                    line.number, tokens.tag
                ),
            }
        }

        self.acc.set(path, tokens.value);
        Ok(())
    }

    // ── Unplaceable lines ───────────────────────────────────────────────

    /// The explicit skip branch: apply the malformed-line policy to `err`.
    fn reject(&mut self, err: ParseError) -> Result<(), ParseError> {
        match self.options.on_malformed_line {
            MalformedLinePolicy::Skip => {
                debug!("{err}; skipped");
                Ok(())
            }
            MalformedLinePolicy::CollectWarning => {
                debug!("{err}; recorded");
                self.diags.push(err.to_diagnostic());
                Ok(())
            }
            MalformedLinePolicy::Abort => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_level_example() {
        let input = "0 @I1@ INDI\n1 NAME John /Doe/\n1 BIRT\n2 DATE 1 JAN 1900\n0 @I2@ INDI\n1 NAME Jane /Doe/\n";
        let r = parse_str(input);
        assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics);
        assert_eq!(r.records.len(), 2);
        let i1 = r.record("I1").unwrap();
        assert_eq!(
            i1.fields.iter().collect::<Vec<_>>(),
            vec![
                ("NAME", "John /Doe/"),
                ("BIRT", ""),
                ("BIRTDATE", "1 JAN 1900")
            ]
        );
        let i2 = r.record("I2").unwrap();
        assert_eq!(i2.fields.iter().collect::<Vec<_>>(), vec![("NAME", "Jane /Doe/")]);
    }

    #[test]
    fn orphan_before_first_record() {
        let r = parse_str("1 NAME Nobody\n0 @I1@ INDI\n");
        assert_eq!(r.records.len(), 1);
        assert_eq!(r.diagnostics.len(), 1);
        assert_eq!(r.diagnostics[0].id, codes::ORPHAN_LEVEL);
        assert_eq!(r.diagnostics[0].line, Some(1));
    }

    #[test]
    fn dropped_record_lines_are_skipped_quietly() {
        let r = parse_str("0 HEAD\n1 SOUR X\n2 VERS 5.5\n0 @I1@ INDI\n1 NAME A\n0 TRLR\n");
        assert_eq!(r.records.len(), 1);
        let ids: Vec<_> = r.diagnostics.iter().map(|d| d.id.as_ref()).collect();
        assert_eq!(ids, vec![codes::INVALID_IDENTIFIER, codes::INVALID_IDENTIFIER]);
        assert_eq!(r.diagnostics[0].line, Some(1));
        assert_eq!(r.diagnostics[1].line, Some(6));
    }
}
