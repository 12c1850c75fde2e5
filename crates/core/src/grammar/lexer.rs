use super::diag::Span;

/// One physical line of the input, trimmed of surrounding whitespace.
///
/// `text` borrows from the source; `span` locates the trimmed text so
/// diagnostics can point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Trimmed line text.
    pub text: &'a str,
    /// Byte span of `text` in the source.
    pub span: Span,
}

/// Iterator over the physical lines of an input, see [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    input: &'a str,
    pos: usize,
    number: usize,
}

/// Split input into physical lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A leading UTF-8 byte-order
/// mark is skipped. A final line terminator does not start an extra line, so
/// `""` yields nothing and `"0 @I1@ INDI\n"` yields one line.
pub fn split_lines(input: &str) -> Lines<'_> {
    let pos = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    Lines {
        input,
        pos,
        number: 0,
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let b = self.input.as_bytes();
        if self.pos >= b.len() {
            return None;
        }

        // Terminators are ASCII, so every index we stop at is a char boundary.
        let start = self.pos;
        let mut end = start;
        while end < b.len() && b[end] != b'\n' && b[end] != b'\r' {
            end += 1;
        }
        self.pos = match b.get(end) {
            Some(b'\r') if b.get(end + 1) == Some(&b'\n') => end + 2,
            Some(_) => end + 1,
            None => end,
        };
        self.number += 1;

        let raw = &self.input[start..end];
        let lead = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        let text_start = start + lead;
        Some(SourceLine {
            number: self.number,
            text,
            span: Span::new(text_start, text_start + text.len()),
        })
    }
}

/// A tokenized statement: `LEVEL [TAG] [VALUE...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens<'a> {
    /// Nesting depth from the leading integer.
    pub level: u32,
    /// Second token; empty for level-only lines. For level-0 lines this is
    /// usually the `@XREF@` identifier.
    pub tag: &'a str,
    /// Remaining tokens re-joined with single spaces; may be empty.
    pub value: String,
    /// Everything after the level token, trimmed but otherwise untouched.
    pub rest: &'a str,
}

/// Why a line could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// Nothing but whitespace.
    #[error("blank line")]
    Blank,
    /// The first token is not a non-negative integer.
    #[error("level `{0}` is not a non-negative integer")]
    InvalidLevel(String),
}

/// Tokenize one trimmed line into level, tag and value.
///
/// The level must be made of ASCII digits only (no sign) and fit in a `u32`.
pub fn tokenize_line(text: &str) -> Result<LineTokens<'_>, LineError> {
    let text = text.trim();
    let mut tokens = text.split_whitespace();
    let first = tokens.next().ok_or(LineError::Blank)?;
    let level = parse_level(first).ok_or_else(|| LineError::InvalidLevel(first.to_string()))?;
    let rest = text[first.len()..].trim_start();
    let tag = tokens.next().unwrap_or("");
    let value = tokens.collect::<Vec<_>>().join(" ");
    Ok(LineTokens {
        level,
        tag,
        value,
        rest,
    })
}

fn parse_level(token: &str) -> Option<u32> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

/// Cross-reference header of a level-0 line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xref<'a> {
    /// Text between the first pair of `@` characters; never empty.
    pub id: &'a str,
    /// First token after the closing `@` (record type, e.g. `INDI`).
    pub kind: &'a str,
    /// Tokens after `kind`, re-joined with single spaces.
    pub value: String,
}

/// Extract the `@ID@` marker from the part of a level-0 line after its level.
///
/// Returns `None` when there is no pair of `@` or the text between them is
/// empty.
pub fn split_xref(rest: &str) -> Option<Xref<'_>> {
    let open = rest.find('@')?;
    let after_open = open + 1;
    let close = after_open + rest[after_open..].find('@')?;
    let id = &rest[after_open..close];
    if id.is_empty() {
        return None;
    }
    let mut tail = rest[close + 1..].split_whitespace();
    let kind = tail.next().unwrap_or("");
    let value = tail.collect::<Vec<_>>().join(" ");
    Some(Xref { id, kind, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        split_lines(input).map(|l| l.text).collect()
    }

    #[test]
    fn splits_on_all_terminators() {
        assert_eq!(texts("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn trailing_terminator_adds_no_line() {
        assert_eq!(texts("0 @I1@ INDI\n"), vec!["0 @I1@ INDI"]);
        assert!(texts("").is_empty());
        assert_eq!(texts("\n\n"), vec!["", ""]);
    }

    #[test]
    fn line_numbers_and_spans() {
        let input = "0 @I1@ INDI\n   1 NAME Jo  \n";
        let lines: Vec<_> = split_lines(input).collect();
        assert_eq!(lines[1].number, 2);
        assert_eq!(lines[1].text, "1 NAME Jo");
        assert_eq!(&input[lines[1].span.start..lines[1].span.end], "1 NAME Jo");
    }

    #[test]
    fn skips_byte_order_mark() {
        let lines: Vec<_> = split_lines("\u{feff}0 HEAD").collect();
        assert_eq!(lines[0].text, "0 HEAD");
        assert_eq!(lines[0].span.start, 3);
    }

    #[test]
    fn tokenizes_level_tag_value() {
        let t = tokenize_line("2 DATE  1 JAN\t1900").unwrap();
        assert_eq!(t.level, 2);
        assert_eq!(t.tag, "DATE");
        assert_eq!(t.value, "1 JAN 1900");
        assert_eq!(t.rest, "DATE  1 JAN\t1900");
    }

    #[test]
    fn level_only_line_is_valid() {
        let t = tokenize_line("1").unwrap();
        assert_eq!(t.level, 1);
        assert_eq!(t.tag, "");
        assert_eq!(t.value, "");
    }

    #[test]
    fn tag_without_value() {
        let t = tokenize_line("1 BIRT").unwrap();
        assert_eq!(t.tag, "BIRT");
        assert_eq!(t.value, "");
    }

    #[test]
    fn rejects_blank_and_non_numeric_levels() {
        assert_eq!(tokenize_line("   "), Err(LineError::Blank));
        assert_eq!(
            tokenize_line("NAME John"),
            Err(LineError::InvalidLevel("NAME".into()))
        );
        assert_eq!(
            tokenize_line("+1 NAME"),
            Err(LineError::InvalidLevel("+1".into()))
        );
        assert_eq!(
            tokenize_line("-1 NAME"),
            Err(LineError::InvalidLevel("-1".into()))
        );
        assert!(matches!(
            tokenize_line("99999999999 X"),
            Err(LineError::InvalidLevel(_))
        ));
    }

    #[test]
    fn xref_with_kind_and_value() {
        let x = split_xref("@N1@ NOTE some   text").unwrap();
        assert_eq!(x.id, "N1");
        assert_eq!(x.kind, "NOTE");
        assert_eq!(x.value, "some text");
    }

    #[test]
    fn xref_missing_or_empty() {
        assert_eq!(split_xref("HEAD"), None);
        assert_eq!(split_xref("@I1 INDI"), None);
        assert_eq!(split_xref("@@ INDI"), None);
        assert_eq!(split_xref(""), None);
    }

    #[test]
    fn xref_uses_first_pair() {
        let x = split_xref("@I1@ INDI @X@").unwrap();
        assert_eq!(x.id, "I1");
        assert_eq!(x.kind, "INDI");
        assert_eq!(x.value, "@X@");
    }
}
