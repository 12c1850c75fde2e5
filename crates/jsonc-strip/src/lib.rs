//! JSONC normalization shared by the diagnostics build script and options loading.
//!
//! Supports:
//! - `//` line comments
//! - `/* ... */` block comments (newlines inside are kept so parse errors
//!   still point at the right line)
//! - trailing commas before `}` or `]`
//! - string literal preservation (including escapes)

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    StrEscape,
    LineComment,
    BlockComment,
}

/// Strip `//` and `/* */` comments from JSONC input.
///
/// Comment-like sequences embedded in string literals are left alone.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut state = State::Code;

    while let Some(c) = chars.next() {
        state = match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    State::BlockComment
                }
                ('"', _) => {
                    out.push(c);
                    State::Str
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::Str => {
                out.push(c);
                match c {
                    '\\' => State::StrEscape,
                    '"' => State::Code,
                    _ => State::Str,
                }
            }
            State::StrEscape => {
                out.push(c);
                State::Str
            }
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    State::Code
                } else {
                    State::LineComment
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    State::Code
                } else {
                    if c == '\n' {
                        out.push(c);
                    }
                    State::BlockComment
                }
            }
        };
    }
    out
}

/// Remove commas that directly precede a closing `}` or `]`.
///
/// Expects comment-free input (see [`strip_jsonc`]).
#[must_use]
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_str = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_str {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_str = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_str = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Turn a JSONC document into plain JSON: comments and trailing commas removed.
#[must_use]
pub fn jsonc_to_json(input: &str) -> String {
    strip_trailing_commas(&strip_jsonc(input))
}

#[cfg(test)]
mod tests {
    use super::{jsonc_to_json, strip_jsonc, strip_trailing_commas};

    #[test]
    fn strips_line_and_block_comments() {
        let input = r#"
{
  // separator between path segments
  "path_separator": ".", /* unbounded */ "max_depth": null
}
"#;
        let stripped = strip_jsonc(input);
        assert!(!stripped.contains("separator between"));
        assert!(!stripped.contains("unbounded"));
        assert!(stripped.contains("\"path_separator\": \".\""));
        assert!(stripped.contains("\"max_depth\": null"));
    }

    #[test]
    fn keeps_comment_markers_inside_strings() {
        let input = r#"{ "url": "http://example.com/*x*/", "note":"//keep", "q": "a\"//b" }"#;
        let stripped = strip_jsonc(input);
        assert_eq!(stripped, input);
    }

    #[test]
    fn block_comment_keeps_line_count() {
        let input = "{\n/* one\ntwo\nthree */\n\"a\": 1\n}";
        let stripped = strip_jsonc(input);
        assert_eq!(stripped.lines().count(), input.lines().count());
    }

    #[test]
    fn unterminated_block_comment_swallows_rest() {
        assert_eq!(strip_jsonc("{} /* never closed"), "{} ");
    }

    #[test]
    fn trailing_commas_removed() {
        let input = "{ \"kinds\": [\"INDI\", \"FAM\", ], \"a\": 1,\n}";
        assert_eq!(
            strip_trailing_commas(input),
            "{ \"kinds\": [\"INDI\", \"FAM\" ], \"a\": 1\n}"
        );
    }

    #[test]
    fn commas_inside_strings_untouched() {
        let input = r#"{ "separator": ",]" }"#;
        assert_eq!(strip_trailing_commas(input), input);
    }

    #[test]
    fn jsonc_to_json_combines_both_passes() {
        let input = "{\n  \"max_depth\": 4, // depth cap\n}";
        assert_eq!(jsonc_to_json(input), "{\n  \"max_depth\": 4 \n}");
    }
}
