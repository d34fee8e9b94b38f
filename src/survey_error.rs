//! Errors in survey data text
use std::fmt::Display;

/// Type alias for a `Result` with [`GrammarViolation`] as the error type.
pub type SResult<T> = Result<T, GrammarViolation>;

/// Text that does not follow the survey data grammar.
///
/// This is the only error the parsers produce. It records where in the source
/// the problem is so that it can be rendered with a caret pointer under the
/// offending text:
///
/// ```text
/// month out of range (SECRET.DAT, line 3, col 14)
/// SURVEY DATE: 13 5 14
///              ^^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarViolation {
    message: String,
    source: String,
    line: usize,
    column: usize,
    line_text: String,
    width: usize,
}

impl GrammarViolation {
    /// Build an error for the byte range `start..end` of `input`.
    ///
    /// `source` names the input (usually a file name) for the rendered message.
    /// Line and column are 1-based; the column counts characters, not bytes.
    pub fn new(message: impl Into<String>, source: &str, input: &str, start: usize, end: usize) -> Self {
        let start = clamp_to_boundary(input, start);
        let end = clamp_to_boundary(input, end.max(start));

        let line_start = input[..start].rfind(&['\r', '\n'][..]).map(|i| i + 1).unwrap_or(0);
        let line_end = input[start..].find(&['\r', '\n'][..]).map(|i| start + i).unwrap_or(input.len());
        let line = 1 + count_line_breaks(&input[..line_start]);
        let column = 1 + input[line_start..start].chars().count();
        let width = input[start..end.min(line_end)].chars().count().max(1);

        Self {
            message: message.into(),
            source: source.to_owned(),
            line,
            column,
            line_text: input[line_start..line_end].to_owned(),
            width,
        }
    }

    /// The human-readable description of the problem, e.g. `"invalid month"`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The name of the input the error occurred in.
    pub fn source_name(&self) -> &str {
        &self.source
    }

    /// 1-based line number of the offending text.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column (in characters) of the offending text.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The full text of the offending line, without its terminator.
    pub fn line_text(&self) -> &str {
        &self.line_text
    }
}

impl Display for GrammarViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pad = " ".repeat(self.column - 1);
        let carets = "^".repeat(self.width);
        write!(f, "{} ({}, line {}, col {})\n{}\n{pad}{carets}",
               self.message, self.source, self.line, self.column, self.line_text)
    }
}

impl std::error::Error for GrammarViolation {}

fn clamp_to_boundary(input: &str, mut idx: usize) -> usize {
    idx = idx.min(input.len());
    while !input.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

// "\r\n" counts once, lone "\r" and "\n" each count once
fn count_line_breaks(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut n = 0;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'\n' => n += 1,
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => n += 1,
            _ => {}
        }
    }
    n
}
