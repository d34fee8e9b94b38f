//! A cursor over survey text.
//!
//! The [`Scanner`] owns nothing; it borrows the full input and tracks a byte
//! offset into it. All the grammar-level parsers in [`crate::de`] are written in
//! terms of its small set of operations: skip some class of characters, read
//! up to a delimiter, expect a literal, or build an error pointing at a range of
//! the input. Cloning a scanner is cheap and is the way to look ahead without
//! consuming anything.
use pest::Parser;

use crate::parsing::{Rule, SurveyGrammar};
use crate::survey_error::GrammarViolation;

/// Form feed, which ends a page (and a shot table) in survey files.
pub const FORM_FEED: char = '\u{0C}';

/// Control-Z, which marks the end of the data in some survey files.
pub const END_OF_DATA: char = '\u{1A}';

/// A slice of the input along with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// The same token with surrounding whitespace removed.
    pub fn trim(self) -> Self {
        let trimmed_start = self.text.trim_start();
        let start = self.start + (self.text.len() - trimmed_start.len());
        Token { text: trimmed_start.trim_end(), start }
    }
}

/// Cursor over an in-memory survey file.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    input: &'a str,
    input_idx: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `input`. `source` names the input in error messages.
    pub fn new(source: &'a str, input: &'a str) -> Self {
        Self { source, input, input_idx: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset into the input.
    pub fn index(&self) -> usize {
        self.input_idx
    }

    /// Move the cursor to byte offset `idx`, clamped to the end of the input.
    pub fn set_index(&mut self, idx: usize) {
        self.input_idx = idx.min(self.input.len());
    }

    /// Everything from the cursor to the end of the input.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.input_idx..]
    }

    pub fn is_at_end(&self) -> bool {
        self.input_idx >= self.input.len()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// `true` at a line terminator or at the end of the input.
    pub fn is_at_end_of_line(&self) -> bool {
        matches!(self.peek_char(), None | Some('\r') | Some('\n'))
    }

    /// Skip spaces, tabs and other non-line-breaking whitespace. Returns `true` if anything was skipped.
    pub fn skip_inline_whitespace(&mut self) -> bool {
        self.skip_while(is_inline_whitespace)
    }

    /// Skip all whitespace, including line breaks and form feeds. Returns `true` if anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        self.skip_while(char::is_whitespace)
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let start = self.input_idx;
        for c in self.remaining().chars() {
            if !pred(c) {
                break;
            }
            self.input_idx += c.len_utf8();
        }
        self.input_idx > start
    }

    /// `true` if the text at the cursor begins with `literal`, ignoring ASCII case.
    pub fn starts_with_ignore_case(&self, literal: &str) -> bool {
        self.remaining()
            .get(..literal.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(literal))
    }

    /// Consume `literal` if the text at the cursor begins with it, ignoring ASCII case.
    pub fn skip_ignore_case(&mut self, literal: &str) -> bool {
        if self.starts_with_ignore_case(literal) {
            self.input_idx += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume `literal` or fail with `expected <literal>` pointing at the cursor.
    pub fn expect_ignore_case(&mut self, literal: &str) -> Result<Token<'a>, GrammarViolation> {
        let start = self.input_idx;
        if self.skip_ignore_case(literal) {
            Ok(Token { text: &self.input[start..self.input_idx], start })
        } else {
            Err(self.error_here(format!("expected {literal}")))
        }
    }

    /// Read up to the next line terminator (or the end of input) and consume the terminator.
    ///
    /// The returned token does not include the terminator.
    pub fn rest_of_line(&mut self) -> Token<'a> {
        let start = self.input_idx;
        let rest = self.remaining();
        let len = rest.find(&['\r', '\n'][..]).unwrap_or(rest.len());
        self.input_idx += len;
        let token = Token { text: &self.input[start..self.input_idx], start };
        self.skip_line_break();
        token
    }

    /// Consume one line terminator (`\r\n`, `\r` or `\n`) if the cursor is at one.
    pub fn skip_line_break(&mut self) -> bool {
        let rest = self.remaining();
        let n = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\r') || rest.starts_with('\n') {
            1
        } else {
            0
        };
        self.input_idx += n;
        n > 0
    }

    /// Skip whitespace-only lines without crossing a form feed. Leaves the
    /// cursor at the start of the first non-blank line (or at a form feed).
    pub fn skip_blank_lines(&mut self) {
        loop {
            let line_start = self.input_idx;
            self.skip_inline_whitespace();
            if !self.skip_line_break() {
                if !self.is_at_end() {
                    self.input_idx = line_start;
                }
                return;
            }
        }
    }

    /// Skip inline whitespace and read the next run of non-whitespace characters.
    ///
    /// Fails with `missing_msg` if the line (or input, or page) ends before a token starts.
    pub fn next_token(&mut self, missing_msg: &str) -> Result<Token<'a>, GrammarViolation> {
        self.skip_inline_whitespace();
        if self.peek_char().map_or(true, char::is_whitespace) {
            return Err(self.error_here(missing_msg));
        }
        let start = self.input_idx;
        self.skip_while(|c| !c.is_whitespace());
        Ok(Token { text: &self.input[start..self.input_idx], start })
    }

    /// Try to match a grammar rule as a prefix of the remaining text, consuming it on success.
    pub(crate) fn match_rule(&mut self, rule: Rule) -> Option<pest::iterators::Pair<'a, Rule>> {
        let pair = SurveyGrammar::parse(rule, self.remaining()).ok()?.next()?;
        self.input_idx += pair.as_span().end();
        Some(pair)
    }

    /// Build an error for the byte range `start..end` of this scanner's input.
    pub fn error_at(&self, message: impl Into<String>, start: usize, end: usize) -> GrammarViolation {
        GrammarViolation::new(message, self.source, self.input, start, end)
    }

    /// Build an error pointing at the cursor.
    pub fn error_here(&self, message: impl Into<String>) -> GrammarViolation {
        self.error_at(message, self.input_idx, self.input_idx)
    }
}

/// Whitespace other than line terminators and form feeds.
pub fn is_inline_whitespace(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\r' | '\n' | FORM_FEED | '\u{85}')
}
