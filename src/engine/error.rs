//! Statement-level diagnostics.
//!
//! A `ParseError` aborts the statement it belongs to and nothing else: rules
//! registered and queries rewritten before it stay valid, and the front end
//! resumes at the next `.`. Unification failures are not errors (they are the
//! ordinary "rule does not apply here" answer) and never show up here.

use crate::Range;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A closing delimiter with no opener left on the operator stack.
    UnmatchedClose { delimiter: char },
    /// A closing delimiter that does not fit the innermost opener, as in `(a]`.
    MismatchedClose { expected: char, found: char },
    /// An opener still waiting for its closing delimiter at the end of the statement.
    Unclosed { delimiter: char },
    /// A binary operator without two operands to combine.
    MissingOperand { operator: String },
    /// More than one expression left over at the end of the statement (`a b.`).
    DanglingOperands { count: usize },
    /// More than one element expression between a container's delimiters (`[a b]`).
    MalformedContainer { count: usize },
    /// Delimiters but no expression, as in `().`.
    EmptyExpression,
    /// Tokens after the last `.` of the source.
    MissingTerminator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Source span of the offending token (the whole statement when no
    /// single token is to blame).
    pub range: Range,
    /// Index of the statement the error aborted.
    pub statement: usize,
    /// Source span of the whole statement the error aborted.
    pub statement_range: Range,
}

impl ParseError {
    /// `statement_range` starts out as `range`; the front end widens it with
    /// [`ParseError::within`] once the statement's extent is known.
    pub fn new(kind: ParseErrorKind, range: Range, statement: usize) -> Self {
        ParseError { kind, range, statement, statement_range: range }
    }

    pub fn within(mut self, statement_range: Range) -> Self {
        self.statement_range = statement_range;
        self
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnmatchedClose { delimiter } => write!(f, "unmatched closing '{delimiter}'"),
            ParseErrorKind::MismatchedClose { expected, found } => {
                write!(f, "expected '{expected}' but found '{found}'")
            }
            ParseErrorKind::Unclosed { delimiter } => write!(f, "unclosed '{delimiter}'"),
            ParseErrorKind::MissingOperand { operator } => write!(f, "operator '{operator}' is missing an operand"),
            ParseErrorKind::DanglingOperands { count } => {
                write!(f, "{count} expressions without an operator between them")
            }
            ParseErrorKind::MalformedContainer { count } => {
                write!(f, "container holds {count} expressions without an operator between them")
            }
            ParseErrorKind::EmptyExpression => write!(f, "statement has no expression"),
            ParseErrorKind::MissingTerminator => write!(f, "statement is missing its terminating '.'"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "statement {} (bytes {}..{}): {}", self.statement, self.range.start, self.range.end, self.kind)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexWarningKind {
    /// A `"` with no closing quote before the end of input; closed implicitly.
    UnterminatedQuote,
}

/// Recoverable lexing problem. The lexer has already repaired the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexWarning {
    pub kind: LexWarningKind,
    pub range: Range,
    pub statement: usize,
}

impl fmt::Display for LexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexWarningKind::UnterminatedQuote => write!(
                f,
                "statement {} (bytes {}..{}): unterminated string, closed at end of input",
                self.statement, self.range.start, self.range.end
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_statement_and_span() {
        let err = ParseError::new(ParseErrorKind::Unclosed { delimiter: '(' }, Range::new(3, 4), 2);
        assert_eq!(err.to_string(), "statement 2 (bytes 3..4): unclosed '('");
    }
}
