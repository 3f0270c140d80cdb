//! Statement-at-a-time front end.
//!
//! `Frontend` pulls one statement from the lexer, runs the postfix pass, the
//! quoted-string expansion and the AST builder on it, and yields the result
//! before the lexer reads any further. A statement that fails yields its
//! `ParseError` and the next call continues after its `.`.

use super::builder::AstBuilder;
use super::error::{LexWarning, ParseError, ParseErrorKind};
use super::lexer::Lexer;
use super::postfix::{desugar_quoted, to_postfix};
use crate::Statement;

#[derive(Debug)]
pub struct Frontend<'a> {
    lexer: Lexer<'a>,
    builder: AstBuilder,
}

impl<'a> Frontend<'a> {
    pub fn new(source: &'a str) -> Self {
        Frontend { lexer: Lexer::new(source), builder: AstBuilder::new() }
    }

    /// Lexer warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<LexWarning> {
        self.lexer.take_warnings()
    }
}

impl Iterator for Frontend<'_> {
    type Item = Result<Statement, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let lexed = self.lexer.next_statement()?;
            if !lexed.terminated {
                return Some(Err(ParseError::new(ParseErrorKind::MissingTerminator, lexed.range, lexed.index)));
            }
            if lexed.is_empty() {
                continue;
            }

            let built = to_postfix(&lexed.tokens, lexed.index)
                .map(desugar_quoted)
                .and_then(|postfix| self.builder.build(&postfix, lexed.index));

            let statement = built.and_then(|mut statements| {
                // One End token in, one statement out.
                statements.pop().ok_or_else(|| {
                    ParseError::new(ParseErrorKind::EmptyExpression, lexed.range, lexed.index)
                })
            });
            return Some(statement.map_err(|err| err.within(lexed.range)));
        }
    }
}
