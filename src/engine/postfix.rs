//! Shunting-yard conversion to postfix.
//!
//! The language has a flat precedence model: every binary operator, `->`
//! included, binds equally tight. All of them are left-associative except
//! `,`, which is right-associative so that `a,b,c` chains as `a,(b,c)`.
//!
//! Containers survive into the postfix stream as markers:
//!
//! ```text
//! infix:    [ a , b , c ]      likes( X , Y )     ( a + b )
//! postfix:  [ a b c , , ]      likes( X Y , )     ( a b +
//!           ^           ^      ^            ^     ^
//!           open marker close  open (Functor) close   plain paren: opener kept,
//!                                                     closer dropped
//! ```
//!
//! Quoted strings are expanded afterwards by [`desugar_quoted`] into the same
//! bracket form, already in postfix order.

use super::error::{ParseError, ParseErrorKind};
use super::lexer::TokenClass;
use crate::{Token, TokenKind};

/// Does `close` end the scope opened by `open`?
fn closes(open: TokenKind, close: TokenKind) -> bool {
    matches!(
        (open, close),
        (TokenKind::LeftParen | TokenKind::Functor, TokenKind::RightParen)
            | (TokenKind::LeftBracket, TokenKind::RightBracket)
            | (TokenKind::LeftBrace, TokenKind::RightBrace)
    )
}

/// Convert one statement's tokens to postfix order.
///
/// `statement` is only used to label errors.
pub fn to_postfix(tokens: &[Token], statement: usize) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<&Token> = Vec::new();

    for token in tokens {
        let class = token.kind.class();

        if class.contains(TokenClass::OPERAND) {
            output.push(token.clone());
        } else if class.contains(TokenClass::OPEN) {
            output.push(token.clone());
            ops.push(token);
        } else if class.contains(TokenClass::CLOSE) {
            let found = token.kind.delimiter().unwrap_or(')');
            loop {
                let Some(top) = ops.pop() else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnmatchedClose { delimiter: found },
                        token.range,
                        statement,
                    ));
                };
                if top.kind.class().contains(TokenClass::OPERATOR) {
                    output.push(top.clone());
                    continue;
                }
                if !closes(top.kind, token.kind) {
                    let expected = match top.kind {
                        TokenKind::LeftBracket => ']',
                        TokenKind::LeftBrace => '}',
                        _ => ')',
                    };
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedClose { expected, found },
                        top.range.cover(token.range),
                        statement,
                    ));
                }
                // A plain paren only groups; containers keep their closing marker.
                if top.kind != TokenKind::LeftParen {
                    output.push(token.clone());
                }
                break;
            }
        } else if token.kind == TokenKind::Comma {
            if ops.last().is_some_and(|top| top.kind == TokenKind::Comma) {
                // Right-associative: leave the earlier comma below this one.
                ops.push(token);
                continue;
            }
            while let Some(top) = ops.last() {
                if !top.kind.class().contains(TokenClass::OPERATOR) {
                    break;
                }
                output.push((*top).clone());
                ops.pop();
            }
            ops.push(token);
        } else if class.contains(TokenClass::OPERATOR) {
            if let Some(top) = ops.last() {
                if top.kind.class().contains(TokenClass::OPERATOR) {
                    output.push((*top).clone());
                    ops.pop();
                }
            }
            ops.push(token);
        } else if class.contains(TokenClass::TERMINATOR) {
            while let Some(top) = ops.pop() {
                if !top.kind.class().contains(TokenClass::OPERATOR) {
                    return Err(ParseError::new(
                        ParseErrorKind::Unclosed { delimiter: top.kind.delimiter().unwrap_or('(') },
                        top.range,
                        statement,
                    ));
                }
                output.push(top.clone());
            }
            output.push(token.clone());
        }
    }

    trace!(
        "[postfix] statement={} {}",
        statement,
        output.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
    );
    Ok(output)
}

/// Replace every Quoted token `"c1...cn"` with `[ c1 ... cn , ... , ]`: an
/// opening bracket, one Constant per character, `n-1` commas and a closing
/// bracket. `""` becomes `[ ]`.
pub fn desugar_quoted(postfix: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(postfix.len());
    for token in postfix {
        if token.kind != TokenKind::Quoted {
            out.push(token);
            continue;
        }

        let inner = token.text.strip_prefix('"').unwrap_or(&token.text);
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        let range = token.range;

        out.push(Token::new("[", TokenKind::LeftBracket, range));
        let mut count = 0;
        for c in inner.chars() {
            out.push(Token::new(c.to_string(), TokenKind::Constant, range));
            count += 1;
        }
        for _ in 1..count {
            out.push(Token::new(",", TokenKind::Comma, range));
        }
        out.push(Token::new("]", TokenKind::RightBracket, range));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Lexer;

    fn postfix(source: &str) -> Result<Vec<String>, ParseError> {
        let stmt = Lexer::new(source).next_statement().unwrap();
        let out = desugar_quoted(to_postfix(&stmt.tokens, stmt.index)?);
        Ok(out.into_iter().map(|t| t.text).collect())
    }

    #[test]
    fn flat_precedence_is_left_associative() {
        assert_eq!(postfix("a + b * c.").unwrap(), vec!["a", "b", "+", "c", "*", "."]);
    }

    #[test]
    fn commas_chain_to_the_right() {
        assert_eq!(postfix("a, b, c.").unwrap(), vec!["a", "b", "c", ",", ",", "."]);
    }

    #[test]
    fn plain_parens_keep_only_the_opener() {
        assert_eq!(postfix("a + (b + c).").unwrap(), vec!["a", "(", "b", "c", "+", "+", "."]);
    }

    #[test]
    fn brackets_keep_both_markers() {
        assert_eq!(postfix("[a, b].").unwrap(), vec!["[", "a", "b", ",", "]", "."]);
        assert_eq!(postfix("{}.").unwrap(), vec!["{", "}", "."]);
    }

    #[test]
    fn functor_call_keeps_closing_paren() {
        assert_eq!(postfix("f(X, Y) -> g(X).").unwrap(), vec!["f", "X", "Y", ",", ")", "g", "X", ")", "->", "."]);
    }

    #[test]
    fn quoted_strings_become_bracket_lists() {
        assert_eq!(postfix("\"abc\".").unwrap(), postfix("[a, b, c].").unwrap());
        assert_eq!(postfix("\"\".").unwrap(), vec!["[", "]", "."]);
        assert_eq!(postfix("\"x\".").unwrap(), vec!["[", "x", "]", "."]);
    }

    #[test]
    fn unclosed_paren_is_reported() {
        let err = postfix("(a + b.").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Unclosed { delimiter: '(' });
        assert_eq!(err.range.start, 0);
    }

    #[test]
    fn stray_closer_is_reported() {
        let err = postfix("a ].").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnmatchedClose { delimiter: ']' });
    }

    #[test]
    fn crossed_delimiters_are_reported() {
        let err = postfix("[a).").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedClose { expected: ']', found: ')' });
    }
}
