//! Lexer.
//!
//! Turns source text into tokens, one statement at a time. Each call to
//! [`Lexer::next_statement`] scans up to and including the next `.` and hands
//! back exactly that statement's tokens, so the parsing stages always start
//! from fresh per-statement buffers.
//!
//! ```text
//! likes(tom, "ab") -> x.   # comment
//! ───── ─── ─ ──── ─ ─ ──  (comment dropped)
//! Functor   │ Quoted │ │ End
//!     Constant Comma Imply Constant
//! ```
//!
//! Character classes:
//!
//! - whitespace, `( ) [ ] { } , . " #` are delimiters and end any run;
//! - a run of letters/digits is a Variable (uppercase start) or a Constant;
//! - a run of anything else is an operator, with every `->` inside it split
//!   out as an Imply token.

use super::error::{LexWarning, LexWarningKind};
use crate::{Range, Token, TokenKind};

bitflags::bitflags! {
    /// Coarse role of a token in the shunting-yard pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenClass: u8 {
        const OPERAND    = 1 << 0;
        const OPERATOR   = 1 << 1;
        const OPEN       = 1 << 2;
        const CLOSE      = 1 << 3;
        const TERMINATOR = 1 << 4;
    }
}

impl TokenKind {
    pub fn class(self) -> TokenClass {
        match self {
            TokenKind::Variable | TokenKind::Constant | TokenKind::Quoted => TokenClass::OPERAND,
            TokenKind::BinaryOp | TokenKind::Imply | TokenKind::Comma => TokenClass::OPERATOR,
            TokenKind::LeftParen | TokenKind::Functor | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                TokenClass::OPEN
            }
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => TokenClass::CLOSE,
            TokenKind::End => TokenClass::TERMINATOR,
        }
    }

    /// The bracket character an opening or closing token stands for.
    pub fn delimiter(self) -> Option<char> {
        match self {
            TokenKind::LeftParen | TokenKind::Functor => Some('('),
            TokenKind::RightParen => Some(')'),
            TokenKind::LeftBracket => Some('['),
            TokenKind::RightBracket => Some(']'),
            TokenKind::LeftBrace => Some('{'),
            TokenKind::RightBrace => Some('}'),
            _ => None,
        }
    }
}

fn structural_kind(c: char) -> Option<TokenKind> {
    match c {
        '(' => Some(TokenKind::LeftParen),
        ')' => Some(TokenKind::RightParen),
        '[' => Some(TokenKind::LeftBracket),
        ']' => Some(TokenKind::RightBracket),
        '{' => Some(TokenKind::LeftBrace),
        '}' => Some(TokenKind::RightBrace),
        ',' => Some(TokenKind::Comma),
        _ => None,
    }
}

/// Tokens of one statement, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LexedStatement {
    pub index: usize,
    pub tokens: Vec<Token>,
    pub range: Range,
    /// False only for trailing tokens with no `.` after them.
    pub terminated: bool,
}

impl LexedStatement {
    /// True for a bare `.` with nothing before it.
    pub fn is_empty(&self) -> bool {
        self.tokens.iter().all(|t| t.kind == TokenKind::End)
    }
}

#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Index the next statement will get.
    statement: usize,
    warnings: Vec<LexWarning>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source, pos: 0, statement: 0, warnings: Vec::new() }
    }

    pub fn warnings(&self) -> &[LexWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<LexWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Scan the next statement. Returns `None` once only whitespace and
    /// comments remain.
    pub fn next_statement(&mut self) -> Option<LexedStatement> {
        let mut tokens = Vec::new();

        while let Some(c) = self.source[self.pos..].chars().next() {
            let start = self.pos;
            match c {
                '#' => self.skip_comment(),
                '"' => {
                    let token = self.quoted();
                    tokens.push(token);
                }
                '.' => {
                    self.pos += 1;
                    tokens.push(Token::new(".", TokenKind::End, Range::new(start, self.pos)));
                    return Some(self.finish(tokens, true));
                }
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                c => match structural_kind(c) {
                    Some(kind) => {
                        self.pos += 1;
                        tokens.push(Token::new(c.to_string(), kind, Range::new(start, self.pos)));
                    }
                    None => self.word_or_operator(&mut tokens),
                },
            }
        }

        if tokens.is_empty() { None } else { Some(self.finish(tokens, false)) }
    }

    fn finish(&mut self, tokens: Vec<Token>, terminated: bool) -> LexedStatement {
        let range = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => first.range.cover(last.range),
            _ => Range::new(self.pos, self.pos),
        };
        let index = self.statement;
        self.statement += 1;
        trace!("[lex] statement={} tokens={} span={}..{}", index, tokens.len(), range.start, range.end);
        LexedStatement { index, tokens, range, terminated }
    }

    /// Drop everything up to and including the next newline.
    fn skip_comment(&mut self) {
        let rest = &self.source[self.pos..];
        self.pos += rest.find('\n').map_or(rest.len(), |nl| nl + 1);
    }

    /// Capture a quoted string verbatim, both quotes included. A missing
    /// closing quote is supplied and reported as a warning.
    fn quoted(&mut self) -> Token {
        let start = self.pos;
        let rest = &self.source[start + 1..];
        match rest.find('"') {
            Some(close) => {
                self.pos = start + close + 2;
                Token::new(&self.source[start..self.pos], TokenKind::Quoted, Range::new(start, self.pos))
            }
            None => {
                self.pos = self.source.len();
                let range = Range::new(start, self.pos);
                self.warnings.push(LexWarning {
                    kind: LexWarningKind::UnterminatedQuote,
                    range,
                    statement: self.statement,
                });
                Token::new(format!("{}\"", &self.source[start..]), TokenKind::Quoted, range)
            }
        }
    }

    fn word_or_operator(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        let rest = &self.source[start..];

        if let Some(m) = regex!(r"^[\p{Alphabetic}\p{N}]+").find(rest) {
            let text = m.as_str();
            self.pos += m.end();
            let kind = if text.chars().next().is_some_and(char::is_uppercase) {
                TokenKind::Variable
            } else if self.source[self.pos..].starts_with('(') {
                self.pos += 1;
                TokenKind::Functor
            } else {
                TokenKind::Constant
            };
            tokens.push(Token::new(text, kind, Range::new(start, self.pos)));
            return;
        }

        if let Some(m) = regex!(r##"^[^\p{Alphabetic}\p{N}\s()\[\]{},.#"]+"##).find(rest) {
            self.pos += m.end();
            split_operator_run(m.as_str(), start, tokens);
            return;
        }

        // Not reachable for well-formed UTF-8: every character is whitespace,
        // structural, alphanumeric or an operator character.
        self.pos += rest.chars().next().map_or(1, char::len_utf8);
    }
}

/// Emit an operator run, splitting out each `->` as its own Imply token.
fn split_operator_run(run: &str, start: usize, tokens: &mut Vec<Token>) {
    let mut offset = start;
    for (i, piece) in run.split("->").enumerate() {
        if i > 0 {
            tokens.push(Token::new("->", TokenKind::Imply, Range::new(offset, offset + 2)));
            offset += 2;
        }
        if !piece.is_empty() {
            tokens.push(Token::new(piece, TokenKind::BinaryOp, Range::new(offset, offset + piece.len())));
            offset += piece.len();
        }
    }
}

/// Tokenize a whole source, statements concatenated (each ends with its End
/// token; trailing unterminated tokens come last).
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    while let Some(statement) = lexer.next_statement() {
        out.extend(statement.tokens);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(String, TokenKind)> {
        tokenize(source).into_iter().map(|t| (t.text, t.kind)).collect()
    }

    #[test]
    fn identifiers_split_by_case() {
        let got = kinds("Foo bar 42 X1.");
        assert_eq!(
            got,
            vec![
                ("Foo".to_string(), TokenKind::Variable),
                ("bar".to_string(), TokenKind::Constant),
                ("42".to_string(), TokenKind::Constant),
                ("X1".to_string(), TokenKind::Variable),
                (".".to_string(), TokenKind::End),
            ]
        );
    }

    #[test]
    fn imply_is_split_out_of_operator_runs() {
        let got = kinds("a->b =->c.");
        let texts: Vec<&str> = got.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "->", "b", "=", "->", "c", "."]);
        assert_eq!(got[1].1, TokenKind::Imply);
        assert_eq!(got[3].1, TokenKind::BinaryOp);
    }

    #[test]
    fn operator_runs_are_maximal() {
        let got = kinds("a <= b + c.");
        assert_eq!(got[1], ("<=".to_string(), TokenKind::BinaryOp));
        assert_eq!(got[3], ("+".to_string(), TokenKind::BinaryOp));
    }

    #[test]
    fn comma_and_brackets_are_single_tokens() {
        let got = kinds("[a,b]{c}.");
        let k: Vec<TokenKind> = got.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            k,
            vec![
                TokenKind::LeftBracket,
                TokenKind::Constant,
                TokenKind::Comma,
                TokenKind::Constant,
                TokenKind::RightBracket,
                TokenKind::LeftBrace,
                TokenKind::Constant,
                TokenKind::RightBrace,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn constant_before_paren_is_a_functor() {
        let got = kinds("likes(tom) f (x).");
        assert_eq!(got[0], ("likes".to_string(), TokenKind::Functor));
        // Whitespace breaks the call form.
        assert_eq!(got[3], ("f".to_string(), TokenKind::Constant));
        assert_eq!(got[4].1, TokenKind::LeftParen);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let got = kinds("a. # ignored b.\nc.");
        let texts: Vec<&str> = got.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", ".", "c", "."]);
    }

    #[test]
    fn quoted_strings_keep_quotes_and_dots() {
        let got = kinds("\"a.b #c\".");
        assert_eq!(got[0], ("\"a.b #c\"".to_string(), TokenKind::Quoted));
        assert_eq!(got[1].1, TokenKind::End);
    }

    #[test]
    fn unterminated_quote_is_closed_with_warning() {
        let mut lexer = Lexer::new("x. \"abc");
        let first = lexer.next_statement().unwrap();
        assert!(first.terminated);
        let second = lexer.next_statement().unwrap();
        assert!(!second.terminated);
        assert_eq!(second.tokens[0].text, "\"abc\"");
        assert_eq!(lexer.warnings().len(), 1);
        assert_eq!(lexer.warnings()[0].statement, 1);
        assert_eq!(lexer.warnings()[0].kind, LexWarningKind::UnterminatedQuote);
    }

    #[test]
    fn statements_are_numbered_and_spanned() {
        let mut lexer = Lexer::new("a + b.  c.");
        let first = lexer.next_statement().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.range, Range::new(0, 6));
        let second = lexer.next_statement().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.range, Range::new(8, 10));
        assert!(lexer.next_statement().is_none());
    }

    #[test]
    fn bare_terminator_is_an_empty_statement() {
        let mut lexer = Lexer::new(" . ");
        let stmt = lexer.next_statement().unwrap();
        assert!(stmt.is_empty());
        assert!(lexer.next_statement().is_none());
    }

    #[test]
    fn token_classes() {
        assert_eq!(TokenKind::Comma.class(), TokenClass::OPERATOR);
        assert_eq!(TokenKind::Functor.class(), TokenClass::OPEN);
        assert_eq!(TokenKind::Quoted.class(), TokenClass::OPERAND);
        assert_eq!(TokenKind::Functor.delimiter(), Some('('));
    }
}
