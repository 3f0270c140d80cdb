//! AST construction from postfix.
//!
//! Two stacks, both local to one `build` call:
//!
//! - the output stack of finished expressions, interleaved with the opening
//!   markers of containers that are still being filled;
//! - the open-containers stack, one pending container per opening marker.
//!
//! ```text
//! postfix: [  a  b  ,  ]
//!          │  │  │  │  └─ drain to the marker: `a,b` becomes the
//!          │  │  │  │     container's right child; re-push the container
//!          │  │  │  └──── pop b (right), a (left) -> `,` node
//!          │  └──┴─────── leaves
//!          └───────────── marker on output + pending Bracket on open stack
//! ```

use super::error::{ParseError, ParseErrorKind};
use crate::{Expr, NodeKind, Range, Statement, Token, TokenKind};

/// A container whose closing marker has not been seen yet.
#[derive(Debug)]
struct PendingContainer {
    id: usize,
    kind: NodeKind,
    text: String,
    open: TokenKind,
    range: Range,
}

#[derive(Debug)]
enum Slot {
    Node(Expr),
    /// Opening marker; the container itself waits on the open stack.
    Marker,
}

/// Builds expression trees from postfix token streams.
///
/// Node ids keep increasing across every statement built by the same
/// builder, so they are unique within one parse run.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: usize,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder { next_id: 0 }
    }

    fn fresh_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build one statement per End marker in `postfix`. The first one gets
    /// index `statement`, the next `statement + 1`, and so on.
    pub fn build(&mut self, postfix: &[Token], statement: usize) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        let mut output: Vec<Slot> = Vec::new();
        let mut open: Vec<PendingContainer> = Vec::new();
        let mut index = statement;
        let mut span: Option<Range> = None;

        for token in postfix {
            span = Some(span.map_or(token.range, |s| s.cover(token.range)));

            match token.kind {
                TokenKind::Variable => {
                    let id = self.fresh_id();
                    output.push(Slot::Node(Expr::leaf(id, &token.text, NodeKind::Variable)));
                }
                TokenKind::Constant | TokenKind::Quoted => {
                    let id = self.fresh_id();
                    output.push(Slot::Node(Expr::leaf(id, &token.text, NodeKind::Constant)));
                }
                TokenKind::BinaryOp | TokenKind::Comma | TokenKind::Imply => {
                    let missing = || {
                        ParseError::new(
                            ParseErrorKind::MissingOperand { operator: token.text.clone() },
                            token.range,
                            index,
                        )
                    };
                    let right = pop_node(&mut output).ok_or_else(missing)?;
                    let left = pop_node(&mut output).ok_or_else(missing)?;
                    let kind = if token.kind == TokenKind::Imply { NodeKind::Imply } else { NodeKind::BinaryOp };
                    let id = self.fresh_id();
                    output.push(Slot::Node(Expr::binary(id, &token.text, kind, left, right)));
                }
                TokenKind::LeftBracket | TokenKind::LeftBrace | TokenKind::Functor => {
                    let kind = match token.kind {
                        TokenKind::LeftBracket => NodeKind::Bracket,
                        TokenKind::LeftBrace => NodeKind::Brace,
                        _ => NodeKind::Compound,
                    };
                    let id = self.fresh_id();
                    open.push(PendingContainer {
                        id,
                        kind,
                        text: token.text.clone(),
                        open: token.kind,
                        range: token.range,
                    });
                    output.push(Slot::Marker);
                }
                TokenKind::RightBracket | TokenKind::RightBrace | TokenKind::RightParen => {
                    let container = close_container(&mut output, &mut open, token, index)?;
                    output.push(Slot::Node(container));
                }
                // Grouping parens only shape the postfix order.
                TokenKind::LeftParen => {}
                TokenKind::End => {
                    let range = span.take().unwrap_or(token.range);
                    if let Some(pending) = open.last() {
                        return Err(ParseError::new(
                            ParseErrorKind::Unclosed { delimiter: pending.open.delimiter().unwrap_or('(') },
                            pending.range,
                            index,
                        ));
                    }
                    let root = match output.len() {
                        0 => return Err(ParseError::new(ParseErrorKind::EmptyExpression, range, index)),
                        1 => pop_node(&mut output),
                        count => {
                            return Err(ParseError::new(ParseErrorKind::DanglingOperands { count }, range, index));
                        }
                    };
                    let Some(root) = root else {
                        return Err(ParseError::new(ParseErrorKind::EmptyExpression, range, index));
                    };
                    statements.push(Statement { index, range, root });
                    index += 1;
                }
            }
        }

        Ok(statements)
    }
}

fn pop_node(output: &mut Vec<Slot>) -> Option<Expr> {
    match output.pop()? {
        Slot::Node(expr) => Some(expr),
        marker @ Slot::Marker => {
            output.push(marker);
            None
        }
    }
}

/// Drain the output stack down to the innermost opening marker and attach
/// what was drained as the pending container's right child.
fn close_container(
    output: &mut Vec<Slot>,
    open: &mut Vec<PendingContainer>,
    close: &Token,
    statement: usize,
) -> Result<Expr, ParseError> {
    let found = close.kind.delimiter().unwrap_or(')');
    let mut drained = Vec::new();
    loop {
        match output.pop() {
            Some(Slot::Node(expr)) => drained.push(expr),
            Some(Slot::Marker) => break,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::UnmatchedClose { delimiter: found },
                    close.range,
                    statement,
                ));
            }
        }
    }

    let Some(pending) = open.pop() else {
        return Err(ParseError::new(ParseErrorKind::UnmatchedClose { delimiter: found }, close.range, statement));
    };
    let expected = match pending.kind {
        NodeKind::Bracket => ']',
        NodeKind::Brace => '}',
        _ => ')',
    };
    if expected != found {
        return Err(ParseError::new(
            ParseErrorKind::MismatchedClose { expected, found },
            pending.range.cover(close.range),
            statement,
        ));
    }
    if drained.len() > 1 {
        return Err(ParseError::new(
            ParseErrorKind::MalformedContainer { count: drained.len() },
            pending.range.cover(close.range),
            statement,
        ));
    }

    Ok(Expr::container(pending.id, pending.text, pending.kind, drained.pop()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Lexer, desugar_quoted, to_postfix};

    fn build(source: &str) -> Result<Expr, ParseError> {
        let stmt = Lexer::new(source).next_statement().unwrap();
        let postfix = desugar_quoted(to_postfix(&stmt.tokens, stmt.index)?);
        let mut statements = AstBuilder::new().build(&postfix, stmt.index)?;
        assert_eq!(statements.len(), 1);
        Ok(statements.remove(0).root)
    }

    #[test]
    fn binary_operator_takes_two_operands() {
        let root = build("a + B.").unwrap();
        assert_eq!(root.kind, NodeKind::BinaryOp);
        assert_eq!(root.text, "+");
        assert_eq!(root.left().unwrap().text, "a");
        assert_eq!(root.right().unwrap().kind, NodeKind::Variable);
    }

    #[test]
    fn comma_root_nests_to_the_right() {
        let root = build("a, b, c.").unwrap();
        assert_eq!(root.text, ",");
        assert_eq!(root.left().unwrap().text, "a");
        let rest = root.right().unwrap();
        assert_eq!(rest.text, ",");
        assert_eq!(rest.left().unwrap().text, "b");
        assert_eq!(rest.right().unwrap().text, "c");
    }

    #[test]
    fn bracket_holds_comma_chain_in_right_child() {
        let root = build("[a, b].").unwrap();
        assert_eq!(root.kind, NodeKind::Bracket);
        assert!(root.left().is_none());
        assert_eq!(root.right().unwrap().text, ",");
    }

    #[test]
    fn empty_containers_have_no_child() {
        let root = build("{}.").unwrap();
        assert_eq!(root.kind, NodeKind::Brace);
        assert!(root.is_leaf());
        assert_eq!(build("\"\".").unwrap(), build("[].").unwrap());
    }

    #[test]
    fn nested_containers() {
        let root = build("[[a], {b}].").unwrap();
        let pair = root.right().unwrap();
        assert_eq!(pair.left().unwrap().kind, NodeKind::Bracket);
        assert_eq!(pair.left().unwrap().right().unwrap().text, "a");
        assert_eq!(pair.right().unwrap().kind, NodeKind::Brace);
    }

    #[test]
    fn functor_builds_compound() {
        let root = build("likes(tom, jerry).").unwrap();
        assert_eq!(root.kind, NodeKind::Compound);
        assert_eq!(root.text, "likes");
        let args = root.right().unwrap();
        assert_eq!(args.left().unwrap().text, "tom");
        assert_eq!(args.right().unwrap().text, "jerry");
    }

    #[test]
    fn implication_root() {
        let root = build("likes(X, Y) -> friend(X, Y).").unwrap();
        assert_eq!(root.kind, NodeKind::Imply);
        assert_eq!(root.left().unwrap().text, "likes");
        assert_eq!(root.right().unwrap().text, "friend");
    }

    #[test]
    fn ids_increase_across_statements() {
        let mut builder = AstBuilder::new();
        let mut lexer = Lexer::new("a. b.");
        let first = lexer.next_statement().unwrap();
        let second = lexer.next_statement().unwrap();
        let a = builder.build(&to_postfix(&first.tokens, 0).unwrap(), 0).unwrap();
        let b = builder.build(&to_postfix(&second.tokens, 1).unwrap(), 1).unwrap();
        assert!(b[0].root.id > a[0].root.id);
        assert_eq!(b[0].index, 1);
    }

    #[test]
    fn juxtaposition_is_rejected() {
        let err = build("a b.").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DanglingOperands { count: 2 });
        let err = build("[a b].").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MalformedContainer { count: 2 });
    }

    #[test]
    fn operator_without_operands_is_rejected() {
        let err = build("+ a.").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingOperand { operator: "+".to_string() });
        let err = build("[a +].").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingOperand { operator: "+".to_string() });
    }

    #[test]
    fn empty_group_is_rejected() {
        assert_eq!(build("().").unwrap_err().kind, ParseErrorKind::EmptyExpression);
    }
}
