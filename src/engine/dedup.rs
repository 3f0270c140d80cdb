//! Term fingerprints for cycle detection.
//!
//! Rewriting is deterministic: the same term and the same rules always lead
//! to the same next step. So once a query returns to a term it has already
//! been in, it will loop forever. The rewriter records a `TermKey` for every
//! state it passes through and stops as soon as one repeats.
//!
//! ## What counts as "the same term"
//!
//! The key is a canonical prefix encoding of kind, text and child layout. It
//! ignores node ids (they are diagnostic only), so two structurally equal
//! trees always produce equal keys, and unequal trees never do.

use crate::{Expr, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TermKey(String);

impl TermKey {
    pub(crate) fn from_expr(expr: &Expr) -> Self {
        let mut key = String::new();
        encode(expr, &mut key);
        TermKey(key)
    }
}

enum Piece<'a> {
    Node(&'a Expr),
    Mark(char),
}

fn encode(root: &Expr, out: &mut String) {
    let mut work = vec![Piece::Node(root)];
    while let Some(piece) = work.pop() {
        let node = match piece {
            Piece::Mark(c) => {
                out.push(c);
                continue;
            }
            Piece::Node(node) => node,
        };
        let tag = match node.kind {
            NodeKind::BinaryOp => 'o',
            NodeKind::Variable => 'v',
            NodeKind::Constant => 'c',
            NodeKind::Imply => 'i',
            NodeKind::Bracket => 'l',
            NodeKind::Brace => 's',
            NodeKind::Compound => 'f',
        };
        // Length-prefixed so texts containing the separators stay unambiguous.
        out.push(tag);
        out.push_str(&node.text.len().to_string());
        out.push(':');
        out.push_str(&node.text);
        // Right first: the left child's pieces must come off the stack first.
        for child in [node.right(), node.left()] {
            match child {
                Some(child) => work.extend([Piece::Mark(')'), Piece::Node(child), Piece::Mark('(')]),
                None => work.push(Piece::Mark('_')),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    fn key(source: &str) -> TermKey {
        TermKey::from_expr(&parse_statement(source).unwrap().root)
    }

    #[test]
    fn equal_terms_share_a_key() {
        assert_eq!(key("f([a, b], X)."), key("f( [a,b] , X )."));
        assert_eq!(key("\"ab\"."), key("[a, b]."));
    }

    #[test]
    fn different_terms_differ() {
        assert_ne!(key("f(a)."), key("f(b)."));
        assert_ne!(key("[a]."), key("{a}."));
        assert_ne!(key("a + b."), key("b + a."));
        assert_ne!(key("X."), key("x."));
    }
}
