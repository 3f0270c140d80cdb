//! Formula printing.
//!
//! `Display` for [`Expr`] renders the infix form: binary nodes as
//! `left op right` (parenthesised when nested, except for `,`), containers as
//! `[..]`, `{..}` and `name(..)`, leaves as their text.

use crate::{Expr, NodeKind};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pending output, last item first. Lists nest right-deep, so this
        // walks with a work stack rather than recursion.
        let mut work = vec![Piece::Node(self, false)];
        while let Some(piece) = work.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(node, nested) => push_formula(&mut work, node, nested),
            }
        }
        Ok(())
    }
}

enum Piece<'a> {
    Node(&'a Expr, bool),
    Text(&'a str),
}

/// Queue the pieces of `node` in reverse order.
fn push_formula<'a>(work: &mut Vec<Piece<'a>>, node: &'a Expr, nested: bool) {
    match node.kind {
        NodeKind::BinaryOp | NodeKind::Imply => {
            let comma = node.text == ",";
            let paren = nested && !comma;
            if paren {
                work.push(Piece::Text(")"));
            }
            if let Some(right) = node.right() {
                work.push(Piece::Node(right, true));
            }
            if comma {
                work.push(Piece::Text(","));
            } else {
                work.extend([Piece::Text(" "), Piece::Text(&node.text), Piece::Text(" ")]);
            }
            if let Some(left) = node.left() {
                work.push(Piece::Node(left, true));
            }
            if paren {
                work.push(Piece::Text("("));
            }
        }
        NodeKind::Variable | NodeKind::Constant => work.push(Piece::Text(&node.text)),
        NodeKind::Bracket => push_container(work, node, "[", "]"),
        NodeKind::Brace => push_container(work, node, "{", "}"),
        NodeKind::Compound => {
            push_container(work, node, "(", ")");
            work.push(Piece::Text(&node.text));
        }
    }
}

fn push_container<'a>(work: &mut Vec<Piece<'a>>, node: &'a Expr, open: &'a str, close: &'a str) {
    work.push(Piece::Text(close));
    if let Some(inner) = node.right() {
        work.push(Piece::Node(inner, false));
    }
    work.push(Piece::Text(open));
}

#[cfg(test)]
mod tests {
    use crate::parse_statement;

    fn round_trip(source: &str) -> String {
        parse_statement(source).unwrap().root.to_string()
    }

    #[test]
    fn containers_print_back() {
        assert_eq!(round_trip("[a, b, c]."), "[a,b,c]");
        assert_eq!(round_trip("{x,Y}."), "{x,Y}");
        assert_eq!(round_trip("[]."), "[]");
        assert_eq!(round_trip("[[a], {b}]."), "[[a],{b}]");
    }

    #[test]
    fn printed_containers_reparse_to_the_same_tree() {
        for source in ["[a, b, c].", "{a, [b, c], d}.", "[f(X), \"hi\"]."] {
            let first = parse_statement(source).unwrap().root;
            let again = parse_statement(&format!("{first}.")).unwrap().root;
            assert_eq!(first, again, "{source}");
        }
    }

    #[test]
    fn quoted_strings_print_as_lists() {
        assert_eq!(round_trip("\"ab\"."), "[a,b]");
    }

    #[test]
    fn nested_operators_are_parenthesised() {
        assert_eq!(round_trip("a + b - c."), "(a + b) - c");
        assert_eq!(round_trip("[a + b, c]."), "[(a + b),c]");
        assert_eq!(round_trip("likes(X, Y) -> friend(X, Y)."), "likes(X,Y) -> friend(X,Y)");
    }
}
