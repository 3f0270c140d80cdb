//! Match-site resolution.
//!
//! Finds every position in a term where a rule head applies. The walk is
//! pre-order (node, then left subtree, then right subtree), so the first
//! match returned is the outermost-leftmost one.

use super::matcher::{Binding, structurally_matches, unify};
use crate::{Expr, Path, Side};

/// A subterm the rule head applies to, and the unifier that makes it fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub site: Path,
    pub bindings: Vec<Binding>,
}

/// Every match of `head` inside `term`, outermost first.
pub fn find_matches(term: &Expr, head: &Expr) -> Vec<Match> {
    let mut out = Vec::new();
    // Each entry is a node and the step that reached it. `path` always
    // holds the steps from the root to the node being visited.
    let mut pending: Vec<(&Expr, usize, Option<Side>)> = vec![(term, 0, None)];
    let mut path: Vec<Side> = Vec::new();

    while let Some((node, depth, side)) = pending.pop() {
        path.truncate(depth.saturating_sub(1));
        if let Some(side) = side {
            path.push(side);
        }

        if structurally_matches(node, head) {
            if let Some(bindings) = unify(node, head) {
                out.push(Match { site: Path(path.clone()), bindings });
            }
        }
        if let Some(right) = node.right() {
            pending.push((right, depth + 1, Some(Side::Right)));
        }
        if let Some(left) = node.left() {
            pending.push((left, depth + 1, Some(Side::Left)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    fn expr(source: &str) -> Expr {
        parse_statement(source).unwrap().root
    }

    #[test]
    fn bare_variable_head_matches_every_node() {
        let term = expr("f([a, b], c + d).");
        let matches = find_matches(&term, &expr("X."));
        assert_eq!(matches.len(), term.node_count());
        assert!(matches[0].site.is_root());
        assert_eq!(matches[0].bindings[0].value, term);
    }

    #[test]
    fn finds_nested_sites_in_preorder() {
        let term = expr("g(f(a), f(f(b))).");
        let matches = find_matches(&term, &expr("f(X)."));
        let values: Vec<Expr> = matches.iter().map(|m| m.bindings[0].value.clone()).collect();
        assert_eq!(values, vec![expr("a."), expr("f(b)."), expr("b.")]);
        for m in &matches {
            assert_eq!(term.subterm(&m.site).unwrap().text, "f");
        }
        assert!(matches[1].site.is_prefix_of(&matches[2].site));
    }

    #[test]
    fn no_match_is_empty() {
        assert!(find_matches(&expr("f(a)."), &expr("g(X).")).is_empty());
    }

    #[test]
    fn inconsistent_unifier_is_not_a_match() {
        let term = expr("[eq(a, a), eq(a, b)].");
        let matches = find_matches(&term, &expr("eq(X, X)."));
        assert_eq!(matches.len(), 1);
        assert_eq!(term.subterm(&matches[0].site).unwrap(), &expr("eq(a, a)."));
    }
}
