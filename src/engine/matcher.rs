//! Structural matching, unification and rule-body instantiation.
//!
//! Matching is one-way: only variables in the *pattern* (a rule head) bind.
//! A variable that appears in the query term is an ordinary node there and
//! only matches a pattern variable.

use crate::Expr;
use std::collections::HashMap;

/// One entry of a unifier: `variable` (a pattern variable name) stands for
/// `value` (a copy of the matched subterm).
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub variable: String,
    pub value: Expr,
}

/// Shape test: does `term` fit `pattern`, treating every pattern variable
/// as a wildcard?
pub fn structurally_matches(term: &Expr, pattern: &Expr) -> bool {
    let mut pending = vec![(term, pattern)];
    while let Some((term, pattern)) = pending.pop() {
        if pattern.is_variable() {
            continue;
        }
        if term.kind != pattern.kind || term.text != pattern.text || !push_children(term, pattern, &mut pending) {
            return false;
        }
    }
    true
}

/// Queue the child pairs of `term` and `pattern`, left on top. False when the
/// two nodes do not have the same children.
fn push_children<'a>(term: &'a Expr, pattern: &'a Expr, pending: &mut Vec<(&'a Expr, &'a Expr)>) -> bool {
    for pair in [(term.right(), pattern.right()), (term.left(), pattern.left())] {
        match pair {
            (None, None) => {}
            (Some(t), Some(p)) => pending.push((t, p)),
            _ => return false,
        }
    }
    true
}

/// Unify `term` against `pattern`.
///
/// On success returns one binding per variable occurrence in the pattern, in
/// left-then-right order (empty when the pattern has no variables). A
/// variable used more than once must be bound to equal subterms every time.
pub fn unify(term: &Expr, pattern: &Expr) -> Option<Vec<Binding>> {
    let mut bindings: Vec<Binding> = Vec::new();
    let mut pending = vec![(term, pattern)];
    while let Some((term, pattern)) = pending.pop() {
        if pattern.is_variable() {
            if let Some(bound) = bindings.iter().find(|b| b.variable == pattern.text) {
                // Already bound - must be the same subterm.
                if bound.value != *term {
                    return None;
                }
            }
            bindings.push(Binding { variable: pattern.text.clone(), value: term.clone() });
            continue;
        }
        if term.kind != pattern.kind || term.text != pattern.text || !push_children(term, pattern, &mut pending) {
            return None;
        }
    }
    Some(bindings)
}

/// Deep-copy `body` with every bound variable replaced by its value.
///
/// All bindings apply at once: a substituted value is never itself
/// rewritten, and a variable bound more than once uses its first binding.
/// Unbound variables are copied unchanged.
pub fn instantiate(body: &Expr, bindings: &[Binding]) -> Expr {
    let mut map: HashMap<&str, &Expr> = HashMap::with_capacity(bindings.len());
    for binding in bindings {
        map.entry(binding.variable.as_str()).or_insert(&binding.value);
    }
    body.copy_with(|node| {
        if node.is_variable() { map.get(node.text.as_str()).map(|value| (*value).clone()) } else { None }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    fn expr(source: &str) -> Expr {
        parse_statement(source).unwrap().root
    }

    #[test]
    fn match_is_reflexive() {
        let t = expr("likes(tom, [a, {b}]) + c.");
        assert!(structurally_matches(&t, &t));
    }

    #[test]
    fn bare_variable_matches_anything() {
        let v = expr("X.");
        for source in ["a.", "f(g(h)).", "[a, b] -> c.", "{}.", "Y."] {
            assert!(structurally_matches(&expr(source), &v), "{source}");
        }
    }

    #[test]
    fn mismatched_shapes_fail() {
        assert!(!structurally_matches(&expr("f(a)."), &expr("g(X).")));
        assert!(!structurally_matches(&expr("[a]."), &expr("{X}.")));
        assert!(!structurally_matches(&expr("f()."), &expr("f(X).")));
        // A query variable is a plain node against a pattern constant.
        assert!(!structurally_matches(&expr("X."), &expr("a.")));
    }

    #[test]
    fn unify_binds_in_left_to_right_order() {
        let bindings = unify(&expr("likes(tom, jerry)."), &expr("likes(X, Y).")).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].variable, "X");
        assert_eq!(bindings[0].value, expr("tom."));
        assert_eq!(bindings[1].variable, "Y");
        assert_eq!(bindings[1].value, expr("jerry."));
    }

    #[test]
    fn ground_match_has_no_bindings() {
        assert_eq!(unify(&expr("f(a, b)."), &expr("f(a, b).")), Some(Vec::new()));
    }

    #[test]
    fn different_constants_do_not_unify() {
        assert_eq!(unify(&expr("a."), &expr("b.")), None);
    }

    #[test]
    fn repeated_variable_needs_equal_values() {
        let pattern = expr("eq(X, X).");
        let bindings = unify(&expr("eq(f(a), f(a))."), &pattern).unwrap();
        assert_eq!(bindings.len(), 2);
        // Shape fits, values disagree.
        assert!(structurally_matches(&expr("eq(a, b)."), &pattern));
        assert_eq!(unify(&expr("eq(a, b)."), &pattern), None);
    }

    #[test]
    fn instantiate_substitutes_at_every_depth() {
        let bindings = unify(&expr("pair(a, b)."), &expr("pair(X, Y).")).unwrap();
        let body = expr("[Y, f(g(X)), Z].");
        assert_eq!(instantiate(&body, &bindings), expr("[b, f(g(a)), Z]."));
    }

    #[test]
    fn instantiate_leaves_the_body_untouched() {
        let body = expr("f(X).");
        let before = body.clone();
        let bindings = vec![Binding { variable: "X".to_string(), value: expr("a.") }];
        let _ = instantiate(&body, &bindings);
        assert_eq!(body, before);
    }

    #[test]
    fn substituted_values_are_not_rewritten_again() {
        let bindings = vec![
            Binding { variable: "X".to_string(), value: expr("Y.") },
            Binding { variable: "Y".to_string(), value: expr("b.") },
        ];
        assert_eq!(instantiate(&expr("f(X, Y)."), &bindings), expr("f(Y, b)."));
    }
}
