//! Rule registry and head indexing.
//!
//! Rules are statements whose root is `->`. They are registered in source
//! order, never removed and never mutated: the rewriter only ever reads a
//! rule's head and instantiates fresh copies of its body.
//!
//! Alongside the rules the set keeps a cheap index used to gate rules per
//! query (see `trigger.rs`):
//!
//! - `always_on`: rules whose head is a bare variable; they can match anywhere.
//! - `by_text`: every other rule, keyed by the text of its head's root node.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `RuleSet::rules` and `RuleSet::metas`; those
//!   vectors stay aligned.
//! - Rule ids are handed out in registration order, which is also the order
//!   the rewriter tries rules in.

use super::trigger::TriggerInfo;
use crate::{Expr, NodeKind, Statement};
use std::collections::HashMap;

/// Rule identifier (index into the rule vector).
pub type RuleId = usize;

bitflags::bitflags! {
    /// Set of node kinds, used both for rule heads and for scanned terms.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindMask: u8 {
        const BINARY   = 1 << 0;
        const VARIABLE = 1 << 1;
        const CONSTANT = 1 << 2;
        const IMPLY    = 1 << 3;
        const BRACKET  = 1 << 4;
        const BRACE    = 1 << 5;
        const COMPOUND = 1 << 6;
    }
}

impl KindMask {
    pub fn of(kind: NodeKind) -> Self {
        match kind {
            NodeKind::BinaryOp => KindMask::BINARY,
            NodeKind::Variable => KindMask::VARIABLE,
            NodeKind::Constant => KindMask::CONSTANT,
            NodeKind::Imply => KindMask::IMPLY,
            NodeKind::Bracket => KindMask::BRACKET,
            NodeKind::Brace => KindMask::BRACE,
            NodeKind::Compound => KindMask::COMPOUND,
        }
    }
}

/// A registered `head -> body` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: RuleId,
    /// Index of the statement that defined the rule.
    pub statement: usize,
    pub head: Expr,
    pub body: Expr,
}

impl Rule {
    /// Split a rule statement into head and body; `None` for queries.
    pub fn from_statement(id: RuleId, statement: &Statement) -> Option<Rule> {
        let (head, body) = statement.as_rule()?;
        Some(Rule { id, statement: statement.index, head: head.clone(), body: body.clone() })
    }

    /// Display label, e.g. `#0 likes(X,Y) -> friend(X,Y)`.
    pub fn label(&self) -> String {
        format!("#{} {} -> {}", self.id, self.head, self.body)
    }
}

/// What the gate needs to know about a rule head.
#[derive(Clone, Debug)]
pub struct RuleMeta {
    pub root_kind: KindMask,
}

#[derive(Default, Debug)]
pub struct RuleIndex {
    pub always_on: Vec<RuleId>,
    pub by_text: HashMap<String, Vec<RuleId>>,
}

/// Append-only, ordered rule collection.
#[derive(Default, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    metas: Vec<RuleMeta>,
    index: RuleIndex,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `statement` if it is a rule. Returns the new rule's id.
    pub fn register(&mut self, statement: &Statement) -> Option<RuleId> {
        let id = self.rules.len();
        let rule = Rule::from_statement(id, statement)?;

        let meta = if rule.head.is_variable() {
            self.index.always_on.push(id);
            RuleMeta { root_kind: KindMask::VARIABLE }
        } else {
            self.index.by_text.entry(rule.head.text.clone()).or_default().push(id);
            RuleMeta { root_kind: KindMask::of(rule.head.kind) }
        };

        trace!("[rule:register] {}", rule.label());
        self.rules.push(rule);
        self.metas.push(meta);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    /// Rules whose head could match somewhere in the scanned term, in
    /// registration order.
    ///
    /// A head can only match at a node with the same root kind and text, so
    /// a rule whose root text never occurs in the term cannot apply.
    pub fn active_for(&self, info: &TriggerInfo) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = self.index.always_on.clone();
        for text in &info.texts {
            if let Some(candidates) = self.index.by_text.get(text) {
                ids.extend(candidates.iter().copied().filter(|&id| info.kinds.contains(self.metas[id].root_kind)));
            }
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    fn statement(source: &str) -> Statement {
        parse_statement(source).unwrap()
    }

    #[test]
    fn only_implications_register() {
        let mut rules = RuleSet::new();
        assert_eq!(rules.register(&statement("likes(tom, jerry).")), None);
        assert_eq!(rules.register(&statement("likes(X, Y) -> friend(X, Y).")), Some(0));
        assert_eq!(rules.register(&statement("X -> wrapped(X).")), Some(1));
        assert_eq!(rules.len(), 2);

        let rule = rules.get(0).unwrap();
        assert_eq!(rule.head.text, "likes");
        assert_eq!(rule.body.text, "friend");
        assert_eq!(rule.label(), "#0 likes(X,Y) -> friend(X,Y)");
    }

    #[test]
    fn gate_keeps_registration_order_and_variable_heads() {
        let mut rules = RuleSet::new();
        rules.register(&statement("b -> c."));
        rules.register(&statement("X -> X."));
        rules.register(&statement("a -> b."));
        rules.register(&statement("f(X) -> X."));

        let info = TriggerInfo::scan(&statement("g(a, b).").root);
        assert_eq!(rules.active_for(&info), vec![0, 1, 2]);
    }

    #[test]
    fn gate_checks_kind_as_well_as_text() {
        let mut rules = RuleSet::new();
        rules.register(&statement("f(X) -> X."));
        // `f` occurs, but only as a constant.
        let info = TriggerInfo::scan(&statement("[f].").root);
        assert!(rules.active_for(&info).is_empty());
    }
}
