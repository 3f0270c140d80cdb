//! Term scanning for rule gating.
//!
//! Before a rewrite pass the rewriter scans the current query term once and
//! records which node kinds and which node texts occur in it. `RuleSet`
//! uses that to skip rules whose head root cannot occur anywhere in the
//! term. The gate is exact in the safe direction: it only drops rules that
//! could not have matched, so results are the same with gating turned off.

use super::rule_set::KindMask;
use crate::Expr;
use std::collections::HashSet;

/// Node kinds and texts present in a term.
#[derive(Debug, Clone)]
pub struct TriggerInfo {
    pub kinds: KindMask,
    pub texts: HashSet<String>,
}

impl TriggerInfo {
    pub fn scan(term: &Expr) -> Self {
        let mut info = TriggerInfo { kinds: KindMask::empty(), texts: HashSet::new() };
        for node in term.preorder() {
            info.kinds |= KindMask::of(node.kind);
            if !info.texts.contains(&node.text) {
                info.texts.insert(node.text.clone());
            }
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_statement;

    #[test]
    fn scan_collects_kinds_and_texts() {
        let term = parse_statement("f([a], X + {}).").unwrap().root;
        let info = TriggerInfo::scan(&term);
        assert!(info.kinds.contains(KindMask::COMPOUND | KindMask::BRACKET | KindMask::BRACE));
        assert!(info.kinds.contains(KindMask::VARIABLE | KindMask::BINARY | KindMask::CONSTANT));
        assert!(!info.kinds.contains(KindMask::IMPLY));
        for text in ["f", "[", "a", ",", "X", "+", "{"] {
            assert!(info.texts.contains(text), "{text}");
        }
    }
}
