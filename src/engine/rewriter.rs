//! Rule-driven rewriting to a fixpoint.
//!
//! This module is the operational core of the engine:
//!
//! - Keep the growing `RuleSet` (rules are registered as the statements that
//!   define them are reached, so a query only sees rules written above it).
//! - Rewrite each query by repeatedly applying the first rule that matches
//!   anywhere in it, until a full scan over the rules changes nothing.
//!
//! ## Step structure
//!
//! ```text
//! scan:  TriggerInfo::scan(term) -> active rules (registration order)
//!        first rule with find_matches(term, head) non-empty
//! step:  for each match site, outermost first:
//!          skip it if an earlier site in this step contains it
//!          instantiate(body, bindings) replaces the subterm
//! check: term seen before?          -> Cycle
//!        step budget used up?       -> StepLimit
//!        no rule matched            -> Normal (fixpoint)
//! ```
//!
//! Rule heads and bodies are only ever read; every replacement is a fresh
//! copy of the body, so the same rule can fire any number of times.

use super::dedup::TermKey;
use super::matcher::instantiate;
use super::metrics::{RewriteMetrics, StepMetrics};
use super::resolve::{Match, find_matches};
use super::rule_set::{Rule, RuleId, RuleSet};
use super::trigger::TriggerInfo;
use crate::{Expr, Options, Path, Statement};
use std::collections::HashSet;
use std::time::Instant;

/// Why rewriting of a query stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No rule applies any more: the term is fully reduced.
    Normal,
    /// `limit` steps were taken and a rule still applied.
    StepLimit { limit: usize },
    /// Step `step` produced a term that had already been seen.
    Cycle { step: usize },
}

impl Termination {
    pub fn is_normal(&self) -> bool {
        matches!(self, Termination::Normal)
    }
}

/// Result of rewriting one query. `term` is the partially reduced term when
/// `termination` is not `Normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub term: Expr,
    pub termination: Termination,
    pub metrics: RewriteMetrics,
}

/// Rewriting engine: the rule set plus the fixpoint loop over it.
#[derive(Debug, Default)]
pub struct Engine {
    rules: RuleSet,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Register `statement` as a rule if its root is `->`.
    pub fn register(&mut self, statement: &Statement) -> Option<RuleId> {
        self.rules.register(statement)
    }

    /// Find the first rule (registration order) that matches somewhere in
    /// `term`, together with all of its match sites.
    fn scan(&self, term: &Expr, options: &Options, metrics: &mut RewriteMetrics) -> Option<(&Rule, Vec<Match>)> {
        metrics.scans += 1;
        let candidates: Vec<RuleId> = if options.gate_rules {
            let active = self.rules.active_for(&TriggerInfo::scan(term));
            let gated = self.rules.len() - active.len();
            if gated > 0 {
                trace!("[rewrite:gated] {}/{} rules active", active.len(), self.rules.len());
            }
            metrics.rules_gated += gated;
            active
        } else {
            (0..self.rules.len()).collect()
        };

        for id in candidates {
            let Some(rule) = self.rules.get(id) else { continue };
            metrics.rules_considered += 1;
            let matches = find_matches(term, &rule.head);
            if !matches.is_empty() {
                return Some((rule, matches));
            }
        }
        None
    }

    /// Rewrite a copy of `query` until no rule applies, the step budget runs
    /// out, or a cycle is detected.
    pub fn rewrite(&self, query: &Expr, options: &Options) -> RewriteOutcome {
        let start = Instant::now();
        let mut metrics = RewriteMetrics::default();
        let mut term = query.clone();
        let mut seen: HashSet<TermKey> = HashSet::new();
        seen.insert(TermKey::from_expr(&term));

        let termination = loop {
            let Some((rule, matches)) = self.scan(&term, options, &mut metrics) else {
                break Termination::Normal;
            };
            if metrics.steps.len() >= options.max_steps {
                break Termination::StepLimit { limit: options.max_steps };
            }

            let step_start = Instant::now();
            let (sites, skipped) = apply_matches(&mut term, &rule.body, matches);
            metrics.steps.push(StepMetrics { rule: rule.id, sites, skipped, duration: step_start.elapsed() });
            trace!(
                "[rewrite:step] step={} rule=\"{}\" sites={} skipped={} term={}",
                metrics.steps.len(),
                rule.label(),
                sites,
                skipped,
                term
            );

            if !seen.insert(TermKey::from_expr(&term)) {
                break Termination::Cycle { step: metrics.steps.len() };
            }
        };

        metrics.total = start.elapsed();
        trace!("[rewrite:done] {} -> {} ({:?}, {} steps)", query, term, termination, metrics.steps.len());
        RewriteOutcome { term, termination, metrics }
    }
}

/// Replace every match site with an instantiated copy of `body`. Sites are
/// visited outermost first; one inside an already replaced site is stale and
/// skipped. Returns `(replaced, skipped)`.
fn apply_matches(term: &mut Expr, body: &Expr, matches: Vec<Match>) -> (usize, usize) {
    let mut replaced: Vec<Path> = Vec::new();
    let mut skipped = 0;
    for m in matches {
        if replaced.iter().any(|done| done.is_prefix_of(&m.site)) {
            skipped += 1;
            continue;
        }
        let replacement = instantiate(body, &m.bindings);
        if term.replace_at(&m.site, replacement).is_some() {
            replaced.push(m.site);
        }
    }
    (replaced.len(), skipped)
}
