//! Rewrite and run metrics.
//!
//! Small structs used to observe what the engine did:
//!
//! - `RewriteMetrics` for one query: every step taken, which rule fired and
//!   how many sites it rewrote, plus gating counts.
//! - `RunMetrics` for a whole source: time spent in the front end and in
//!   rewriting.

use super::rule_set::RuleId;
use std::time::Duration;

/// One rewrite step: a single rule applied at every independent site.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepMetrics {
    pub rule: RuleId,
    /// Sites replaced in this step.
    pub sites: usize,
    /// Matches dropped because they sat inside a site replaced earlier in the step.
    pub skipped: usize,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RewriteMetrics {
    /// Total elapsed time for [`Engine::rewrite`](super::Engine::rewrite).
    pub total: Duration,
    pub steps: Vec<StepMetrics>,
    /// Rule scans performed (one per step, plus the final scan that found nothing).
    pub scans: usize,
    /// Rules tried across all scans.
    pub rules_considered: usize,
    /// Rules skipped by the trigger gate across all scans.
    pub rules_gated: usize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunMetrics {
    pub total: Duration,
    /// Lexing, postfix conversion and tree building.
    pub parse: Duration,
    /// Time spent in rewriting queries.
    pub rewrite: Duration,
}
