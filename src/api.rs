use crate::engine::{
    Engine, Frontend, LexWarning, ParseError, ParseErrorKind, RewriteOutcome, Rule, RuleId, RunMetrics, Termination,
};
use crate::{Expr, Range, Statement};
use std::time::{Duration, Instant};

/// Options that affect rewriting.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum rewrite steps per query before giving up with
    /// [`Termination::StepLimit`].
    pub max_steps: usize,
    /// Skip rules whose head cannot occur in the query. Never changes results.
    pub gate_rules: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { max_steps: 1000, gate_rules: true }
    }
}

/// Everything the front end produced for a source.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub statements: Vec<Statement>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<LexWarning>,
}

/// What happened to one statement during [`run`].
#[derive(Debug, Clone)]
pub enum StatementResult {
    /// The statement was registered as a rule.
    Rule { index: usize, rule: Rule },
    /// The statement was rewritten with the rules registered above it.
    Query { index: usize, original: Expr, outcome: RewriteOutcome },
}

impl StatementResult {
    pub fn index(&self) -> usize {
        match self {
            StatementResult::Rule { index, .. } | StatementResult::Query { index, .. } => *index,
        }
    }

    /// The reduced term of a query.
    pub fn reduced(&self) -> Option<&Expr> {
        match self {
            StatementResult::Query { outcome, .. } => Some(&outcome.term),
            StatementResult::Rule { .. } => None,
        }
    }
}

/// A compact per-step trace entry.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub step: usize,
    pub rule: RuleId,
    pub rule_label: String,
    pub sites: usize,
    pub duration: Duration,
}

/// Result from [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One entry per successfully parsed statement, in source order.
    pub results: Vec<StatementResult>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<LexWarning>,
    pub metrics: RunMetrics,
}

impl RunReport {
    /// True when every statement parsed and every query reached a fixpoint.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && self.results.iter().all(|r| match r {
                StatementResult::Query { outcome, .. } => outcome.termination.is_normal(),
                StatementResult::Rule { .. } => true,
            })
    }

    /// Queries that stopped on the step budget or a cycle.
    pub fn nonterminating(&self) -> impl Iterator<Item = (usize, Termination)> + '_ {
        self.results.iter().filter_map(|r| match r {
            StatementResult::Query { index, outcome, .. } if !outcome.termination.is_normal() => {
                Some((*index, outcome.termination))
            }
            _ => None,
        })
    }

    /// Step-by-step trace of the query at statement `index`.
    pub fn steps_for(&self, index: usize) -> Vec<StepSummary> {
        let rules = self.rules();
        let Some(StatementResult::Query { outcome, .. }) = self.results.iter().find(|r| r.index() == index) else {
            return Vec::new();
        };
        outcome
            .metrics
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepSummary {
                step: i + 1,
                rule: step.rule,
                rule_label: rules
                    .iter()
                    .find(|r| r.id == step.rule)
                    .map(Rule::label)
                    .unwrap_or_else(|| format!("#{}", step.rule)),
                sites: step.sites,
                duration: step.duration,
            })
            .collect()
    }

    /// All registered rules, in registration order.
    pub fn rules(&self) -> Vec<Rule> {
        self.results
            .iter()
            .filter_map(|r| match r {
                StatementResult::Rule { rule, .. } => Some(rule.clone()),
                StatementResult::Query { .. } => None,
            })
            .collect()
    }
}

/// Parse `source` into statements without rewriting anything.
pub fn parse_program(source: &str) -> ParsedProgram {
    let mut frontend = Frontend::new(source);
    let mut statements = Vec::new();
    let mut errors = Vec::new();
    for item in frontend.by_ref() {
        match item {
            Ok(statement) => statements.push(statement),
            Err(err) => errors.push(err),
        }
    }
    ParsedProgram { statements, errors, warnings: frontend.take_warnings() }
}

/// Parse the first statement of `source`.
pub fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    Frontend::new(source)
        .next()
        .unwrap_or_else(|| Err(ParseError::new(ParseErrorKind::EmptyExpression, Range::new(0, source.len()), 0)))
}

/// Parse `source` and process its statements in order: rules are registered,
/// queries are rewritten to a fixpoint with the rules seen so far.
///
/// # Example
/// ```
/// use brian::{Options, run};
///
/// let report = run("likes(X, Y) -> friend(X, Y). likes(tom, jerry).", &Options::default());
/// let reduced = report.results[1].reduced().unwrap();
/// assert_eq!(reduced.to_string(), "friend(tom,jerry)");
/// ```
pub fn run(source: &str, options: &Options) -> RunReport {
    let total_start = Instant::now();
    let mut parse = Duration::ZERO;
    let mut rewrite = Duration::ZERO;

    let mut engine = Engine::new();
    let mut frontend = Frontend::new(source);
    let mut results = Vec::new();
    let mut errors = Vec::new();

    loop {
        let parse_start = Instant::now();
        let item = frontend.next();
        parse += parse_start.elapsed();
        let Some(item) = item else { break };

        let statement = match item {
            Ok(statement) => statement,
            Err(err) => {
                trace!("[parse:error] {err}");
                errors.push(err);
                continue;
            }
        };

        match engine.register(&statement) {
            Some(id) => {
                let rule = engine.rules().get(id).cloned();
                if let Some(rule) = rule {
                    results.push(StatementResult::Rule { index: statement.index, rule });
                }
            }
            None => {
                let rewrite_start = Instant::now();
                let outcome = engine.rewrite(&statement.root, options);
                rewrite += rewrite_start.elapsed();
                results.push(StatementResult::Query { index: statement.index, original: statement.root, outcome });
            }
        }
    }

    RunReport {
        results,
        errors,
        warnings: frontend.take_warnings(),
        metrics: RunMetrics { total: total_start.elapsed(), parse, rewrite },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_program_collects_errors_and_statements() {
        let parsed = parse_program("a. (b. c -> d. \"x");
        assert_eq!(parsed.statements.len(), 2);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].statement, 1);
        assert_eq!(parsed.errors[1].kind, ParseErrorKind::MissingTerminator);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn run_reports_rules_and_queries_in_order() {
        let report = run("a -> b. a. c.", &Options::default());
        assert_eq!(report.results.len(), 3);
        assert!(matches!(report.results[0], StatementResult::Rule { index: 0, .. }));
        assert_eq!(report.results[1].reduced().unwrap().to_string(), "b");
        assert_eq!(report.results[2].reduced().unwrap().to_string(), "c");
        assert!(report.is_clean());
        assert!(report.metrics.parse + report.metrics.rewrite <= report.metrics.total);
    }

    #[test]
    fn step_trace_names_the_rules() {
        let report = run("f(X) -> g(X). g(X) -> h. f(a).", &Options::default());
        let steps = report.steps_for(2);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].rule_label, "#0 f(X) -> g(X)");
        assert_eq!(steps[1].rule, 1);
    }

    #[test]
    fn nonterminating_queries_are_listed() {
        let report = run("a -> b. b -> a. a. c.", &Options::default());
        let stuck: Vec<_> = report.nonterminating().collect();
        assert_eq!(stuck, vec![(2, Termination::Cycle { step: 2 })]);
        assert!(!report.is_clean());
    }
}
