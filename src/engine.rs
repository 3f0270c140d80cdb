//! Front end and rewriting engine.
//!
//! The engine is split into focused submodules under `src/engine/`, one per
//! pipeline stage, while keeping the public paths flat (for example
//! `crate::engine::Lexer` and `crate::engine::Engine`).
//!
//! ## How the parts work together
//!
//! ```text
//! source ── Lexer::next_statement ──┐   (lexer.rs, one call per `.`)
//!                                   │
//!                                   v
//!                         to_postfix + desugar_quoted   (postfix.rs)
//!                                   │
//!                                   v
//!                         AstBuilder::build             (builder.rs)
//!                                   │
//!                    Frontend yields Statement          (frontend.rs)
//!                                   │
//!                   ┌───────────────┴────────────────┐
//!             root is `->`                      anything else
//!                   │                                │
//!        RuleSet::register (rule_set.rs)   Engine::rewrite (rewriter.rs)
//!                                            - TriggerInfo::scan gates rules
//!                                            - find_matches per rule (resolve.rs)
//!                                            - unify + instantiate (matcher.rs)
//!                                            - TermKey cycle guard (dedup.rs)
//!                                            - repeat to a fixpoint
//! ```
//!
//! Statement boundaries are driven by the lexer: every `.` ends a statement and
//! the parsing stages run on that statement's tokens alone, with all stacks
//! local to the call. A malformed statement yields a `ParseError` and the
//! front end carries on with the next one.
//!
//! The rewriting side leans on **fixpoint iteration**: apply the first rule
//! that matches anywhere in the query, restart from the first rule, and stop
//! once a full scan changes nothing (or a step budget or cycle check trips).
//!
//! ## Debugging
//!
//! Set `BRIAN_DEBUG_REWRITE=1` to print lexing, rule registration and rewrite
//! traces to stderr.

#[path = "engine/builder.rs"]
mod builder;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/error.rs"]
mod error;
#[path = "engine/frontend.rs"]
mod frontend;
#[path = "engine/lexer.rs"]
mod lexer;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/postfix.rs"]
mod postfix;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/rewriter.rs"]
mod rewriter;
#[path = "engine/rule_set.rs"]
mod rule_set;
#[path = "engine/trigger.rs"]
mod trigger;

pub use builder::AstBuilder;
pub use error::{LexWarning, LexWarningKind, ParseError, ParseErrorKind};
pub use frontend::Frontend;
pub use lexer::{LexedStatement, Lexer, TokenClass, tokenize};
pub use matcher::{Binding, instantiate, structurally_matches, unify};
pub use metrics::{RewriteMetrics, RunMetrics, StepMetrics};
pub use postfix::{desugar_quoted, to_postfix};
pub use resolve::{Match, find_matches};
pub use rewriter::{Engine, RewriteOutcome, Termination};
pub use rule_set::{KindMask, Rule, RuleId, RuleSet};
pub use trigger::TriggerInfo;
