extern crate self as brian;

#[macro_use]
mod macros;
mod api;
mod engine;
mod formula;


pub use api::{
    Options, ParsedProgram, RunReport, StatementResult, StepSummary, parse_program, parse_statement, run,
};
pub use engine::{
    AstBuilder, Binding, Engine, Frontend, KindMask, LexWarning, LexWarningKind, LexedStatement, Lexer, Match,
    ParseError, ParseErrorKind, RewriteMetrics, RewriteOutcome, Rule, RuleId, RuleSet, RunMetrics, StepMetrics,
    Termination, TokenClass, TriggerInfo, desugar_quoted, find_matches, instantiate, structurally_matches,
    to_postfix, tokenize, unify,
};

use once_cell::sync::Lazy;

/// Set when `BRIAN_DEBUG_REWRITE` is present in the environment; read once.
#[doc(hidden)]
pub static DEBUG_REWRITE: Lazy<bool> = Lazy::new(|| std::env::var_os("BRIAN_DEBUG_REWRITE").is_some());

// --- Source positions -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Range { start, end }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn cover(self, other: Range) -> Range {
        Range { start: self.start.min(other.start), end: self.end.max(other.end) }
    }
}

// --- Tokens -----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BinaryOp,
    Variable,
    Constant,
    Imply,
    Quoted,
    /// A constant written directly before `(`, as in `likes(`. The paren is
    /// part of the token.
    Functor,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    /// `,`: a binary operator, but the only right-associative one.
    Comma,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub range: Range,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, range: Range) -> Self {
        Token { text: text.into(), kind, range }
    }
}

// --- Expression trees -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    BinaryOp,
    Variable,
    Constant,
    Imply,
    Bracket,
    Brace,
    /// Function-call term `name(args)`; shaped like a container.
    Compound,
}

impl NodeKind {
    /// Container nodes only ever populate their right child.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Bracket | NodeKind::Brace | NodeKind::Compound)
    }
}

/// Expression tree node. Each child is exclusively owned by its parent, so a
/// `clone()` is always a full deep copy.
///
/// Equality is structural: `id` is a diagnostic serial and is ignored.
///
/// Lists nest right-deep through their comma chain, so a long literal is a
/// very deep tree. Clone, drop, equality and every engine walk use an
/// explicit work stack instead of recursion.
#[derive(Debug)]
pub struct Expr {
    pub id: usize,
    pub text: String,
    pub kind: NodeKind,
    pub left: Option<Box<Expr>>,
    pub right: Option<Box<Expr>>,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.kind != b.kind || a.text != b.text {
                return false;
            }
            for pair in [(a.left(), b.left()), (a.right(), b.right())] {
                match pair {
                    (None, None) => {}
                    (Some(x), Some(y)) => pending.push((x, y)),
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for Expr {}

impl Clone for Expr {
    fn clone(&self) -> Self {
        self.copy_with(|_| None)
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Expr>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

/// Pre-order iterator over a tree: node, left subtree, right subtree.
pub struct Preorder<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<&'a Expr> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right() {
            self.stack.push(right);
        }
        if let Some(left) = node.left() {
            self.stack.push(left);
        }
        Some(node)
    }
}

/// Which child of a node a path step descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Location of a subterm, as the sequence of child steps from the root.
/// The empty path is the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(pub Vec<Side>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn child(&self, side: Side) -> Path {
        let mut steps = self.0.clone();
        steps.push(side);
        Path(steps)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl Expr {
    pub fn leaf(id: usize, text: impl Into<String>, kind: NodeKind) -> Self {
        Expr { id, text: text.into(), kind, left: None, right: None }
    }

    pub fn binary(id: usize, text: impl Into<String>, kind: NodeKind, left: Expr, right: Expr) -> Self {
        Expr { id, text: text.into(), kind, left: Some(Box::new(left)), right: Some(Box::new(right)) }
    }

    pub fn container(id: usize, text: impl Into<String>, kind: NodeKind, inner: Option<Expr>) -> Self {
        Expr { id, text: text.into(), kind, left: None, right: inner.map(Box::new) }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }

    pub fn left(&self) -> Option<&Expr> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Expr> {
        self.right.as_deref()
    }

    /// Subterm at `path`, if the path exists in this tree.
    pub fn subterm(&self, path: &Path) -> Option<&Expr> {
        let mut node = self;
        for side in &path.0 {
            node = match side {
                Side::Left => node.left()?,
                Side::Right => node.right()?,
            };
        }
        Some(node)
    }

    fn subterm_mut(&mut self, path: &Path) -> Option<&mut Expr> {
        let mut node = self;
        for side in &path.0 {
            node = match side {
                Side::Left => node.left.as_deref_mut()?,
                Side::Right => node.right.as_deref_mut()?,
            };
        }
        Some(node)
    }

    /// Replace the subterm at `path`, returning the one that was there.
    pub fn replace_at(&mut self, path: &Path, replacement: Expr) -> Option<Expr> {
        let slot = self.subterm_mut(path)?;
        Some(std::mem::replace(slot, replacement))
    }

    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }

    /// Variable names in pre-order, one entry per occurrence.
    pub fn variables(&self) -> Vec<&str> {
        self.preorder().filter(|node| node.is_variable()).map(|node| node.text.as_str()).collect()
    }

    /// Deep copy, rebuilt bottom-up. `replace` is offered every node on the
    /// way down; when it returns a tree, that tree is used in place of the
    /// node and the node's children are not visited.
    pub(crate) fn copy_with(&self, mut replace: impl FnMut(&Expr) -> Option<Expr>) -> Expr {
        enum Visit<'a> {
            Enter(&'a Expr),
            Exit(&'a Expr),
        }

        let mut work = vec![Visit::Enter(self)];
        let mut built: Vec<Expr> = Vec::new();
        while let Some(visit) = work.pop() {
            match visit {
                Visit::Enter(node) => {
                    if let Some(replacement) = replace(node) {
                        built.push(replacement);
                        continue;
                    }
                    work.push(Visit::Exit(node));
                    if let Some(right) = node.right() {
                        work.push(Visit::Enter(right));
                    }
                    if let Some(left) = node.left() {
                        work.push(Visit::Enter(left));
                    }
                }
                Visit::Exit(node) => {
                    // Left was finished first, so right sits on top.
                    let right = if node.right.is_some() { built.pop().map(Box::new) } else { None };
                    let left = if node.left.is_some() { built.pop().map(Box::new) } else { None };
                    built.push(Expr { id: node.id, text: node.text.clone(), kind: node.kind, left, right });
                }
            }
        }
        built.pop().expect("copy leaves exactly one tree")
    }
}

// --- Statements -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Rule,
    Query,
}

/// One `.`-terminated top-level formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Zero-based position among the `.`-terminated statements of the source.
    pub index: usize,
    pub range: Range,
    pub root: Expr,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        if self.root.kind == NodeKind::Imply { StatementKind::Rule } else { StatementKind::Query }
    }

    pub fn is_rule(&self) -> bool {
        self.kind() == StatementKind::Rule
    }

    /// `(head, body)` when this statement is a rule.
    pub fn as_rule(&self) -> Option<(&Expr, &Expr)> {
        if !self.is_rule() {
            return None;
        }
        Some((self.root.left()?, self.root.right()?))
    }
}
