//! Emission: serialize a statement tree back to target source text.
//!
//! The emitter walks the tree with an explicit work stack, so nesting depth
//! is bounded by heap, not by the native call stack. It only reads the
//! tree; every spelling decision is delegated to the `Dialect`.

mod stmts;

#[cfg(test)]
mod tests;

use tracing::{debug, warn};

use crate::dialect::Dialect;
use crate::tree::{StatementTree, StmtId};

/// Pending emitter work. Pushed in reverse so that pops come out in
/// source order.
enum Task {
    Visit(StmtId),
    /// A full line at the current depth.
    Line(String),
    /// A closing brace followed by `suffix` on the same line.
    Close(String),
    Indent,
    Dedent,
}

pub struct Emitter<'t> {
    tree: &'t StatementTree,
    dialect: &'t dyn Dialect,
    out: String,
    depth: usize,
    /// Indent unit repeated `depth` times, kept in step with `depth`.
    prefix: String,
    stack: Vec<Task>,
}

impl<'t> Emitter<'t> {
    pub fn new(tree: &'t StatementTree, dialect: &'t dyn Dialect) -> Self {
        Self {
            tree,
            dialect,
            out: String::new(),
            depth: 0,
            prefix: String::new(),
            stack: Vec::new(),
        }
    }

    /// Emit the subtree rooted at `id`. The tree root is printed without
    /// its brackets.
    pub fn emit(mut self, id: StmtId) -> String {
        debug!(dialect = self.dialect.name(), root = %id, "emitting");
        if !self.tree.contains(id) {
            warn!(%id, "emit requested for unknown statement");
            return self.out;
        }
        if id == self.tree.root() {
            let children = self.tree.children(id);
            self.stack
                .extend(children.iter().rev().map(|c| Task::Visit(*c)));
        } else {
            self.stack.push(Task::Visit(id));
        }
        self.run();
        self.out
    }

    fn run(&mut self) {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Visit(id) => self.visit(id),
                Task::Line(text) => self.line(&text),
                Task::Close(suffix) => self.line(&format!("}}{}", suffix)),
                Task::Indent => {
                    self.depth += 1;
                    self.prefix.push_str(&self.dialect.style().indent);
                }
                Task::Dedent => {
                    if self.depth > 0 {
                        self.depth -= 1;
                        let unit = self.dialect.style().indent.len();
                        self.prefix.truncate(self.prefix.len() - unit);
                    }
                }
            }
        }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(&self.prefix);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Labels, cases and access markers sit one level out.
    fn outdented(&mut self, text: &str) {
        let unit = self.dialect.style().indent.len();
        let keep = self.prefix.len().saturating_sub(unit);
        self.out.push_str(&self.prefix[..keep]);
        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// Emit the subtree rooted at `id` for `dialect`.
pub fn emit(tree: &StatementTree, id: StmtId, dialect: &dyn Dialect) -> String {
    Emitter::new(tree, dialect).emit(id)
}

/// Emit the whole tree, preceded by the dialect's prelude.
pub fn emit_program(tree: &StatementTree, dialect: &dyn Dialect) -> String {
    let mut out = String::new();
    if let Some(prelude) = dialect.prelude() {
        out.push_str(prelude);
        out.push('\n');
    }
    out.push_str(&emit(tree, tree.root(), dialect));
    out
}
