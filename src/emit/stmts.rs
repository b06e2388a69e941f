use tracing::{trace, warn};

use super::{Emitter, Task};
use crate::dialect::DialectSpelling;
use crate::syntax::{FunctionSig, Spelling, VarDecl};
use crate::tree::{Stmt, StmtId};

impl Emitter<'_> {
    /// Print one statement's own lines and schedule its sub-statements.
    pub(super) fn visit(&mut self, id: StmtId) {
        let tree = self.tree;
        let dialect = self.dialect;
        let Some(stmt) = tree.get(id) else {
            warn!(%id, "skipping unknown statement");
            return;
        };
        trace!(%id, kind = %stmt.kind(), depth = self.depth, "visit");
        let sp = DialectSpelling(dialect);

        match stmt.node() {
            Stmt::Block(body) => {
                if id == tree.root() {
                    self.schedule(body.children(), None, Vec::new());
                } else {
                    self.line("{");
                    self.schedule(body.children(), Some(String::new()), Vec::new());
                }
            }
            Stmt::Pragma(tok) => {
                if let Some(text) = dialect.pragma(tok.as_str()) {
                    self.line(&format!("#pragma {}", text));
                }
            }
            Stmt::Function(sig) => {
                let header = self.signature(sig);
                self.line(&format!("{};", header));
            }
            Stmt::FunctionDecl { sig, body } => {
                let header = self.signature(sig);
                self.open(&header);
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::ClassAccess(access) => self.outdented(&format!("{}:", access.as_str())),
            Stmt::Expression(expr) => self.line(&format!("{};", expr.render(&sp))),
            Stmt::Declaration(decls) => self.line(&format!("{};", render_decls(decls, &sp))),
            Stmt::Goto(label) => self.line(&format!("goto {};", label.as_str())),
            Stmt::GotoLabel(label) => self.outdented(&format!("{}:", label.as_str())),
            Stmt::Namespace { name, body } => {
                if dialect.supports_namespaces() {
                    self.open(&format!("namespace {}", name.as_str()));
                    self.schedule(body.children(), Some(String::new()), Vec::new());
                } else {
                    self.schedule(body.children(), None, Vec::new());
                }
            }
            Stmt::If {
                condition,
                body,
                elifs,
                else_branch,
            } => {
                let header = format!("if ({})", self.inline(*condition));
                self.open(&header);
                let after = elifs
                    .iter()
                    .chain(else_branch.iter())
                    .map(|e| Task::Visit(*e))
                    .collect();
                self.schedule(body.children(), Some(String::new()), after);
            }
            Stmt::Elif { condition, body } => {
                let header = format!("else if ({})", self.inline(*condition));
                self.open_continuation(&header);
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::Else(body) => {
                self.open_continuation("else");
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let slot = |s: &Option<StmtId>| s.map(|id| self.inline(id)).unwrap_or_default();
                let mut header = format!("for ({};", slot(init));
                for part in [slot(test), slot(update)] {
                    if !part.is_empty() {
                        header.push(' ');
                        header.push_str(&part);
                    }
                    header.push(';');
                }
                // The last separator is the closing paren, not a `;`.
                header.pop();
                header.push(')');
                self.open(&header);
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::While {
                condition,
                body,
                do_while: false,
            } => {
                let header = format!("while ({})", self.inline(*condition));
                self.open(&header);
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::While {
                condition,
                body,
                do_while: true,
            } => {
                let tail = format!("while ({});", self.inline(*condition));
                self.open("do");
                if dialect.style().brace_on_new_line {
                    self.schedule(body.children(), Some(String::new()), vec![Task::Line(tail)]);
                } else {
                    self.schedule(body.children(), Some(format!(" {}", tail)), Vec::new());
                }
            }
            Stmt::Switch { condition, body } => {
                let header = format!("switch ({})", self.inline(*condition));
                self.open(&header);
                self.schedule(body.children(), Some(String::new()), Vec::new());
            }
            Stmt::Case(value) => self.outdented(&format!("case {}:", value.render(&sp))),
            Stmt::Default => self.outdented("default:"),
            Stmt::Continue => self.line("continue;"),
            Stmt::Break => self.line("break;"),
            Stmt::Return(None) => self.line("return;"),
            Stmt::Return(Some(value)) => self.line(&format!("return {};", value.render(&sp))),
        }
    }

    /// Print a header followed by an opening brace, honoring brace style.
    fn open(&mut self, header: &str) {
        let dialect = self.dialect;
        if dialect.style().brace_on_new_line {
            self.line(header);
            self.line("{");
        } else {
            self.line(&format!("{} {{", header));
        }
    }

    /// `else` / `else if` headers join the preceding `}` when cuddling.
    fn open_continuation(&mut self, header: &str) {
        let dialect = self.dialect;
        let style = dialect.style();
        if !style.cuddle_else || !self.out.ends_with("}\n") {
            self.open(header);
            return;
        }
        self.out.pop();
        self.out.push(' ');
        self.out.push_str(header);
        if style.brace_on_new_line {
            self.out.push('\n');
            self.line("{");
        } else {
            self.out.push_str(" {\n");
        }
    }

    /// Queue `children` one level deeper, then the closing brace (when
    /// `close` is set) and finally `after`, all in source order.
    fn schedule(&mut self, children: &[StmtId], close: Option<String>, after: Vec<Task>) {
        self.stack.extend(after.into_iter().rev());
        match close {
            Some(suffix) => {
                self.stack.push(Task::Close(suffix));
                self.stack.push(Task::Dedent);
                self.stack.extend(children.iter().rev().map(|c| Task::Visit(*c)));
                self.stack.push(Task::Indent);
            }
            None => self.stack.extend(children.iter().rev().map(|c| Task::Visit(*c))),
        }
    }

    /// Conditions and for-slots print without their terminator.
    fn inline(&self, id: StmtId) -> String {
        let sp = DialectSpelling(self.dialect);
        match self.tree.get(id).map(|s| s.node()) {
            Some(Stmt::Expression(expr)) => expr.render(&sp),
            Some(Stmt::Declaration(decls)) => render_decls(decls, &sp),
            Some(other) => {
                warn!(%id, kind = %other.kind(), "statement has no inline form");
                String::new()
            }
            None => String::new(),
        }
    }

    fn signature(&self, sig: &FunctionSig) -> String {
        let sp = DialectSpelling(self.dialect);
        match self.dialect.function_prefix(sig.kind) {
            Some(prefix) if !prefix.is_empty() => format!("{} {}", prefix, sig.render(&sp)),
            _ => sig.render(&sp),
        }
    }
}

/// `int a = 0, *b` style: consecutive entries sharing a base type are
/// joined after a single base.
pub(super) fn render_decls(decls: &[VarDecl], sp: &dyn Spelling) -> String {
    let mut out = String::new();
    let mut prev: Option<String> = None;
    for decl in decls {
        let base = decl.ty.render_base(sp);
        if prev.as_deref() == Some(base.as_str()) {
            out.push_str(", ");
        } else {
            if prev.is_some() {
                out.push_str("; ");
            }
            out.push_str(&base);
            out.push(' ');
        }
        out.push_str(&decl.render_tail(sp));
        prev = Some(base);
    }
    out
}
