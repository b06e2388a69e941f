//! JSON kernel descriptions.
//!
//! Stands in for the source parser: a description lists statements in
//! source order and is built into a `StatementTree` the way a parser would
//! build it, declaring every declared name in its enclosing scope.
//!
//! ```json
//! { "name": "scale",
//!   "statements": [
//!     { "function_decl": { "sig": { "name": "scale", "kind": "kernel", "returns": { "name": "void" } },
//!                          "body": [ { "return": null } ] } } ] }
//! ```
//!
//! Any statement object may carry a `"span": {"start": s, "end": e}` entry.


use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::syntax::{Expr, FunctionSig, Span, Token, VarDecl};
use crate::tree::{Access, StatementTree, Stmt, StmtId, TreeError};

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("cannot read kernel description '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid kernel description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{source}")]
    Tree {
        #[source]
        source: TreeError,
        span: Span,
    },
}

impl From<DescribeError> for Diagnostic {
    fn from(err: DescribeError) -> Self {
        match err {
            DescribeError::Tree { source, span } => {
                let mut diag = Diagnostic::from(source);
                diag.span = span;
                diag
            }
            DescribeError::Json(e) => Diagnostic::error(e.to_string(), Span::dummy())
                .with_note(format!("at line {}, column {}", e.line(), e.column())),
            other => Diagnostic::error(other.to_string(), Span::dummy()),
        }
    }
}

/// A described statement plus its optional source span.
#[derive(Debug, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct NodeDesc {
    pub node: Node,
    pub span: Span,
}

impl TryFrom<serde_json::Value> for NodeDesc {
    type Error = serde_json::Error;

    fn try_from(mut value: serde_json::Value) -> Result<Self, Self::Error> {
        let span = match value.as_object_mut().and_then(|m| m.remove("span")) {
            Some(span) => serde_json::from_value(span)?,
            None => Span::dummy(),
        };
        Ok(Self {
            node: serde_json::from_value(value)?,
            span,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ElifDesc {
    pub condition: Box<NodeDesc>,
    #[serde(default)]
    pub body: Vec<NodeDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Block(Vec<NodeDesc>),
    Pragma(String),
    Function(FunctionSig),
    FunctionDecl {
        sig: FunctionSig,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    ClassAccess(Access),
    Expression(Expr),
    Declaration(Vec<VarDecl>),
    Goto(Token),
    Label(Token),
    Namespace {
        name: Token,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    If {
        condition: Box<NodeDesc>,
        #[serde(default)]
        body: Vec<NodeDesc>,
        #[serde(default)]
        elifs: Vec<ElifDesc>,
        #[serde(rename = "else", default)]
        else_body: Option<Vec<NodeDesc>>,
    },
    For {
        #[serde(default)]
        init: Option<Box<NodeDesc>>,
        #[serde(default)]
        test: Option<Box<NodeDesc>>,
        #[serde(default)]
        update: Option<Box<NodeDesc>>,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    While {
        condition: Box<NodeDesc>,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    DoWhile {
        condition: Box<NodeDesc>,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    Switch {
        condition: Box<NodeDesc>,
        #[serde(default)]
        body: Vec<NodeDesc>,
    },
    Case(Expr),
    Default,
    Continue,
    Break,
    Return(Option<Expr>),
}

#[derive(Debug, Deserialize)]
pub struct KernelDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub statements: Vec<NodeDesc>,
}

impl KernelDescription {
    pub fn from_json(text: &str) -> Result<Self, DescribeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DescribeError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescribeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Build the statements into a fresh tree under its root block.
    pub fn into_tree(self) -> Result<StatementTree, DescribeError> {
        let mut builder = Builder {
            tree: StatementTree::new(),
        };
        let root = builder.tree.root();
        builder.children(root, self.statements)?;
        debug!(
            kernel = self.name.as_deref().unwrap_or("<unnamed>"),
            statements = builder.tree.len(),
            "built kernel description"
        );
        Ok(builder.tree)
    }
}

/// Description nesting is bounded by serde_json's recursion limit, so the
/// builder recurses.
struct Builder {
    tree: StatementTree,
}

impl Builder {
    fn children(&mut self, owner: StmtId, descs: Vec<NodeDesc>) -> Result<(), DescribeError> {
        for desc in descs {
            let span = desc.span;
            let id = self.node(desc)?;
            self.tree.append(owner, id).map_err(at(span))?;
            self.declare_names(owner, id, span)?;
        }
        Ok(())
    }

    /// Declarations bind their names in the scope they are appended to.
    fn declare_names(&mut self, scope: StmtId, id: StmtId, span: Span) -> Result<(), DescribeError> {
        let names: Vec<String> = match self.tree.get(id).map(|s| s.node()) {
            Some(Stmt::Declaration(decls)) => {
                decls.iter().map(|d| d.name.as_str().to_string()).collect()
            }
            _ => return Ok(()),
        };
        for name in names {
            self.tree.declare(scope, &name, id).map_err(at(span))?;
        }
        Ok(())
    }

    fn add(&mut self, node: Stmt, span: Span) -> Result<StmtId, DescribeError> {
        self.tree.add_spanned(node, span).map_err(at(span))
    }

    /// Build one statement, unattached.
    fn node(&mut self, desc: NodeDesc) -> Result<StmtId, DescribeError> {
        let span = desc.span;
        match desc.node {
            Node::Block(body) => {
                let id = self.add(Stmt::block(), span)?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::Pragma(text) => self.add(Stmt::Pragma(Token::pragma(&text).with_span(span)), span),
            Node::Function(sig) => self.add(Stmt::Function(sig), span),
            Node::FunctionDecl { sig, body } => {
                let id = self.add(Stmt::function_decl(sig), span)?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::ClassAccess(access) => self.add(Stmt::ClassAccess(access), span),
            Node::Expression(e) => self.add(Stmt::Expression(e), span),
            Node::Declaration(decls) => self.add(Stmt::Declaration(decls), span),
            Node::Goto(label) => self.add(Stmt::Goto(label), span),
            Node::Label(label) => self.add(Stmt::GotoLabel(label), span),
            Node::Namespace { name, body } => {
                let id = self.add(
                    Stmt::Namespace {
                        name,
                        body: Default::default(),
                    },
                    span,
                )?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::If {
                condition,
                body,
                elifs,
                else_body,
            } => {
                let cond = self.node(*condition)?;
                let id = self.add(Stmt::if_(cond), span)?;
                self.children(id, body)?;
                for elif in elifs {
                    let elif_span = elif.condition.span;
                    let cond = self.node(*elif.condition)?;
                    let e = self.add(Stmt::elif(cond), elif_span)?;
                    self.tree.add_elif(id, e).map_err(at(elif_span))?;
                    self.children(e, elif.body)?;
                }
                if let Some(else_body) = else_body {
                    let e = self.add(Stmt::else_(), span)?;
                    self.tree.set_else(id, e).map_err(at(span))?;
                    self.children(e, else_body)?;
                }
                Ok(id)
            }
            Node::For {
                init,
                test,
                update,
                body,
            } => {
                let init = init.map(|d| self.node(*d)).transpose()?;
                let test = test.map(|d| self.node(*d)).transpose()?;
                let update = update.map(|d| self.node(*d)).transpose()?;
                let id = self.add(Stmt::for_(init, test, update), span)?;
                if let Some(init) = init {
                    self.declare_names(id, init, span)?;
                }
                self.children(id, body)?;
                Ok(id)
            }
            Node::While { condition, body } => {
                let cond = self.node(*condition)?;
                let id = self.add(Stmt::while_(cond), span)?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::DoWhile { condition, body } => {
                let cond = self.node(*condition)?;
                let id = self.add(Stmt::do_while(cond), span)?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::Switch { condition, body } => {
                let cond = self.node(*condition)?;
                let id = self.add(Stmt::switch(cond), span)?;
                self.children(id, body)?;
                Ok(id)
            }
            Node::Case(value) => self.add(Stmt::Case(value), span),
            Node::Default => self.add(Stmt::Default, span),
            Node::Continue => self.add(Stmt::Continue, span),
            Node::Break => self.add(Stmt::Break, span),
            Node::Return(value) => self.add(Stmt::Return(value), span),
        }
    }
}

fn at(span: Span) -> impl Fn(TreeError) -> DescribeError {
    move |source| DescribeError::Tree { source, span }
}

/// Load a description file and build its tree.
pub fn load_kernel(path: &Path) -> Result<(Option<String>, StatementTree), DescribeError> {
    let desc = KernelDescription::load(path)?;
    let name = desc.name.clone();
    Ok((name, desc.into_tree()?))
}
