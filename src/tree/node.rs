use std::fmt;

use serde::Deserialize;

use super::kind::StmtKind;
use super::scope::Scope;
use crate::syntax::{Expr, FunctionSig, Span, Token, VarDecl};

/// Handle of a statement inside its `StatementTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(pub(crate) u32);

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

/// Child sequence plus the names declared at this level.
///
/// Only the tree can add children; a `Block` handed to `StatementTree::add`
/// is always empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub(crate) children: Vec<StmtId>,
    pub(crate) scope: Scope,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[StmtId] {
        &self.children
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// Statement payloads. Every `StmtId` stored in a variant is owned by that
/// statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Block),
    Pragma(Token),
    /// Prototype without a body.
    Function(FunctionSig),
    FunctionDecl {
        sig: FunctionSig,
        body: Block,
    },
    ClassAccess(Access),
    Expression(Expr),
    Declaration(Vec<VarDecl>),
    Goto(Token),
    GotoLabel(Token),
    Namespace {
        name: Token,
        body: Block,
    },
    If {
        condition: StmtId,
        body: Block,
        elifs: Vec<StmtId>,
        else_branch: Option<StmtId>,
    },
    Elif {
        condition: StmtId,
        body: Block,
    },
    Else(Block),
    For {
        init: Option<StmtId>,
        test: Option<StmtId>,
        update: Option<StmtId>,
        body: Block,
    },
    While {
        condition: StmtId,
        body: Block,
        do_while: bool,
    },
    Switch {
        condition: StmtId,
        body: Block,
    },
    Case(Expr),
    Default,
    Continue,
    Break,
    Return(Option<Expr>),
}

impl Stmt {
    pub fn block() -> Self {
        Stmt::Block(Block::new())
    }

    pub fn function_decl(sig: FunctionSig) -> Self {
        Stmt::FunctionDecl {
            sig,
            body: Block::new(),
        }
    }

    pub fn namespace(name: &str) -> Self {
        Stmt::Namespace {
            name: Token::ident(name),
            body: Block::new(),
        }
    }

    pub fn if_(condition: StmtId) -> Self {
        Stmt::If {
            condition,
            body: Block::new(),
            elifs: Vec::new(),
            else_branch: None,
        }
    }

    pub fn elif(condition: StmtId) -> Self {
        Stmt::Elif {
            condition,
            body: Block::new(),
        }
    }

    pub fn else_() -> Self {
        Stmt::Else(Block::new())
    }

    pub fn for_(init: Option<StmtId>, test: Option<StmtId>, update: Option<StmtId>) -> Self {
        Stmt::For {
            init,
            test,
            update,
            body: Block::new(),
        }
    }

    pub fn while_(condition: StmtId) -> Self {
        Stmt::While {
            condition,
            body: Block::new(),
            do_while: false,
        }
    }

    pub fn do_while(condition: StmtId) -> Self {
        Stmt::While {
            condition,
            body: Block::new(),
            do_while: true,
        }
    }

    pub fn switch(condition: StmtId) -> Self {
        Stmt::Switch {
            condition,
            body: Block::new(),
        }
    }

    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Block(_) => StmtKind::Block,
            Stmt::Pragma(_) => StmtKind::Pragma,
            Stmt::Function(_) => StmtKind::Function,
            Stmt::FunctionDecl { .. } => StmtKind::FunctionDecl,
            Stmt::ClassAccess(_) => StmtKind::ClassAccess,
            Stmt::Expression(_) => StmtKind::Expression,
            Stmt::Declaration(_) => StmtKind::Declaration,
            Stmt::Goto(_) => StmtKind::Goto,
            Stmt::GotoLabel(_) => StmtKind::GotoLabel,
            Stmt::Namespace { .. } => StmtKind::Namespace,
            Stmt::If { .. } => StmtKind::If,
            Stmt::Elif { .. } => StmtKind::Elif,
            Stmt::Else(_) => StmtKind::Else,
            Stmt::For { .. } => StmtKind::For,
            Stmt::While { .. } => StmtKind::While,
            Stmt::Switch { .. } => StmtKind::Switch,
            Stmt::Case(_) => StmtKind::Case,
            Stmt::Default => StmtKind::Default,
            Stmt::Continue => StmtKind::Continue,
            Stmt::Break => StmtKind::Break,
            Stmt::Return(_) => StmtKind::Return,
        }
    }

    pub fn body(&self) -> Option<&Block> {
        match self {
            Stmt::Block(body)
            | Stmt::Else(body)
            | Stmt::FunctionDecl { body, .. }
            | Stmt::Namespace { body, .. }
            | Stmt::If { body, .. }
            | Stmt::Elif { body, .. }
            | Stmt::For { body, .. }
            | Stmt::While { body, .. }
            | Stmt::Switch { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut Block> {
        match self {
            Stmt::Block(body)
            | Stmt::Else(body)
            | Stmt::FunctionDecl { body, .. }
            | Stmt::Namespace { body, .. }
            | Stmt::If { body, .. }
            | Stmt::Elif { body, .. }
            | Stmt::For { body, .. }
            | Stmt::While { body, .. }
            | Stmt::Switch { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Owned sub-statements that are not children: conditions, for-slots,
    /// elif and else entries. Source order.
    pub fn slots(&self) -> Vec<StmtId> {
        match self {
            Stmt::If {
                condition,
                elifs,
                else_branch,
                ..
            } => {
                let mut out = vec![*condition];
                out.extend(elifs.iter().copied());
                out.extend(else_branch.iter().copied());
                out
            }
            Stmt::Elif { condition, .. }
            | Stmt::While { condition, .. }
            | Stmt::Switch { condition, .. } => vec![*condition],
            Stmt::For {
                init, test, update, ..
            } => [*init, *test, *update].into_iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    /// Every owned statement in natural source order: leading slots
    /// (conditions, for-slots), body children, then trailing elif/else.
    pub fn owned(&self) -> Vec<StmtId> {
        let mut out = Vec::new();
        match self {
            Stmt::If {
                condition,
                body,
                elifs,
                else_branch,
            } => {
                out.push(*condition);
                out.extend(body.children.iter().copied());
                out.extend(elifs.iter().copied());
                out.extend(else_branch.iter().copied());
            }
            _ => {
                out.extend(self.slots());
                if let Some(body) = self.body() {
                    out.extend(body.children.iter().copied());
                }
            }
        }
        out
    }

    /// Rewrite every owned id and scope entry through `map`. `None` from
    /// the map aborts with `Err(id)` naming the unmapped id.
    pub(crate) fn remap(
        &self,
        map: &impl Fn(StmtId) -> Option<StmtId>,
    ) -> Result<Stmt, StmtId> {
        let one = |id: StmtId| map(id).ok_or(id);
        let opt = |id: Option<StmtId>| id.map(one).transpose();
        let block = |b: &Block| -> Result<Block, StmtId> {
            let children = b.children.iter().map(|c| one(*c)).collect::<Result<_, _>>()?;
            let mut missing = None;
            let scope = b.scope.remapped(|id| {
                let mapped = map(id);
                if mapped.is_none() {
                    missing = Some(id);
                }
                mapped
            });
            match scope {
                Some(scope) => Ok(Block { children, scope }),
                None => Err(missing.unwrap_or(StmtId(u32::MAX))),
            }
        };

        Ok(match self {
            Stmt::Block(b) => Stmt::Block(block(b)?),
            Stmt::Else(b) => Stmt::Else(block(b)?),
            Stmt::FunctionDecl { sig, body } => Stmt::FunctionDecl {
                sig: sig.clone(),
                body: block(body)?,
            },
            Stmt::Namespace { name, body } => Stmt::Namespace {
                name: name.clone(),
                body: block(body)?,
            },
            Stmt::If {
                condition,
                body,
                elifs,
                else_branch,
            } => Stmt::If {
                condition: one(*condition)?,
                body: block(body)?,
                elifs: elifs.iter().map(|e| one(*e)).collect::<Result<_, _>>()?,
                else_branch: opt(*else_branch)?,
            },
            Stmt::Elif { condition, body } => Stmt::Elif {
                condition: one(*condition)?,
                body: block(body)?,
            },
            Stmt::For {
                init,
                test,
                update,
                body,
            } => Stmt::For {
                init: opt(*init)?,
                test: opt(*test)?,
                update: opt(*update)?,
                body: block(body)?,
            },
            Stmt::While {
                condition,
                body,
                do_while,
            } => Stmt::While {
                condition: one(*condition)?,
                body: block(body)?,
                do_while: *do_while,
            },
            Stmt::Switch { condition, body } => Stmt::Switch {
                condition: one(*condition)?,
                body: block(body)?,
            },
            leaf => leaf.clone(),
        })
    }
}

/// A node in the arena: payload plus its non-owning back-reference.
#[derive(Clone, Debug)]
pub struct Statement {
    pub(crate) parent: Option<StmtId>,
    pub(crate) span: Span,
    pub(crate) node: Stmt,
}

impl Statement {
    pub fn kind(&self) -> StmtKind {
        self.node.kind()
    }

    pub fn parent(&self) -> Option<StmtId> {
        self.parent
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn node(&self) -> &Stmt {
        &self.node
    }

    pub fn body(&self) -> Option<&Block> {
        self.node.body()
    }
}
