//! The statement tree: an arena of statements linked by owned child ids
//! and non-owning parent back-references.
//!
//! Ownership is explicit. A statement is created unattached by `add`, then
//! handed to exactly one container (`append`, `add_elif`, `set_else`, or as
//! a sub-statement of a newly added node). Destroying a statement destroys
//! everything it owns. Parent links are ids, never handles, so teardown
//! never consults them.
//!
//! Ids are not reused: a destroyed id stays invalid for the life of the
//! tree.

mod clone;
mod error;
mod kind;
mod node;
mod scope;


use std::collections::HashSet;
use std::sync::Arc;

pub use error::TreeError;
pub use kind::StmtKind;
pub use node::{Access, Block, Statement, Stmt, StmtId};
pub use scope::Scope;

use crate::syntax::{Expr, Span};

#[derive(Clone, Debug)]
pub struct StatementTree {
    slots: Vec<Option<Statement>>,
    root: StmtId,
    live: usize,
}

impl Default for StatementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementTree {
    /// A tree holding only its (bracket-less) root block.
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Statement {
                parent: None,
                span: Span::dummy(),
                node: Stmt::block(),
            })],
            root: StmtId(0),
            live: 1,
        }
    }

    pub fn root(&self) -> StmtId {
        self.root
    }

    /// Number of live statements, attached or not.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub(crate) fn next_id(&self) -> StmtId {
        StmtId(self.slots.len() as u32)
    }

    pub fn contains(&self, id: StmtId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: StmtId) -> Option<&Statement> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn stmt(&self, id: StmtId) -> Result<&Statement, TreeError> {
        self.get(id).ok_or(TreeError::UnknownStatement(id))
    }

    fn stmt_mut(&mut self, id: StmtId) -> Result<&mut Statement, TreeError> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownStatement(id))
    }

    pub fn kind(&self, id: StmtId) -> Option<StmtKind> {
        self.get(id).map(Statement::kind)
    }

    pub fn parent(&self, id: StmtId) -> Option<StmtId> {
        self.get(id).and_then(|s| s.parent)
    }

    /// Children of a container; empty for leaves and unknown ids.
    pub fn children(&self, id: StmtId) -> &[StmtId] {
        self.get(id)
            .and_then(Statement::body)
            .map(Block::children)
            .unwrap_or(&[])
    }

    pub fn scope(&self, id: StmtId) -> Option<&Scope> {
        self.get(id).and_then(Statement::body).map(Block::scope)
    }

    /// Parent chain starting at `id` itself.
    pub fn ancestors(&self, id: StmtId) -> impl Iterator<Item = StmtId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), move |cur| {
            self.parent(*cur)
        })
    }

    /// True when `id` is `ancestor` or lies beneath it.
    pub fn is_within(&self, id: StmtId, ancestor: StmtId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    // --- Construction ---

    pub fn add(&mut self, node: Stmt) -> Result<StmtId, TreeError> {
        self.add_spanned(node, Span::dummy())
    }

    /// Create an unattached statement. Every id the payload mentions as an
    /// owned sub-statement is adopted by the new node; all of them must be
    /// live and unattached.
    pub fn add_spanned(&mut self, node: Stmt, span: Span) -> Result<StmtId, TreeError> {
        let id = self.next_id();
        let owned = node.owned();
        let mut seen = HashSet::with_capacity(owned.len());
        for &sub in &owned {
            let stmt = self.stmt(sub)?;
            if sub == self.root {
                return Err(TreeError::Root(sub));
            }
            if let Some(owner) = stmt.parent {
                return Err(TreeError::Ownership { child: sub, owner });
            }
            if !seen.insert(sub) {
                return Err(TreeError::Ownership {
                    child: sub,
                    owner: id,
                });
            }
        }
        self.check_chain_kinds(id, &node)?;

        for &sub in &owned {
            self.stmt_mut(sub)?.parent = Some(id);
        }
        tracing::trace!(%id, kind = %node.kind(), owned = owned.len(), "add statement");
        self.slots.push(Some(Statement {
            parent: None,
            span,
            node,
        }));
        self.live += 1;
        Ok(id)
    }

    /// `elif`/`else` entries may only sit in an `if` chain, and an `if`
    /// chain may only hold them.
    fn check_chain_kinds(&self, id: StmtId, node: &Stmt) -> Result<(), TreeError> {
        let is_chain = |sub: StmtId| {
            matches!(
                self.kind(sub),
                Some(StmtKind::Elif) | Some(StmtKind::Else)
            )
        };
        if let Stmt::If {
            elifs, else_branch, ..
        } = node
        {
            if elifs.iter().any(|e| self.kind(*e) != Some(StmtKind::Elif)) {
                return Err(TreeError::MalformedChain {
                    at: id,
                    reason: "elif list holds a non-elif statement",
                });
            }
            if else_branch.is_some_and(|e| self.kind(e) != Some(StmtKind::Else)) {
                return Err(TreeError::MalformedChain {
                    at: id,
                    reason: "else slot holds a non-else statement",
                });
            }
        }
        let mut plain = node.slots();
        if let Stmt::If { condition, .. } = node {
            plain = vec![*condition];
        }
        if let Some(body) = node.body() {
            plain.extend(body.children.iter().copied());
        }
        if plain.into_iter().any(is_chain) {
            return Err(TreeError::MalformedChain {
                at: id,
                reason: "elif/else entries attach only to an if",
            });
        }
        Ok(())
    }

    /// Checks shared by every attach operation.
    fn check_attachable(&self, owner: StmtId, child: StmtId) -> Result<(), TreeError> {
        self.stmt(owner)?;
        let stmt = self.stmt(child)?;
        if child == self.root {
            return Err(TreeError::Root(child));
        }
        if let Some(current) = stmt.parent {
            return Err(TreeError::Ownership {
                child,
                owner: current,
            });
        }
        if self.is_within(owner, child) {
            return Err(TreeError::Cycle { child, owner });
        }
        Ok(())
    }

    /// Append `child` to the end of `owner`'s child sequence.
    pub fn append(&mut self, owner: StmtId, child: StmtId) -> Result<(), TreeError> {
        let kind = self.stmt(owner)?.kind();
        if !kind.is_container() {
            return Err(TreeError::NotAContainer { id: owner, kind });
        }
        if matches!(self.kind(child), Some(StmtKind::Elif) | Some(StmtKind::Else)) {
            return Err(TreeError::MalformedChain {
                at: child,
                reason: "elif/else entries attach only to an if",
            });
        }
        self.check_attachable(owner, child)?;

        if let Some(body) = self.stmt_mut(owner)?.node.body_mut() {
            body.children.push(child);
        }
        self.stmt_mut(child)?.parent = Some(owner);
        tracing::trace!(%owner, %child, "append");
        Ok(())
    }

    /// `add` followed by `append`.
    pub fn push(&mut self, owner: StmtId, node: Stmt) -> Result<StmtId, TreeError> {
        let kind = self.stmt(owner)?.kind();
        if !kind.is_container() {
            return Err(TreeError::NotAContainer { id: owner, kind });
        }
        if matches!(node.kind(), StmtKind::Elif | StmtKind::Else) {
            return Err(TreeError::MalformedChain {
                at: owner,
                reason: "elif/else entries attach only to an if",
            });
        }
        let id = self.add(node)?;
        self.append(owner, id)?;
        Ok(id)
    }

    /// Shorthand for an unattached expression statement, the usual
    /// condition payload.
    pub fn expr(&mut self, expr: Expr) -> Result<StmtId, TreeError> {
        self.add(Stmt::Expression(expr))
    }

    pub fn add_elif(&mut self, if_id: StmtId, elif: StmtId) -> Result<(), TreeError> {
        self.check_chain_target(if_id)?;
        if self.stmt(elif)?.kind() != StmtKind::Elif {
            return Err(TreeError::MalformedChain {
                at: elif,
                reason: "expected an elif statement",
            });
        }
        if self.stmt(elif)?.parent.is_some() {
            return Err(TreeError::MalformedChain {
                at: elif,
                reason: "elif already belongs to an if",
            });
        }
        if let Stmt::If {
            else_branch: Some(_),
            ..
        } = self.stmt(if_id)?.node
        {
            return Err(TreeError::MalformedChain {
                at: if_id,
                reason: "elif cannot follow the else",
            });
        }
        self.check_attachable(if_id, elif)?;

        if let Stmt::If { elifs, .. } = &mut self.stmt_mut(if_id)?.node {
            elifs.push(elif);
        }
        self.stmt_mut(elif)?.parent = Some(if_id);
        Ok(())
    }

    pub fn set_else(&mut self, if_id: StmtId, else_id: StmtId) -> Result<(), TreeError> {
        self.check_chain_target(if_id)?;
        if self.stmt(else_id)?.kind() != StmtKind::Else {
            return Err(TreeError::MalformedChain {
                at: else_id,
                reason: "expected an else statement",
            });
        }
        if self.stmt(else_id)?.parent.is_some() {
            return Err(TreeError::MalformedChain {
                at: else_id,
                reason: "else already belongs to an if",
            });
        }
        if let Stmt::If {
            else_branch: Some(_),
            ..
        } = self.stmt(if_id)?.node
        {
            return Err(TreeError::MalformedChain {
                at: if_id,
                reason: "else cannot follow another else",
            });
        }
        self.check_attachable(if_id, else_id)?;

        if let Stmt::If { else_branch, .. } = &mut self.stmt_mut(if_id)?.node {
            *else_branch = Some(else_id);
        }
        self.stmt_mut(else_id)?.parent = Some(if_id);
        Ok(())
    }

    fn check_chain_target(&self, if_id: StmtId) -> Result<(), TreeError> {
        if self.stmt(if_id)?.kind() != StmtKind::If {
            return Err(TreeError::MalformedChain {
                at: if_id,
                reason: "elif/else attached to a non-if statement",
            });
        }
        Ok(())
    }

    // --- Scopes ---

    /// Declare `name` at `container`'s own level. `decl` must be
    /// `container` itself or lie inside its subtree, so every scope entry
    /// is purged when its declaration is detached.
    pub fn declare(
        &mut self,
        container: StmtId,
        name: &str,
        decl: StmtId,
    ) -> Result<(), TreeError> {
        self.stmt(decl)?;
        let kind = self.stmt(container)?.kind();
        if !kind.is_container() {
            return Err(TreeError::NotAContainer {
                id: container,
                kind,
            });
        }
        if !self.is_within(decl, container) {
            return Err(TreeError::ForeignDeclaration {
                name: name.to_string(),
                scope: container,
                decl,
            });
        }
        let stmt = self.stmt_mut(container)?;
        let body = stmt.node.body_mut().ok_or(TreeError::NotAContainer {
            id: container,
            kind,
        })?;
        body.scope
            .insert(Arc::from(name), decl)
            .map_err(|existing| TreeError::DuplicateDeclaration {
                name: name.to_string(),
                scope: container,
                existing,
            })?;
        tracing::trace!(%container, name, %decl, "declare");
        Ok(())
    }

    /// Nearest declaration of `name` visible from `from`, walking outward
    /// through enclosing containers only.
    pub fn resolve(&self, from: StmtId, name: &str) -> Option<StmtId> {
        self.ancestors(from)
            .filter_map(|id| self.scope(id))
            .find_map(|scope| scope.get(name))
    }

    // --- Removal ---

    /// Unlink `id` from its owner. Scope entries of enclosing containers
    /// that pointed into the detached subtree are dropped with it.
    pub fn detach(&mut self, id: StmtId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::Root(id));
        }
        let Some(owner) = self.stmt(id)?.parent else {
            return Ok(());
        };

        let owner_stmt = self.stmt_mut(owner)?;
        let mut unlinked = false;
        match &mut owner_stmt.node {
            Stmt::If {
                elifs, else_branch, ..
            } => {
                if let Some(pos) = elifs.iter().position(|e| *e == id) {
                    elifs.remove(pos);
                    unlinked = true;
                } else if *else_branch == Some(id) {
                    *else_branch = None;
                    unlinked = true;
                }
            }
            Stmt::For {
                init, test, update, ..
            } => {
                for slot in [init, test, update] {
                    if *slot == Some(id) {
                        *slot = None;
                        unlinked = true;
                    }
                }
            }
            _ => {}
        }
        if !unlinked {
            if let Some(body) = owner_stmt.node.body_mut() {
                if let Some(pos) = body.children.iter().position(|c| *c == id) {
                    body.children.remove(pos);
                    unlinked = true;
                }
            }
        }
        if !unlinked {
            return Err(TreeError::RequiredSlot { id, owner });
        }

        let detached: HashSet<StmtId> = self.preorder(id).into_iter().collect();
        let chain: Vec<StmtId> = self.ancestors(owner).collect();
        for anc in chain {
            if let Some(body) = self.stmt_mut(anc)?.node.body_mut() {
                body.scope.retain(|decl| !detached.contains(&decl));
            }
        }
        self.stmt_mut(id)?.parent = None;
        tracing::trace!(%id, %owner, "detach");
        Ok(())
    }

    /// Detach `id` and destroy it with everything it owns. Returns the
    /// number of statements destroyed.
    pub fn remove(&mut self, id: StmtId) -> Result<usize, TreeError> {
        self.detach(id)?;
        let mut destroyed = 0;
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(stmt) = self.slots.get_mut(cur.index()).and_then(Option::take) {
                destroyed += 1;
                stack.extend(stmt.node.owned());
            }
        }
        self.live -= destroyed;
        tracing::debug!(%id, destroyed, "remove subtree");
        Ok(destroyed)
    }

    // --- Traversal ---

    /// Statements of the subtree at `root` in natural source order:
    /// a node, then its conditions/slots, body children, elifs, else.
    pub fn preorder(&self, root: StmtId) -> Vec<StmtId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(stmt) = self.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(stmt.node.owned().into_iter().rev());
        }
        out
    }

    pub fn kinds(&self, root: StmtId) -> Vec<StmtKind> {
        self.preorder(root)
            .into_iter()
            .filter_map(|id| self.kind(id))
            .collect()
    }

    /// Every owned id is live and points back at its owner.
    pub fn verify_links(&self, root: StmtId) -> Result<(), TreeError> {
        for id in self.preorder(root) {
            for sub in self.stmt(id)?.node.owned() {
                let child = self.stmt(sub)?;
                if child.parent != Some(id) {
                    return Err(TreeError::Ownership {
                        child: sub,
                        owner: child.parent.unwrap_or(id),
                    });
                }
            }
        }
        Ok(())
    }
}
