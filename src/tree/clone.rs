//! Deep clone of a subtree, within one tree or into another.
//!
//! One walk assigns every reachable statement its new id, then a rewrite
//! pass rebuilds each payload through that old→new map: children,
//! conditions, elif/else links and scope entries. Nothing is written to the
//! destination until the whole plan succeeds. Tokens, expressions and types
//! are immutable and shared with the source.

use std::collections::HashMap;

use super::node::{Statement, StmtId};
use super::{StatementTree, StmtKind, TreeError};

impl StatementTree {
    /// Build the cloned statements for the subtree at `root`, numbered from
    /// `base`. The clone's root comes first and is unattached.
    fn plan_clone(&self, root: StmtId, base: u32) -> Result<Vec<Statement>, TreeError> {
        let unsupported = |at: StmtId, reason: &'static str| TreeError::UnsupportedClone {
            root,
            at,
            reason,
        };

        let mut order = Vec::new();
        let mut map: HashMap<StmtId, StmtId> = HashMap::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let stmt = self
                .get(id)
                .ok_or_else(|| unsupported(id, "dangling sub-statement"))?;
            let next = StmtId(base + order.len() as u32);
            if map.insert(id, next).is_some() {
                return Err(unsupported(id, "statement is owned twice"));
            }
            order.push(id);
            for sub in stmt.node.owned().into_iter().rev() {
                if self.parent(sub) != Some(id) {
                    return Err(unsupported(sub, "back-reference does not match owner"));
                }
                stack.push(sub);
            }
        }

        let lookup = |id: StmtId| map.get(&id).copied();
        let mut planned = Vec::with_capacity(order.len());
        for &old in &order {
            let stmt = self.get(old).ok_or_else(|| unsupported(old, "dangling sub-statement"))?;
            let node = stmt
                .node
                .remap(&lookup)
                .map_err(|at| unsupported(at, "scope entry points outside the subtree"))?;
            let parent = if old == root {
                None
            } else {
                stmt.parent.and_then(lookup)
            };
            planned.push(Statement {
                parent,
                span: stmt.span,
                node,
            });
        }
        Ok(planned)
    }

    fn install(&mut self, planned: Vec<Statement>) -> StmtId {
        let first = self.next_id();
        self.live += planned.len();
        self.slots.extend(planned.into_iter().map(Some));
        first
    }

    /// Make sure a cloned `root_kind` can be attached under `owner` before
    /// anything is allocated.
    fn check_clone_owner(&self, root_kind: StmtKind, owner: StmtId) -> Result<(), TreeError> {
        let owner_kind = self.kind(owner).ok_or(TreeError::UnknownStatement(owner))?;
        match root_kind {
            StmtKind::Elif | StmtKind::Else => {
                if owner_kind != StmtKind::If {
                    return Err(TreeError::MalformedChain {
                        at: owner,
                        reason: "elif/else attached to a non-if statement",
                    });
                }
                if let Some(super::Stmt::If {
                    else_branch: Some(_),
                    ..
                }) = self.get(owner).map(|s| &s.node)
                {
                    return Err(TreeError::MalformedChain {
                        at: owner,
                        reason: "if already has an else",
                    });
                }
            }
            _ if !owner_kind.is_container() => {
                return Err(TreeError::NotAContainer {
                    id: owner,
                    kind: owner_kind,
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn attach_clone(
        &mut self,
        owner: StmtId,
        root_kind: StmtKind,
        new_root: StmtId,
    ) -> Result<(), TreeError> {
        match root_kind {
            StmtKind::Elif => self.add_elif(owner, new_root),
            StmtKind::Else => self.set_else(owner, new_root),
            _ => self.append(owner, new_root),
        }
    }

    /// Deep-copy the subtree at `root` inside this tree. With an `owner`,
    /// the copy is attached there (appended, or chained for elif/else);
    /// otherwise it is left unattached.
    pub fn clone_subtree(
        &mut self,
        root: StmtId,
        owner: Option<StmtId>,
    ) -> Result<StmtId, TreeError> {
        let root_kind = self.kind(root).ok_or(TreeError::UnknownStatement(root))?;
        if let Some(owner) = owner {
            self.check_clone_owner(root_kind, owner)?;
        }
        let planned = self.plan_clone(root, self.next_id().0)?;
        let count = planned.len();
        let new_root = self.install(planned);
        if let Some(owner) = owner {
            self.attach_clone(owner, root_kind, new_root)?;
        }
        tracing::debug!(%root, %new_root, count, "clone subtree");
        Ok(new_root)
    }

    /// Deep-copy the subtree at `root` into another tree.
    pub fn clone_into(
        &self,
        root: StmtId,
        dest: &mut StatementTree,
        owner: Option<StmtId>,
    ) -> Result<StmtId, TreeError> {
        let root_kind = self.kind(root).ok_or(TreeError::UnknownStatement(root))?;
        if let Some(owner) = owner {
            dest.check_clone_owner(root_kind, owner)?;
        }
        let planned = self.plan_clone(root, dest.next_id().0)?;
        let new_root = dest.install(planned);
        if let Some(owner) = owner {
            dest.attach_clone(owner, root_kind, new_root)?;
        }
        Ok(new_root)
    }

    /// An independent copy of the whole tree in a fresh arena, compacted:
    /// the copy holds only statements reachable from the root.
    pub fn fork(&self) -> Result<StatementTree, TreeError> {
        let planned = self.plan_clone(self.root, 0)?;
        let live = planned.len();
        tracing::debug!(statements = live, "fork tree");
        Ok(StatementTree {
            slots: planned.into_iter().map(Some).collect(),
            root: StmtId(0),
            live,
        })
    }
}
