//! Structural fingerprints of statement subtrees.
//!
//! A subtree is serialized in preorder, one tag byte per statement
//! followed by its payload, then hashed with BLAKE3. Ids never enter the
//! serialization (scope entries are written as preorder positions), so a
//! clone fingerprints equal to its source while any change in kind,
//! payload, nesting or scoping changes the digest.

use std::collections::HashMap;
use std::fmt;

use crate::syntax::{Expr, FunctionSig, PlainSpelling, Spelling};
use crate::tree::{Block, StatementTree, Stmt, StmtId};

/// Marks a subtree position that does not resolve inside the fingerprinted
/// subtree.
const OUTSIDE: u32 = u32::MAX;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 bytes in hex, for logs.
    pub fn short(&self) -> String {
        self.0[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

struct Writer<'a> {
    hasher: blake3::Hasher,
    positions: HashMap<StmtId, u32>,
    sp: &'a dyn Spelling,
}

impl Writer<'_> {
    fn byte(&mut self, b: u8) {
        self.hasher.update(&[b]);
    }

    fn count(&mut self, n: usize) {
        self.hasher.update(&(n as u32).to_le_bytes());
    }

    fn text(&mut self, s: &str) {
        self.count(s.len());
        self.hasher.update(s.as_bytes());
    }

    fn expr(&mut self, e: &Expr) {
        let rendered = e.render(self.sp);
        self.text(&rendered);
    }

    fn sig(&mut self, sig: &FunctionSig) {
        self.byte(sig.kind as u8);
        let rendered = sig.render(self.sp);
        self.text(&rendered);
    }

    fn position(&mut self, id: StmtId) {
        let pos = self.positions.get(&id).copied().unwrap_or(OUTSIDE);
        self.hasher.update(&pos.to_le_bytes());
    }

    fn block(&mut self, body: &Block) {
        self.count(body.children().len());
        self.count(body.scope().len());
        for (name, decl) in body.scope().iter() {
            self.text(name);
            self.position(decl);
        }
    }

    fn stmt(&mut self, node: &Stmt) {
        self.byte(node.kind().code());
        match node {
            Stmt::Block(body) | Stmt::Else(body) => self.block(body),
            Stmt::Pragma(tok) | Stmt::Goto(tok) | Stmt::GotoLabel(tok) => self.text(tok.as_str()),
            Stmt::Function(sig) => self.sig(sig),
            Stmt::FunctionDecl { sig, body } => {
                self.sig(sig);
                self.block(body);
            }
            Stmt::ClassAccess(access) => self.text(access.as_str()),
            Stmt::Expression(e) | Stmt::Case(e) => self.expr(e),
            Stmt::Declaration(decls) => {
                self.count(decls.len());
                for d in decls {
                    let rendered = d.render(self.sp);
                    self.text(&rendered);
                }
            }
            Stmt::Namespace { name, body } => {
                self.text(name.as_str());
                self.block(body);
            }
            Stmt::If {
                body,
                elifs,
                else_branch,
                ..
            } => {
                self.block(body);
                self.count(elifs.len());
                self.byte(else_branch.is_some() as u8);
            }
            Stmt::Elif { body, .. } | Stmt::Switch { body, .. } => self.block(body),
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let present = (init.is_some() as u8)
                    | (test.is_some() as u8) << 1
                    | (update.is_some() as u8) << 2;
                self.byte(present);
                self.block(body);
            }
            Stmt::While { body, do_while, .. } => {
                self.byte(*do_while as u8);
                self.block(body);
            }
            Stmt::Return(value) => match value {
                Some(e) => {
                    self.byte(1);
                    self.expr(e);
                }
                None => self.byte(0),
            },
            Stmt::Default | Stmt::Continue | Stmt::Break => {}
        }
    }
}

/// Fingerprint the subtree rooted at `root`.
pub fn fingerprint(tree: &StatementTree, root: StmtId) -> Fingerprint {
    let order = tree.preorder(root);
    let positions = order
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as u32))
        .collect();
    let mut w = Writer {
        hasher: blake3::Hasher::new(),
        positions,
        sp: &PlainSpelling,
    };
    w.count(order.len());
    for id in &order {
        if let Some(stmt) = tree.get(*id) {
            w.stmt(stmt.node());
        }
    }
    Fingerprint(*w.hasher.finalize().as_bytes())
}
