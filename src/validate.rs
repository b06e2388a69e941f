//! Checks the tree does not enforce while it is being built.
//!
//! - at most one `default` per switch
//! - label names unique within their function region
//! - `goto` naming a label that exists in the same region (warning)
//!
//! Duplicate `case` values and goto reachability are not examined.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::tree::{StatementTree, Stmt, StmtId, StmtKind};

/// Labels visible per region. A region is the nearest enclosing function
/// definition, or the validated root when there is none.
#[derive(Debug, Default)]
pub struct LabelTable {
    regions: HashMap<StmtId, HashMap<Arc<str>, StmtId>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label` in `region`; on a clash returns the first definition.
    pub fn define(&mut self, region: StmtId, name: &str, label: StmtId) -> Result<(), StmtId> {
        let labels = self.regions.entry(region).or_default();
        if let Some(first) = labels.get(name) {
            return Err(*first);
        }
        labels.insert(Arc::from(name), label);
        Ok(())
    }

    pub fn lookup(&self, region: StmtId, name: &str) -> Option<StmtId> {
        self.regions.get(&region)?.get(name).copied()
    }

    pub fn len(&self, region: StmtId) -> usize {
        self.regions.get(&region).map_or(0, HashMap::len)
    }
}

/// Region owning `id`'s labels.
fn label_region(tree: &StatementTree, id: StmtId, root: StmtId) -> StmtId {
    tree.ancestors(id)
        .skip(1)
        .take_while(|a| *a != root)
        .find(|a| tree.kind(*a).is_some_and(StmtKind::is_label_region))
        .unwrap_or(root)
}

/// Validate the subtree under `root`, returning every finding.
pub fn validate(tree: &StatementTree, root: StmtId) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut labels = LabelTable::new();
    let mut gotos = Vec::new();

    for id in tree.preorder(root) {
        let Some(stmt) = tree.get(id) else { continue };
        match stmt.node() {
            Stmt::Switch { body, .. } => {
                let defaults: Vec<StmtId> = body
                    .children()
                    .iter()
                    .copied()
                    .filter(|c| tree.kind(*c) == Some(StmtKind::Default))
                    .collect();
                if let Some((first, rest)) = defaults.split_first() {
                    for extra in rest {
                        let span = tree.get(*extra).map(|s| s.span()).unwrap_or_default();
                        diagnostics.push(
                            Diagnostic::error("multiple 'default' labels in one switch".to_string(), span)
                                .with_note(format!("first 'default' is statement {}", first)),
                        );
                    }
                }
            }
            Stmt::GotoLabel(name) => {
                let region = label_region(tree, id, root);
                if let Err(first) = labels.define(region, name.as_str(), id) {
                    diagnostics.push(
                        Diagnostic::error(format!("duplicate label '{}'", name), stmt.span())
                            .with_note(format!("first defined by statement {}", first))
                            .with_help("labels must be unique within a function".to_string()),
                    );
                }
            }
            Stmt::Goto(name) => gotos.push((label_region(tree, id, root), name, stmt.span())),
            _ => {}
        }
    }

    for (region, name, span) in gotos {
        if labels.lookup(region, name.as_str()).is_none() {
            diagnostics.push(Diagnostic::warning(
                format!("goto target '{}' is not defined in this function", name),
                span,
            ));
        }
    }

    debug!(%root, findings = diagnostics.len(), "validated");
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Expr, FunctionSig, Span, Token, Type};

    fn function(tree: &mut StatementTree, name: &str) -> StmtId {
        let root = tree.root();
        tree.push(root, Stmt::function_decl(FunctionSig::new(name, Type::named("void"))))
            .unwrap()
    }

    #[test]
    fn test_clean_tree_has_no_findings() {
        let mut tree = StatementTree::new();
        let f = function(&mut tree, "f");
        tree.push(f, Stmt::Goto(Token::ident("out"))).unwrap();
        tree.push(f, Stmt::GotoLabel(Token::ident("out"))).unwrap();
        assert!(validate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_second_default_reported() {
        let mut tree = StatementTree::new();
        let root = tree.root();
        let c = tree.expr(Expr::ident("v")).unwrap();
        let sw = tree.push(root, Stmt::switch(c)).unwrap();
        tree.push(sw, Stmt::Default).unwrap();
        tree.push(sw, Stmt::Break).unwrap();
        let second = tree.add_spanned(Stmt::Default, Span::new(0, 40, 47)).unwrap();
        tree.append(sw, second).unwrap();

        let found = validate(&tree, root);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_error());
        assert_eq!(found[0].span, Span::new(0, 40, 47));
    }

    #[test]
    fn test_nested_switch_defaults_are_separate() {
        let mut tree = StatementTree::new();
        let root = tree.root();
        let c = tree.expr(Expr::ident("a")).unwrap();
        let outer = tree.push(root, Stmt::switch(c)).unwrap();
        tree.push(outer, Stmt::Default).unwrap();
        let c = tree.expr(Expr::ident("b")).unwrap();
        let inner = tree.push(outer, Stmt::switch(c)).unwrap();
        tree.push(inner, Stmt::Default).unwrap();
        assert!(validate(&tree, root).is_empty());
    }

    #[test]
    fn test_duplicate_cases_accepted() {
        let mut tree = StatementTree::new();
        let root = tree.root();
        let c = tree.expr(Expr::ident("v")).unwrap();
        let sw = tree.push(root, Stmt::switch(c)).unwrap();
        tree.push(sw, Stmt::Case(Expr::literal("1"))).unwrap();
        tree.push(sw, Stmt::Case(Expr::literal("1"))).unwrap();
        assert!(validate(&tree, root).is_empty());
    }

    #[test]
    fn test_duplicate_label_in_one_function() {
        let mut tree = StatementTree::new();
        let f = function(&mut tree, "f");
        tree.push(f, Stmt::GotoLabel(Token::ident("again"))).unwrap();
        let b = tree.push(f, Stmt::block()).unwrap();
        tree.push(b, Stmt::GotoLabel(Token::ident("again"))).unwrap();

        let found = validate(&tree, tree.root());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "duplicate label 'again'");
    }

    #[test]
    fn test_same_label_in_two_functions() {
        let mut tree = StatementTree::new();
        for name in ["f", "g"] {
            let f = function(&mut tree, name);
            tree.push(f, Stmt::GotoLabel(Token::ident("done"))).unwrap();
            tree.push(f, Stmt::Goto(Token::ident("done"))).unwrap();
        }
        assert!(validate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_goto_into_other_function_warns() {
        let mut tree = StatementTree::new();
        let f = function(&mut tree, "f");
        tree.push(f, Stmt::GotoLabel(Token::ident("exit"))).unwrap();
        let g = function(&mut tree, "g");
        tree.push(g, Stmt::Goto(Token::ident("exit"))).unwrap();

        let found = validate(&tree, tree.root());
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_error());
    }

    #[test]
    fn test_label_table_regions() {
        let mut table = LabelTable::new();
        let (r1, r2) = (StmtId(1), StmtId(2));
        assert!(table.define(r1, "a", StmtId(5)).is_ok());
        assert_eq!(table.define(r1, "a", StmtId(6)), Err(StmtId(5)));
        assert!(table.define(r2, "a", StmtId(7)).is_ok());
        assert_eq!(table.lookup(r2, "a"), Some(StmtId(7)));
        assert_eq!(table.len(r1), 1);
        assert_eq!(table.len(StmtId(9)), 0);
    }

    #[test]
    fn test_validating_a_function_subtree() {
        let mut tree = StatementTree::new();
        let f = function(&mut tree, "f");
        tree.push(f, Stmt::GotoLabel(Token::ident("l"))).unwrap();
        tree.push(f, Stmt::GotoLabel(Token::ident("l"))).unwrap();
        assert_eq!(validate(&tree, f).len(), 1);
    }
}
