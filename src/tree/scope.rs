use std::collections::BTreeMap;
use std::sync::Arc;

use super::node::StmtId;

/// Names declared at one lexical level, mapped to their declaring statement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    entries: BTreeMap<Arc<str>, StmtId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<StmtId> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert `name`; returns the existing declaration instead of
    /// overwriting it.
    pub(crate) fn insert(&mut self, name: Arc<str>, decl: StmtId) -> Result<(), StmtId> {
        match self.entries.get(&name) {
            Some(existing) => Err(*existing),
            None => {
                self.entries.insert(name, decl);
                Ok(())
            }
        }
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(StmtId) -> bool) {
        self.entries.retain(|_, id| keep(*id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StmtId)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), *v))
    }

    /// Rebuild with every target passed through `map`; `None` aborts.
    pub(crate) fn remapped(
        &self,
        mut map: impl FnMut(StmtId) -> Option<StmtId>,
    ) -> Option<Scope> {
        let mut entries = BTreeMap::new();
        for (name, id) in &self.entries {
            entries.insert(Arc::clone(name), map(*id)?);
        }
        Some(Scope { entries })
    }
}
