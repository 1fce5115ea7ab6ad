//! Alias and binding registry.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::config::Canonicalization;
use crate::error::{DiError, DiResult};
use crate::key::Key;

#[derive(Default)]
struct Tables {
    /// alias name -> target
    aliases: HashMap<Key, Key>,
    /// abstract -> concrete
    mappings: HashMap<Key, Key>,
}

/// Redirection tables turning a requested key into a concrete key.
///
/// Both tables are last-write-wins. Canonicalization follows redirections
/// until no table has an entry for the current key. A key reached twice is
/// reported as [`DiError::AliasCycle`]; in the two-phase order a key counts
/// as reached twice only within the same phase.
#[derive(Default)]
pub struct TypeRegistry {
    tables: RwLock<Tables>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `abstract_key` to `concrete`, replacing any previous mapping.
    pub fn bind(&self, abstract_key: Key, concrete: Key) {
        self.tables.write().mappings.insert(abstract_key, concrete);
    }

    /// Removes the mapping for `abstract_key`; returns the old target.
    pub fn unbind(&self, abstract_key: &Key) -> Option<Key> {
        self.tables.write().mappings.remove(abstract_key)
    }

    /// Makes `alias_name` redirect to `target`.
    pub fn alias(&self, target: Key, alias_name: Key) {
        self.tables.write().aliases.insert(alias_name, target);
    }

    /// Removes an alias; returns its old target.
    pub fn unalias(&self, alias_name: &Key) -> Option<Key> {
        self.tables.write().aliases.remove(alias_name)
    }

    pub fn binding(&self, abstract_key: &Key) -> Option<Key> {
        self.tables.read().mappings.get(abstract_key).cloned()
    }

    pub fn alias_target(&self, alias_name: &Key) -> Option<Key> {
        self.tables.read().aliases.get(alias_name).cloned()
    }

    /// `(alias_name, target)` pairs sorted by alias name.
    pub fn aliases(&self) -> Vec<(Key, Key)> {
        sorted(&self.tables.read().aliases)
    }

    /// `(abstract, concrete)` pairs sorted by abstract key.
    pub fn bindings(&self) -> Vec<(Key, Key)> {
        sorted(&self.tables.read().mappings)
    }

    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.aliases.clear();
        tables.mappings.clear();
    }

    /// Resolves `key` to its concrete key.
    pub fn canonicalize(&self, key: &Key, order: Canonicalization) -> DiResult<Key> {
        let mut path = self.redirections(key, order)?;
        Ok(path.pop().unwrap_or_else(|| key.clone()))
    }

    /// Every key visited while canonicalizing `key`, starting with `key`
    /// itself and ending with the concrete key.
    pub fn redirections(&self, key: &Key, order: Canonicalization) -> DiResult<Vec<Key>> {
        let tables = self.tables.read();
        let mut chain = Chain::new(key);

        match order {
            Canonicalization::Interleaved => {
                loop {
                    let next = tables
                        .aliases
                        .get(chain.current())
                        .or_else(|| tables.mappings.get(chain.current()));
                    match next {
                        Some(next) => chain.follow(next)?,
                        None => break,
                    }
                }
            }
            Canonicalization::AliasesThenMappings => {
                while let Some(next) = tables.aliases.get(chain.current()) {
                    chain.follow(next)?;
                }
                // A key may recur across phases; only a revisit within the
                // mapping phase is a loop.
                chain.restart();
                while let Some(next) = tables.mappings.get(chain.current()) {
                    chain.follow(next)?;
                }
            }
        }

        Ok(chain.path)
    }
}

fn sorted(table: &HashMap<Key, Key>) -> Vec<(Key, Key)> {
    let mut pairs: Vec<_> = table.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    pairs.sort();
    pairs
}

/// Redirections followed so far.
struct Chain {
    origin: Key,
    path: Vec<Key>,
    seen: HashSet<Key>,
}

impl Chain {
    fn new(origin: &Key) -> Self {
        let mut seen = HashSet::new();
        seen.insert(origin.clone());
        Self {
            origin: origin.clone(),
            path: vec![origin.clone()],
            seen,
        }
    }

    fn current(&self) -> &Key {
        self.path.last().unwrap_or(&self.origin)
    }

    /// Forgets visited keys except the current one, keeping the path.
    fn restart(&mut self) {
        let current = self.current().clone();
        self.seen.clear();
        self.seen.insert(current);
    }

    fn follow(&mut self, next: &Key) -> DiResult<()> {
        self.path.push(next.clone());
        if !self.seen.insert(next.clone()) {
            return Err(DiError::AliasCycle {
                key: self.origin.clone(),
                chain: std::mem::take(&mut self.path),
            });
        }
        Ok(())
    }
}
