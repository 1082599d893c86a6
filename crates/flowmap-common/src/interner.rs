//! String interning for property names and string literal types.
//!
//! Every distinct string is stored once and referred to by an [`Atom`].
//! Atoms are cheap to copy, hash and compare, which keeps object shapes and
//! literal types small and makes structural interning of types possible.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, RwLock};

/// Handle to an interned string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string. Always interned first.
    pub const EMPTY: Atom = Atom(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Thread-safe string interner.
///
/// Lookups go through a sharded concurrent map so that checker threads
/// interning property names at the same time do not serialize on one lock.
/// Only the append to the string table takes the write lock.
pub struct ShardedInterner {
    map: DashMap<Arc<str>, Atom, FxBuildHasher>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl ShardedInterner {
    pub fn new() -> Self {
        let interner = ShardedInterner {
            map: DashMap::with_hasher(FxBuildHasher),
            strings: RwLock::new(Vec::new()),
        };
        interner.intern("");
        interner
    }

    /// Intern `s`, returning the existing atom if it was seen before.
    pub fn intern(&self, s: &str) -> Atom {
        if let Some(atom) = self.map.get(s) {
            return *atom;
        }

        let mut strings = self.strings.write().expect("interner strings lock poisoned");
        // Another thread may have won the race between the lookup and the lock.
        if let Some(atom) = self.map.get(s) {
            return *atom;
        }

        let atom = Atom(strings.len() as u32);
        let text: Arc<str> = Arc::from(s);
        strings.push(text.clone());
        self.map.insert(text, atom);
        atom
    }

    /// Resolve an atom back to its text. Unknown atoms resolve to `""`.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let strings = self.strings.read().expect("interner strings lock poisoned");
        strings
            .get(atom.index())
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Look up an atom without interning.
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.map.get(s).map(|atom| *atom)
    }

    pub fn len(&self) -> usize {
        self.strings.read().expect("interner strings lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
