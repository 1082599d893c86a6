//! Type alias resolution.
//!
//! The evaluator does not own alias declarations. It asks a [`TypeResolver`]
//! for the definition behind a `TypeData::Alias` reference and expands it
//! with the reference's arguments bound to the alias parameters.

use crate::types::TypeId;
use flowmap_common::Atom;
use rustc_hash::FxHashMap;

/// A generic type alias: `type Name<params> = body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDef {
    pub params: Vec<Atom>,
    pub body: TypeId,
}

pub trait TypeResolver {
    /// Look up the alias named `name`. `None` leaves the reference as written.
    fn resolve_alias(&self, name: Atom) -> Option<&AliasDef>;
}

/// Resolver that knows no aliases.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve_alias(&self, _name: Atom) -> Option<&AliasDef> {
        None
    }
}

/// In-memory alias declarations.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    aliases: FxHashMap<Atom, AliasDef>,
}

impl AliasTable {
    pub fn new() -> Self {
        AliasTable {
            aliases: FxHashMap::default(),
        }
    }

    /// Declare (or redeclare) an alias.
    pub fn define(&mut self, name: Atom, params: Vec<Atom>, body: TypeId) {
        self.aliases.insert(name, AliasDef { params, body });
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl TypeResolver for AliasTable {
    fn resolve_alias(&self, name: Atom) -> Option<&AliasDef> {
        self.aliases.get(&name)
    }
}
