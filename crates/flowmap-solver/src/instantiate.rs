//! Type parameter substitution.
//!
//! `instantiate_type` rebuilds a type with bound type parameters replaced by
//! their arguments. It is purely structural: meta-types such as mapped types
//! and indexed accesses are instantiated but not evaluated. Evaluation is the
//! job of [`TypeEvaluator`](crate::TypeEvaluator).

use crate::intern::TypeDatabase;
use crate::types::*;
use flowmap_common::Atom;
use rustc_hash::FxHashMap;

/// Mapping from type parameter names to the types bound to them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    pub fn single(name: Atom, type_id: TypeId) -> Self {
        let mut subst = Self::new();
        subst.insert(name, type_id);
        subst
    }

    pub fn insert(&mut self, name: Atom, type_id: TypeId) {
        self.map.insert(name, type_id);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn contains(&self, name: Atom) -> bool {
        self.map.contains_key(&name)
    }

    /// A copy of this substitution with one more binding.
    pub fn with(&self, name: Atom, type_id: TypeId) -> Self {
        let mut subst = self.clone();
        subst.insert(name, type_id);
        subst
    }

    /// A copy of this substitution with `name` unbound.
    pub fn without(&self, name: Atom) -> Self {
        let mut subst = self.clone();
        subst.map.remove(&name);
        subst
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Instantiate `type_id` with `subst`.
pub fn instantiate_type(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    subst: &TypeSubstitution,
) -> TypeId {
    if subst.is_empty() || type_id.is_intrinsic() || type_id.is_error() {
        return type_id;
    }
    let mut instantiator = TypeInstantiator::new(db, subst);
    instantiator.instantiate(type_id)
}

/// Structural rewriter that applies one substitution.
///
/// Results are memoized per instance so shared sub-trees are rewritten once.
pub struct TypeInstantiator<'a> {
    db: &'a dyn TypeDatabase,
    subst: &'a TypeSubstitution,
    cache: FxHashMap<TypeId, TypeId>,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(db: &'a dyn TypeDatabase, subst: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            db,
            subst,
            cache: FxHashMap::default(),
        }
    }

    pub fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if type_id.is_intrinsic() || type_id.is_error() {
            return type_id;
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }
        let result = self.instantiate_data(type_id);
        self.cache.insert(type_id, result);
        result
    }

    fn instantiate_data(&mut self, type_id: TypeId) -> TypeId {
        let db = self.db;
        let Some(data) = db.lookup(type_id) else {
            return type_id;
        };

        match data {
            TypeData::TypeParameter(param) => self.subst.get(param.name).unwrap_or(type_id),
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let properties = shape
                    .properties
                    .iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.instantiate(prop.type_id),
                        ..prop.clone()
                    })
                    .collect();
                let indexer = shape.indexer.as_ref().map(|indexer| IndexSignature {
                    key_type: self.instantiate(indexer.key_type),
                    value_type: self.instantiate(indexer.value_type),
                    variance: indexer.variance,
                });
                db.object_with_indexer(ObjectShape {
                    properties,
                    indexer,
                })
            }
            TypeData::Union(list_id) => {
                let members = db.type_list(list_id);
                let members = members.iter().map(|&m| self.instantiate(m)).collect();
                db.union(members)
            }
            TypeData::Maybe(inner) => {
                let inner = self.instantiate(inner);
                db.maybe(inner)
            }
            TypeData::KeyOf(object) => {
                let object = self.instantiate(object);
                db.intern(TypeData::KeyOf(object))
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                db.intern(TypeData::IndexAccess(object, index))
            }
            TypeData::Application(app_id) => {
                let app = db.type_application(app_id);
                let args = app.args.iter().map(|&arg| self.instantiate(arg)).collect();
                db.application(app.name, args)
            }
            TypeData::Alias(app_id) => {
                let app = db.type_application(app_id);
                let args = app.args.iter().map(|&arg| self.instantiate(arg)).collect();
                db.alias(app.name, args)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = db.mapped_type(mapped_id);
                let source = self.instantiate(mapped.source);
                // The binder shadows any outer parameter of the same name.
                let template = if self.subst.contains(mapped.type_param.name) {
                    let inner = self.subst.without(mapped.type_param.name);
                    instantiate_type(db, mapped.template, &inner)
                } else {
                    self.instantiate(mapped.template)
                };
                db.mapped(MappedType {
                    type_param: mapped.type_param.clone(),
                    source,
                    template,
                    modifiers: mapped.modifiers,
                })
            }
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Error => type_id,
        }
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
