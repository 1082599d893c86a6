//! Indexed access evaluation: `O[K]`.

use crate::intern::TypeDatabase;
use crate::resolver::TypeResolver;
use crate::types::*;

use super::super::evaluate::TypeEvaluator;
use super::key_source::literal_key_name;

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate `object[index]` over already-evaluated operands.
    ///
    /// Distributes over unions on either side and looks through `?T`. If any
    /// part of the access cannot be resolved (a generic object, a missing
    /// property) the whole access stays deferred.
    pub(crate) fn evaluate_index_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        let db = self.interner();
        lookup_index(db, object, index)
            .unwrap_or_else(|| db.intern(TypeData::IndexAccess(object, index)))
    }
}

fn lookup_index(db: &dyn TypeDatabase, object: TypeId, index: TypeId) -> Option<TypeId> {
    if object == TypeId::ANY {
        return Some(TypeId::ANY);
    }

    if let Some(TypeData::Union(list_id)) = db.lookup(index) {
        let members = db.type_list(list_id);
        let results = members
            .iter()
            .map(|&member| lookup_index(db, object, member))
            .collect::<Option<Vec<_>>>()?;
        return Some(db.union(results));
    }

    match db.lookup(object)? {
        TypeData::Union(list_id) => {
            let members = db.type_list(list_id);
            let results = members
                .iter()
                .map(|&member| lookup_index(db, member, index))
                .collect::<Option<Vec<_>>>()?;
            Some(db.union(results))
        }
        TypeData::Maybe(inner) => lookup_index(db, inner, index),
        TypeData::Object(shape_id) => {
            let shape = db.object_shape(shape_id);
            if let Some(name) = literal_key_name(db, index)
                && let Some(prop) = shape.property(name)
            {
                return Some(prop.type_id);
            }
            let indexer = shape.indexer.as_ref()?;
            indexer_accepts(db, indexer.key_type, index).then_some(indexer.value_type)
        }
        _ => None,
    }
}

/// Whether an indexer keyed by `key_type` covers `index`.
fn indexer_accepts(db: &dyn TypeDatabase, key_type: TypeId, index: TypeId) -> bool {
    if index == key_type {
        return true;
    }
    match db.lookup(index) {
        Some(TypeData::Literal(LiteralValue::String(_))) => key_type == TypeId::STRING,
        // Number keys are spelled as strings at runtime.
        Some(TypeData::Literal(LiteralValue::Number(_))) => {
            key_type == TypeId::NUMBER || key_type == TypeId::STRING
        }
        _ => index == TypeId::NUMBER && key_type == TypeId::STRING,
    }
}

#[cfg(test)]
#[path = "../../tests/index_access_tests.rs"]
mod tests;
