//! Per-key value computation for mapped types.

use crate::error::MappedTypeError;
use crate::types::TypeId;

/// Computes the value type of one mapped-type property.
///
/// `key` is the literal type of a named property (`'foo'`) or the primitive
/// key type of an indexer (`string`). The per-member evaluator calls the
/// builder once per produced key, in output order.
pub trait ValueBuilder {
    fn build(&mut self, key: TypeId) -> Result<TypeId, MappedTypeError>;
}

impl<F> ValueBuilder for F
where
    F: FnMut(TypeId) -> Result<TypeId, MappedTypeError>,
{
    fn build(&mut self, key: TypeId) -> Result<TypeId, MappedTypeError> {
        self(key)
    }
}
