//! Mapped-type binder sources.
//!
//! Two steps turn the source expression of `{[K in S]: T}` into something the
//! per-member evaluator can iterate:
//!
//! 1. **Resolution** reads the *syntactic* form of `S` (inline `$Keys<O>`, a
//!    type parameter bounded by `$Keys<O>`, or anything else), applies the
//!    substitution and finds the backing object, if there is one.
//! 2. **Classification** sorts the resolved source into a [`KeySource`].
//!
//! The syntactic form survives both steps because it alone decides whether
//! the mapped type may distribute and whether it is homomorphic.

use crate::error::MappedTypeError;
use crate::instantiate::TypeSubstitution;
use crate::intern::TypeDatabase;
use crate::resolver::TypeResolver;
use crate::types::*;
use flowmap_common::Atom;
use indexmap::IndexMap;
use tracing::trace;

use super::super::evaluate::TypeEvaluator;

/// How the binder source was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceSyntax {
    /// `{[K in $Keys<O>]: ...}`
    InlineKeyOf,
    /// `{[K in Keys]: ...}` where `Keys: $Keys<O>`.
    KeysBoundParam,
    Other,
}

impl SourceSyntax {
    /// Only these two forms distribute over unions and nullable objects.
    pub fn is_distributive(self) -> bool {
        matches!(self, SourceSyntax::InlineKeyOf | SourceSyntax::KeysBoundParam)
    }
}

/// The object whose keys a mapped type iterates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Backing {
    /// Evaluated object type. May still be a union or `?T`.
    pub object: TypeId,
    /// Type parameter the template uses to refer to `object`. Rebound to each
    /// branch when the evaluation distributes.
    pub param: Option<Atom>,
    /// `object` came from a bound rather than a binding, so it only describes
    /// the keys the source *may* have.
    pub generic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSource {
    pub syntax: SourceSyntax,
    /// Key type, when the source is not backed by an object.
    pub keys: TypeId,
    pub backing: Option<Backing>,
    /// Explicit key subset of a `$Keys`-bounded parameter. Only set together
    /// with `backing`.
    pub subset: Option<Vec<LiteralKey>>,
}

/// A named key produced by a literal key source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LiteralKey {
    pub name: Atom,
    /// The literal type handed to the value builder.
    pub key_type: TypeId,
}

/// Classification of a binder source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// Keys of `object`, or just `subset` when the binding picked some.
    FromObjectKeys {
        object: TypeId,
        subset: Option<Vec<LiteralKey>>,
    },
    /// Keys in first-seen order.
    FromLiteralUnion { keys: Vec<LiteralKey> },
    FromPrimitive(PrimitiveKeyKind),
    Mixed {
        literals: Vec<LiteralKey>,
        primitive: PrimitiveKeyKind,
    },
}

impl KeySource {
    /// Number of named properties this source produces, when known without
    /// looking at a backing object.
    pub fn literal_count(&self) -> usize {
        match self {
            KeySource::FromLiteralUnion { keys } => keys.len(),
            KeySource::Mixed { literals, .. } => literals.len(),
            KeySource::FromObjectKeys {
                subset: Some(keys), ..
            } => keys.len(),
            KeySource::FromObjectKeys { subset: None, .. } | KeySource::FromPrimitive(_) => 0,
        }
    }
}

/// Property name for a literal key, or `None` if the literal cannot name a
/// property. Number literals use their decimal spelling.
pub fn literal_key_name(db: &dyn TypeDatabase, key_type: TypeId) -> Option<Atom> {
    match db.lookup(key_type)? {
        TypeData::Literal(LiteralValue::String(atom)) => Some(atom),
        TypeData::Literal(LiteralValue::Number(OrderedFloat(value))) => {
            Some(db.intern_string(&number_key_name(value)))
        }
        _ => None,
    }
}

pub(crate) fn number_key_name(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Classify a key type that has no backing object.
///
/// Accepts string and number literals, at most one primitive key kind, and
/// `$Keys<O>` members over concrete objects. `empty` members contribute
/// nothing.
pub fn classify_keys(
    db: &dyn TypeDatabase,
    keys: TypeId,
) -> Result<KeySource, MappedTypeError> {
    let members: Vec<TypeId> = match db.lookup(keys) {
        Some(TypeData::Union(list_id)) => db.type_list(list_id).to_vec(),
        _ => vec![keys],
    };

    let mut literals: IndexMap<Atom, TypeId> = IndexMap::new();
    let mut primitive: Option<PrimitiveKeyKind> = None;

    let mut add_primitive = |kind: PrimitiveKeyKind| match primitive {
        Some(existing) if existing != kind => Err(MappedTypeError::AmbiguousIndexerConflict {
            existing,
            incoming: kind,
        }),
        _ => {
            primitive = Some(kind);
            Ok(())
        }
    };

    for member in members {
        if member == TypeId::EMPTY {
            continue;
        }
        if let Some(kind) = PrimitiveKeyKind::from_type_id(member) {
            add_primitive(kind)?;
            continue;
        }
        if let Some(name) = literal_key_name(db, member) {
            literals.entry(name).or_insert(member);
            continue;
        }
        if let Some(TypeData::KeyOf(object)) = db.lookup(member)
            && let Some(TypeData::Object(shape_id)) = db.lookup(object)
        {
            let shape = db.object_shape(shape_id);
            for prop in &shape.properties {
                literals
                    .entry(prop.name)
                    .or_insert_with(|| db.literal_string_atom(prop.name));
            }
            if let Some(indexer) = &shape.indexer
                && let Some(kind) = PrimitiveKeyKind::from_type_id(indexer.key_type)
            {
                add_primitive(kind)?;
            }
            continue;
        }
        return Err(MappedTypeError::InvalidMappedSource {
            offending_type: member,
        });
    }

    let literals: Vec<LiteralKey> = literals
        .into_iter()
        .map(|(name, key_type)| LiteralKey { name, key_type })
        .collect();

    Ok(match primitive {
        None => KeySource::FromLiteralUnion { keys: literals },
        Some(kind) if literals.is_empty() => KeySource::FromPrimitive(kind),
        Some(kind) => KeySource::Mixed {
            literals,
            primitive: kind,
        },
    })
}

/// Check that every member of a backing type is an object or nullish.
fn check_backing(db: &dyn TypeDatabase, object: TypeId) -> Result<(), MappedTypeError> {
    match db.lookup(object) {
        Some(TypeData::Object(_)) => Ok(()),
        Some(TypeData::Union(list_id)) => {
            for &member in db.type_list(list_id).iter() {
                check_backing(db, member)?;
            }
            Ok(())
        }
        Some(TypeData::Maybe(inner)) => check_backing(db, inner),
        _ if object.is_nullish() || object == TypeId::EMPTY => Ok(()),
        _ => Err(MappedTypeError::InvalidMappedSource {
            offending_type: object,
        }),
    }
}

/// Classify a resolved source.
///
/// A backing object makes the source `FromObjectKeys` no matter what its keys
/// look like.
pub fn classify(
    db: &dyn TypeDatabase,
    source: &ResolvedSource,
) -> Result<KeySource, MappedTypeError> {
    match source.backing {
        Some(backing) => {
            check_backing(db, backing.object)?;
            Ok(KeySource::FromObjectKeys {
                object: backing.object,
                subset: source.subset.clone(),
            })
        }
        None => classify_keys(db, source.keys),
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Resolve the binder source of `mapped` under `subst`.
    pub(crate) fn resolve_mapped_source(
        &mut self,
        mapped: &MappedType,
        subst: &TypeSubstitution,
    ) -> Result<ResolvedSource, MappedTypeError> {
        let db = self.interner();
        let resolved = match db.lookup(mapped.source) {
            Some(TypeData::KeyOf(object)) => ResolvedSource {
                syntax: SourceSyntax::InlineKeyOf,
                keys: mapped.source,
                backing: Some(self.resolve_backing(object, subst)?),
                subset: None,
            },
            Some(TypeData::TypeParameter(param))
                if param
                    .bound
                    .is_some_and(|bound| matches!(db.lookup(bound), Some(TypeData::KeyOf(_)))) =>
            {
                self.resolve_keys_bound_param(&param, subst)?
            }
            _ => self.resolve_other_source(mapped.source, subst)?,
        };
        trace!(
            syntax = ?resolved.syntax,
            keys = resolved.keys.0,
            backing = ?resolved.backing,
            "resolved mapped type source"
        );
        Ok(resolved)
    }

    /// Backing object of `$Keys<object>`.
    fn resolve_backing(
        &mut self,
        object: TypeId,
        subst: &TypeSubstitution,
    ) -> Result<Backing, MappedTypeError> {
        let db = self.interner();
        if let Some(TypeData::TypeParameter(param)) = db.lookup(object) {
            if let Some(binding) = subst.get(param.name) {
                let (object, generic) = self.concrete_backing(binding)?;
                return Ok(Backing {
                    object,
                    param: (!generic).then_some(param.name),
                    generic,
                });
            }
            if let Some(bound) = param.bound {
                return Ok(Backing {
                    object: self.evaluate_in(bound, subst)?,
                    param: None,
                    generic: true,
                });
            }
            return Err(MappedTypeError::InvalidMappedSource {
                offending_type: object,
            });
        }
        Ok(Backing {
            object: self.evaluate_in(object, subst)?,
            param: None,
            generic: false,
        })
    }

    /// Evaluate a bound object. A parameter that is still generic in the
    /// caller's scope is replaced by its bound.
    fn concrete_backing(&mut self, object: TypeId) -> Result<(TypeId, bool), MappedTypeError> {
        let object = self.evaluate(object)?;
        match self.interner().lookup(object) {
            Some(TypeData::TypeParameter(TypeParamInfo {
                bound: Some(bound), ..
            })) => Ok((self.evaluate(bound)?, true)),
            _ => Ok((object, false)),
        }
    }

    /// `Keys` where `Keys: $Keys<O>`.
    fn resolve_keys_bound_param(
        &mut self,
        param: &TypeParamInfo,
        subst: &TypeSubstitution,
    ) -> Result<ResolvedSource, MappedTypeError> {
        let db = self.interner();
        let Some(TypeData::KeyOf(bound_object)) = param.bound.and_then(|bound| db.lookup(bound))
        else {
            let source = db.intern(TypeData::TypeParameter(param.clone()));
            return self.resolve_other_source(source, subst);
        };
        // The template names the object through the bound's parameter.
        let object_param = match db.lookup(bound_object) {
            Some(TypeData::TypeParameter(object_param)) => Some(object_param.name),
            _ => None,
        };

        let Some(binding) = subst.get(param.name) else {
            // Some subset of the bound's keys.
            let mut backing = self.resolve_backing(bound_object, subst)?;
            backing.generic = true;
            return Ok(ResolvedSource {
                syntax: SourceSyntax::KeysBoundParam,
                keys: db.intern(TypeData::KeyOf(backing.object)),
                backing: Some(backing),
                subset: None,
            });
        };

        match db.lookup(binding) {
            Some(TypeData::KeyOf(object)) => {
                let (object, generic) = self.concrete_backing(object)?;
                Ok(ResolvedSource {
                    syntax: SourceSyntax::KeysBoundParam,
                    keys: binding,
                    backing: Some(Backing {
                        object,
                        param: if generic { None } else { object_param },
                        generic,
                    }),
                    subset: None,
                })
            }
            // A subset of the keys written out explicitly. The bound's object
            // still backs it, so the subset distributes and inherits.
            _ => {
                let keys = self.evaluate(binding)?;
                match classify_keys(db, keys)? {
                    KeySource::FromLiteralUnion { keys: subset } => {
                        let backing = match self.resolve_backing(bound_object, subst) {
                            Ok(backing) => Some(backing),
                            // Nothing is known about an unbounded object parameter.
                            Err(MappedTypeError::InvalidMappedSource { offending_type })
                                if offending_type == bound_object =>
                            {
                                None
                            }
                            Err(err) => return Err(err),
                        };
                        Ok(ResolvedSource {
                            syntax: SourceSyntax::KeysBoundParam,
                            keys,
                            subset: backing.is_some().then_some(subset),
                            backing,
                        })
                    }
                    // A primitive key has no property to pick.
                    _ => Ok(ResolvedSource {
                        syntax: SourceSyntax::KeysBoundParam,
                        keys,
                        backing: None,
                        subset: None,
                    }),
                }
            }
        }
    }

    fn resolve_other_source(
        &mut self,
        source: TypeId,
        subst: &TypeSubstitution,
    ) -> Result<ResolvedSource, MappedTypeError> {
        let db = self.interner();
        let mut keys = self.evaluate_in(source, subst)?;
        // An unbound parameter stands for some subset of its bound.
        if let Some(TypeData::TypeParameter(param)) = db.lookup(keys) {
            match param.bound {
                Some(bound) => keys = self.evaluate_in(bound, subst)?,
                None => {
                    return Err(MappedTypeError::InvalidMappedSource {
                        offending_type: keys,
                    });
                }
            }
        }
        let backing = match db.lookup(keys) {
            Some(TypeData::KeyOf(object)) => Some(Backing {
                object: self.evaluate(object)?,
                param: None,
                generic: false,
            }),
            _ => None,
        };
        Ok(ResolvedSource {
            syntax: SourceSyntax::Other,
            keys,
            backing,
            subset: None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/key_source_tests.rs"]
mod tests;
