//! Mapped type evaluation.
//!
//! Handles Flow's mapped types: `{[K in S]: T}`, including homomorphic
//! mapped types over `$Keys<O>` that preserve the source's property
//! modifiers, distribution over unions and `?O`, and indexer synthesis from
//! primitive key types.

use crate::error::MappedTypeError;
use crate::instantiate::TypeSubstitution;
use crate::intern::TypeDatabase;
use crate::resolver::TypeResolver;
use crate::types::*;
use crate::value_builder::ValueBuilder;
use flowmap_common::Atom;
use std::sync::Arc;
use tracing::{Level, debug, span, trace};

use super::super::evaluate::TypeEvaluator;
use super::distribution::{Branch, DistributionPlan, plan, recombine};
use super::key_source::{KeySource, LiteralKey, classify};
use super::modifiers::{resolve_indexer_variance, resolve_modifiers};

/// Build the object for one non-distributed key source.
///
/// The builder is called once per produced key: for named properties with
/// the key's literal type, for the indexer with the primitive key type.
/// Object-backed sources never produce an indexer, even when the backing
/// object has one. A picked subset produces exactly its keys, taking the
/// modifiers of any same-named property of the object.
pub fn evaluate_one<B>(
    db: &dyn TypeDatabase,
    keys: &KeySource,
    builder: &mut B,
    explicit: MappedModifiers,
    homomorphic: bool,
    max_keys: usize,
) -> Result<TypeId, MappedTypeError>
where
    B: ValueBuilder + ?Sized,
{
    match keys {
        KeySource::FromObjectKeys {
            object,
            subset: Some(subset),
        } => {
            check_key_limit(subset.len(), max_keys)?;
            let source_props = object_keys(db, *object);
            let mut properties = Vec::with_capacity(subset.len());
            for key in subset {
                let value = builder.build(key.key_type)?;
                let source_prop = source_props.iter().find(|prop| prop.name == key.name);
                let (variance, optional) = resolve_modifiers(explicit, homomorphic, source_prop);
                properties.push(PropertyInfo {
                    name: key.name,
                    type_id: value,
                    variance,
                    optional,
                });
            }
            Ok(db.object(properties))
        }
        KeySource::FromObjectKeys {
            object,
            subset: None,
        } => {
            let source_props = object_keys(db, *object);
            check_key_limit(source_props.len(), max_keys)?;
            let mut properties = Vec::with_capacity(source_props.len());
            for prop in &source_props {
                let value = builder.build(db.literal_string_atom(prop.name))?;
                let (variance, optional) = resolve_modifiers(explicit, homomorphic, Some(prop));
                properties.push(PropertyInfo {
                    name: prop.name,
                    type_id: value,
                    variance,
                    optional,
                });
            }
            Ok(db.object(properties))
        }
        KeySource::FromLiteralUnion { keys } => {
            check_key_limit(keys.len(), max_keys)?;
            let properties = literal_properties(keys, builder, explicit)?;
            Ok(db.object(properties))
        }
        KeySource::FromPrimitive(kind) => {
            let indexer = synthesize_indexer(db, *kind, builder, explicit)?;
            Ok(db.object_with_indexer(ObjectShape {
                properties: Vec::new(),
                indexer: Some(indexer),
            }))
        }
        KeySource::Mixed {
            literals,
            primitive,
        } => {
            check_key_limit(literals.len(), max_keys)?;
            let properties = literal_properties(literals, builder, explicit)?;
            let indexer = synthesize_indexer(db, *primitive, builder, explicit)?;
            Ok(db.object_with_indexer(ObjectShape {
                properties,
                indexer: Some(indexer),
            }))
        }
    }
}

fn check_key_limit(count: usize, limit: usize) -> Result<(), MappedTypeError> {
    if count > limit {
        return Err(MappedTypeError::KeyLimitExceeded { count, limit });
    }
    Ok(())
}

fn literal_properties<B>(
    keys: &[LiteralKey],
    builder: &mut B,
    explicit: MappedModifiers,
) -> Result<Vec<PropertyInfo>, MappedTypeError>
where
    B: ValueBuilder + ?Sized,
{
    let mut properties = Vec::with_capacity(keys.len());
    for key in keys {
        let value = builder.build(key.key_type)?;
        let (variance, optional) = resolve_modifiers(explicit, false, None);
        properties.push(PropertyInfo {
            name: key.name,
            type_id: value,
            variance,
            optional,
        });
    }
    Ok(properties)
}

fn synthesize_indexer<B>(
    db: &dyn TypeDatabase,
    kind: PrimitiveKeyKind,
    builder: &mut B,
    explicit: MappedModifiers,
) -> Result<IndexSignature, MappedTypeError>
where
    B: ValueBuilder + ?Sized,
{
    let mut value = builder.build(kind.type_id())?;
    // An indexer has no optional marker; `?` widens its value instead.
    if explicit.optional {
        value = db.union(vec![value, TypeId::VOID]);
    }
    Ok(IndexSignature {
        key_type: kind.type_id(),
        value_type: value,
        variance: resolve_indexer_variance(explicit),
    })
}

/// Properties of a backing object. For a union of objects, the properties
/// every member has, in the first member's order.
fn object_keys(db: &dyn TypeDatabase, object: TypeId) -> Vec<PropertyInfo> {
    let mut shapes = Vec::new();
    collect_shapes(db, object, &mut shapes);
    let Some((first, rest)) = shapes.split_first() else {
        return Vec::new();
    };
    first
        .properties
        .iter()
        .filter(|prop| rest.iter().all(|shape| shape.property(prop.name).is_some()))
        .cloned()
        .collect()
}

fn collect_shapes(db: &dyn TypeDatabase, object: TypeId, shapes: &mut Vec<Arc<ObjectShape>>) {
    match db.lookup(object) {
        Some(TypeData::Object(shape_id)) => shapes.push(db.object_shape(shape_id)),
        Some(TypeData::Union(list_id)) => {
            for &member in db.type_list(list_id).iter() {
                collect_shapes(db, member, shapes);
            }
        }
        Some(TypeData::Maybe(inner)) => collect_shapes(db, inner, shapes),
        _ => {}
    }
}

fn is_concrete_object(db: &dyn TypeDatabase, object: TypeId) -> bool {
    matches!(db.lookup(object), Some(TypeData::Object(_)))
}

/// Instantiates and evaluates the mapped type's template for each key.
struct TemplateBuilder<'e, 'a, R: TypeResolver> {
    evaluator: &'e mut TypeEvaluator<'a, R>,
    binder: Atom,
    template: TypeId,
    subst: &'e TypeSubstitution,
}

impl<R: TypeResolver> ValueBuilder for TemplateBuilder<'_, '_, R> {
    fn build(&mut self, key: TypeId) -> Result<TypeId, MappedTypeError> {
        let subst = self.subst.with(self.binder, key);
        self.evaluator.evaluate_in(self.template, &subst)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Evaluate a mapped type under `subst`.
    ///
    /// Resolves the binder source, classifies it, and either evaluates once
    /// or distributes over the source's union members and recombines.
    pub(crate) fn expand_mapped(
        &mut self,
        mapped: &MappedType,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        let db = self.interner();
        let _span = span!(
            Level::DEBUG,
            "expand_mapped",
            binder = %db.resolve_atom(mapped.type_param.name),
            source = mapped.source.0
        )
        .entered();

        let source = self.resolve_mapped_source(mapped, subst)?;
        let keys = classify(db, &source)?;
        debug!(?keys, "classified mapped type source");

        let generic = source.backing.is_some_and(|backing| backing.generic);
        let param = source.backing.and_then(|backing| backing.param);

        let subset = match &keys {
            KeySource::FromObjectKeys { subset, .. } => subset.clone(),
            _ => None,
        };

        match plan(db, &source, &keys) {
            DistributionPlan::Single => {
                let concrete = match keys {
                    KeySource::FromObjectKeys { object, .. } => is_concrete_object(db, object),
                    _ => false,
                };
                let homomorphic = source.syntax.is_distributive() && !generic && concrete;
                trace!(homomorphic, "evaluating mapped type without distribution");
                self.evaluate_mapped_branch(mapped, subst, &keys, homomorphic)
            }
            DistributionPlan::Split {
                branches,
                maybe_wrappers,
            } => {
                trace!(branches = branches.len(), maybe_wrappers, "distributing mapped type");
                let mut results = Vec::with_capacity(branches.len());
                for branch in &branches {
                    let result = match *branch {
                        Branch::Member(object) => {
                            let branch_subst = match param {
                                Some(name) => subst.with(name, object),
                                None => subst.clone(),
                            };
                            let homomorphic = !generic && is_concrete_object(db, object);
                            let keys = KeySource::FromObjectKeys {
                                object,
                                subset: subset.clone(),
                            };
                            self.evaluate_mapped_branch(mapped, &branch_subst, &keys, homomorphic)?
                        }
                        Branch::Nullish { type_id, .. } => type_id,
                    };
                    trace!(result = result.0, "mapped type branch evaluated");
                    results.push(result);
                }
                Ok(recombine(db, &branches, &results, maybe_wrappers))
            }
        }
    }

    fn evaluate_mapped_branch(
        &mut self,
        mapped: &MappedType,
        subst: &TypeSubstitution,
        keys: &KeySource,
        homomorphic: bool,
    ) -> Result<TypeId, MappedTypeError> {
        let db = self.interner();
        let max_keys = self.options().max_mapped_keys;
        let mut builder = TemplateBuilder {
            evaluator: self,
            binder: mapped.type_param.name,
            template: mapped.template,
            subst,
        };
        evaluate_one(db, keys, &mut builder, mapped.modifiers, homomorphic, max_keys)
    }
}
