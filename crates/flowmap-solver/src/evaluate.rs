//! Type evaluation for meta-types (mapped types, indexed access, aliases).
//!
//! Meta-types are "type-level functions" that compute output types from input
//! types. The evaluator reduces them wherever they occur inside a type, so the
//! subtyping engine only ever sees objects, unions, maybes and primitives.
//!
//! Key design:
//! - Substitutions are threaded through evaluation instead of being applied
//!   up front, so a mapped type still sees how its binder source was written
//!   after its type parameters are bound.
//! - All expansions share one [`RecursionGuard`]: a type that is already
//!   being expanded is returned unexpanded, and exhausting the budget is an
//!   error rather than a stack overflow.

use crate::diagnostics::{DiagnosticBuilder, SourceSpan, TypeDiagnostic};
use crate::error::MappedTypeError;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeDatabase;
use crate::options::EvaluatorOptions;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::resolver::{NoopResolver, TypeResolver};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

/// Type evaluator for meta-types.
///
/// One evaluator owns one recursion budget and one memo cache. It holds no
/// state shared with other evaluators, so independent evaluations can run on
/// separate threads against the same interner.
pub struct TypeEvaluator<'a, R: TypeResolver = NoopResolver> {
    interner: &'a dyn TypeDatabase,
    resolver: &'a R,
    options: EvaluatorOptions,
    guard: RecursionGuard,
    /// Results of substitution-free evaluations.
    cache: FxHashMap<TypeId, TypeId>,
}

impl<'a> TypeEvaluator<'a, NoopResolver> {
    /// Create a new evaluator without a resolver.
    pub fn new(interner: &'a dyn TypeDatabase) -> TypeEvaluator<'a, NoopResolver> {
        static NOOP: NoopResolver = NoopResolver;
        TypeEvaluator::with_resolver(interner, &NOOP)
    }
}

impl<'a, R: TypeResolver> TypeEvaluator<'a, R> {
    /// Create a new evaluator with a custom resolver.
    pub fn with_resolver(interner: &'a dyn TypeDatabase, resolver: &'a R) -> Self {
        let options = EvaluatorOptions::default();
        TypeEvaluator {
            interner,
            resolver,
            options,
            guard: RecursionGuard::with_profile(options.recursion_profile()),
            cache: FxHashMap::default(),
        }
    }

    /// Replace the evaluation limits. Clears any budget already spent.
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self.guard = RecursionGuard::with_profile(options.recursion_profile());
        self
    }

    // =========================================================================
    // Accessor methods for evaluate_rules modules
    // =========================================================================

    /// Get the type interner.
    #[inline]
    pub(crate) fn interner(&self) -> &'a dyn TypeDatabase {
        self.interner
    }

    #[inline]
    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Check if the recursion budget was exhausted. Once it has been, every
    /// further evaluation fails.
    #[inline]
    pub fn is_depth_exceeded(&self) -> bool {
        self.guard.is_exceeded()
    }

    /// Evaluate a type, resolving any meta-types inside it.
    pub fn evaluate(&mut self, type_id: TypeId) -> Result<TypeId, MappedTypeError> {
        self.evaluate_in(type_id, &TypeSubstitution::new())
    }

    /// Evaluate `mapped` with its free type parameters bound by `subst`.
    ///
    /// This is the entry point the constraint solver and subtyping engine
    /// use. The result is never a mapped type.
    pub fn evaluate_mapped_type(
        &mut self,
        mapped: &MappedType,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        let type_id = self.interner.mapped(mapped.clone());
        self.evaluate_in(type_id, subst)
    }

    /// Like [`evaluate_mapped_type`](Self::evaluate_mapped_type), but turns an
    /// error into the recovery type plus a diagnostic located at `span`.
    pub fn evaluate_or_recover(
        &mut self,
        mapped: &MappedType,
        subst: &TypeSubstitution,
        span: Option<SourceSpan>,
    ) -> (TypeId, Option<TypeDiagnostic>) {
        match self.evaluate_mapped_type(mapped, subst) {
            Ok(result) => (result, None),
            Err(err) => {
                debug!(%err, "mapped type evaluation failed, recovering");
                let mut diagnostic = DiagnosticBuilder::new(self.interner).mapped_type_error(&err);
                if let Some(span) = span {
                    diagnostic = diagnostic.with_span(span);
                }
                (err.recovery_type(), Some(diagnostic))
            }
        }
    }

    /// Evaluate `type_id` with `subst` applied to the type parameters it
    /// mentions.
    pub(crate) fn evaluate_in(
        &mut self,
        type_id: TypeId,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        // Fast path for intrinsics
        if type_id.is_intrinsic() || type_id.is_error() {
            return Ok(type_id);
        }

        if self.guard.is_exceeded() {
            return Err(MappedTypeError::RecursionBudgetExceeded {
                depth: self.guard.max_depth(),
            });
        }

        let cacheable = subst.is_empty();
        if cacheable && let Some(&cached) = self.cache.get(&type_id) {
            return Ok(cached);
        }

        let Some(data) = self.interner.lookup(type_id) else {
            return Ok(type_id);
        };

        let result = match data {
            TypeData::Mapped(_) | TypeData::IndexAccess(..) | TypeData::Alias(_) => {
                self.evaluate_meta(type_id, data, subst)?
            }
            other => self.evaluate_structural(type_id, other, subst)?,
        };

        if cacheable {
            self.cache.insert(type_id, result);
            // Evaluated types are in normal form.
            self.cache.insert(result, result);
        }
        Ok(result)
    }

    /// Expand a meta-type inside the recursion guard.
    fn evaluate_meta(
        &mut self,
        type_id: TypeId,
        data: TypeData,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        let key = instantiate_type(self.interner, type_id, subst);

        match self.guard.enter(key) {
            RecursionResult::Entered => {
                let result = self.expand_meta(type_id, data, subst);
                self.guard.leave(key);
                result
            }
            RecursionResult::Cycle => {
                trace!(type_id = key.0, "recursive reference left unexpanded");
                Ok(key)
            }
            RecursionResult::Exceeded(limit) => {
                let depth = self.guard.depth();
                warn!(
                    ?limit,
                    depth,
                    iterations = self.guard.iterations(),
                    "type evaluation exceeded the recursion budget"
                );
                Err(MappedTypeError::RecursionBudgetExceeded { depth })
            }
        }
    }

    fn expand_meta(
        &mut self,
        type_id: TypeId,
        data: TypeData,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        match data {
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.expand_mapped(&mapped, subst)
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.evaluate_in(object, subst)?;
                let index = self.evaluate_in(index, subst)?;
                Ok(self.evaluate_index_access(object, index))
            }
            TypeData::Alias(app_id) => self.expand_alias(type_id, app_id, subst),
            _ => Ok(type_id),
        }
    }

    /// Expand `Name<args>` through the resolver.
    ///
    /// Arguments are bound unevaluated so a mapped type in the alias body can
    /// still see an argument written as `$Keys<O>`.
    fn expand_alias(
        &mut self,
        type_id: TypeId,
        app_id: TypeApplicationId,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        let db = self.interner;
        let app = db.type_application(app_id);
        let Some(def) = self.resolver.resolve_alias(app.name) else {
            return Ok(instantiate_type(db, type_id, subst));
        };
        trace!(alias = %db.resolve_atom(app.name), args = app.args.len(), "expanding type alias");

        let mut alias_subst = TypeSubstitution::new();
        for (&param, &arg) in def.params.iter().zip(app.args.iter()) {
            alias_subst.insert(param, instantiate_type(db, arg, subst));
        }
        self.evaluate_in(def.body, &alias_subst)
    }

    fn evaluate_structural(
        &mut self,
        type_id: TypeId,
        data: TypeData,
        subst: &TypeSubstitution,
    ) -> Result<TypeId, MappedTypeError> {
        let db = self.interner;
        match data {
            TypeData::TypeParameter(param) => match subst.get(param.name) {
                // Bindings live in the caller's scope.
                Some(binding) => self.evaluate(binding),
                None => Ok(type_id),
            },
            TypeData::Object(shape_id) => {
                let shape = db.object_shape(shape_id);
                let mut properties = Vec::with_capacity(shape.properties.len());
                for prop in &shape.properties {
                    properties.push(PropertyInfo {
                        type_id: self.evaluate_in(prop.type_id, subst)?,
                        ..prop.clone()
                    });
                }
                let indexer = match &shape.indexer {
                    Some(indexer) => Some(IndexSignature {
                        key_type: self.evaluate_in(indexer.key_type, subst)?,
                        value_type: self.evaluate_in(indexer.value_type, subst)?,
                        variance: indexer.variance,
                    }),
                    None => None,
                };
                Ok(db.object_with_indexer(ObjectShape {
                    properties,
                    indexer,
                }))
            }
            TypeData::Union(list_id) => {
                let members = db.type_list(list_id);
                let mut evaluated = Vec::with_capacity(members.len());
                for &member in members.iter() {
                    evaluated.push(self.evaluate_in(member, subst)?);
                }
                Ok(db.union(evaluated))
            }
            TypeData::Maybe(inner) => {
                let inner = self.evaluate_in(inner, subst)?;
                Ok(db.maybe(inner))
            }
            TypeData::KeyOf(object) => {
                let object = self.evaluate_in(object, subst)?;
                Ok(db.intern(TypeData::KeyOf(object)))
            }
            TypeData::Application(app_id) => {
                let app = db.type_application(app_id);
                let mut args = Vec::with_capacity(app.args.len());
                for &arg in &app.args {
                    args.push(self.evaluate_in(arg, subst)?);
                }
                Ok(db.application(app.name, args))
            }
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Error
            | TypeData::Mapped(_)
            | TypeData::IndexAccess(..)
            | TypeData::Alias(_) => Ok(type_id),
        }
    }
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
