//! Variance and optionality of mapped-type output properties.

use crate::types::{MappedModifiers, PropertyInfo, Variance};

/// Resolve the `(variance, optional)` pair of one output property.
///
/// Each explicit modifier on the mapped type applies to every produced
/// property. A homomorphic evaluation copies whatever the explicit syntax
/// leaves open from the same-named source property. Anything still open is
/// read-write and required.
pub fn resolve_modifiers(
    explicit: MappedModifiers,
    homomorphic: bool,
    source_prop: Option<&PropertyInfo>,
) -> (Variance, bool) {
    let inherited = if homomorphic { source_prop } else { None };

    let variance = match (explicit.variance, inherited) {
        (Some(variance), _) => variance,
        (None, Some(prop)) => prop.variance,
        (None, None) => Variance::Writable,
    };
    // `?` can only add optionality.
    let optional = explicit.optional || inherited.is_some_and(|prop| prop.optional);

    (variance, optional)
}

/// Modifiers for a synthesized indexer. Indexers never inherit.
pub fn resolve_indexer_variance(explicit: MappedModifiers) -> Variance {
    explicit.variance.unwrap_or(Variance::Writable)
}

#[cfg(test)]
#[path = "../../tests/modifiers_tests.rs"]
mod tests;
