//! Distribution of mapped types over unions and nullable objects.
//!
//! `{[K in $Keys<O>]: O[K]}` applied to `A | B` evaluates once for `A` and
//! once for `B`, and applied to `?A` evaluates for `A` while `null` and
//! `void` pass through untouched. Only object-backed sources written with
//! inline `$Keys` or a `$Keys`-bounded parameter distribute; a literal key
//! union always collapses into a single object.

use crate::intern::TypeDatabase;
use crate::types::{TypeData, TypeId};

use super::key_source::{KeySource, ResolvedSource};

/// One sub-evaluation of a split mapped type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    /// Evaluate the mapped type against this object.
    Member(TypeId),
    /// `null` or `void`, passed through as is.
    Nullish { type_id: TypeId, from_maybe: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistributionPlan {
    Single,
    Split {
        /// In source order. A `?T` member contributes `T`'s branches followed
        /// by `null` and `void`.
        branches: Vec<Branch>,
        /// Number of `?T` wrappers the branches were flattened from.
        maybe_wrappers: usize,
    },
}

impl DistributionPlan {
    pub fn is_split(&self) -> bool {
        matches!(self, DistributionPlan::Split { .. })
    }
}

/// Decide whether a mapped type evaluation splits.
pub fn plan(db: &dyn TypeDatabase, source: &ResolvedSource, keys: &KeySource) -> DistributionPlan {
    if !source.syntax.is_distributive() {
        return DistributionPlan::Single;
    }
    let KeySource::FromObjectKeys { object, .. } = *keys else {
        return DistributionPlan::Single;
    };

    let mut branches = Vec::new();
    let mut maybe_wrappers = 0;
    flatten(db, object, false, &mut branches, &mut maybe_wrappers);

    let nullable = branches
        .iter()
        .any(|branch| matches!(branch, Branch::Nullish { .. }));
    if branches.len() > 1 || nullable {
        DistributionPlan::Split {
            branches,
            maybe_wrappers,
        }
    } else {
        DistributionPlan::Single
    }
}

fn flatten(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    from_maybe: bool,
    branches: &mut Vec<Branch>,
    maybe_wrappers: &mut usize,
) {
    match db.lookup(type_id) {
        Some(TypeData::Union(list_id)) => {
            for &member in db.type_list(list_id).iter() {
                flatten(db, member, from_maybe, branches, maybe_wrappers);
            }
        }
        Some(TypeData::Maybe(inner)) => {
            *maybe_wrappers += 1;
            flatten(db, inner, true, branches, maybe_wrappers);
            branches.push(Branch::Nullish {
                type_id: TypeId::NULL,
                from_maybe: true,
            });
            branches.push(Branch::Nullish {
                type_id: TypeId::VOID,
                from_maybe: true,
            });
        }
        _ if type_id == TypeId::EMPTY => {}
        _ if type_id.is_nullish() => branches.push(Branch::Nullish {
            type_id,
            from_maybe,
        }),
        _ => branches.push(Branch::Member(type_id)),
    }
}

/// Union the branch results back together.
///
/// `results` holds one entry per branch, in plan order; a nullish branch's
/// entry is the nullish type itself. When the only nullable part of the
/// source was a single `?T` wrapper, the result is `?(results)`. Otherwise
/// `null` and `void` stay plain union members.
pub fn recombine(
    db: &dyn TypeDatabase,
    branches: &[Branch],
    results: &[TypeId],
    maybe_wrappers: usize,
) -> TypeId {
    let bare_nullish = branches.iter().any(|branch| {
        matches!(
            branch,
            Branch::Nullish {
                from_maybe: false,
                ..
            }
        )
    });

    if maybe_wrappers == 1 && !bare_nullish {
        let members = branches
            .iter()
            .zip(results)
            .filter(|(branch, _)| matches!(branch, Branch::Member(_)))
            .map(|(_, &result)| result)
            .collect();
        return db.maybe(db.union(members));
    }

    db.union(results.to_vec())
}

#[cfg(test)]
#[path = "../../tests/distribution_tests.rs"]
mod tests;
