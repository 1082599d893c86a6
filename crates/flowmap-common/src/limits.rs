//! Centralized limits and thresholds for the type engine.
//!
//! These are the defaults behind `EvaluatorOptions` in `flowmap-solver` and
//! the named `RecursionProfile`s. Keeping them in one place prevents the
//! evaluator, the recursion guard and the options parser from drifting apart.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of meta-type evaluation.
///
/// Every mapped type, indexed access or alias expansion that is evaluated
/// while another one is still in progress adds one level. When the limit is
/// reached the evaluator reports `RecursionBudgetExceeded` instead of
/// recursing further.
///
/// # Flow example
///
/// ```text
/// // Each expansion wraps the source in another Box, so no two levels are
/// // the same type and coinductive cycle detection cannot stop it:
/// type Deep<O> = {[K in keyof O]: Deep<Box<O>>};
/// type Boom = Deep<{foo: number}>;
/// ```
pub const MAX_EVALUATE_DEPTH: u32 = 50;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of guarded evaluation steps per evaluator instance.
///
/// Bounds total work independently of depth: a wide but shallow expansion
/// (many keys, each evaluating a small recursive alias) is cut off here.
pub const MAX_EVALUATE_ITERATIONS: u32 = 100_000;

/// Maximum number of types tracked as "currently being evaluated".
///
/// A configured depth limit above this is capped to it.
pub const MAX_VISITING_SET_SIZE: u32 = 10_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Maximum number of named keys a single mapped type may produce.
///
/// Large generated key unions (e.g. 200+ member string literal unions from
/// codegen) are common enough that the limit cannot be small, but a mapped
/// type over thousands of keys is almost always a runaway expansion.
#[cfg(not(target_arch = "wasm32"))]
pub const MAX_MAPPED_KEYS: usize = 500;

/// Maximum number of named keys a single mapped type may produce.
///
/// WASM environments have limited memory.
#[cfg(target_arch = "wasm32")]
pub const MAX_MAPPED_KEYS: usize = 250;
