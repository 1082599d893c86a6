//! The evaluation budget of one [`TypeEvaluator`](crate::TypeEvaluator).
//!
//! Every meta-type expansion (mapped type, indexed access, alias) enters the
//! guard with its instantiated type as the key. Re-entering a key that is
//! still being expanded is a cycle; the caller returns the type unexpanded.
//! Running past the depth or iteration limit is a budget failure, and once
//! that happens the guard stays exceeded for the rest of its life.
//!
//! In debug builds, dropping a guard with keys still entered panics.

use crate::types::TypeId;
use flowmap_common::limits;
use rustc_hash::FxHashSet;

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// depth = 50, iterations = 100,000
    TypeEvaluation,

    /// Limits taken from `EvaluatorOptions`.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::TypeEvaluation => limits::MAX_EVALUATE_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::TypeEvaluation => limits::MAX_EVALUATE_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Which limit stopped an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
    Depth,
    Iterations,
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already being expanded further up the stack.
    Cycle,
    Exceeded(BudgetLimit),
}

pub struct RecursionGuard {
    /// Keys of the expansions currently on the stack.
    active: FxHashSet<TypeId>,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl RecursionGuard {
    /// The depth limit is capped at [`limits::MAX_VISITING_SET_SIZE`].
    pub fn with_profile(profile: RecursionProfile) -> Self {
        RecursionGuard {
            active: FxHashSet::default(),
            iterations: 0,
            max_depth: profile.max_depth().min(limits::MAX_VISITING_SET_SIZE),
            max_iterations: profile.max_iterations(),
            exceeded: false,
        }
    }

    /// Try to start expanding `key`. After [`RecursionResult::Entered`] the
    /// caller must [`leave`](Self::leave) with the same key.
    pub fn enter(&mut self, key: TypeId) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::Exceeded(BudgetLimit::Iterations);
        }
        if self.active.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.depth() >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::Exceeded(BudgetLimit::Depth);
        }

        self.active.insert(key);
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: TypeId) {
        let was_active = self.active.remove(&key);
        debug_assert!(was_active, "RecursionGuard::leave() without a matching enter()");
    }

    /// Number of expansions currently on the stack.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.active.len() as u32
    }

    /// Enter attempts so far, successful or not.
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether a limit was ever hit. Never cleared.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for RecursionGuard {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.active.is_empty() {
            panic!(
                "RecursionGuard dropped with {} expansions still entered",
                self.active.len(),
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
