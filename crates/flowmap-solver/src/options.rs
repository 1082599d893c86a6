//! Evaluator configuration.

use crate::recursion::RecursionProfile;
use flowmap_common::limits;
use serde::{Deserialize, Serialize};

/// Limits applied by one [`TypeEvaluator`](crate::TypeEvaluator).
///
/// Deserializes from a partial JSON object; omitted fields keep their
/// defaults:
///
/// ```json
/// { "maxDepth": 20, "maxMappedKeys": 64 }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluatorOptions {
    pub max_depth: u32,
    pub max_iterations: u32,
    pub max_mapped_keys: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        EvaluatorOptions {
            max_depth: limits::MAX_EVALUATE_DEPTH,
            max_iterations: limits::MAX_EVALUATE_ITERATIONS,
            max_mapped_keys: limits::MAX_MAPPED_KEYS,
        }
    }
}

impl EvaluatorOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn recursion_profile(&self) -> RecursionProfile {
        let defaults = RecursionProfile::TypeEvaluation;
        if self.max_depth == defaults.max_depth() && self.max_iterations == defaults.max_iterations()
        {
            defaults
        } else {
            RecursionProfile::Custom {
                max_depth: self.max_depth,
                max_iterations: self.max_iterations,
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
