//! Domain error types for the generation harness.
//!
//! Both types are embedded in `anyhow::Error` so orchestration signatures
//! stay `anyhow::Result`; callers that need to distinguish them downcast:
//! `err.downcast_ref::<StepOrderingError>()`.

use thiserror::Error;

/// A step was requested before a prerequisite step's artifact existed on disk.
///
/// Fatal for the current run: prerequisites are never regenerated implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generating problem {problem_id} step {requested} ahead of step {missing}")]
pub struct StepOrderingError {
    /// Problem whose step sequence was violated.
    pub problem_id: String,
    /// The 1-based step that was requested.
    pub requested: usize,
    /// The 1-based prerequisite step whose artifact is missing.
    pub missing: usize,
}

/// The next-step section of a prompt rendered blank.
///
/// Unreachable for problem sets that pass load-time validation; hitting it
/// signals malformed problem data, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("problem {problem_id} step {step} produced an empty next-step section")]
pub struct EmptyStepError {
    pub problem_id: String,
    /// The 1-based step whose section was blank.
    pub step: usize,
}
