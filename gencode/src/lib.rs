//! Step-sequential benchmark code generation harness.
//!
//! This crate drives a language model through benchmark problems that are
//! decomposed into ordered, dependent sub-steps. Each step's prompt embeds the
//! function bodies accepted for all earlier steps, so generation is strictly
//! sequential: one problem at a time, one step at a time, one model call at a
//! time. The architecture separates:
//!
//! - **[`problem`] / [`extract`]**: pure parsing — problem-set records and
//!   code extraction from model output and generated files. No I/O beyond
//!   the loader entry point.
//! - **[`model`]**: the chat-completion backend boundary. Tests use scripted
//!   clients that return predetermined responses without network access.
//! - **[`generate`]**: orchestration — prerequisite resolution, prompt
//!   assembly via [`prompt`], and artifact persistence via [`artifact`].
//!
//! Artifacts are written once per (model, problem, step) and never modified;
//! rerunning the driver resumes from the first step lacking a response file.

pub mod artifact;
pub mod errors;
pub mod extract;
pub mod generate;
pub mod logging;
pub mod model;
pub mod overrides;
pub mod problem;
pub mod prompt;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
