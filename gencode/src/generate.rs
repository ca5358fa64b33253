//! Step-sequential code generation.
//!
//! Drives the per-problem, per-step loop: resolves prerequisite step code,
//! assembles a prompt, invokes the model client, and persists artifacts.
//! Steps run strictly in order; a step whose prerequisites are missing from
//! disk fails the run rather than silently regenerating them.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::artifact;
use crate::errors::StepOrderingError;
use crate::extract;
use crate::model::{ModelClient, ModelParams};
use crate::overrides::FixtureOverrides;
use crate::problem::Problem;
use crate::prompt::{self, PromptTemplate};

/// Configuration for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    /// Model identifier passed to the completion backend; also names the
    /// per-model artifact directories.
    pub model: String,
    /// Directory for generated-code artifacts.
    pub output_dir: PathBuf,
    /// Directory for rendered prompts.
    pub prompt_dir: PathBuf,
    /// Sampling temperature, passed through uniformly.
    pub temperature: f64,
    /// Extension for response artifacts.
    pub response_ext: String,
    /// Write rendered prompts to the prompt directory.
    pub save_prompts: bool,
}

/// Per-problem cache of extracted step bodies, one slot per sub-step.
///
/// Scoped to the problem currently being processed: reset whenever a problem
/// begins at step 1 or the slot count no longer matches the problem's step
/// count. Stale entries from a previous problem must never leak into a new
/// problem's resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepCache {
    slots: Vec<Option<String>>,
}

impl StepCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries and size the cache for a problem with `total_steps`.
    pub fn reset(&mut self, total_steps: usize) {
        self.slots = vec![None; total_steps];
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Extracted body for the 0-based step index, if resolved.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Store the extracted body for the 0-based step index.
    pub fn set(&mut self, index: usize, body: String) {
        self.slots[index] = Some(body);
    }

    pub fn is_resolved(&self, index: usize) -> bool {
        self.get(index).is_some()
    }
}

/// Drives per-problem, per-step generation against a model client.
///
/// The prompt template and fixture-override table are injected at
/// construction; the step cache is an explicit value owned by the caller so
/// its reset points stay auditable.
pub struct Generator<C> {
    config: GenerateConfig,
    overrides: FixtureOverrides,
    template: PromptTemplate,
    client: C,
}

impl<C: ModelClient> Generator<C> {
    pub fn new(
        config: GenerateConfig,
        overrides: FixtureOverrides,
        template: PromptTemplate,
        client: C,
    ) -> Self {
        Self {
            config,
            overrides,
            template,
            client,
        }
    }

    /// Resolve the extracted bodies of every step before `target_step`.
    ///
    /// Unresolved slots are filled from the fixture file when the pair is
    /// overridden, otherwise from the step's response artifact. A missing
    /// source file is a [`StepOrderingError`]: the step was requested ahead
    /// of its prerequisites. Postcondition: slots `0..target_step-1` are
    /// populated; later slots are untouched.
    #[instrument(skip_all, fields(problem_id = %problem.problem_id, target_step))]
    pub fn resolve_prior_steps(
        &self,
        problem: &Problem,
        target_step: usize,
        cache: &mut StepCache,
    ) -> Result<()> {
        let total_steps = problem.total_steps();
        if target_step == 1 || cache.len() != total_steps {
            cache.reset(total_steps);
        }
        for prior in 0..target_step.saturating_sub(1) {
            if cache.is_resolved(prior) {
                continue;
            }
            let step_number = prior + 1;
            let source = match self.overrides.get(&problem.problem_id, step_number) {
                Some(path) => path.to_path_buf(),
                None => self.response_path(problem, step_number),
            };
            if !source.is_file() {
                return Err(StepOrderingError {
                    problem_id: problem.problem_id.clone(),
                    requested: target_step,
                    missing: step_number,
                }
                .into());
            }
            let contents = fs::read_to_string(&source)
                .with_context(|| format!("read prior step {}", source.display()))?;
            let name = extract::function_name(&problem.sub_steps[prior].function_header)
                .with_context(|| {
                    format!(
                        "derive function name for problem {} step {}",
                        problem.problem_id, step_number
                    )
                })?;
            let body = extract::function_body(&contents, &name)
                .ok_or_else(|| anyhow!("function {} not found in {}", name, source.display()))?;
            debug!(step = step_number, source = %source.display(), "resolved prior step");
            cache.set(prior, body);
        }
        Ok(())
    }

    /// Generate one step: resolve prerequisites, assemble and optionally
    /// persist the prompt, then invoke the model unless the response
    /// artifact already exists.
    #[instrument(skip_all, fields(problem_id = %problem.problem_id, target_step))]
    pub fn generate_step(
        &self,
        problem: &Problem,
        target_step: usize,
        cache: &mut StepCache,
    ) -> Result<()> {
        self.resolve_prior_steps(problem, target_step, cache)?;

        let prior_bodies: Vec<&str> = (0..target_step.saturating_sub(1))
            .map(|index| {
                cache
                    .get(index)
                    .with_context(|| format!("prior step {} unresolved", index + 1))
            })
            .collect::<Result<_>>()?;
        let assembled = prompt::assemble(&self.template, problem, target_step, &prior_bodies)?;

        if self.config.save_prompts {
            let path = artifact::prompt_path(
                &self.config.prompt_dir,
                &self.config.model,
                &problem.problem_id,
                target_step,
            );
            artifact::write(&path, &assembled.prompt)?;
        }

        let response_path = self.response_path(problem, target_step);
        if response_path.exists() {
            // Resuming a prior run: the artifact is immutable and the cache
            // slot stays unresolved; a later resolve re-derives it from disk.
            debug!(path = %response_path.display(), "response artifact exists, skipping");
            return Ok(());
        }

        let params = ModelParams::for_model(&self.config.model, self.config.temperature);
        let raw = self.client.complete(&assembled.prompt, &params)?;
        let code = extract::code_block(&raw);
        artifact::write(
            &response_path,
            &format!("{}\n{}", assembled.previous_code, code),
        )?;
        cache.set(target_step - 1, code);
        info!(step = target_step, path = %response_path.display(), "step generated");
        Ok(())
    }

    /// Generate every step of every problem, in input order.
    ///
    /// Steps present in the override table are skipped silently. One cache
    /// value flows through the whole run; resets at problem boundaries
    /// happen inside [`Self::resolve_prior_steps`]. The first error halts
    /// the run.
    pub fn run(&self, problems: &[Problem]) -> Result<()> {
        let mut cache = StepCache::new();
        for problem in problems {
            info!(
                problem_id = %problem.problem_id,
                steps = problem.total_steps(),
                "generating problem"
            );
            for step in 1..=problem.total_steps() {
                if self.overrides.contains(&problem.problem_id, step) {
                    debug!(problem_id = %problem.problem_id, step, "fixture override, skipping");
                    continue;
                }
                self.generate_step(problem, step, &mut cache)?;
            }
        }
        Ok(())
    }

    /// The underlying model client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn response_path(&self, problem: &Problem, step: usize) -> PathBuf {
        artifact::response_path(
            &self.config.output_dir,
            &self.config.model,
            &problem.problem_id,
            step,
            &self.config.response_ext,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_sizes_and_clears_slots() {
        let mut cache = StepCache::new();
        cache.reset(3);
        cache.set(0, "def a(): pass".to_string());
        assert!(cache.is_resolved(0));

        cache.reset(3);
        assert_eq!(cache.len(), 3);
        assert!(!cache.is_resolved(0));
    }

    #[test]
    fn get_is_none_out_of_range() {
        let mut cache = StepCache::new();
        cache.reset(1);
        assert_eq!(cache.get(5), None);
        assert!(!cache.is_resolved(5));
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = StepCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }
}
