//! Prompt assembly for step generation.
//!
//! A step's prompt interleaves the accepted function bodies of all earlier
//! steps with the current step's description and function header, rendered
//! through a minijinja template with three named fields: `problem_steps`,
//! `next_step`, and `dependencies`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::errors::EmptyStepError;
use crate::problem::Problem;

const DEFAULT_TEMPLATE: &str = include_str!("prompts/generate.md");

/// Separator token placed between consecutive prior-step bodies.
const STEP_SEPARATOR: &str = "------";

/// Template engine wrapper around minijinja.
#[derive(Debug)]
pub struct PromptTemplate {
    env: Environment<'static>,
}

impl PromptTemplate {
    /// Compile a template from source.
    pub fn new(source: String) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template_owned("step".to_string(), source)
            .context("compile prompt template")?;
        Ok(Self { env })
    }

    /// The built-in generation template.
    pub fn builtin() -> Self {
        Self::new(DEFAULT_TEMPLATE.to_string()).expect("built-in template should be valid")
    }

    /// Compile a template from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        Self::new(source)
    }

    fn render(&self, problem_steps: &str, next_step: &str, dependencies: &str) -> Result<String> {
        let template = self.env.get_template("step")?;
        let rendered = template.render(context! {
            problem_steps => problem_steps,
            next_step => next_step,
            dependencies => dependencies,
        })?;
        Ok(rendered)
    }
}

/// A rendered prompt plus the code prefix for the next response artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPrompt {
    /// Rendered prompt text sent to the model.
    pub prompt: String,
    /// `required_dependencies` followed by all prior step bodies,
    /// newline-joined with a trailing newline; prefixed to the next
    /// response artifact.
    pub previous_code: String,
}

/// Assemble the prompt for `target_step` (1-based) from resolved prior bodies.
///
/// `prior_bodies` must hold the extracted bodies of steps `1..target_step`
/// in order. Returns [`EmptyStepError`] when the step's description and
/// header/return block are both blank.
pub fn assemble(
    template: &PromptTemplate,
    problem: &Problem,
    target_step: usize,
    prior_bodies: &[&str],
) -> Result<StepPrompt> {
    let step_index = target_step
        .checked_sub(1)
        .with_context(|| format!("target step must be 1-based, got {target_step}"))?;
    let sub_step = problem.sub_steps.get(step_index).with_context(|| {
        format!("problem {} has no step {}", problem.problem_id, target_step)
    })?;

    let problem_steps = prior_bodies.join(&format!("\n\n{STEP_SEPARATOR}\n\n"));

    let header_block = format!("{}\n\n{}", sub_step.function_header, sub_step.return_line);
    if sub_step.step_description_prompt.trim().is_empty() && header_block.trim().is_empty() {
        return Err(EmptyStepError {
            problem_id: problem.problem_id.clone(),
            step: target_step,
        }
        .into());
    }
    let next_step = format!("{}\n\n{}", sub_step.step_description_prompt, header_block);

    let prompt = template.render(&problem_steps, &next_step, &problem.required_dependencies)?;

    let mut parts = vec![problem.required_dependencies.as_str()];
    parts.extend(prior_bodies.iter().copied());
    let previous_code = format!("{}\n", parts.join("\n"));

    Ok(StepPrompt {
        prompt,
        previous_code,
    })
}
