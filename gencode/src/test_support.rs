//! Test-only helpers for constructing problems and scripted model clients.

use std::cell::RefCell;

use anyhow::{Result, bail};

use crate::model::{ModelClient, ModelParams};
use crate::problem::{Problem, SubStep};

/// Create a problem with `steps` deterministic sub-steps (`step1`..`stepN`).
pub fn problem(id: &str, steps: usize) -> Problem {
    let sub_steps = (1..=steps)
        .map(|n| SubStep {
            step_description_prompt: format!("Implement step {n}"),
            function_header: format!("def step{n}(x):\n    '''Step {n}.'''"),
            return_line: "    return x".to_string(),
        })
        .collect();
    Problem {
        problem_id: id.to_string(),
        required_dependencies: "import numpy as np".to_string(),
        sub_steps,
    }
}

/// Create a problem from explicit (description, header, return_line) triples.
pub fn problem_with_steps(id: &str, dependencies: &str, steps: &[(&str, &str, &str)]) -> Problem {
    let sub_steps = steps
        .iter()
        .map(|(description, header, return_line)| SubStep {
            step_description_prompt: description.to_string(),
            function_header: header.to_string(),
            return_line: return_line.to_string(),
        })
        .collect();
    Problem {
        problem_id: id.to_string(),
        required_dependencies: dependencies.to_string(),
        sub_steps,
    }
}

/// Deterministic body text matching the sub-steps built by [`problem`].
pub fn body(n: usize) -> String {
    format!("def step{n}(x):\n    return x")
}

/// Fenced model response whose code block is [`body`]`(n)`.
pub fn response(n: usize) -> String {
    format!("Background: step {n}.\n```python\n{}\n```\n", body(n))
}

/// Scripted model client that replays canned responses and records prompts.
#[derive(Default)]
pub struct ScriptedClient {
    responses: RefCell<Vec<String>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: RefCell::new(responses),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl ModelClient for ScriptedClient {
    fn complete(&self, prompt: &str, _params: &ModelParams) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            bail!("scripted client exhausted");
        }
        Ok(responses.remove(0))
    }
}
