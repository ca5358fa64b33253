//! Problem-set parsing and validation.
//!
//! Problem sets are JSONL files, one problem record per line. Each problem
//! carries its ordered sub-steps and the import boilerplate prefixed to every
//! generated artifact.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// A benchmark problem decomposed into ordered, dependent sub-steps.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Problem {
    /// Unique identifier; also names artifact files on disk.
    pub problem_id: String,
    /// Import/boilerplate code prefixed to every generated artifact.
    #[serde(default)]
    pub required_dependencies: String,
    /// Ordered sub-steps, identified by their 1-based position.
    pub sub_steps: Vec<SubStep>,
}

/// One incremental coding task within a problem.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SubStep {
    /// Natural-language instruction for this step.
    pub step_description_prompt: String,
    /// Docstring-annotated signature block; also names the target function.
    pub function_header: String,
    /// Trailing code establishing the expected return contract.
    #[serde(default)]
    pub return_line: String,
}

impl Problem {
    /// Number of sub-steps in this problem.
    pub fn total_steps(&self) -> usize {
        self.sub_steps.len()
    }

    fn validate(&self) -> Result<()> {
        validate_problem_id(&self.problem_id)?;
        if self.sub_steps.is_empty() {
            bail!("sub_steps must be a non-empty array");
        }
        for (index, step) in self.sub_steps.iter().enumerate() {
            if step.step_description_prompt.trim().is_empty()
                && step.function_header.trim().is_empty()
                && step.return_line.trim().is_empty()
            {
                bail!("sub_steps[{}] must have a description or function header", index);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let problem: Problem = serde_json::from_str(contents).context("parse problem")?;
        problem.validate()?;
        Ok(problem)
    }
}

/// Load all problems from a JSONL file, preserving input order.
///
/// Blank lines are skipped. Errors carry the 1-based line number. Duplicate
/// `problem_id`s are rejected.
pub fn load_problems(path: &Path) -> Result<Vec<Problem>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read problem set {}", path.display()))?;

    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let problem: Problem = serde_json::from_str(line)
            .with_context(|| format!("parse {} line {}", path.display(), index + 1))?;
        problem
            .validate()
            .with_context(|| format!("validate {} line {}", path.display(), index + 1))?;
        if !seen.insert(problem.problem_id.clone()) {
            bail!(
                "duplicate problem_id {} at {} line {}",
                problem.problem_id,
                path.display(),
                index + 1
            );
        }
        problems.push(problem);
    }
    Ok(problems)
}

fn validate_problem_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("problem_id must be non-empty");
    }
    if id.contains('/') || id.contains('\\') {
        bail!("problem_id must not contain path separators");
    }
    if id.contains("..") {
        bail!("problem_id must not contain '..'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_problem() {
        let input = r#"{
            "problem_id": "1",
            "required_dependencies": "import numpy as np",
            "sub_steps": [{
                "step_description_prompt": "Compute sum",
                "function_header": "def f(x):\n    '''doc'''",
                "return_line": "    return sum(x)"
            }]
        }"#;
        let problem = Problem::parse_str(input).expect("problem parses");
        assert_eq!(problem.problem_id, "1");
        assert_eq!(problem.total_steps(), 1);
        assert_eq!(problem.required_dependencies, "import numpy as np");
    }

    #[test]
    fn rejects_invalid_id() {
        let input = r#"{"problem_id": "bad/id", "sub_steps": [{
            "step_description_prompt": "x", "function_header": "def f():", "return_line": ""
        }]}"#;
        let err = Problem::parse_str(input).expect_err("invalid id");
        assert!(err.to_string().contains("problem_id"));
    }

    #[test]
    fn rejects_empty_steps() {
        let input = r#"{"problem_id": "1", "sub_steps": []}"#;
        let _err = Problem::parse_str(input).expect_err("empty steps");
    }

    #[test]
    fn rejects_degenerate_sub_step() {
        let input = r#"{"problem_id": "1", "sub_steps": [{
            "step_description_prompt": " ", "function_header": "", "return_line": ""
        }]}"#;
        let err = Problem::parse_str(input).expect_err("degenerate step");
        assert!(err.to_string().contains("sub_steps[0]"));
    }

    #[test]
    fn loads_jsonl_preserving_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("problems.jsonl");
        let record = |id: &str| {
            format!(
                r#"{{"problem_id": "{id}", "sub_steps": [{{"step_description_prompt": "x", "function_header": "def f():", "return_line": ""}}]}}"#
            )
        };
        fs::write(&path, format!("{}\n\n{}\n", record("2"), record("1"))).expect("write");

        let problems = load_problems(&path).expect("load");
        let ids: Vec<&str> = problems.iter().map(|p| p.problem_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn load_rejects_duplicate_ids_with_line_number() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("problems.jsonl");
        let record = r#"{"problem_id": "1", "sub_steps": [{"step_description_prompt": "x", "function_header": "def f():", "return_line": ""}]}"#;
        fs::write(&path, format!("{record}\n{record}\n")).expect("write");

        let err = load_problems(&path).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate problem_id 1"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn load_reports_malformed_line() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("problems.jsonl");
        fs::write(&path, "not json\n").expect("write");

        let err = load_problems(&path).expect_err("malformed");
        assert!(format!("{err:#}").contains("line 1"));
    }
}
