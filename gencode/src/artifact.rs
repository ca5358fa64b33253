//! On-disk artifact layout for prompts and generated code.
//!
//! Artifacts are keyed by (model, problem, step). Response files are written
//! once and treated as immutable afterwards; an existing response file
//! short-circuits generation for that step.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Path of the rendered prompt for a (model, problem, step) triple.
pub fn prompt_path(prompt_dir: &Path, model: &str, problem_id: &str, step: usize) -> PathBuf {
    prompt_dir
        .join(model)
        .join(format!("{problem_id}.{step}.txt"))
}

/// Path of the generated-code artifact for a (model, problem, step) triple.
pub fn response_path(
    output_dir: &Path,
    model: &str,
    problem_id: &str,
    step: usize,
    ext: &str,
) -> PathBuf {
    output_dir
        .join(model)
        .join(format!("{problem_id}.{step}.{ext}"))
}

/// Write an artifact, creating parent directories as needed.
pub fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create artifact dir {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write artifact {}", path.display()))?;
    Ok(())
}
