//! Fixture overrides: steps whose reference code ships with the problem set.
//!
//! A small set of (problem, step) pairs source their prerequisite code from
//! static fixture files instead of freshly generated artifacts, and the
//! overridden steps themselves are skipped entirely during generation. The
//! table is plain data injected at construction; nothing else in the harness
//! knows which pairs are special.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Mapping of (problem_id, 1-based step number) to a fixture file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureOverrides {
    entries: BTreeMap<(String, usize), PathBuf>,
}

/// TOML file shape: a list of `[[overrides]]` entries.
#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    overrides: Vec<OverrideEntry>,
}

#[derive(Debug, Deserialize)]
struct OverrideEntry {
    problem_id: String,
    /// 1-based step number within the problem.
    step: usize,
    path: PathBuf,
}

impl FixtureOverrides {
    /// An empty table: every step is generated.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference problems whose prerequisite code ships with the
    /// problem set, at the standard `<fixture_dir>/<problem_id>.<step>.txt`
    /// location.
    pub fn builtin(fixture_dir: &Path) -> Self {
        let mut table = Self::new();
        for (problem_id, step) in [("13", 6), ("62", 1), ("76", 3)] {
            table.insert(problem_id, step, fixture_dir.join(format!("{problem_id}.{step}.txt")));
        }
        table
    }

    /// Load a table from a TOML file, replacing the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read overrides {}", path.display()))?;
        let file: OverrideFile = toml::from_str(&contents)
            .with_context(|| format!("parse overrides {}", path.display()))?;

        let mut table = Self::new();
        for (index, entry) in file.overrides.iter().enumerate() {
            entry
                .validate()
                .with_context(|| format!("overrides[{}] invalid", index))?;
            if table.contains(&entry.problem_id, entry.step) {
                bail!(
                    "duplicate override for problem {} step {}",
                    entry.problem_id,
                    entry.step
                );
            }
            table.insert(&entry.problem_id, entry.step, entry.path.clone());
        }
        Ok(table)
    }

    /// Register a fixture path for a (problem, 1-based step) pair.
    pub fn insert(&mut self, problem_id: &str, step: usize, path: PathBuf) {
        self.entries.insert((problem_id.to_string(), step), path);
    }

    /// Fixture path for the pair, if overridden.
    pub fn get(&self, problem_id: &str, step: usize) -> Option<&Path> {
        self.entries
            .get(&(problem_id.to_string(), step))
            .map(PathBuf::as_path)
    }

    /// Whether the pair is overridden.
    pub fn contains(&self, problem_id: &str, step: usize) -> bool {
        self.entries.contains_key(&(problem_id.to_string(), step))
    }
}

impl OverrideEntry {
    fn validate(&self) -> Result<()> {
        if self.problem_id.trim().is_empty() {
            bail!("problem_id must be non-empty");
        }
        if self.step == 0 {
            bail!("step is 1-based and must be > 0");
        }
        if self.path.as_os_str().is_empty() {
            bail!("path must be non-empty");
        }
        Ok(())
    }
}
