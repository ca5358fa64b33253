//! Code extraction from model responses and generated files.
//!
//! Pure text boundaries: pull the runnable portion out of a raw model
//! response, derive the target function name from a sub-step's header, and
//! locate a named function's source in a previously generated file.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

static PYTHON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```python[ \t]*\r?\n(.*?)```").unwrap());

static ANY_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").unwrap());

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:def|class)[ \t]+([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Extract the runnable code portion from a raw model response.
///
/// Prefers a `python`-tagged fenced block, then any fenced block; a response
/// with no fences is returned trimmed.
pub fn code_block(raw: &str) -> String {
    if let Some(caps) = PYTHON_FENCE_RE.captures(raw) {
        return caps[1].trim_end().to_string();
    }
    if let Some(caps) = ANY_FENCE_RE.captures(raw) {
        return caps[1].trim_end().to_string();
    }
    raw.trim().to_string()
}

/// Derive the target function (or class) name from a sub-step's header block.
pub fn function_name(header: &str) -> Result<String> {
    match NAME_RE.captures(header) {
        Some(caps) => Ok(caps[1].to_string()),
        None => bail!("function header has no def or class definition"),
    }
}

/// Extract the source of the named function or class from a file's full text.
///
/// The block starts at the `def`/`class` line and extends through every line
/// that is blank or indented deeper than it; trailing blank lines are
/// dropped. Returns `None` when the name is not defined in the text.
pub fn function_body(file_text: &str, name: &str) -> Option<String> {
    let def_re =
        Regex::new(&format!(r"^([ \t]*)(?:def|class)[ \t]+{}\b", regex::escape(name))).ok()?;

    let lines: Vec<&str> = file_text.lines().collect();
    let (def_index, indent) = lines.iter().enumerate().find_map(|(index, line)| {
        def_re
            .captures(line)
            .map(|caps| (index, caps.get(1).map_or(0, |m| m.as_str().len())))
    })?;

    let mut collected = vec![lines[def_index]];
    // Signature continuations can sit at the def's own indent; track bracket
    // depth from the def line so wrapped parameter lists stay in the block.
    let mut depth = bracket_depth(lines[def_index]);
    for &line in &lines[def_index + 1..] {
        if depth > 0 {
            collected.push(line);
            depth += bracket_depth(line);
            continue;
        }
        let line_indent = line.len() - line.trim_start().len();
        if !line.trim().is_empty() && line_indent <= indent {
            break;
        }
        collected.push(line);
    }
    while collected.last().is_some_and(|line| line.trim().is_empty()) {
        collected.pop();
    }
    Some(collected.join("\n"))
}

fn bracket_depth(line: &str) -> i32 {
    line.chars().fold(0, |depth, ch| match ch {
        '(' | '[' | '{' => depth + 1,
        ')' | ']' | '}' => depth - 1,
        _ => depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_block_prefers_python_fence() {
        let raw = "Notes:\n```text\nnot code\n```\n```python\nx = 1\n```\n";
        assert_eq!(code_block(raw), "x = 1");
    }

    #[test]
    fn code_block_accepts_untagged_fence() {
        let raw = "```\ny = 2\n```";
        assert_eq!(code_block(raw), "y = 2");
    }

    #[test]
    fn code_block_falls_back_to_raw_text() {
        assert_eq!(code_block("  z = 3\n"), "z = 3");
    }

    #[test]
    fn function_name_from_def_header() {
        let header = "def calc_sum(x):\n    '''Sum the input.'''";
        assert_eq!(function_name(header).expect("name"), "calc_sum");
    }

    #[test]
    fn function_name_from_class_header() {
        let header = "class Lattice:\n    '''A lattice.'''";
        assert_eq!(function_name(header).expect("name"), "Lattice");
    }

    #[test]
    fn function_name_rejects_prose() {
        let err = function_name("compute the thing").expect_err("no definition");
        assert!(err.to_string().contains("no def or class"));
    }

    #[test]
    fn function_body_stops_at_next_top_level_def() {
        let text = "import numpy as np\n\ndef first(x):\n    y = x + 1\n    return y\n\n\ndef second(x):\n    return x\n";
        let body = function_body(text, "first").expect("body");
        assert_eq!(body, "def first(x):\n    y = x + 1\n    return y");
    }

    #[test]
    fn function_body_keeps_nested_definitions() {
        let text = "def outer(x):\n    def inner(y):\n        return y\n    return inner(x)\n";
        let body = function_body(text, "outer").expect("body");
        assert!(body.contains("def inner(y):"));
        assert!(body.ends_with("return inner(x)"));
    }

    #[test]
    fn function_body_spans_wrapped_signature() {
        let text = "def wide(\n    a,\n    b,\n):\n    return a + b\n";
        let body = function_body(text, "wide").expect("body");
        assert!(body.ends_with("return a + b"));
    }

    #[test]
    fn function_body_matches_whole_name_only() {
        let text = "def sum_all(x):\n    return sum(x)\n";
        assert!(function_body(text, "sum").is_none());
        assert!(function_body(text, "sum_all").is_some());
    }

    #[test]
    fn function_body_extracts_class_block() {
        let text = "class Grid:\n    def __init__(self):\n        self.cells = []\n\nVALUE = 1\n";
        let body = function_body(text, "Grid").expect("body");
        assert!(body.ends_with("self.cells = []"));
        assert!(!body.contains("VALUE"));
    }

    #[test]
    fn function_body_missing_name_is_none() {
        assert!(function_body("x = 1\n", "f").is_none());
    }
}
