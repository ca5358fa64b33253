//! Benchmark code generation driver.
//!
//! Iterates a problem set and generates each problem's sub-steps in order
//! against a chat-completion backend, persisting prompt and response
//! artifacts per (model, problem, step). Runs to completion or exits on the
//! first fatal error.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gencode::generate::{GenerateConfig, Generator};
use gencode::logging;
use gencode::model::HttpModelClient;
use gencode::overrides::FixtureOverrides;
use gencode::problem::load_problems;
use gencode::prompt::PromptTemplate;

#[derive(Parser)]
#[command(
    name = "gencode",
    version,
    about = "Generate benchmark solutions from a model, one sub-step at a time"
)]
struct Cli {
    /// Model identifier passed to the completion backend.
    #[arg(long, default_value = "gpt-4o")]
    model: String,

    /// Directory for generated-code artifacts.
    #[arg(long, default_value = "results/generated_code")]
    output_dir: PathBuf,

    /// Problem set JSONL file.
    #[arg(long, default_value = "data/problems_all.jsonl")]
    input_path: PathBuf,

    /// Directory for rendered prompts.
    #[arg(long, default_value = "results/prompt")]
    prompt_dir: PathBuf,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.0)]
    temperature: f64,

    /// Directory holding the built-in fixture reference files.
    #[arg(long, default_value = "data")]
    fixture_dir: PathBuf,

    /// Prompt template file (defaults to the built-in template).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Fixture override table (TOML), replacing the built-in defaults.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Chat-completion endpoint.
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    base_url: String,

    /// Environment variable holding the API key.
    #[arg(long, default_value = "OPENAI_API_KEY")]
    api_key_env: String,

    /// Extension for response artifacts.
    #[arg(long, default_value = "py")]
    response_ext: String,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let problems = load_problems(&cli.input_path)?;
    let template = match &cli.template {
        Some(path) => PromptTemplate::from_file(path)?,
        None => PromptTemplate::builtin(),
    };
    let overrides = match &cli.overrides {
        Some(path) => FixtureOverrides::load(path)?,
        None => FixtureOverrides::builtin(&cli.fixture_dir),
    };
    let client = HttpModelClient::from_env(cli.model.clone(), cli.base_url, &cli.api_key_env)?;

    let config = GenerateConfig {
        model: cli.model,
        output_dir: cli.output_dir,
        prompt_dir: cli.prompt_dir,
        temperature: cli.temperature,
        response_ext: cli.response_ext,
        save_prompts: true,
    };
    let generator = Generator::new(config, overrides, template, client);
    generator.run(&problems)
}
