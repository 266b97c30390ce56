//! Command-line interface.
//!
//! Validates preconditions (credential, prompt, non-empty suite) before any
//! test executes, wires operator interrupts into the cancellation token, and
//! hands the finished report to the selected reporter.

use crate::buildinfo;
use crate::client::CompletionClient;
use crate::config::ClientConfig;
use crate::report::{HtmlReporter, JsonReporter, Reporter, TerminalReporter};
use crate::runner::Runner;
use crate::suite;
use crate::types::RunReport;
use crate::util::truncate;
use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Specification testing for structured LLM outputs.
///
/// Define test cases with input strings and expected JSON outputs, run them
/// against one or more models via OpenRouter, and compare accuracy, latency,
/// and throughput across models with field-level diff reports for failures.
#[derive(Parser)]
#[command(name = "verdict", version = buildinfo::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tests against LLM models
    Run(RunArgs),
    /// Print version information
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Path to test cases JSON file
    #[arg(short = 't', long)]
    tests: PathBuf,

    /// Path to JSON schema file
    #[arg(short = 's', long)]
    schema: PathBuf,

    /// System prompt for the LLM
    #[arg(short = 'p', long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Path to file containing the system prompt
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Model(s) to test against (can be repeated)
    #[arg(short = 'm', long = "model", required = true)]
    models: Vec<String>,

    /// Number of parallel requests per model
    #[arg(short = 'P', long, default_value_t = 1)]
    parallel: usize,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Terminal)]
    output: OutputFormat,

    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Terminal,
    Json,
    Html,
}

/// Parse arguments and run the selected command.
pub async fn execute() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("verdict {}", buildinfo::version_string());
            ExitCode::SUCCESS
        }
        Commands::Run(args) => match run_tests(args).await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Error: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_tests(args: RunArgs) -> anyhow::Result<ExitCode> {
    let api_key = args
        .api_key
        .clone()
        .context("API key required: use --api-key or set OPENROUTER_API_KEY")?;

    let system_prompt = match (&args.prompt, &args.prompt_file) {
        (Some(prompt), None) => prompt.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt file {}", path.display()))?,
        (None, None) => anyhow::bail!("prompt required: use --prompt or --prompt-file"),
        (Some(_), Some(_)) => anyhow::bail!("--prompt and --prompt-file are mutually exclusive"),
    };

    let tests = suite::load_tests(&args.tests)?;
    anyhow::ensure!(!tests.is_empty(), "no tests found in {}", args.tests.display());
    let schema = suite::load_schema(&args.schema)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, cancelling...");
                cancel.cancel();
            }
        });
    }

    let client = CompletionClient::new(ClientConfig::new(api_key))?;
    let runner = Runner::new(client, args.parallel);

    let mut report = RunReport {
        timestamp: Utc::now(),
        prompt: truncate(&system_prompt, 100),
        schema: args.schema.display().to_string(),
        test_file: args.tests.display().to_string(),
        models: Vec::with_capacity(args.models.len()),
    };

    for model in &args.models {
        let model = model.trim();
        if model.is_empty() {
            continue;
        }

        if args.output == OutputFormat::Terminal {
            eprintln!("Running {} tests against {model}...", tests.len());
        }

        let model_run = runner
            .run(&cancel, model, &system_prompt, &schema, &tests)
            .await;
        report.models.push(model_run);

        // Stop dispatching further models once cancellation is observed;
        // the model just aggregated stays in the report.
        if cancel.is_cancelled() {
            break;
        }
    }

    render(&report, args.output).context("failed to write report")?;

    let tests_failed = report
        .models
        .iter()
        .any(|mr| mr.metrics.failed > 0 || mr.metrics.errors > 0);
    Ok(if tests_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn render(report: &RunReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout().lock();
    match format {
        OutputFormat::Terminal => TerminalReporter::new(stdout).report(report),
        OutputFormat::Json => JsonReporter::new(stdout).report(report),
        OutputFormat::Html => HtmlReporter::new(stdout).report(report),
    }
}
