//! `plancc` command line
//!
//! Compiles request files into test statement listings and checks
//! compiler configurations.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use plancc_compiler::generator::Attempt;
use plancc_compiler::report::{FailureReport, RunReport, TestReport};
use plancc_compiler::{logging, CompilerConfig, GenerationRequest, TestGenerator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "plancc",
    version,
    about = "Lower construction plans into executable test statements"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile the candidates of a request file
    Compile {
        /// Request file (JSON)
        #[arg(long)]
        request: PathBuf,
        /// Compiler configuration (TOML, JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Package the helper class lives in, overriding the configuration
        #[arg(long)]
        helper_package: Option<String>,
        /// Compile every candidate instead of stopping at the first success
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },
    /// Print the default configuration as TOML
    DefaultConfig,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompilerConfig> {
    match path {
        Some(path) => CompilerConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CompilerConfig::default()),
    }
}

fn compile(
    request: &Path,
    mut config: CompilerConfig,
    helper_package: Option<String>,
    all: bool,
) -> anyhow::Result<RunReport> {
    if let Some(package) = helper_package {
        config
            .override_helper_package(package)
            .context("applying --helper-package")?;
    }
    let input = std::fs::read_to_string(request)
        .with_context(|| format!("reading request {}", request.display()))?;
    let request = GenerationRequest::from_json_str(&input).context("parsing request")?;
    let loader = request.loader(&config.helpers);
    let mut generator = TestGenerator::new(&loader, &config);
    let mut report = RunReport::default();

    if all {
        for (index, candidate) in request.candidates.iter().enumerate() {
            match generator.attempt(candidate) {
                Attempt::Compiled(test) => report
                    .tests
                    .push(TestReport::new(&candidate.method, &test)),
                Attempt::Failed(error) => report.failures.push(FailureReport {
                    candidate: index,
                    method: candidate.method.to_string(),
                    error: error.to_string(),
                }),
                Attempt::Skipped => {}
            }
        }
    } else if let Some((candidate, test)) = generator.generate(request.candidates, || false) {
        report.tests.push(TestReport::new(&candidate.method, &test));
    }

    report.stats = generator.stats();
    Ok(report)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Compile {
            request,
            config,
            helper_package,
            all,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            logging::init(&config.logging).map_err(|e| anyhow!(e))?;
            let report = compile(&request, config, helper_package, all)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
            Ok(if report.tests.is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::CheckConfig { path } => {
            let config = load_config(Some(&path))?;
            println!(
                "{}: ok (helper class {}, max_depth {})",
                path.display(),
                config.helpers.binary_name(),
                config
                    .max_depth
                    .map_or_else(|| "unlimited".to_string(), |d| d.to_string())
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::DefaultConfig => {
            print!("{}", toml::to_string_pretty(&CompilerConfig::default())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    run(Cli::parse())
}
