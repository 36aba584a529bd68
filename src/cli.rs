use crate::commands;
use crate::config::Config;
use crate::gateway::RigGateway;
use crate::log_debug;
use crate::providers::Provider;
use crate::types::Task;
use crate::ui;
use anyhow::{Context, Result, bail};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

const LOG_FILE: &str = "trio-debug.log";

/// CLI structure defining the available arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "trio: divide a task, analyze it in parallel, synthesize one report",
    long_about = "trio asks an LLM to split a task into three complementary sub-tasks, \
                  analyzes each one with an independent worker, and combines the results \
                  into a single JSON report.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// The task to work on
    #[arg(help = "The task to work on (read from stdin when omitted)")]
    pub task: Option<String>,

    /// Read the task from a file
    #[arg(
        short = 'f',
        long = "task-file",
        conflicts_with = "task",
        help = "Read the task from a file"
    )]
    pub task_file: Option<PathBuf>,

    /// Override default LLM provider
    #[arg(long, help = "Override default LLM provider", value_parser = available_providers_parser)]
    pub provider: Option<String>,

    /// Model for division and synthesis
    #[arg(short, long, help = "Model for task division and synthesis")]
    pub model: Option<String>,

    /// Model for subtask workers
    #[arg(long = "subtask-model", help = "Model for subtask workers")]
    pub subtask_model: Option<String>,

    /// Where to write the final report
    #[arg(short, long, help = "Where to write the final report")]
    pub output: Option<PathBuf>,

    /// Fail instead of synthesizing when every subtask fails
    #[arg(
        long = "require-results",
        help = "Fail instead of synthesizing when every subtask fails"
    )]
    pub require_results: bool,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log", help = "Log debug messages to a file")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", help = "Specify a custom log file path")]
    pub log_file: Option<String>,

    /// Suppress non-essential output
    #[arg(short = 'q', long = "quiet", help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Display the version
    #[arg(short = 'v', long = "version", help = "Display the version")]
    pub version: bool,
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Generate dynamic help including available LLM providers
fn get_dynamic_help() -> String {
    let providers = Provider::all_names()
        .iter()
        .map(|p| format!("{p} ({})", p.parse::<Provider>().map_or("", |p| p.api_key_env())))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Available LLM providers: {providers}")
}

fn available_providers_parser(s: &str) -> Result<String, String> {
    s.parse::<Provider>()
        .map(|p| p.name().to_string())
        .map_err(|e| e.to_string())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Pick the task from the argument, the task file, or stdin
fn resolve_task(cli: &Cli) -> Result<Task> {
    let text = if let Some(task) = &cli.task {
        task.clone()
    } else if let Some(path) = &cli.task_file {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file {}", path.display()))?
    } else {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail!("No task given. Pass it as an argument, with --task-file, or on stdin.");
        }
        io::read_to_string(stdin).context("Failed to read task from stdin")?
    };

    let task = Task::new(&text);
    if task.is_empty() {
        bail!("The task is empty");
    }
    Ok(task)
}

/// Main entry point; returns whether the run completed
pub async fn main() -> Result<bool> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(true);
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    let task = resolve_task(&cli)?;

    let mut config = Config::load()?;
    config.update(
        cli.provider,
        cli.model,
        cli.subtask_model,
        cli.output,
        cli.require_results,
    )?;
    let pipeline_config = config.pipeline_config()?;
    let gateway = RigGateway::new(config.provider()?)?;

    log_debug!(
        "Running with provider {} (main model {}, subtask model {})",
        gateway.provider(),
        pipeline_config.main_model,
        pipeline_config.subtask_model
    );

    let run = commands::handle_run(&task, pipeline_config, Arc::new(gateway), &config.output_path)
        .await?;
    Ok(run.report().is_some())
}
