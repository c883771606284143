//! CLI entrypoint for dive-bar
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use divebar_application::{
    AnalyzeTranscriptInput, AnalyzeTranscriptUseCase, BarObserver, NoTranscript, TranscriptStore,
    TurnController,
};
use divebar_domain::{ConfigIssue, Scheduler};
use divebar_infrastructure::{
    ConfigError, ConfigLoader, DEFAULT_AGENTS_PATH, FileAgentsConfig, FileConfig,
    JsonlTranscriptReader, JsonlTranscriptStore, config_hash, gateway_from_config,
};
use divebar_presentation::{
    AnalyzeArgs, Cli, Command, ConsoleConfig, ConsoleObserver, ReportFormatter,
    spawn_stdin_controls,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "dive-bar.log";
const COMMAND_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = ConfigLoader::load(cli.config.as_deref())?;

    // Stdout is the bar itself, so logs go to a file unless asked otherwise
    let to_stderr = cli.log_stderr || cli.command.is_some();
    let _log_guard = init_logging(cli.verbose, to_stderr, &config.storage.log_dir)?;

    let console = ConsoleConfig {
        show_timestamps: config.display.show_timestamps,
        color: config.display.color && !cli.no_color,
    };
    console.apply_color_choice();

    match &cli.command {
        Some(Command::Analyze(args)) => run_analyze(args, &config),
        None => run_bar(&cli, config, console).await,
    }
}

/// Initialize logging based on verbosity level (`RUST_LOG` wins when set).
fn init_logging(
    verbose: u8,
    to_stderr: bool,
    log_dir: &std::path::Path,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Log warnings and fail on errors.
fn check_issues(issues: Vec<ConfigIssue>) -> Result<(), ConfigError> {
    let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(ConfigIssue::is_error);
    for issue in &warnings {
        warn!("{}", issue.message);
    }
    for issue in &errors {
        error!("{}", issue.message);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}

async fn run_bar(cli: &Cli, config: FileConfig, console: ConsoleConfig) -> Result<()> {
    let agents_path = cli
        .agents
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AGENTS_PATH));
    let agents = FileAgentsConfig::load(&agents_path)?;

    let mut issues = config.validate();
    issues.extend(agents.validate(config.bar.max_agents));
    check_issues(issues)?;

    // === Dependency Injection ===
    let mut settings = config.to_bar_settings(config_hash(&config, &agents)?);
    if let Some(speed) = cli.speed {
        settings.speed = speed;
    }

    let roster = agents.to_roster(config.bar.max_agents)?;
    let scheduler = match cli.seed {
        Some(seed) => Scheduler::with_seed(roster, settings.scheduler_settings(), seed),
        None => Scheduler::new(roster, settings.scheduler_settings()),
    };

    let gateway = gateway_from_config(&config.llm)?;

    let store: Arc<dyn TranscriptStore> =
        match JsonlTranscriptStore::open(&config.storage.transcript_path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(
                    path = %config.storage.transcript_path.display(),
                    error = %e,
                    "Transcript unavailable, continuing without recording"
                );
                Arc::new(NoTranscript)
            }
        };
    let observer: Arc<dyn BarObserver> = Arc::new(ConsoleObserver::new(console));

    println!();
    println!("+============================================================+");
    println!("|{:^60}|", settings.bar_name);
    println!("+============================================================+");
    println!(
        "Regulars: {}",
        scheduler.roster().names().collect::<Vec<_>>().join(", ")
    );
    println!("Type to talk. /p pause, + / - speed, /q last call.");
    println!();

    let mut controller = TurnController::new(gateway, scheduler, settings)
        .with_store(store)
        .with_observer(observer);
    if let Some(seed) = cli.seed {
        controller = controller.with_seed(seed);
    }

    controller
        .open()
        .await
        .context("the text backend is not available")?;
    info!(session = ?controller.session_id(), "Session started");

    let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
    spawn_stdin_controls(commands);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    controller.run(command_rx, cancel).await?;
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs, config: &FileConfig) -> Result<()> {
    let path = args
        .transcript
        .clone()
        .unwrap_or_else(|| config.storage.transcript_path.clone());
    let reader = Arc::new(JsonlTranscriptReader::new(&path));
    let use_case = AnalyzeTranscriptUseCase::new(reader);

    let input = AnalyzeTranscriptInput {
        session_prefix: args.session.clone(),
    };
    let report = use_case
        .execute(input)
        .with_context(|| format!("analyzing {}", path.display()))?;

    let output = if args.json {
        ReportFormatter::format_json(&report)
    } else {
        ReportFormatter::format(&report)
    };
    println!("{}", output);
    Ok(())
}
