//! Countdown Timer CLI - a color-wipe countdown in the terminal
//!
//! Pick a duration from the presets, start the countdown, and watch the
//! bar drain. Enter pauses and resumes, `r` resets.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use countdown::cli::{session, Cli, Commands, Display, RunArgs, SessionOptions};
use countdown::AppConfig;

/// How long to wait for background work (the blocking stdin reader) on exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// Main entry point
fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            Display::show_error(&format!("failed to start runtime: {e}"));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = runtime.block_on(execute(cli));
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);

    if let Err(e) = result {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `--verbose` selects `debug` and the default is `warn`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match &cli.command {
        Some(Commands::Run(args)) => {
            let config = load_config(&cli)?;
            run(&config, args).await?;
        }
        Some(Commands::Presets) => {
            let config = load_config(&cli)?;
            Display::show_presets(&config.selector()?);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    AppConfig::load(cli.config.as_deref()).context("failed to load configuration")
}

/// Opens the timer screen.
async fn run(config: &AppConfig, args: &RunArgs) -> Result<()> {
    let mut selector = config.selector()?;
    if let Some(index) = args.preset {
        selector.select(index);
    }
    if let Some(position) = args.seconds.and_then(|s| selector.durations().position(s)) {
        selector.select(position);
    }

    let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
    let display = Display::new(config.theme.palette()?, config.bar_width, color);
    let options = SessionOptions {
        tick_interval: config.tick_interval(),
        // Only a one-shot or an explicit duration skips the picker
        first_duration: args
            .seconds
            .or_else(|| args.once.then(|| selector.current_duration())),
        once: args.once,
    };

    if !args.once {
        Display::show_controls_help();
    }
    session::run(selector, display, options).await?;
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
