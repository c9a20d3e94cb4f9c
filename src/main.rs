use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use livechart::app::{self, IngestError, RunReport};
use livechart::config::{interval_from_secs, ChartConfig, ConfigError, GridSpec, SubplotConfig};
use livechart::services::diagnostics::{DeferredDiagnostics, StderrDiagnostics};
use livechart::services::terminal_modes::{self, TerminalModes};
use livechart::services::time_source::RealTimeSource;
use livechart::services::{log_dirs, signal_handler, tracing_setup};
use livechart::view::headless::HeadlessSurface;
use livechart::view::terminal::{CrosstermEvents, TerminalSurface};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

const NO_STDIN_MESSAGE: &str = "No STDIN input detected. `livechart --help` for help information.";

/// Live chart of JSON numbers streamed over STDIN
#[derive(Parser, Debug)]
#[command(name = "livechart")]
#[command(
    about = "Plot a live chart of numbers or flat JSON objects read line by line from STDIN",
    long_about = None
)]
#[command(version)]
struct Args {
    /// One subplot per series, optionally on a HxV grid (e.g. 5x6 = 5 columns, 6 rows)
    #[arg(
        short,
        long,
        value_name = "HxV",
        num_args = 0..=1,
        default_missing_value = "auto",
        value_parser = parse_subplots
    )]
    subplots: Option<SubplotConfig>,

    /// Normalize each series against its maximum absolute value
    #[arg(short, long)]
    normalize: bool,

    /// Minimum number of seconds between re-renders [default: 1.0]
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_interval)]
    interval: Option<f64>,

    /// Render only once STDIN is exhausted
    #[arg(short = 'N', long)]
    no_refresh: bool,

    /// Plot wall-clock time, including the time spent rendering
    #[arg(long)]
    raw_time: bool,

    /// Draw nothing; print the final series as JSON on STDOUT
    #[arg(long)]
    headless: bool,

    /// Path to a JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Path to log file (default: livechart state directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_subplots(value: &str) -> Result<SubplotConfig, String> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(SubplotConfig::auto());
    }
    value
        .parse::<GridSpec>()
        .map(SubplotConfig::from)
        .map_err(|e| e.to_string())
}

fn parse_interval(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    interval_from_secs(seconds).map_err(|e| e.to_string())?;
    Ok(seconds)
}

impl Args {
    /// Config file (or defaults) with command-line flags applied on top.
    fn chart_config(&self) -> Result<ChartConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::load_from_file(path)?,
            None => ChartConfig::default(),
        };

        if let Some(subplots) = self.subplots {
            config.subplots = subplots;
        }
        if let Some(interval) = self.interval {
            config.render_interval = interval;
        }
        config.normalize |= self.normalize;
        config.no_refresh |= self.no_refresh;
        if self.raw_time {
            config.compensate_render_time = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(args: &Args) {
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(log_dirs::main_log_path);
    if let Err(e) = tracing_setup::init_global(&log_file) {
        eprintln!(
            "Warning: logging to {} disabled: {:#}",
            log_file.display(),
            e
        );
    }

    // Clean up stale log files from dead processes on startup
    log_dirs::cleanup_stale_logs();

    tracing::info!("livechart starting");
}

fn run_headless(config: &ChartConfig) -> AnyhowResult<RunReport> {
    signal_handler::install_interrupt_handler(None, false)
        .context("Failed to install interrupt handler")?;

    let report = app::run(
        io::stdin().lock(),
        config,
        HeadlessSurface::new(io::stdout().lock()),
        StderrDiagnostics,
        RealTimeSource::shared(),
    )?;
    Ok(report)
}

fn run_terminal(config: &ChartConfig) -> AnyhowResult<RunReport> {
    if !io::stdout().is_terminal() {
        anyhow::bail!("STDOUT is not a terminal; use --headless to print the series as JSON");
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        terminal_modes::emergency_cleanup();
        original_hook(panic);
    }));

    let diagnostics = DeferredDiagnostics::new();
    signal_handler::install_interrupt_handler(Some(diagnostics.clone()), true)
        .context("Failed to install interrupt handler")?;

    let modes = TerminalModes::enable().context("Failed to set up the terminal")?;
    let terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")?;
    let mut surface = TerminalSurface::new(terminal, CrosstermEvents::new(modes));

    let result = app::run(
        io::stdin().lock(),
        config,
        &mut surface,
        diagnostics.clone(),
        RealTimeSource::shared(),
    );

    // Restore the terminal before anything reaches stderr
    drop(surface);
    diagnostics.flush();

    Ok(result?)
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let config = match args.chart_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Handle --dump-config early (no STDIN or terminal needed)
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if io::stdin().is_terminal() {
        eprintln!("{}", NO_STDIN_MESSAGE);
        std::process::exit(1);
    }

    init_logging(&args);
    tracing::debug!(?config, "Effective configuration");

    let result = if args.headless {
        run_headless(&config)
    } else {
        run_terminal(&config)
    };

    match result {
        Ok(report) => {
            tracing::info!(
                samples = report.series.len(),
                skipped = report.skipped_lines,
                passes = report.render_passes,
                "livechart exiting"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("livechart failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<IngestError>()
                .map(IngestError::exit_code)
                .unwrap_or(1);
            std::process::exit(code.into());
        }
    }
}
