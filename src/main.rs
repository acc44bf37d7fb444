//! StudyFocus - a 25 minute focus timer for study sessions
//!
//! `studyfocus daemon` hosts the countdown; every other command talks to it
//! over a Unix socket. Each session that runs to zero is recorded for the
//! configured user.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use studyfocus::cli::{Cli, Commands, DaemonArgs, Display, IpcClient, StartArgs, StatsArgs};
use studyfocus::config::{AppConfig, ConfigError};
use studyfocus::daemon::{
    CompletionReport, FocusTimer, IntervalTicker, IpcServer, RequestHandler, SessionCompleter,
    TimerDriver, TimerEvent,
};
use studyfocus::notify::{Notifier, NotifyError, TerminalNotifier};
use studyfocus::store::{FocusStats, JsonFileStore, SessionStore, StoreError};

/// Status poll interval for `start --wait`
const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(default_log_level(&cli));

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(hint) = suggestion_for(&e) {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(1);
    }
}

/// Returns the log level used when `RUST_LOG` is not set.
fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if matches!(cli.command, Some(Commands::Daemon(_))) {
        "info"
    } else {
        "warn"
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn suggestion_for(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(e) = error.downcast_ref::<ConfigError>() {
        return Some(e.suggestion());
    }
    if let Some(e) = error.downcast_ref::<StoreError>() {
        return Some(e.suggestion());
    }
    None
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    debug!(command = ?cli.command, "executing");

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?.with_overrides(
        None,
        cli.data_dir,
        cli.socket,
    );

    match command {
        Commands::Daemon(args) => run_daemon(config, args).await,
        Commands::Start(args) => run_start(&client_for(&config)?, args).await,
        Commands::Pause => {
            let response = client_for(&config)?.pause().await?;
            Display::show_command_result(&response);
            Ok(())
        }
        Commands::Toggle => {
            let response = client_for(&config)?.toggle().await?;
            Display::show_command_result(&response);
            Ok(())
        }
        Commands::Reset => {
            let response = client_for(&config)?.reset().await?;
            Display::show_command_result(&response);
            Ok(())
        }
        Commands::Status => {
            let response = client_for(&config)?.status().await?;
            Display::show_status(&response);
            Ok(())
        }
        Commands::Stats(args) => run_stats(config, args).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match AppConfig::default_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("no default config file: {}", e);
                return Ok(AppConfig::default());
            }
        },
    };

    debug!(path = %path.display(), "loading config");
    Ok(AppConfig::load(&path)?)
}

fn client_for(config: &AppConfig) -> Result<IpcClient> {
    Ok(IpcClient::with_socket_path(config.resolve_socket_path()?))
}

// ============================================================================
// Daemon
// ============================================================================

async fn run_daemon(config: AppConfig, args: DaemonArgs) -> Result<()> {
    let config = config.with_overrides(args.user, None, None);
    let user_id = config.require_user()?.to_string();
    let data_dir = config.resolve_data_dir()?;
    let socket_path = config.resolve_socket_path()?;

    let (event_tx, events) = mpsc::unbounded_channel();
    let (report_tx, reports) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let timer = Arc::new(Mutex::new(FocusTimer::new(event_tx)));
    let store = JsonFileStore::in_dir(&data_dir);
    info!(path = %store.path().display(), "session store");

    let completer = SessionCompleter::new(store, build_notifier(&config, args.no_sound));
    let driver = TimerDriver::new(
        timer.clone(),
        IntervalTicker::default(),
        completer,
        user_id.clone(),
    )
    .with_reports(report_tx);

    let server = IpcServer::new(&socket_path)?;
    let handler = RequestHandler::new(timer, user_id.clone());
    info!(user = %user_id, socket = %server.socket_path().display(), "daemon listening");

    let signal = async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutting down"),
            Err(e) => warn!("failed to listen for ctrl-c: {}", e),
        }
        let _ = shutdown_tx.send(true);
    };

    tokio::join!(
        driver.run(shutdown_rx.clone()),
        server.serve(&handler, shutdown_rx.clone()),
        log_activity(events, reports, shutdown_rx),
        signal,
    );

    Ok(())
}

/// Picks the completion cue: the audio device when available and enabled,
/// otherwise the terminal.
fn build_notifier(config: &AppConfig, no_sound: bool) -> Box<dyn Notifier> {
    #[cfg(feature = "sound")]
    {
        if config.sound && !no_sound {
            match studyfocus::notify::SoundNotifier::new() {
                Ok(notifier) => return Box::new(notifier),
                Err(e) => warn!("{}; falling back to the terminal bell", e),
            }
        }
    }

    Box::new(TerminalNotifier::new(config.bell && !no_sound))
}

async fn log_activity(
    mut events: mpsc::UnboundedReceiver<TimerEvent>,
    mut reports: mpsc::UnboundedReceiver<CompletionReport>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            Some(event) = events.recv() => match event {
                TimerEvent::Tick { .. } => {}
                other => debug!(?other, "timer event"),
            },
            Some(report) = reports.recv() => {
                if let Err(e) = &report.notified {
                    // A missing audio device is expected on headless hosts
                    if e.is_device_error() {
                        debug!("{}", describe_notify_failure(e));
                    } else {
                        warn!("{}", describe_notify_failure(e));
                    }
                }
                if let Err(e) = &report.persisted {
                    warn!(
                        completed_at = %report.session.completed_at,
                        "{}",
                        describe_persist_failure(e)
                    );
                }
            }
        }
    }
}

fn describe_notify_failure(error: &NotifyError) -> String {
    format!("completion cue failed: {} ({})", error, error.suggestion())
}

fn describe_persist_failure(error: &StoreError) -> String {
    let outlook = if error.is_transient() {
        "later sessions may still be recorded"
    } else {
        "later sessions will fail the same way until this is fixed"
    };
    format!(
        "session was not recorded: {} ({}; {})",
        error,
        error.suggestion(),
        outlook
    )
}

// ============================================================================
// Client commands
// ============================================================================

async fn run_start(client: &IpcClient, args: StartArgs) -> Result<()> {
    let response = client.start().await?;
    Display::show_command_result(&response);

    if !args.wait {
        return Ok(());
    }

    let baseline = response
        .data
        .as_ref()
        .and_then(|data| data.completed_sessions)
        .unwrap_or(0);

    loop {
        tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        let status = client.status().await?;
        let Some(data) = status.data else {
            anyhow::bail!("the daemon returned no status");
        };

        if data.completed_sessions.unwrap_or(0) > baseline {
            Display::confirm_completion();
            return Ok(());
        }

        if data.state.as_deref() != Some("running") {
            println!();
            println!(
                "Timer is {}; stopped waiting",
                data.state.as_deref().unwrap_or("stopped")
            );
            return Ok(());
        }

        Display::show_countdown(&data);
    }
}

async fn run_stats(config: AppConfig, args: StatsArgs) -> Result<()> {
    let config = config.with_overrides(args.user, None, None);
    let user_id = config.require_user()?;
    let store = JsonFileStore::in_dir(&config.resolve_data_dir()?);

    let sessions = store
        .list_by_user(user_id)
        .await
        .context("failed to read focus sessions")?;
    let stats = FocusStats::from_sessions(&sessions, Utc::now().date_naive());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        Display::show_stats(user_id, &stats);
    }

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

// ============================================================================
// Tests
// ============================================================================
