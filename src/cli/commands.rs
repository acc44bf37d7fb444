//! Command definitions for the studyfocus CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// StudyFocus - a 25 minute focus timer that records completed sessions
#[derive(Parser, Debug)]
#[command(
    name = "studyfocus",
    version,
    about = "25 minute focus timer with session history",
    long_about = "A single-session focus timer. Run `studyfocus daemon` once, then \
                  control the countdown with start, pause, toggle and reset.\n\
                  Every completed session is recorded for the configured user.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ~/.studyfocus/config.json)
    #[arg(long, global = true, env = "STUDYFOCUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the session collection and the default socket
    #[arg(long, global = true, env = "STUDYFOCUS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to the daemon socket
    #[arg(long, global = true, env = "STUDYFOCUS_SOCKET")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Start (or resume) the focus timer
    Start(StartArgs),

    /// Pause the running timer
    Pause,

    /// Start if stopped, pause if running
    Toggle,

    /// Stop and restore the full 25:00
    Reset,

    /// Show current timer status
    Status,

    /// Show completed session statistics
    Stats(StatsArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Account that completed sessions are recorded for
    #[arg(short, long, env = "STUDYFOCUS_USER", value_parser = validate_user_id)]
    pub user: Option<String>,

    /// Disable the completion sound and terminal bell
    #[arg(long)]
    pub no_sound: bool,
}

/// Arguments for the start command
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Stay attached and show the countdown until the session completes
    #[arg(short, long)]
    pub wait: bool,
}

/// Arguments for the stats command
#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    /// Account to summarize
    #[arg(short, long, env = "STUDYFOCUS_USER", value_parser = validate_user_id)]
    pub user: Option<String>,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a user id.
///
/// - Must not be blank
/// - Must not exceed 128 characters
fn validate_user_id(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("user id must not be empty".to_string());
    }
    if trimmed.len() > 128 {
        return Err("user id must be at most 128 characters".to_string());
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["studyfocus"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["studyfocus", "-v", "status"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_global_socket_after_subcommand() {
            let cli = Cli::parse_from(["studyfocus", "status", "--socket", "/tmp/sf.sock"]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/sf.sock")));
        }

        #[test]
        fn test_parse_global_data_dir_for_client_command() {
            let cli = Cli::parse_from(["studyfocus", "status", "--data-dir", "/var/lib/sf"]);
            assert_eq!(cli.data_dir, Some(PathBuf::from("/var/lib/sf")));
        }

        #[test]
        fn test_parse_config_flag() {
            let cli = Cli::parse_from(["studyfocus", "--config", "/etc/sf.json", "status"]);
            assert_eq!(cli.config, Some(PathBuf::from("/etc/sf.json")));
        }

        #[test]
        fn test_parse_simple_commands() {
            let cases = [
                ("pause", "Pause"),
                ("toggle", "Toggle"),
                ("reset", "Reset"),
                ("status", "Status"),
            ];
            for (arg, expected) in cases {
                let cli = Cli::parse_from(["studyfocus", arg]);
                let name = format!("{:?}", cli.command.unwrap());
                assert_eq!(name, expected);
            }
        }

        #[test]
        fn test_parse_completions_bash() {
            let cli = Cli::parse_from(["studyfocus", "completions", "bash"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Bash);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["studyfocus", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Subcommand Argument Tests
    // ------------------------------------------------------------------------

    mod args_tests {
        use super::*;

        #[test]
        fn test_parse_start_defaults() {
            let cli = Cli::parse_from(["studyfocus", "start"]);
            match cli.command {
                Some(Commands::Start(args)) => assert!(!args.wait),
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_parse_start_wait() {
            let cli = Cli::parse_from(["studyfocus", "start", "--wait"]);
            match cli.command {
                Some(Commands::Start(args)) => assert!(args.wait),
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_parse_daemon_all_options() {
            let cli = Cli::parse_from([
                "studyfocus",
                "daemon",
                "--user",
                "alice",
                "--data-dir",
                "/var/lib/sf",
                "--no-sound",
            ]);
            assert_eq!(cli.data_dir, Some(PathBuf::from("/var/lib/sf")));
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert_eq!(args.user.as_deref(), Some("alice"));
                    assert!(args.no_sound);
                }
                _ => panic!("Expected Daemon command"),
            }
        }

        #[test]
        fn test_parse_stats_json() {
            let cli = Cli::parse_from(["studyfocus", "stats", "-u", "bob", "--json"]);
            match cli.command {
                Some(Commands::Stats(args)) => {
                    assert_eq!(args.user.as_deref(), Some("bob"));
                    assert!(args.json);
                }
                _ => panic!("Expected Stats command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Validation Tests
    // ------------------------------------------------------------------------

    mod validation_tests {
        use super::*;

        #[test]
        fn test_validate_user_id_valid() {
            assert_eq!(validate_user_id("alice").unwrap(), "alice");
        }

        #[test]
        fn test_validate_user_id_trims() {
            assert_eq!(validate_user_id("  alice ").unwrap(), "alice");
        }

        #[test]
        fn test_validate_user_id_blank() {
            let result = validate_user_id("   ");
            assert!(result.unwrap_err().contains("empty"));
        }

        #[test]
        fn test_validate_user_id_too_long() {
            let result = validate_user_id(&"a".repeat(129));
            assert!(result.unwrap_err().contains("128"));
        }

        #[test]
        fn test_validate_user_id_exactly_128() {
            assert!(validate_user_id(&"a".repeat(128)).is_ok());
        }
    }

    // ------------------------------------------------------------------------
    // Error Case Tests (using try_parse)
    // ------------------------------------------------------------------------

    mod error_tests {
        use super::*;

        #[test]
        fn test_parse_daemon_empty_user() {
            let result = Cli::try_parse_from(["studyfocus", "daemon", "--user", ""]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_unknown_command() {
            let result = Cli::try_parse_from(["studyfocus", "unknown"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_removed_duration_option() {
            let result = Cli::try_parse_from(["studyfocus", "start", "--work", "30"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_completions_invalid_shell() {
            let result = Cli::try_parse_from(["studyfocus", "completions", "invalid"]);
            assert!(result.is_err());
        }
    }
}
