//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the command handlers.

use crate::commands::{self, PlayOptions};
use crate::config;
use crate::logging;
use crate::playback::Decay;
use crate::setup::{self, SetupStatus};
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Writes the default config on first run and re-stamps configs written by
/// older versions.
fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = config::config_path()?;

    match setup::check_setup_status(&config_path)? {
        SetupStatus::Missing => {
            setup::write_default_config(&config_path).map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow::anyhow!("Setup failed: {e}")
            })?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
        }
        SetupStatus::Outdated(old_version) => {
            setup::stamp_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow::anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Config migrated from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
        }
        SetupStatus::Current => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Terminal X/Y scope for stereo audio
#[derive(Parser, Debug)]
#[command(name = "xyscope")]
#[command(version)]
#[command(about = "Plot the left and right channels of a stereo file against each other")]
#[command(long_about = "Plot the left and right channels of a stereo WAV file against each other \
as a fading Lissajous trail, in real time.\n\n\
KEYS:\n    \
Space        pause / resume\n    \
/            swap X and Y channels\n    \
Left/Right   scrub 0.1s (hold Shift for 1s)\n    \
q, Esc       quit\n\n\
EXAMPLES:\n    \
$ xyscope song.wav\n    \
$ xyscope play song.wav --decay linear --window-ms 80\n    \
$ xyscope info song.wav")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/xyscope/xyscope.toml\n    Logs:               ~/.local/state/xyscope/xyscope.log.*"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Stereo WAV file to play (shorthand for `xyscope play FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(flatten)]
    play: PlayArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Playback overrides shared by the default command and `play`.
#[derive(Args, Debug, Clone, Default)]
struct PlayArgs {
    /// Trail length in milliseconds
    #[arg(short, long, value_name = "MS")]
    window_ms: Option<u32>,

    /// Trail fade curve
    #[arg(short, long, value_enum)]
    decay: Option<Decay>,

    /// Amplitude multiplier applied before plotting
    #[arg(short, long)]
    gain: Option<f32>,

    /// Start with the right channel on the X axis
    #[arg(short, long)]
    invert: bool,

    /// Start paused on the first frame
    #[arg(short, long)]
    paused: bool,
}

impl From<PlayArgs> for PlayOptions {
    fn from(args: PlayArgs) -> Self {
        PlayOptions {
            window_ms: args.window_ms,
            decay: args.decay,
            gain: args.gain,
            invert: args.invert,
            paused: args.paused,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a stereo file in the X/Y scope (default)
    #[command(visible_alias = "p")]
    Play {
        /// Stereo WAV file to play
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        args: PlayArgs,
    },

    /// Print a file's format and the playback parameters used for it
    #[command(visible_alias = "i")]
    Info {
        /// Stereo WAV file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   xyscope completions bash > xyscope.bash
    ///   xyscope completions zsh > _xyscope
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization or setup fails
/// - If command execution fails
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "xyscope", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;
    check_and_run_setup()?;

    match cli.command {
        None => {
            let Some(file) = cli.file else {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "no input file given; try `xyscope <FILE>`",
                    )
                    .exit();
            };
            commands::handle_play(file, cli.play.into())?;
        }
        Some(Commands::Play { file, args }) => {
            commands::handle_play(file, args.into())?;
        }
        Some(Commands::Info { file }) => {
            commands::handle_info(file)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
