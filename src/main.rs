// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod ass_codec;
mod errors;
mod file_utils;
mod merge_pipeline;
mod subtitle_document;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge subtitle files into one document (default command)
    Merge(MergeArgs),

    /// Generate shell completions for submerge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// .ass subtitle files to merge; the first file becomes the base document
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Exclude subtitle events whose styles match the given regular
    /// expression. Regex is case-insensitive and full-match.
    #[arg(short, long)]
    exclude: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// submerge - merge ASS subtitle documents
///
/// Combines the styles and events of two or more .ass files into a single
/// document, keeping positioning visually consistent across source
/// resolutions, and writes the result to standard output.
#[derive(Parser, Debug)]
#[command(name = "submerge")]
#[command(version = "1.0.0")]
#[command(about = "ASS subtitle merging tool")]
#[command(long_about = "submerge combines two or more .ass subtitle files into one time-ordered document.

Style names are prefixed per input file so they never collide, styles from
files authored against a smaller video resolution are rescaled to the largest
declared resolution, and the merged events are re-sorted by start time. The
merged document is written to standard output.

EXAMPLES:
    submerge episode.ass signs.ass > merged.ass      # Merge two files
    submerge --exclude 'op|ed' a.ass b.ass c.ass     # Drop OP/ED styles first
    submerge --log-level debug a.ass b.ass           # Show pipeline detail
    submerge completions bash > submerge.bash        # Generate bash completions

CONFIGURATION:
    An optional JSON config file (conf.json by default, see --config-path)
    can provide a default exclude pattern and log level. Command-line flags
    override it. A missing config file is not an error.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// .ass subtitle files to merge; the first file becomes the base document
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Exclude subtitle events whose styles match the given regular
    /// expression. Regex is case-insensitive and full-match.
    #[arg(short, long)]
    exclude: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("31", "❌ "),
            Level::Warn => ("33", "🚧 "),
            Level::Info => ("32", " "),
            Level::Debug => ("36", "🔍 "),
            Level::Trace => ("35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            // All diagnostics go to stderr; stdout carries only the merged document
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[1;{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "submerge", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Merge(args)) => run_merge(args),
        None => {
            // Default behavior - use top-level args for backwards compatibility
            if cli.files.is_empty() {
                return Err(anyhow!("At least one FILE is required when no subcommand is specified"));
            }

            let merge_args = MergeArgs {
                files: cli.files,
                exclude: cli.exclude,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_merge(merge_args)
        }
    }
}

fn run_merge(options: MergeArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load configuration if a config file is present; defaults otherwise.
    // The file is never created implicitly - stdout is reserved for the
    // merged document and this tool writes nothing else.
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        debug!("No config file at '{}', using defaults", config_path);
        Config::default()
    };

    // Override config with CLI options if provided
    if let Some(exclude) = &options.exclude {
        config.exclude = Some(exclude.clone());
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding; an invalid
    // exclude pattern aborts here, before any input file is opened
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    // Create controller and run the merge
    let controller = Controller::with_config(config)?;
    let output = controller.run(&options.files)?;

    let mut stdout = std::io::stdout();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
