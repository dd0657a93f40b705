// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subvox::app_config::{self, Config, ModelSize};
use subvox::file_utils::FileManager;
use subvox::pipeline::{OutputOptions, Pipeline};

/// CLI Wrapper for ModelSize to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl From<CliModelSize> for ModelSize {
    fn from(cli_size: CliModelSize) -> Self {
        match cli_size {
            CliModelSize::Tiny => ModelSize::Tiny,
            CliModelSize::Base => ModelSize::Base,
            CliModelSize::Small => ModelSize::Small,
            CliModelSize::Medium => ModelSize::Medium,
            CliModelSize::Large => ModelSize::Large,
        }
    }
}

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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subvox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subvox - subtitle videos from speech
///
/// Transcribes the spoken audio of video files into SRT subtitles with a
/// local whisper.cpp model, optionally translates them, and burns the
/// result back onto the video.
#[derive(Parser, Debug)]
#[command(name = "subvox")]
#[command(version = "0.1.0")]
#[command(about = "Speech-to-subtitle pipeline for video files")]
#[command(long_about = "subvox extracts audio from video files, transcribes it with a local \
whisper.cpp model, optionally translates the subtitles, and muxes them back onto the video.

EXAMPLES:
    subvox movie.mkv                            # Subtitle one video
    subvox -m medium movie.mkv                  # Use a bigger recognition model
    subvox -t -l fr movie.mkv                   # Translate subtitles to French
    subvox --srt-only movie.mkv                 # Only emit the .srt file
    subvox --output-srt -o out/ /movies/        # Process a directory, keep .srt files
    subvox -j 4 /movies/                        # Process up to 4 videos concurrently
    subvox completions bash > subvox.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. Command-line flags override config values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video files or directories to process
    #[arg(value_name = "VIDEO")]
    videos: Vec<PathBuf>,

    /// Recognition model size
    #[arg(short, long, value_enum)]
    model: Option<CliModelSize>,

    /// Directory holding the ggml model files
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Pin the spoken language instead of auto-detecting (e.g. 'en')
    #[arg(long)]
    language: Option<String>,

    /// Translate the subtitles
    #[arg(short, long)]
    translate: bool,

    /// Target language code for translation (e.g. 'fr', 'zh')
    #[arg(short = 'l', long)]
    target_language: Option<String>,

    /// Directory to save the outputs
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Keep the .srt file alongside the output video
    #[arg(long)]
    output_srt: bool,

    /// Only generate the .srt file, skip muxing
    #[arg(long)]
    srt_only: bool,

    /// Maximum number of videos processed concurrently
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Per-video deadline in seconds
    #[arg(long)]
    job_timeout_secs: Option<u64>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
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

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subvox", &mut std::io::stdout());
        return Ok(());
    }

    run(cli).await
}

async fn run(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let config = load_config(&options)?;

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let videos = collect_videos(&options.videos)?;
    if videos.is_empty() {
        return Err(anyhow!("No video files found among the given inputs"));
    }

    // The scratch directory holds extracted audio and transient subtitle
    // files for the lifetime of the run
    let scratch = tempfile::Builder::new()
        .prefix("subvox-")
        .tempdir()
        .context("Failed to create scratch directory")?;

    let pipeline = Pipeline::from_config(config, scratch.path().to_path_buf())
        .context("Failed to initialize pipeline")?;

    let output_options = OutputOptions {
        dir: options.output_dir.clone(),
        keep_subtitle: options.output_srt,
        subtitle_only: options.srt_only,
    };

    let report = pipeline.run_batch(&videos, &output_options).await?;

    for job in &report.jobs {
        match &job.result {
            Ok(output) => {
                if let Some(path) = &output.video_path {
                    info!("Success: {}", path.display());
                }
                if let Some(path) = &output.subtitle_path {
                    info!("Success: {}", path.display());
                }
            }
            Err(e) => {
                warn!("Failed [{}] {}: {}", e.stage(), job.video.display(), e);
            }
        }
    }

    if report.has_failures() {
        return Err(anyhow!(
            "{} of {} videos failed",
            report.failure_count(),
            report.jobs.len()
        ));
    }

    Ok(())
}

/// Load the configuration file, creating a default one when absent, then
/// apply command-line overrides
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if std::path::Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(model) = &options.model {
        config.recognition.model_size = model.clone().into();
    }
    if let Some(model_dir) = &options.model_dir {
        config.recognition.model_dir = model_dir.clone();
    }
    if let Some(language) = &options.language {
        config.recognition.language = Some(language.clone());
    }
    if options.translate {
        config.translation.enabled = true;
    }
    if let Some(target) = &options.target_language {
        config.translation.target_language = target.clone();
        config.translation.enabled = true;
    }
    if let Some(concurrency) = options.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(timeout) = options.job_timeout_secs {
        config.pipeline.job_timeout_secs = Some(timeout);
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

/// Expand file and directory arguments into the list of videos to process
fn collect_videos(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut videos = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = FileManager::find_video_files(input)?;
            if found.is_empty() {
                warn!("No video files found in directory: {}", input.display());
            }
            videos.append(&mut found);
        } else if input.is_file() {
            videos.push(input.clone());
        } else {
            return Err(anyhow!("Input path does not exist: {}", input.display()));
        }
    }

    Ok(videos)
}
