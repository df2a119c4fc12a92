//! msub - embed subtitles into videos with ffmpeg
//!
//! Soft muxes or burns a subtitle file into a video, rendering live progress
//! parsed from ffmpeg's diagnostic output.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use msub::cli::{Args, Commands};
use msub::config::Config;
use msub::error::MsubError;
use msub::job::{JobSpec, JobSupervisor};
use msub::media::OperationMode;
use msub::progress::{ProgressBarObserver, ProgressObserver};

const DEFAULT_CONFIG_FILE: &str = "msub.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    let supervisor = JobSupervisor::new(config.media.clone());

    match args.command {
        Commands::Merge { video, subtitles, output, mode, no_progress } => {
            let spec = job_spec(&config, mode, video, subtitles, output);

            let mut bar = (!no_progress).then(ProgressBarObserver::new);
            let observer = bar.as_mut().map(|b| b as &mut dyn ProgressObserver);
            let result = supervisor.run(&spec, observer).await;
            if let Some(bar) = &bar {
                bar.finish(result.succeeded);
            }

            if !result.succeeded {
                anyhow::bail!("Failed to merge subtitles into {}", result.output_path.display());
            }
            println!("Subtitle merged successfully! Output: {}", result.output_path.display());
        }
        Commands::Plan { video, subtitles, output, mode, json } => {
            let spec = job_spec(&config, mode, video, subtitles, output);
            let plan = supervisor.plan(&spec);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan).map_err(MsubError::from)?);
            } else {
                println!("# {}", plan.description);
                println!("{}", plan.command_line());
            }
        }
        Commands::Modes => {
            println!("\nAvailable Modes:");
            println!("{:<6} {:<14} {:<10} {:<50}", "Code", "Name", "Re-encode", "Description");
            println!("{}", "-".repeat(80));

            for mode in OperationMode::ALL {
                println!("{}", mode_row(mode));
            }
        }
        Commands::Check => {
            let version = media_tool_version(&config.media.binary_path).await?;
            println!("{}", version);
        }
        Commands::InitConfig { path } => {
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
        }
    }

    Ok(())
}

fn job_spec(
    config: &Config,
    mode: Option<OperationMode>,
    video: PathBuf,
    subtitles: PathBuf,
    output: Option<PathBuf>,
) -> JobSpec {
    JobSpec::new(
        mode.unwrap_or(config.job.default_mode),
        video,
        subtitles,
        output.unwrap_or_else(|| config.job.default_output.clone()),
    )
}

/// One line of the `modes` listing
fn mode_row(mode: OperationMode) -> String {
    let re_encode = if mode.is_burn_in() { "yes" } else { "no" };
    format!("{:<6} {:<14} {:<10} {:<50}", mode.code(), mode.name(), re_encode, mode.description())
}

/// First line of `<tool> -version`
async fn media_tool_version(binary_path: &str) -> Result<String> {
    let output = Command::new(binary_path)
        .arg("-version")
        .output()
        .await
        .map_err(|source| MsubError::ProcessLaunch { program: binary_path.to_string(), source })?;

    if !output.status.success() {
        return Err(MsubError::ProcessExit {
            program: binary_path.to_string(),
            code: output.status.code(),
        }
        .into());
    }

    let version_info = String::from_utf8_lossy(&output.stdout);
    Ok(version_info.lines().next().unwrap_or("Unknown version").to_string())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".msub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "msub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("msub.log").display());

    Ok(())
}
