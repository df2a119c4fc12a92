use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::media::OperationMode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a subtitle file into a video
    Merge {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file (.srt or .ass)
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file (defaults to the configured output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mode: 1-5 or mkv, mp4, burn, burn-gpu, burn-lowres
        #[arg(short, long)]
        mode: Option<OperationMode>,

        /// Do not render a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Print the media tool invocation without running it
    Plan {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file (.srt or .ass)
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file (defaults to the configured output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mode: 1-5 or mkv, mp4, burn, burn-gpu, burn-lowres
        #[arg(short, long)]
        mode: Option<OperationMode>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available modes
    Modes,

    /// Check that the media tool can be launched
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "msub.toml")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_merge() {
        let args = Args::try_parse_from([
            "msub", "merge", "-v", "in.mp4", "-s", "subs.srt", "--mode", "burn-gpu",
        ])
        .unwrap();

        match args.command {
            Commands::Merge { video, subtitles, output, mode, no_progress } => {
                assert_eq!(video, PathBuf::from("in.mp4"));
                assert_eq!(subtitles, PathBuf::from("subs.srt"));
                assert_eq!(output, None);
                assert_eq!(mode, Some(OperationMode::BurnInGpuCuda));
                assert!(!no_progress);
            }
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn test_numeric_mode() {
        let args = Args::try_parse_from(["msub", "plan", "-v", "a", "-s", "b", "-m", "5"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Plan { mode: Some(OperationMode::BurnInCpuLowRes), .. }
        ));
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(Args::try_parse_from(["msub", "merge", "-v", "a", "-s", "b", "-m", "7"]).is_err());
    }
}
