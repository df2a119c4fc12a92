use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MsubError, Result};
use crate::media::OperationMode;

fn default_output() -> PathBuf {
    PathBuf::from("output.mp4")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub job: JobConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Pass `-y` so an existing output file is replaced without prompting
    pub overwrite: bool,
    /// x264 preset for CPU burn-in modes
    pub cpu_preset: String,
    /// NVENC preset for the CUDA burn-in mode
    pub gpu_preset: String,
    /// Target video bitrate for the CUDA burn-in mode
    pub gpu_bitrate: String,
    /// Target width for the low resolution burn-in mode (height keeps aspect)
    pub low_res_width: u32,
    /// Additional options appended right before the output path
    /// e.g. ["-crf", "23", "-pix_fmt", "yuv420p"]
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Mode used when none is given on the command line
    pub default_mode: OperationMode,
    /// Output path used when none is given on the command line
    #[serde(default = "default_output")]
    pub default_output: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            overwrite: false,
            cpu_preset: "ultrafast".to_string(),
            gpu_preset: "fast".to_string(),
            gpu_bitrate: "2M".to_string(),
            low_res_width: 1280,
            extra_options: Vec::new(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            default_mode: OperationMode::SoftMuxMatroska,
            default_output: default_output(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MsubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MsubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content)
            .map_err(|e| MsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
