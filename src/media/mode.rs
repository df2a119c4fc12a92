use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MsubError;

/// How the subtitle ends up in the output video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationMode {
    /// Stream copy everything, subtitle as a selectable track in a Matroska container
    SoftMuxMatroska,
    /// Stream copy everything, subtitle converted to an MP4 text track
    SoftMuxMp4Text,
    /// Re-encode on the CPU with the subtitle rendered into the picture
    BurnInCpu,
    /// Re-encode with NVENC (CUDA) at a fixed bitrate, subtitle rendered into the picture
    BurnInGpuCuda,
    /// Like `BurnInCpu`, but downscaled first for constrained CPUs
    BurnInCpuLowRes,
}

impl OperationMode {
    pub const ALL: [OperationMode; 5] = [
        OperationMode::SoftMuxMatroska,
        OperationMode::SoftMuxMp4Text,
        OperationMode::BurnInCpu,
        OperationMode::BurnInGpuCuda,
        OperationMode::BurnInCpuLowRes,
    ];

    /// Numeric code accepted on the command line (1-5)
    pub fn code(self) -> u8 {
        match self {
            OperationMode::SoftMuxMatroska => 1,
            OperationMode::SoftMuxMp4Text => 2,
            OperationMode::BurnInCpu => 3,
            OperationMode::BurnInGpuCuda => 4,
            OperationMode::BurnInCpuLowRes => 5,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, MsubError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or_else(|| MsubError::InvalidMode(code.to_string()))
    }

    /// Short name accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            OperationMode::SoftMuxMatroska => "mkv",
            OperationMode::SoftMuxMp4Text => "mp4",
            OperationMode::BurnInCpu => "burn",
            OperationMode::BurnInGpuCuda => "burn-gpu",
            OperationMode::BurnInCpuLowRes => "burn-lowres",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OperationMode::SoftMuxMatroska => "Soft mux into MKV (fastest, selectable track)",
            OperationMode::SoftMuxMp4Text => "Soft mux into MP4 (mov_text track)",
            OperationMode::BurnInCpu => "Burn-in, CPU re-encode (slow)",
            OperationMode::BurnInGpuCuda => "Burn-in, NVIDIA CUDA/NVENC re-encode",
            OperationMode::BurnInCpuLowRes => "Burn-in, CPU re-encode at reduced resolution",
        }
    }

    /// Whether the video stream is re-encoded with the subtitle rendered into it
    pub fn is_burn_in(self) -> bool {
        !matches!(
            self,
            OperationMode::SoftMuxMatroska | OperationMode::SoftMuxMp4Text
        )
    }

    /// Extension the output path is forced to, if the mode requires a specific container
    pub fn forced_extension(self) -> Option<&'static str> {
        match self {
            OperationMode::SoftMuxMatroska => Some("mkv"),
            _ => None,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationMode {
    type Err = MsubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Ok(code) = normalized.parse::<u8>() {
            return Self::from_code(code).map_err(|_| MsubError::InvalidMode(s.to_string()));
        }

        match normalized.as_str() {
            "mkv" | "soft-mux-matroska" => Ok(OperationMode::SoftMuxMatroska),
            "mp4" | "soft-mux-mp4-text" => Ok(OperationMode::SoftMuxMp4Text),
            "burn" | "burn-in-cpu" => Ok(OperationMode::BurnInCpu),
            "burn-gpu" | "burn-in-gpu-cuda" => Ok(OperationMode::BurnInGpuCuda),
            "burn-lowres" | "burn-in-cpu-low-res" => Ok(OperationMode::BurnInCpuLowRes),
            _ => Err(MsubError::InvalidMode(s.to_string())),
        }
    }
}
