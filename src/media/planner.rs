use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::MediaConfig;
use super::{ArgumentPlan, OperationMode};

/// Maps a mode and paths to the media tool invocation. Performs no I/O.
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    config: MediaConfig,
}

impl CommandPlanner {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn plan<P: AsRef<Path>>(
        &self,
        mode: OperationMode,
        video_path: P,
        subtitle_path: P,
        output_path: P,
    ) -> ArgumentPlan {
        let video_path = video_path.as_ref();
        let subtitle_path = subtitle_path.as_ref();
        let output_path = resolve_output_path(mode, output_path.as_ref());

        let mut plan = ArgumentPlan::new(&self.config.binary_path, mode.description());
        if self.config.overwrite {
            plan = plan.overwrite();
        }

        let subtitles_filter = format!("subtitles={}", subtitle_path.display());

        plan = match mode {
            OperationMode::SoftMuxMatroska => plan
                .input(video_path)
                .input(subtitle_path)
                .map("0")
                .map("1")
                .codec("copy"),
            OperationMode::SoftMuxMp4Text => plan
                .input(video_path)
                .input(subtitle_path)
                .copy_video()
                .copy_audio()
                .subtitle_codec("mov_text"),
            OperationMode::BurnInCpu => plan
                .input(video_path)
                .video_filter(subtitles_filter)
                .video_codec("libx264")
                .preset(&self.config.cpu_preset)
                .copy_audio(),
            OperationMode::BurnInGpuCuda => plan
                .hwaccel("cuda")
                .input(video_path)
                .video_filter(subtitles_filter)
                .video_codec("h264_nvenc")
                .preset(&self.config.gpu_preset)
                .video_bitrate(&self.config.gpu_bitrate)
                .copy_audio(),
            OperationMode::BurnInCpuLowRes => plan
                .input(video_path)
                // -2 keeps the aspect ratio with an even height
                .video_filter(format!(
                    "scale={}:-2,{}",
                    self.config.low_res_width, subtitles_filter
                ))
                .video_codec("libx264")
                .preset(&self.config.cpu_preset)
                .copy_audio(),
        };

        let plan = plan
            .args(self.config.extra_options.iter().cloned())
            .output(&output_path);

        debug!("Planned {} invocation: {}", mode, plan.command_line());
        plan
    }
}

/// Replace only the trailing extension when the mode requires a container
pub fn resolve_output_path(mode: OperationMode, output_path: &Path) -> PathBuf {
    match mode.forced_extension() {
        Some(ext) => {
            let matches = output_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
            if matches {
                output_path.to_path_buf()
            } else {
                output_path.with_extension(ext)
            }
        }
        None => output_path.to_path_buf(),
    }
}
