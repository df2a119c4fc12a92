//! msub - embed subtitles into videos with ffmpeg
//!
//! Plans the ffmpeg invocation for one of several embedding modes, runs it,
//! and turns ffmpeg's diagnostic output into live progress updates.

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod media;
pub mod progress;

pub use job::{JobResult, JobSpec, JobSupervisor, run_job};
pub use media::{ArgumentPlan, CommandPlanner, OperationMode};
pub use progress::{ProgressMonitor, ProgressObserver, ProgressSample};
