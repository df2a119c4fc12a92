use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{MsubError, Result};
use crate::media::{ArgumentPlan, CommandPlanner, OperationMode};
use crate::progress::{MonitorState, ProgressMonitor, ProgressObserver};

/// One subtitle embedding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub output_path: PathBuf,
    pub mode: OperationMode,
}

impl JobSpec {
    pub fn new<P: Into<PathBuf>>(mode: OperationMode, video_path: P, subtitle_path: P, output_path: P) -> Self {
        Self {
            video_path: video_path.into(),
            subtitle_path: subtitle_path.into(),
            output_path: output_path.into(),
            mode,
        }
    }

    /// Both inputs must exist before anything is launched
    pub fn validate(&self) -> Result<()> {
        if !self.video_path.exists() {
            return Err(MsubError::MissingInputFile(self.video_path.display().to_string()));
        }
        if !self.subtitle_path.exists() {
            return Err(MsubError::MissingSubtitleFile(self.subtitle_path.display().to_string()));
        }
        Ok(())
    }
}

/// Terminal outcome of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub succeeded: bool,
    /// Output path after any container extension rewrite
    pub output_path: PathBuf,
}

/// Launches the media tool for a job and follows its progress
pub struct JobSupervisor {
    planner: CommandPlanner,
}

impl JobSupervisor {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            planner: CommandPlanner::new(config),
        }
    }

    pub fn plan(&self, spec: &JobSpec) -> ArgumentPlan {
        self.planner.plan(spec.mode, &spec.video_path, &spec.subtitle_path, &spec.output_path)
    }

    /// Run a job to completion. Every failure is folded into `succeeded: false`.
    pub async fn run(&self, spec: &JobSpec, observer: Option<&mut dyn ProgressObserver>) -> JobResult {
        let job_id = Uuid::new_v4();
        let span = info_span!("job", id = %job_id, mode = %spec.mode);

        async {
            let plan = self.plan(spec);
            let output_path = plan.output_path.clone();

            match self.execute(spec, plan, observer).await {
                Ok(state) => {
                    info!(
                        "Subtitle merged successfully: {} (last progress: {})",
                        output_path.display(),
                        state
                            .last_sample
                            .map(|s| format!("{:.2}%", s.rounded_percentage()))
                            .unwrap_or_else(|| "n/a".to_string())
                    );
                    JobResult { succeeded: true, output_path }
                }
                Err(e) => {
                    error!("Job failed: {}", e);
                    JobResult { succeeded: false, output_path }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        spec: &JobSpec,
        plan: ArgumentPlan,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<MonitorState> {
        spec.validate()?;

        let program = plan.binary_path.clone();
        info!("{}: {} -> {}", plan.description, spec.video_path.display(), plan.output_path.display());
        info!("Executing: {}", plan.command_line());

        let mut child = plan
            .into_command()
            .spawn()
            .map_err(|source| MsubError::ProcessLaunch { program: program.clone(), source })?;

        let monitor = ProgressMonitor::new(observer);
        let state = match child.stderr.take() {
            Some(stderr) => follow_diagnostics(monitor, BufReader::new(stderr)).await,
            None => monitor.into_state(),
        };

        let status = child.wait().await?;
        if !status.success() {
            return Err(MsubError::ProcessExit { program, code: status.code() });
        }

        Ok(state)
    }
}

/// Feed the diagnostic stream to the monitor. A read failure is logged and
/// whatever progress was seen before it is kept; the exit status decides the job.
async fn follow_diagnostics<R>(mut monitor: ProgressMonitor<'_>, reader: R) -> MonitorState
where
    R: AsyncBufRead + Unpin,
{
    if let Err(e) = monitor.read_stream(reader).await {
        warn!("Diagnostic stream read failed, waiting for exit: {}", e);
    }
    monitor.into_state()
}

/// Run a job with the default media configuration
pub async fn run_job<P: AsRef<Path>>(
    mode: OperationMode,
    video_path: P,
    subtitle_path: P,
    output_path: P,
    observer: Option<&mut dyn ProgressObserver>,
) -> JobResult {
    let spec = JobSpec::new(
        mode,
        video_path.as_ref(),
        subtitle_path.as_ref(),
        output_path.as_ref(),
    );
    JobSupervisor::new(MediaConfig::default()).run(&spec, observer).await
}
