use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

use super::parser::{self, ProgressSample};

/// Receives progress updates in the order the media tool emits them.
///
/// Called in-line with stream consumption: a slow observer slows down reading.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressObserver {
    /// `percentage` and `speed` are rounded to 2 decimals, `eta` reads "<m>m <s>s"
    fn on_progress(&mut self, percentage: f64, speed: f64, eta: &str);
}

impl<F> ProgressObserver for F
where
    F: FnMut(f64, f64, &str),
{
    fn on_progress(&mut self, percentage: f64, speed: f64, eta: &str) {
        self(percentage, speed, eta)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorState {
    /// First duration announced by the tool; later announcements are ignored
    pub total_duration: Option<f64>,
    pub last_sample: Option<ProgressSample>,
}

/// Follows one job's diagnostic stream
pub struct ProgressMonitor<'a> {
    state: MonitorState,
    observer: Option<&'a mut dyn ProgressObserver>,
}

impl<'a> ProgressMonitor<'a> {
    pub fn new(observer: Option<&'a mut dyn ProgressObserver>) -> Self {
        Self {
            state: MonitorState::default(),
            observer,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Inspect one diagnostic line, notifying the observer if it yields a sample
    pub fn process_line(&mut self, line: &str) -> Option<ProgressSample> {
        trace!("{}", line);

        if self.state.total_duration.is_none() {
            if let Some(duration) = parser::parse_duration(line) {
                debug!("Input duration: {:.2}s", duration);
                self.state.total_duration = Some(duration);
            }
        }

        let total = self.state.total_duration?;
        let sample = parser::sample_from_line(line, total)?;

        if let Some(observer) = self.observer.as_mut() {
            observer.on_progress(
                sample.rounded_percentage(),
                sample.rounded_speed(),
                &sample.eta_label(),
            );
        }
        self.state.last_sample = Some(sample);
        Some(sample)
    }

    /// Consume a finite sequence of lines, returning the final state
    pub fn attach<I, S>(mut self, lines: I) -> MonitorState
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.process_line(line.as_ref());
        }
        self.state
    }

    /// Consume a live diagnostic stream until it closes.
    ///
    /// `\r`, `\n` and `\r\n` all end a line, since progress lines are
    /// terminated by carriage returns while the tool is running. On a read
    /// error the state gathered so far stays available through `into_state`.
    pub async fn read_stream<R>(&mut self, mut reader: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        while read_line(&mut reader, &mut buf).await? {
            if !buf.is_empty() {
                let line = String::from_utf8_lossy(&buf);
                self.process_line(&line);
            }
            buf.clear();
        }
        Ok(())
    }

    pub fn into_state(self) -> MonitorState {
        self.state
    }
}

/// Read up to the next `\r` or `\n` (exclusive). Returns false at end of stream
/// when nothing was read.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(!buf.is_empty());
        }
        match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(pos) => {
                buf.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    fn collect(lines: &[&str]) -> (Vec<(f64, f64, String)>, MonitorState) {
        let mut updates = Vec::new();
        let mut observer = |p: f64, s: f64, eta: &str| updates.push((p, s, eta.to_string()));
        let state = ProgressMonitor::new(Some(&mut observer)).attach(lines.iter());
        (updates, state)
    }

    #[test]
    fn test_half_way_report() {
        let (updates, state) = collect(&[
            "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'video.mp4':",
            "  Duration: 00:10:00.00, start: 0.000000, bitrate: 1205 kb/s",
            "frame= 7200 fps=240 q=-1.0 size=10240kB time=00:05:00.00 bitrate=279.6kbits/s speed=2.0x",
        ]);

        assert_eq!(updates, vec![(50.0, 2.0, "2m 30s".to_string())]);
        assert_eq!(state.total_duration, Some(600.0));
        assert_eq!(state.last_sample.map(|s| s.percentage), Some(50.0));
    }

    #[test]
    fn test_progress_before_duration_is_ignored() {
        let mut observer = MockProgressObserver::new();
        observer.expect_on_progress().times(0);

        let mut monitor = ProgressMonitor::new(Some(&mut observer));
        assert!(monitor.process_line("time=00:00:05.00 speed=1.0x").is_none());
        assert!(monitor.state().total_duration.is_none());
    }

    #[test]
    fn test_only_first_duration_is_honored() {
        let (updates, state) = collect(&[
            "  Duration: 00:01:40.00, start: 0.000000",
            "  Duration: 00:50:00.00, start: 0.000000",
            "time=00:00:50.00 speed=1.0x",
        ]);

        assert_eq!(state.total_duration, Some(100.0));
        assert_eq!(updates, vec![(50.0, 1.0, "0m 50s".to_string())]);
    }

    #[test]
    fn test_zero_speed_reports_zero_eta() {
        let (updates, _) = collect(&["Duration: 00:01:00.00", "time=00:00:15.00 speed=0.0x"]);
        assert_eq!(updates, vec![(25.0, 0.0, "0m 0s".to_string())]);
    }

    #[test]
    fn test_updates_follow_emission_order() {
        let (updates, _) = collect(&[
            "Duration: 00:00:40.00",
            "time=00:00:10.00 speed=1.0x",
            "random noise",
            "time=00:00:30.00 speed=1.0x",
            "time=00:00:20.00 speed=1.0x",
        ]);

        let percentages: Vec<f64> = updates.iter().map(|u| u.0).collect();
        assert_eq!(percentages, vec![25.0, 75.0, 50.0]);
    }

    #[test]
    fn test_without_observer_state_still_tracks() {
        let state = ProgressMonitor::new(None)
            .attach(["Duration: 00:00:10.00", "time=00:00:05.00 speed=1.0x"]);
        assert_eq!(state.last_sample.map(|s| s.percentage), Some(50.0));
    }

    #[test]
    fn test_observer_called_once_per_sample() {
        let mut observer = MockProgressObserver::new();
        observer
            .expect_on_progress()
            .withf(|p, s, eta| *p == 10.0 && *s == 1.0 && eta == "0m 9s")
            .times(1)
            .return_const(());

        ProgressMonitor::new(Some(&mut observer))
            .attach(["Duration: 00:00:10.00", "time=00:00:01.00 speed=1.0x", "muxing overhead: 0.1%"]);
    }

    #[tokio::test]
    async fn test_read_stream_splits_carriage_returns() {
        let stream = tokio_test::io::Builder::new()
            .read(b"ffmpeg version 6.0\n  Duration: 00:00:20.00, start: 0.0\r\n")
            .read(b"frame=1 time=00:00:05.00 speed=1.0x\rframe=2 time=00:00:")
            .read(b"10.00 speed=2.0x\r")
            .read(b"video:1kB audio:1kB muxing overhead")
            .build();

        let mut updates = Vec::new();
        let mut observer = |p: f64, s: f64, eta: &str| updates.push((p, s, eta.to_string()));
        let mut monitor = ProgressMonitor::new(Some(&mut observer));
        monitor.read_stream(BufReader::new(stream)).await.unwrap();
        let state = monitor.into_state();

        assert_eq!(state.total_duration, Some(20.0));
        assert_eq!(
            updates,
            vec![(25.0, 1.0, "0m 15s".to_string()), (50.0, 2.0, "0m 5s".to_string())]
        );
    }

    #[tokio::test]
    async fn test_read_error_keeps_partial_state() {
        let stream = tokio_test::io::Builder::new()
            .read(b"  Duration: 00:01:00.00, start: 0.0\ntime=00:00:30.00 speed=3.0x\r")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            .build();

        let mut monitor = ProgressMonitor::new(None);
        assert!(monitor.read_stream(BufReader::new(stream)).await.is_err());

        let state = monitor.into_state();
        assert_eq!(state.total_duration, Some(60.0));
        assert_eq!(state.last_sample.map(|s| s.rounded_percentage()), Some(50.0));
    }
}
