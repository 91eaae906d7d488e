//! Progress and result reporting.
//!
//! The installer and hook engine announce each step through a [`Reporter`].
//! What a line says is decided by the caller; the reporter only decides where
//! it goes.

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Receives progress notifications and result lines.
pub trait Reporter: Send + Sync {
    /// A step has begun (e.g. "Running Tests...").
    fn start(&self, label: &str);
    /// The current step has finished.
    fn stop(&self);
    /// A line of user-facing output.
    fn line(&self, text: &str);
}

/// Elapsed time in whole milliseconds, rounded half up.
pub fn elapsed_millis(elapsed: Duration) -> u64 {
    ((elapsed.as_micros() + 500) / 1000)
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Elapsed time rounded to milliseconds, e.g. `1s 250ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_millis(elapsed_millis(elapsed))).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes to the terminal.
///
/// Progress labels are only drawn when the stream is a terminal, and are
/// cleared again on [`Reporter::stop`].
#[derive(Debug)]
pub struct ConsoleReporter {
    stream: Stream,
    progress: bool,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
            progress: io::stdout().is_terminal(),
        }
    }

    /// Used when stdout carries machine-readable output.
    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
            progress: io::stderr().is_terminal(),
        }
    }

    fn write(&self, text: &str) {
        // Write errors (e.g. a closed pipe) are ignored.
        let _ = match self.stream {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|_| out.flush())
            }
            Stream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(text.as_bytes()).and_then(|_| err.flush())
            }
        };
    }
}

impl Reporter for ConsoleReporter {
    fn start(&self, label: &str) {
        if self.progress {
            self.write(&format!("⏳ {label}"));
        }
    }

    fn stop(&self) {
        if self.progress {
            self.write("\r\x1b[2K");
        }
    }

    fn line(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }
}

/// One call made on a [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Start(String),
    Stop,
    Line(String),
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Only the [`ReportEvent::Line`] texts, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReportEvent::Line(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Reporter for RecordingReporter {
    fn start(&self, label: &str) {
        self.push(ReportEvent::Start(label.to_string()));
    }

    fn stop(&self) {
        self.push(ReportEvent::Stop);
    }

    fn line(&self, text: &str) {
        self.push(ReportEvent::Line(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_rounds_to_millis() {
        assert_eq!(format_elapsed(Duration::from_micros(1_250_400)), "1s 250ms");
        assert_eq!(format_elapsed(Duration::from_millis(42)), "42ms");
        assert_eq!(format_elapsed(Duration::from_micros(300)), "0s");
    }

    #[test]
    fn test_elapsed_millis_rounds_half_up() {
        assert_eq!(elapsed_millis(Duration::from_micros(12_499)), 12);
        assert_eq!(elapsed_millis(Duration::from_micros(12_500)), 13);
        assert_eq!(elapsed_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.start("Running Lint...");
        reporter.stop();
        reporter.line("✅ Lint passed (5ms)");

        assert_eq!(
            reporter.events(),
            vec![
                ReportEvent::Start("Running Lint...".into()),
                ReportEvent::Stop,
                ReportEvent::Line("✅ Lint passed (5ms)".into()),
            ]
        );
        assert_eq!(reporter.lines(), vec!["✅ Lint passed (5ms)"]);
    }
}
