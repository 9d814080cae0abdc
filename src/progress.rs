//! Progress reporting for the duplicate removal pipeline.
//!
//! The core reports through the [`ProgressSink`] trait and never writes to
//! stdout or stderr itself. Three sinks are provided:
//!
//! - closures `Fn(&str)` and [`ChannelSink`] receive the human-readable
//!   checkpoint lines
//! - [`NullSink`] discards everything
//! - [`Progress`] renders phases as indicatif progress bars for the CLI
//!
//! # Example
//!
//! ```
//! use dupsweep::progress::{ChannelSink, ProgressSink};
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel::<String>();
//! ChannelSink::new(tx).on_message("Total files: 3");
//! assert_eq!(rx.recv().unwrap(), "Total files: 3");
//! ```

use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Directory enumeration.
pub const PHASE_SCAN: &str = "scan";
/// Stat calls on the worker pool.
pub const PHASE_METADATA: &str = "metadata";
/// Content hashing of size duplicates.
pub const PHASE_HASH: &str = "hash";
/// Deleting removable files.
pub const PHASE_REMOVE: &str = "remove";

/// Receiver of pipeline progress.
///
/// Only [`on_message`](Self::on_message) is required. The phase callbacks
/// may be invoked from worker threads.
pub trait ProgressSink: Send + Sync {
    /// A human-readable progress or result line.
    fn on_message(&self, message: &str);

    /// A phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - One of the `PHASE_*` names
    /// * `total` - Number of items to process, 0 if unknown
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    /// `current` items of the running phase are done.
    fn on_progress(&self, _current: usize) {}

    /// A phase completes.
    fn on_phase_end(&self, _phase: &str) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_message(&self, message: &str) {
        self(message);
    }
}

/// Forwards progress lines into a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    #[must_use]
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn on_message(&self, message: &str) {
        // The receiver going away must not fail the run
        let _ = self.sender.send(message.to_string());
    }
}

/// A sink that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Shows a spinner while scanning and a bar for metadata, hashing and
/// removal. Checkpoint lines are printed above the bars.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed
    ///
    /// # Examples
    ///
    /// ```
    /// use dupsweep::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn active(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        // A panic while holding the lock only loses a progress update
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ProgressSink for Progress {
    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.multi.println(message);
    }

    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if phase == PHASE_SCAN {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::bar_style());
            pb
        };
        pb.set_message(match phase {
            PHASE_SCAN => "Scanning directories".to_string(),
            PHASE_METADATA => "Reading metadata".to_string(),
            PHASE_HASH => "Hashing".to_string(),
            PHASE_REMOVE => "Removing".to_string(),
            other => other.to_string(),
        });

        if let Some(previous) = self.active().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.active() {
            pb.set_position(current as u64);
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active().take() {
            pb.finish_and_clear();
        }
    }
}
