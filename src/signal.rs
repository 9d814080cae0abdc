//! Cooperative stop signal and Ctrl+C handling.
//!
//! The pipeline never kills a worker. Instead a [`StopSignal`] wrapping an
//! `AtomicBool` is shared with it; the orchestrator checks the signal between
//! stages and the remover checks it between files.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupsweep::signal::install_handler;
//!
//! // Ctrl+C now raises the returned signal
//! let stop = install_handler().expect("Failed to install signal handler");
//!
//! // Any clone observes the same flag
//! let for_worker = stop.clone();
//! assert!(!for_worker.is_stop_requested());
//! ```
//!
//! # Exit Codes
//!
//! When Ctrl+C is received the flag is set and the application exits with
//! [`ExitCode::Interrupted`](crate::error::ExitCode::Interrupted) (130) once
//! the pipeline has returned.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared stop flag.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a new signal with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a stop. Idempotent.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the signal can be reused for a new run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// The underlying flag, for APIs that take an `Arc<AtomicBool>`.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_SIGNAL: Mutex<Option<StopSignal>> = Mutex::new(None);

/// Install a Ctrl+C handler that raises the returned stop signal.
///
/// ctrlc only allows one handler per process. Later calls (for example from
/// tests running `run_app` in parallel) get the already installed signal,
/// reset to "not stopped".
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered,
/// for example because another Ctrl+C handler already owns it.
pub fn install_handler() -> Result<StopSignal, SignalError> {
    let mut installed = GLOBAL_SIGNAL
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    if let Some(signal) = installed.as_ref() {
        signal.reset();
        return Ok(signal.clone());
    }

    let signal = StopSignal::new();
    let hooked = signal.clone();
    ctrlc::set_handler(move || {
        hooked.request_stop();
        let _ = writeln!(std::io::stderr(), "\nStopping after the current step...");
        let _ = std::io::stderr().flush();
        log::info!("Stop signal received");
    })?;

    *installed = Some(signal.clone());
    Ok(signal)
}
