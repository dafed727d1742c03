//! Progress reporting and cooperative cancellation.

use crate::errors::{InstanceError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress update for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub struct CardProgress {
    /// Short status line.
    pub status: String,
    /// Completion in `0.0..=1.0`, if known.
    pub progress: Option<f64>,
}

impl CardProgress {
    /// Create a progress update.
    pub fn new(status: impl Into<String>, progress: Option<f64>) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// Receiver of progress updates.
pub trait ProgressSink {
    /// Report a progress update.
    fn report(&self, progress: CardProgress);
}

impl<F: Fn(CardProgress)> ProgressSink for F {
    fn report(&self, progress: CardProgress) {
        self(progress)
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: CardProgress) {}
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. Engines check it between top-level items
/// only, so a cancelled operation stops on an item boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`InstanceError::Cancelled`] if cancellation was requested.
    pub fn check(&self, completed: usize) -> Result<()> {
        if self.is_cancelled() {
            Err(InstanceError::Cancelled { completed })
        } else {
            Ok(())
        }
    }
}
