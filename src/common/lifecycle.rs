//! One-shot transfer tracking and the self-terminating server lifecycle.
//!
//! `Idle --first success (exit enabled)--> ShutdownScheduled --grace--> Terminating`
//!
//! The completion flag is single-use for the lifetime of the process. Once a
//! shutdown is scheduled it cannot be undone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay between the qualifying transfer and the shutdown request, so the
/// in-flight response can flush.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct SessionLifecycle {
    exit_on_transfer: bool,
    grace: Duration,
    completed: AtomicBool,
    scheduled: AtomicBool,
    shutdown: CancellationToken,
}

impl SessionLifecycle {
    pub fn new(exit_on_transfer: bool) -> Self {
        Self::with_grace(exit_on_transfer, SHUTDOWN_GRACE)
    }

    pub fn with_grace(exit_on_transfer: bool, grace: Duration) -> Self {
        Self {
            exit_on_transfer,
            grace,
            completed: AtomicBool::new(false),
            scheduled: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Record a successful transfer.
    ///
    /// Returns `true` only for the single caller that won the race and
    /// scheduled the shutdown. Every other call is a no-op.
    pub fn notify_transfer_complete(&self) -> bool {
        if self
            .completed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Transfer already recorded, ignoring completion");
            return false;
        }

        tracing::info!("First transfer completed");

        if !self.exit_on_transfer {
            return false;
        }

        self.schedule_shutdown()
    }

    fn schedule_shutdown(&self) -> bool {
        // A failure here must not surface to the client: the transfer already succeeded.
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(error = %err, "Failed to schedule shutdown after transfer");
                return false;
            }
        };

        let shutdown = self.shutdown.clone();
        let grace = self.grace;

        // Detached: no handle is kept.
        runtime.spawn(async move {
            tokio::time::sleep(grace).await;
            tracing::info!("Grace period elapsed, requesting graceful shutdown");
            shutdown.cancel();
        });

        self.scheduled.store(true, Ordering::SeqCst);
        tracing::info!(
            grace_ms = grace.as_millis() as u64,
            "Shutdown scheduled after first transfer"
        );
        true
    }

    pub fn exit_on_transfer(&self) -> bool {
        self.exit_on_transfer
    }

    pub fn transfer_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn shutdown_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Token cancelled once the grace delay after the qualifying transfer elapses.
    pub fn shutdown_signal(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
