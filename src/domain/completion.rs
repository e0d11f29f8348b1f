//! Completion signal and outcome slot for one logging attempt.
//!
//! The enqueuing caller keeps a `Completion` handle; the logging worker
//! finalizes it exactly once when the attempt concludes. Any number of
//! waiters can block on the same handle.

use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;

/// Result of one artifact logging attempt.
///
/// The failure arm carries the captured error opaquely: the queue stores
/// and relays it, it never inspects or retries it.
#[derive(Debug, Clone)]
pub enum LogOutcome {
    /// The artifact was persisted to the run's store.
    Logged,

    /// The attempt failed; the error describes staging or upload failure.
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl LogOutcome {
    /// Wrap an error into a failed outcome
    pub fn failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(Arc::new(error))
    }

    /// Whether the artifact was logged successfully
    pub fn is_logged(&self) -> bool {
        matches!(self, Self::Logged)
    }

    /// The captured error, if the attempt failed
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Logged => None,
            Self::Failed(error) => Some(error.as_ref()),
        }
    }
}

#[derive(Debug)]
struct CompletionState {
    /// Write-once outcome slot; the first write wins
    outcome: OnceLock<LogOutcome>,
    notify: Notify,
}

/// One-shot completion signal with a write-once outcome slot.
///
/// Cloning the handle shares the same underlying state. `finish` sets the
/// outcome and then wakes waiters, so a waiter that unblocks is guaranteed
/// to observe a finalized outcome.
#[derive(Debug, Clone)]
pub struct Completion {
    state: Arc<CompletionState>,
}

impl Completion {
    /// Create a new unfired completion
    pub fn new() -> Self {
        Self {
            state: Arc::new(CompletionState {
                outcome: OnceLock::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Finalize the outcome and wake all waiters.
    ///
    /// The first call records its outcome; later calls are ignored. Returns
    /// `true` if this call recorded the outcome.
    pub fn finish(&self, outcome: LogOutcome) -> bool {
        let recorded = self.state.outcome.set(outcome).is_ok();
        self.state.notify.notify_waiters();
        recorded
    }

    /// The finalized outcome, or `None` if the attempt has not concluded.
    ///
    /// `None` means "no outcome yet", not success.
    pub fn outcome(&self) -> Option<LogOutcome> {
        self.state.outcome.get().cloned()
    }

    /// Whether the attempt has concluded
    pub fn is_finished(&self) -> bool {
        self.state.outcome.get().is_some()
    }

    /// Wait until the outcome is finalized.
    ///
    /// Returns immediately if `finish` was already called. Safe to call
    /// from any number of tasks.
    pub async fn wait(&self) -> LogOutcome {
        loop {
            // Register interest before checking the slot so a concurrent
            // finish() cannot slip between the check and the await.
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(outcome) = self.state.outcome.get() {
                return outcome.clone();
            }

            notified.await;
        }
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn test_outcome_is_none_until_finished() {
        let completion = Completion::new();

        assert!(completion.outcome().is_none());
        assert!(!completion.is_finished());
    }

    #[test]
    fn test_first_finish_wins() {
        let completion = Completion::new();

        assert!(completion.finish(LogOutcome::Logged));
        assert!(!completion.finish(LogOutcome::failed(io::Error::other("late failure"))));

        let outcome = completion.outcome().unwrap();
        assert!(outcome.is_logged());
    }

    #[test]
    fn test_failed_outcome_carries_error() {
        let completion = Completion::new();
        completion.finish(LogOutcome::failed(io::Error::other("disk full")));

        let outcome = completion.outcome().unwrap();
        assert!(!outcome.is_logged());
        assert_eq!(outcome.error().unwrap().to_string(), "disk full");
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_finished() {
        let completion = Completion::new();
        completion.finish(LogOutcome::Logged);

        let outcome = completion.wait().await;
        assert!(outcome.is_logged());
    }

    #[tokio::test]
    async fn test_waiters_unblock_after_finish() {
        let completion = Completion::new();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let handle = completion.clone();
            waiters.push(tokio::spawn(async move { handle.wait().await }));
        }

        // Give the waiters a chance to park before firing the signal
        tokio::time::sleep(Duration::from_millis(20)).await;
        completion.finish(LogOutcome::Logged);

        for waiter in waiters {
            let outcome = waiter.await.unwrap();
            assert!(outcome.is_logged());
        }
    }
}
