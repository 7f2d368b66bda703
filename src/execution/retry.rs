//! Task-level retry with exponential backoff
//!
//! A task is re-run from its own input when it fails with a transient
//! (I/O) error. Data errors fail the task on the first attempt.

use super::phases::PhaseType;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Identifies a task in log lines and failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLabel {
    pub round: usize,
    pub phase: PhaseType,
    pub task: usize,
}

impl std::fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} task {} of round {}", self.phase, self.task, self.round)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_attempts: config.max_task_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Never retry
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based), doubling up to 8x the base
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.pow(retry.saturating_sub(1).min(3));
        self.base_delay * factor
    }

    /// Run `task` until it succeeds, fails with a non-transient error, or
    /// runs out of attempts
    ///
    /// `task` receives the 1-based attempt number. On success the value is
    /// returned along with the number of attempts used.
    pub async fn run<T, F, Fut>(&self, label: TaskLabel, mut task: F) -> Result<(T, u32)>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match task(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        label, attempt, self.max_attempts, delay, e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::TaskFailed {
                        round: label.round,
                        phase: label.phase,
                        task: label.task,
                        attempts: attempt,
                        source: Box::new(e),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ContractViolation;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn label() -> TaskLabel {
        TaskLabel {
            round: 1,
            phase: PhaseType::Expand,
            task: 2,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(50),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(400));
        assert_eq!(policy.delay_for(9), Duration::from_millis(400));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(label().to_string(), "Expand task 2 of round 1");
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let (value, attempts) = fast_policy(3)
            .run(label(), |attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 3 {
                        Err(Error::from(std::io::Error::other("flaky disk")))
                    } else {
                        Ok(attempt * 10)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 30);
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fail_the_task() {
        let err = fast_policy(2)
            .run(label(), |_| async {
                Err::<(), _>(Error::from(std::io::Error::other("disk gone")))
            })
            .await
            .unwrap_err();

        match err {
            Error::TaskFailed {
                round,
                phase,
                task,
                attempts,
                ..
            } => {
                assert_eq!((round, phase, task, attempts), (1, PhaseType::Expand, 2, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_data_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = fast_policy(5)
            .run(label(), |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Error::from(ContractViolation::EmptyGroup { id: 3 }))
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.is_data_error());
    }
}
