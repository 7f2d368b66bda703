//! Phase execution for one round
//!
//! A round runs two phases back to back:
//!
//! ```text
//! [round r-1 output] → [Expand] → shuffle → [Merge] → [round r output]
//! ```
//!
//! Each phase fans out into tasks that run concurrently, bounded by the
//! configured parallelism. A phase returns only after all of its tasks have
//! finished, which gives the barrier between expansion and merging and
//! between consecutive rounds.

pub mod expand;
pub mod merge;

use super::retry::RetryPolicy;
use super::storage::RoundStore;
use crate::error::{Error, Result};
use crate::graph::{Color, NodeRecord};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub use expand::ExpandPhaseExecutor;
pub use merge::MergePhaseExecutor;

/// Phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseType {
    /// Fan each record out to the records it contributes
    Expand,
    /// Reduce each id's records to one canonical record
    Merge,
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseType::Expand => write!(f, "Expand"),
            PhaseType::Merge => write!(f, "Merge"),
        }
    }
}

/// Result from executing a phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase_type: PhaseType,
    pub round: usize,
    /// Phase-specific details
    pub data: Option<Value>,
    pub metrics: PhaseMetrics,
}

/// Metrics collected during phase execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub duration_secs: f64,
    pub tasks: usize,
    pub records_in: usize,
    pub records_out: usize,
    /// Task attempts beyond the first
    pub retries: u32,
}

/// Vertex counts per color in a round's canonical output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts {
    pub white: usize,
    pub gray: usize,
    pub black: usize,
}

impl ColorCounts {
    pub fn record(&mut self, color: Color) {
        match color {
            Color::White => self.white += 1,
            Color::Gray => self.gray += 1,
            Color::Black => self.black += 1,
        }
    }

    pub fn add(&mut self, other: ColorCounts) {
        self.white += other.white;
        self.gray += other.gray;
        self.black += other.black;
    }

    pub fn total(&self) -> usize {
        self.white + self.gray + self.black
    }
}

impl std::fmt::Display for ColorCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WHITE {}, GRAY {}, BLACK {}",
            self.white, self.gray, self.black
        )
    }
}

/// State handed from phase to phase within one round
#[derive(Debug)]
pub struct RoundContext {
    /// Round being computed; reads the output of `round - 1`
    pub round: usize,
    pub store: RoundStore,
    pub retry: RetryPolicy,
    pub max_parallel: usize,
    /// Expanded records, one bucket per merge partition
    pub shuffle: Option<Vec<Vec<NodeRecord>>>,
    /// Colors of the records written by the merge phase
    pub color_counts: Option<ColorCounts>,
}

impl RoundContext {
    pub fn new(round: usize, store: RoundStore, retry: RetryPolicy, max_parallel: usize) -> Self {
        Self {
            round,
            store,
            retry,
            max_parallel: max_parallel.max(1),
            shuffle: None,
            color_counts: None,
        }
    }
}

/// One phase of a round
#[async_trait]
pub trait PhaseExecutor: Send + Sync {
    /// Execute the phase
    async fn execute(&self, context: &mut RoundContext) -> Result<PhaseResult>;

    fn phase_type(&self) -> PhaseType;

    /// Check the context before execution
    fn validate_context(&self, _context: &RoundContext) -> Result<()> {
        Ok(())
    }
}

/// Run `tasks` concurrently, at most `max_parallel` at a time
///
/// Results come back in task order. The first failure aborts the tasks that
/// are still running and is returned.
pub(crate) async fn run_bounded<T, Fut>(max_parallel: usize, tasks: Vec<Fut>) -> Result<Vec<T>>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut futures = FuturesUnordered::new();
    let mut abort_handles = Vec::with_capacity(tasks.len());
    let total = tasks.len();

    for (index, task) in tasks.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(format!("task semaphore closed: {e}")))?;
            task.await.map(|value| (index, value))
        });
        abort_handles.push(handle.abort_handle());
        futures.push(handle);
    }

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some(joined) = futures.next().await {
        let outcome = joined
            .map_err(|e| Error::Internal(format!("task panicked or was cancelled: {e}")))
            .and_then(|result| result);
        match outcome {
            Ok((index, value)) => results[index] = Some(value),
            Err(e) => {
                for handle in &abort_handles {
                    handle.abort();
                }
                return Err(e);
            }
        }
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            value.ok_or_else(|| Error::Internal(format!("task {index} produced no result")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_phase_type_display() {
        assert_eq!(PhaseType::Expand.to_string(), "Expand");
        assert_eq!(PhaseType::Merge.to_string(), "Merge");
    }

    #[test]
    fn test_color_counts() {
        let mut counts = ColorCounts::default();
        counts.record(Color::Gray);
        counts.record(Color::Black);
        counts.record(Color::Black);

        let mut total = ColorCounts {
            white: 1,
            ..ColorCounts::default()
        };
        total.add(counts);

        assert_eq!(total.total(), 4);
        assert_eq!(total.to_string(), "WHITE 1, GRAY 1, BLACK 2");
    }

    #[tokio::test]
    async fn test_run_bounded_keeps_task_order() {
        let tasks: Vec<_> = (0..5u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(10 * (5 - i))).await;
                Ok::<_, Error>(i * 2)
            })
            .collect();

        let results = run_bounded(3, tasks).await.unwrap();
        assert_eq!(results, vec![0, 2, 4, 6, 8]);
    }

    #[tokio::test]
    async fn test_run_bounded_respects_limit() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, Error>(())
                }
            })
            .collect();

        run_bounded(2, tasks).await.unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_run_bounded_returns_first_failure() {
        let tasks: Vec<_> = (0..3)
            .map(|i| async move {
                if i == 1 {
                    Err(Error::Internal("boom".to_string()))
                } else {
                    Ok(i)
                }
            })
            .collect();

        let err = run_bounded(3, tasks).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
