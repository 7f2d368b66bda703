//! Expand phase executor
//!
//! Splits the round input into contiguous line ranges, runs one task per
//! split, and buckets every emitted record by merge partition.

use super::{run_bounded, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType, RoundContext};
use crate::error::{Error, Result};
use crate::execution::retry::TaskLabel;
use crate::graph::{parse, NodeId, NodeRecord};
use crate::search::RoundJob;
use async_trait::async_trait;
use serde_json::json;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Records produced by one expand task
#[derive(Debug, Default)]
pub struct SplitOutput {
    /// One bucket per merge partition
    pub buckets: Vec<Vec<NodeRecord>>,
    pub records_in: usize,
    pub records_out: usize,
}

pub struct ExpandPhaseExecutor {
    job: Arc<dyn RoundJob>,
    map_tasks: usize,
    reduce_tasks: usize,
}

impl ExpandPhaseExecutor {
    pub fn new(job: Arc<dyn RoundJob>, map_tasks: usize, reduce_tasks: usize) -> Self {
        Self {
            job,
            map_tasks: map_tasks.max(1),
            reduce_tasks: reduce_tasks.max(1),
        }
    }

    async fn read_input(&self, context: &RoundContext) -> Result<(Vec<String>, u32)> {
        let store = &context.store;
        let input_round = context.round - 1;
        let label = TaskLabel {
            round: context.round,
            phase: PhaseType::Expand,
            task: 0,
        };
        context
            .retry
            .run(label, move |_| store.read_round(input_round))
            .await
    }
}

#[async_trait]
impl PhaseExecutor for ExpandPhaseExecutor {
    async fn execute(&self, context: &mut RoundContext) -> Result<PhaseResult> {
        self.validate_context(context)?;
        let start = Instant::now();

        let (lines, read_attempts) = self.read_input(context).await?;
        let lines = Arc::new(lines);
        let splits = plan_splits(lines.len(), self.map_tasks);
        info!(
            "Expanding {} record(s) of round {} in {} task(s)",
            lines.len(),
            context.round - 1,
            splits.len()
        );

        let tasks: Vec<_> = splits
            .iter()
            .cloned()
            .enumerate()
            .map(|(task, range)| {
                let lines = lines.clone();
                let job = self.job.clone();
                let retry = context.retry;
                let reduce_tasks = self.reduce_tasks;
                let label = TaskLabel {
                    round: context.round,
                    phase: PhaseType::Expand,
                    task,
                };
                async move {
                    let (output, attempts) = retry
                        .run(label, |_| {
                            std::future::ready(expand_split(
                                job.as_ref(),
                                &lines[range.clone()],
                                reduce_tasks,
                            ))
                        })
                        .await?;
                    debug!(
                        "{} expanded {} record(s) into {}",
                        label, output.records_in, output.records_out
                    );
                    Ok::<_, Error>((output, attempts))
                }
            })
            .collect();

        let outputs = run_bounded(context.max_parallel, tasks).await?;

        let mut metrics = PhaseMetrics {
            tasks: outputs.len(),
            retries: read_attempts - 1,
            ..PhaseMetrics::default()
        };
        let mut shuffle: Vec<Vec<NodeRecord>> = vec![Vec::new(); self.reduce_tasks];
        for (output, attempts) in outputs {
            metrics.records_in += output.records_in;
            metrics.records_out += output.records_out;
            metrics.retries += attempts - 1;
            for (partition, bucket) in output.buckets.into_iter().enumerate() {
                shuffle[partition].extend(bucket);
            }
        }
        metrics.duration_secs = start.elapsed().as_secs_f64();

        let partition_sizes: Vec<usize> = shuffle.iter().map(Vec::len).collect();
        context.shuffle = Some(shuffle);

        Ok(PhaseResult {
            phase_type: PhaseType::Expand,
            round: context.round,
            data: Some(json!({
                "splits": splits.iter().map(|r| r.len()).collect::<Vec<_>>(),
                "partition_sizes": partition_sizes,
            })),
            metrics,
        })
    }

    fn phase_type(&self) -> PhaseType {
        PhaseType::Expand
    }

    fn validate_context(&self, context: &RoundContext) -> Result<()> {
        if context.round == 0 {
            return Err(Error::Internal(
                "round numbers start at 1; round 0 is the input".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse, expand, and partition one split of the round input
pub fn expand_split(
    job: &dyn RoundJob,
    lines: &[String],
    reduce_tasks: usize,
) -> Result<SplitOutput> {
    let mut output = SplitOutput {
        buckets: vec![Vec::new(); reduce_tasks],
        ..SplitOutput::default()
    };
    for line in lines {
        let record = parse(line)?;
        output.records_in += 1;
        for emitted in job.expand(&record) {
            output.records_out += 1;
            output.buckets[partition_for(emitted.id, reduce_tasks)].push(emitted);
        }
    }
    Ok(output)
}

/// Merge partition owning `id`
pub fn partition_for(id: NodeId, reduce_tasks: usize) -> usize {
    (id % reduce_tasks.max(1) as u64) as usize
}

/// Split `len` items into at most `map_tasks` contiguous, non-empty ranges
/// whose sizes differ by at most one
pub fn plan_splits(len: usize, map_tasks: usize) -> Vec<Range<usize>> {
    let count = map_tasks.max(1).min(len);
    if count == 0 {
        return Vec::new();
    }

    let base = len / count;
    let extra = len % count;
    let mut splits = Vec::with_capacity(count);
    let mut start = 0;
    for index in 0..count {
        let size = base + usize::from(index < extra);
        splits.push(start..start + size);
        start += size;
    }
    splits
}
