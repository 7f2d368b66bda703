//! Merge phase executor
//!
//! One task per partition: group the partition's records by id, merge each
//! group, and write the canonical records as the partition's output file.

use super::{
    run_bounded, ColorCounts, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType, RoundContext,
};
use crate::error::{Error, Result};
use crate::execution::retry::TaskLabel;
use crate::graph::{serialize, NodeId, NodeRecord};
use crate::search::RoundJob;
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Canonical records of one partition, serialized and sorted by id
#[derive(Debug, Default)]
pub struct MergedPartition {
    pub lines: Vec<String>,
    pub counts: ColorCounts,
    pub records_in: usize,
}

pub struct MergePhaseExecutor {
    job: Arc<dyn RoundJob>,
    reduce_tasks: usize,
}

impl MergePhaseExecutor {
    pub fn new(job: Arc<dyn RoundJob>, reduce_tasks: usize) -> Self {
        Self {
            job,
            reduce_tasks: reduce_tasks.max(1),
        }
    }
}

#[async_trait]
impl PhaseExecutor for MergePhaseExecutor {
    async fn execute(&self, context: &mut RoundContext) -> Result<PhaseResult> {
        self.validate_context(context)?;
        let start = Instant::now();

        let shuffle = context
            .shuffle
            .take()
            .ok_or_else(|| Error::Internal("merge phase ran before expansion".to_string()))?;
        context.store.prepare_round(context.round).await?;
        info!(
            "Merging {} record(s) into {} partition(s) of round {}",
            shuffle.iter().map(Vec::len).sum::<usize>(),
            shuffle.len(),
            context.round
        );

        let tasks: Vec<_> = shuffle
            .into_iter()
            .enumerate()
            .map(|(partition, records)| {
                let records = Arc::new(records);
                let job = self.job.clone();
                let store = context.store.clone();
                let retry = context.retry;
                let round = context.round;
                let label = TaskLabel {
                    round,
                    phase: PhaseType::Merge,
                    task: partition,
                };
                async move {
                    let (merged, attempts) = retry
                        .run(label, |_| {
                            let records = records.clone();
                            let job = job.clone();
                            let store = store.clone();
                            async move {
                                let merged = merge_partition(job.as_ref(), &records)?;
                                store.write_partition(round, partition, &merged.lines).await?;
                                Ok::<_, Error>(merged)
                            }
                        })
                        .await?;
                    debug!(
                        "{} merged {} record(s) into {} vertex record(s)",
                        label,
                        merged.records_in,
                        merged.lines.len()
                    );
                    Ok::<_, Error>((merged, attempts))
                }
            })
            .collect();

        let partitions = run_bounded(context.max_parallel, tasks).await?;

        let mut metrics = PhaseMetrics {
            tasks: partitions.len(),
            ..PhaseMetrics::default()
        };
        let mut counts = ColorCounts::default();
        let mut partition_sizes = Vec::with_capacity(partitions.len());
        for (merged, attempts) in partitions {
            metrics.records_in += merged.records_in;
            metrics.records_out += merged.lines.len();
            metrics.retries += attempts - 1;
            counts.add(merged.counts);
            partition_sizes.push(merged.lines.len());
        }
        metrics.duration_secs = start.elapsed().as_secs_f64();
        context.color_counts = Some(counts);

        Ok(PhaseResult {
            phase_type: PhaseType::Merge,
            round: context.round,
            data: Some(json!({
                "output_dir": context.store.round_dir(context.round).display().to_string(),
                "partition_sizes": partition_sizes,
                "colors": counts,
            })),
            metrics,
        })
    }

    fn phase_type(&self) -> PhaseType {
        PhaseType::Merge
    }

    fn validate_context(&self, context: &RoundContext) -> Result<()> {
        match &context.shuffle {
            Some(shuffle) if shuffle.len() == self.reduce_tasks => Ok(()),
            Some(shuffle) => Err(Error::Internal(format!(
                "expected {} shuffle partition(s), found {}",
                self.reduce_tasks,
                shuffle.len()
            ))),
            None => Err(Error::Internal(
                "merge phase ran before expansion".to_string(),
            )),
        }
    }
}

/// Group one partition by id and merge every group
pub fn merge_partition(job: &dyn RoundJob, records: &[NodeRecord]) -> Result<MergedPartition> {
    let mut groups: BTreeMap<NodeId, Vec<NodeRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.id).or_default().push(record.clone());
    }

    let mut merged = MergedPartition {
        lines: Vec::with_capacity(groups.len()),
        records_in: records.len(),
        ..MergedPartition::default()
    };
    for (id, group) in groups {
        let record = job.merge(id, group)?;
        merged.counts.record(record.color);
        merged.lines.push(serialize(&record));
    }
    Ok(merged)
}
