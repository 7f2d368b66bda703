//! Integration tests for multi-round runs through the round driver

mod common;

use common::*;
use graphsearch::config::SearchConfig;
use graphsearch::execution::{PhaseType, RoundDriver};
use graphsearch::graph::{NodeId, NodeRecord};
use graphsearch::report;
use graphsearch::search::{ColoringBfs, ContractViolation, RoundJob};
use graphsearch::Error;
use std::sync::Arc;
use tempfile::TempDir;

async fn run(config: SearchConfig) -> graphsearch::Result<graphsearch::execution::RunSummary> {
    RoundDriver::new(config, Arc::new(ColoringBfs))?.run().await
}

#[tokio::test]
async fn test_scenario_rounds_match_expected_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);

    let summary = run(test_config(&temp_dir, 3)).await.unwrap();
    assert_eq!(summary.rounds.len(), 3);

    for (index, expected) in scenario_rounds().iter().enumerate() {
        let round = index + 1;
        assert_eq!(
            read_sorted_lines(&round_dir(temp_dir.path(), round)),
            *expected,
            "round {round} output differs"
        );
    }
    assert!(!round_dir(temp_dir.path(), 4).exists());
}

#[tokio::test]
async fn test_results_do_not_depend_on_task_counts() {
    let mut finals = Vec::new();
    for (map_tasks, reduce_tasks, max_parallel) in [(1, 1, None), (3, 3, None), (4, 7, Some(2))] {
        let temp_dir = TempDir::new().unwrap();
        write_input(temp_dir.path(), SCENARIO_GRAPH);

        let config = SearchConfig {
            map_tasks,
            reduce_tasks,
            max_parallel,
            ..test_config(&temp_dir, 3)
        };
        run(config).await.unwrap();

        let part_files = std::fs::read_dir(round_dir(temp_dir.path(), 3))
            .unwrap()
            .count();
        assert_eq!(part_files, reduce_tasks);
        finals.push(read_sorted_lines(&round_dir(temp_dir.path(), 3)));
    }

    assert_eq!(finals[0], finals[1]);
    assert_eq!(finals[1], finals[2]);
}

#[tokio::test]
async fn test_cheaper_late_path_wins() {
    // 0 -> 1 costs 10 directly but 2 through vertex 2
    let temp_dir = TempDir::new().unwrap();
    write_input(
        temp_dir.path(),
        "0\t1,2|10,1|0|GRAY\n1\t3|1|INF|WHITE\n2\t1|1|INF|WHITE\n3\t||INF|WHITE\n",
    );

    run(test_config(&temp_dir, 5)).await.unwrap();

    assert_eq!(
        read_sorted_lines(&round_dir(temp_dir.path(), 5)),
        vec![
            "0\t1,2|10,1|0|BLACK",
            "1\t3|1|2|BLACK",
            "2\t1|1|1|BLACK",
            "3\t||3|BLACK",
        ]
    );
}

#[tokio::test]
async fn test_too_few_rounds_under_computes_silently() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);

    let summary = run(test_config(&temp_dir, 1)).await.unwrap();
    assert_eq!(summary.rounds[0].colors.white, 1);
    assert!(read_sorted_lines(&round_dir(temp_dir.path(), 1)).contains(&"3\t||INF|WHITE".to_string()));
}

#[tokio::test]
async fn test_malformed_record_is_a_fatal_data_error() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), "0\t1,2|5|0|GRAY\n");

    let err = run(test_config(&temp_dir, 3)).await.unwrap_err();
    assert!(err.is_data_error());
    match err {
        Error::TaskFailed {
            round,
            phase,
            attempts,
            ..
        } => assert_eq!((round, phase, attempts), (1, PhaseType::Expand, 1)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!round_dir(temp_dir.path(), 1).exists());
}

#[tokio::test]
async fn test_failure_keeps_completed_round_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);
    // A plain file where round 2's directory has to go
    std::fs::create_dir_all(temp_dir.path().join("output")).unwrap();
    std::fs::write(round_dir(temp_dir.path(), 2), "in the way").unwrap();

    let err = run(test_config(&temp_dir, 3)).await.unwrap_err();
    assert!(!err.is_data_error());

    assert_eq!(
        read_sorted_lines(&round_dir(temp_dir.path(), 1)),
        scenario_rounds()[0]
    );
    assert!(!round_dir(temp_dir.path(), 3).exists());
}

struct RejectingJob;

impl RoundJob for RejectingJob {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn expand(&self, record: &NodeRecord) -> Vec<NodeRecord> {
        ColoringBfs.expand(record)
    }

    fn merge(&self, id: NodeId, _records: Vec<NodeRecord>) -> Result<NodeRecord, ContractViolation> {
        Err(ContractViolation::ConflictingTopology { id })
    }
}

#[tokio::test]
async fn test_contract_violation_is_not_retried() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);

    let driver = RoundDriver::new(test_config(&temp_dir, 2), Arc::new(RejectingJob)).unwrap();
    let err = driver.run().await.unwrap_err();

    match &err {
        Error::TaskFailed {
            phase, attempts, ..
        } => assert_eq!((*phase, *attempts), (PhaseType::Merge, 1)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_data_error());
}

#[tokio::test]
async fn test_report_lists_rounds_in_order() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);
    let config = test_config(&temp_dir, 3);
    let report_path = config.report_path();

    let driver = RoundDriver::new(config, Arc::new(ColoringBfs)).unwrap();
    driver.run().await.unwrap();
    assert_eq!(report::consolidate(driver.store(), &report_path).await.unwrap(), 3);

    let expected: Vec<String> = scenario_rounds()
        .iter()
        .enumerate()
        .map(|(index, lines)| {
            format!(
                "{}\n\t{}",
                round_dir(temp_dir.path(), index + 1).display(),
                lines.join("\n\t")
            )
        })
        .collect();
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert_eq!(report, expected.join("\n"));
}

#[tokio::test]
async fn test_rerun_replaces_previous_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write_input(temp_dir.path(), SCENARIO_GRAPH);

    run(test_config(&temp_dir, 3)).await.unwrap();
    run(test_config(&temp_dir, 2)).await.unwrap();

    assert!(round_dir(temp_dir.path(), 2).exists());
    assert!(!round_dir(temp_dir.path(), 3).exists());
}
