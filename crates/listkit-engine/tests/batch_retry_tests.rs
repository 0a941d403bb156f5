//! Batch Retry Tests
//!
//! This test suite verifies selective resubmission of batch items.
//!
//! ## Scenarios Covered
//!
//! 1. Only retryable items are resubmitted; terminal and succeeded items settle
//! 2. A single-attempt budget never sleeps
//! 3. Exponential delays double up to the cap; constant delays stay flat
//! 4. Retried steps keep their ids and dependency lists
//! 5. Later attempts override earlier results
//! 6. Transport and protocol failures resubmit the whole batch until the last attempt
//! 7. Invalid options and empty batches are rejected before submission

mod common;

use common::{
    dependent_chain, three_updates, transport_error, RecordingSleeper, Scripted, ScriptedSubmitter,
};
use listkit_core::errors::{ExError, ExErrorKind};
use listkit_core::retry::RetryOptions;
use listkit_core::BatchStepRegistry;
use listkit_engine::{AttemptResponse, BatchRetryOrchestrator};
use serde_json::{json, Value};

fn orchestrator(
    script: Vec<Scripted>,
    options: RetryOptions,
) -> (
    BatchRetryOrchestrator<ScriptedSubmitter, RecordingSleeper>,
    ScriptedSubmitter,
    RecordingSleeper,
) {
    let submitter = ScriptedSubmitter::new(script);
    let sleeper = RecordingSleeper::new();
    let orch = BatchRetryOrchestrator::new(submitter.clone())
        .with_sleeper(sleeper.clone())
        .with_options(options);
    (orch, submitter, sleeper)
}

#[tokio::test]
async fn test_only_retryable_items_are_resubmitted() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![Scripted::Statuses(vec![("1", 200), ("2", 503), ("3", 404)])],
        RetryOptions::default(),
    );

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(outcome.attempts(), 2);
    assert_eq!(outcome.status("1"), Some(200));
    assert_eq!(outcome.status("2"), Some(200));
    assert_eq!(outcome.status("3"), Some(404));
    assert_eq!(submitter.batch_ids(1), vec!["2"]);
    assert_eq!(sleeper.delay_secs(), vec![1]);
    assert_eq!(outcome.failed().collect::<Vec<_>>(), vec!["3"]);
}

#[tokio::test]
async fn test_all_succeeded_needs_one_attempt() {
    let (orch, submitter, sleeper) = orchestrator(vec![], RetryOptions::default());

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(submitter.calls(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_single_attempt_budget_never_sleeps() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![Scripted::Statuses(vec![("2", 503)])],
        RetryOptions::default().with_max_retries(1),
    );

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(submitter.calls(), 1);
    assert!(sleeper.delays().is_empty());
    assert_eq!(outcome.status("2"), Some(503));
}

#[tokio::test]
async fn test_exponential_delays_double_up_to_cap() {
    let always_busy = (0..9).map(|_| Scripted::Statuses(vec![("1", 503)])).collect();
    let (orch, submitter, sleeper) =
        orchestrator(always_busy, RetryOptions::default().with_max_retries(9));

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(submitter.calls(), 9);
    assert_eq!(outcome.attempts(), 9);
    assert_eq!(sleeper.delay_secs(), vec![1, 2, 4, 8, 16, 32, 60, 60]);
    assert_eq!(outcome.status("1"), Some(503));
}

#[tokio::test]
async fn test_constant_delays_when_exponential_disabled() {
    let always_busy = (0..4).map(|_| Scripted::Statuses(vec![("3", 429)])).collect();
    let options = RetryOptions::default()
        .with_max_retries(4)
        .with_initial_delay_seconds(3)
        .with_exponential_backoff(false);
    let (orch, _, sleeper) = orchestrator(always_busy, options);

    orch.submit(&three_updates()).await.unwrap();

    assert_eq!(sleeper.delay_secs(), vec![3, 3, 3]);
}

#[tokio::test]
async fn test_terminal_statuses_are_never_retried() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![Scripted::Statuses(vec![("1", 400), ("2", 409), ("3", 302)])],
        RetryOptions::default(),
    );

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(submitter.calls(), 1);
    assert!(sleeper.delays().is_empty());
    assert_eq!(outcome.succeeded().count(), 0);
}

#[tokio::test]
async fn test_retried_steps_keep_ids_and_dependencies() {
    let original = dependent_chain();
    let (orch, submitter, _) = orchestrator(
        vec![
            Scripted::Statuses(vec![("b", 423), ("c", 500)]),
            Scripted::Statuses(vec![("c", 502)]),
        ],
        RetryOptions::default(),
    );

    let outcome = orch.submit(&original).await.unwrap();

    assert_eq!(outcome.attempts(), 3);
    assert_eq!(submitter.batch_ids(1), vec!["b", "c"]);
    assert_eq!(submitter.batch_ids(2), vec!["c"]);
    for batch in submitter.batches() {
        for step in &batch {
            assert_eq!(Some(step), original.get(step.id()));
        }
    }
    assert_eq!(submitter.batches()[2].get("c").unwrap().depends_on(), ["a", "b"]);
}

#[tokio::test]
async fn test_later_attempts_override_earlier_results() {
    let (orch, _, _) = orchestrator(
        vec![
            Scripted::Statuses(vec![("1", 503)]),
            Scripted::Statuses(vec![("1", 429)]),
            Scripted::Statuses(vec![("1", 500)]),
        ],
        RetryOptions::default().with_max_retries(3),
    );

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(outcome.status("1"), Some(500));
    assert_eq!(outcome.response("1"), Some(&json!({"id": "1", "attempt": 3})));
    assert_eq!(outcome.response("2"), Some(&json!({"id": "2", "attempt": 1})));
    assert_eq!(outcome.statuses().len(), 3);
}

#[tokio::test]
async fn test_transport_failure_resubmits_whole_batch() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![Scripted::Fail(transport_error("connection reset"))],
        RetryOptions::default(),
    );

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(outcome.attempts(), 2);
    assert_eq!(submitter.batch_ids(1), vec!["1", "2", "3"]);
    assert_eq!(sleeper.delay_secs(), vec![1]);
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_transport_failure_on_last_attempt_is_returned() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![
            Scripted::Fail(transport_error("timeout")),
            Scripted::Fail(transport_error("timeout again")),
        ],
        RetryOptions::default().with_max_retries(2),
    );

    let err = orch.submit(&three_updates()).await.unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Transport);
    assert_eq!(err.attempt(), Some(2));
    assert_eq!(err.message(), "timeout again");
    assert_eq!(err.op(), Some("submit_with_retry"));
    assert!(err.correlation_id().is_some());
    assert_eq!(submitter.calls(), 2);
    assert_eq!(sleeper.delay_secs(), vec![1]);
}

#[tokio::test]
async fn test_missing_item_is_a_protocol_failure() {
    let partial = AttemptResponse::new()
        .with_item("1", 200, Value::Null)
        .with_item("2", 200, Value::Null);
    let (orch, submitter, _) = orchestrator(vec![Scripted::Raw(partial)], RetryOptions::default());

    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(outcome.attempts(), 2);
    assert_eq!(submitter.batch_ids(1), vec!["1", "2", "3"]);
    assert_eq!(outcome.statuses().len(), 3);
}

#[tokio::test]
async fn test_unexpected_item_on_last_attempt_is_returned() {
    let extra = AttemptResponse::new()
        .with_item("1", 200, Value::Null)
        .with_item("2", 200, Value::Null)
        .with_item("3", 200, Value::Null)
        .with_item("99", 200, Value::Null);
    let (orch, _, _) = orchestrator(
        vec![Scripted::Raw(extra)],
        RetryOptions::default().with_max_retries(1),
    );

    let err = orch.submit(&three_updates()).await.unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Protocol);
    assert_eq!(err.step_id(), Some("99"));
}

#[tokio::test]
async fn test_non_transient_submitter_error_is_returned_immediately() {
    let (orch, submitter, sleeper) = orchestrator(
        vec![Scripted::Fail(
            ExError::new(ExErrorKind::InvalidInput).with_message("rejected envelope"),
        )],
        RetryOptions::default(),
    );

    let err = orch.submit(&three_updates()).await.unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(submitter.calls(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_invalid_options_rejected_before_submission() {
    let (orch, submitter, _) = orchestrator(vec![], RetryOptions::default());

    for options in [
        RetryOptions::default().with_max_retries(0),
        RetryOptions::default().with_initial_delay_seconds(0),
    ] {
        let err = orch.submit_with_retry(&three_updates(), &options).await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfiguration);
    }
    assert_eq!(submitter.calls(), 0);
}

#[tokio::test]
async fn test_empty_batch_rejected_before_submission() {
    let (orch, submitter, _) = orchestrator(vec![], RetryOptions::default());

    let err = orch.submit(&BatchStepRegistry::new()).await.unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::EmptyBatch);
    assert_eq!(submitter.calls(), 0);
}

#[tokio::test]
async fn test_explicit_options_override_orchestrator_options() {
    let (orch, submitter, _) = orchestrator(
        vec![Scripted::Statuses(vec![("1", 503)])],
        RetryOptions::default().with_max_retries(1),
    );

    let outcome = orch
        .submit_with_retry(&three_updates(), &RetryOptions::default().with_max_retries(2))
        .await
        .unwrap();

    assert_eq!(outcome.attempts(), 2);
    assert_eq!(submitter.calls(), 2);
    assert_eq!(orch.options().max_retries, 1);
}

#[tokio::test]
async fn test_each_sequence_gets_its_own_correlation_id() {
    let (orch, _, _) = orchestrator(vec![], RetryOptions::default());

    let first = orch.submit(&three_updates()).await.unwrap();
    let second = orch.submit(&three_updates()).await.unwrap();

    assert_ne!(first.correlation_id(), second.correlation_id());
}

#[tokio::test(start_paused = true)]
async fn test_default_sleeper_waits_on_tokio_timer() {
    let submitter = ScriptedSubmitter::new(vec![Scripted::Statuses(vec![("1", 503)])]);
    let orch = BatchRetryOrchestrator::new(submitter)
        .with_options(RetryOptions::default().with_initial_delay_seconds(5));

    let start = tokio::time::Instant::now();
    let outcome = orch.submit(&three_updates()).await.unwrap();

    assert_eq!(outcome.attempts(), 2);
    assert!(start.elapsed() >= std::time::Duration::from_secs(5));
}
