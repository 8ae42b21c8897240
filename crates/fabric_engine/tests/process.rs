#![cfg(unix)]

use std::time::Duration;

use fabric_core::{ExecutionPlan, ExitKind, Stage};
use fabric_engine::{PipePolicy, ProcessRunner, ProcessSettings, TokioProcessRunner};
use pretty_assertions::assert_eq;

fn sh(script: &str) -> Stage {
    Stage::new("sh", ["-c", script])
}

fn runner() -> TokioProcessRunner {
    TokioProcessRunner::new(&ProcessSettings::default())
}

#[tokio::test]
async fn captures_stdout_of_a_successful_process() {
    let outcome = runner().run(&Stage::new("printf", ["hello"])).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.stdout, "hello");
}

#[tokio::test]
async fn non_zero_exit_keeps_code_and_stderr() {
    let outcome = runner().run(&sh("echo 'model not found' >&2; exit 3")).await;
    assert_eq!(outcome.exit, ExitKind::NonZero(Some(3)));
    assert_eq!(outcome.stderr.trim(), "model not found");
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    let outcome = runner()
        .run(&Stage::new("definitely-not-a-real-binary-4821", Vec::<String>::new()))
        .await;
    assert!(matches!(outcome.exit, ExitKind::SpawnFailed(_)));
}

#[tokio::test]
async fn stdin_is_forwarded_to_the_child() {
    let outcome = runner()
        .run_with_input(&Stage::new("tr", ["a-z", "A-Z"]), Some(b"shout"))
        .await;
    assert_eq!(outcome.stdout, "SHOUT");
}

#[tokio::test]
async fn piped_run_matches_running_the_stages_by_hand() {
    let runner = runner();
    let producer = sh("printf 'one\\ntwo\\n'");
    let transform = Stage::new("tr", ["a-z", "A-Z"]);

    let first = runner.run(&producer).await;
    let by_hand = runner
        .run_with_input(&transform, Some(first.stdout.as_bytes()))
        .await;
    let piped = runner
        .run_piped(&producer, &transform, PipePolicy::default())
        .await;

    assert_eq!(piped, by_hand);
    assert_eq!(piped.stdout, "ONE\nTWO\n");
}

#[tokio::test]
async fn large_input_does_not_deadlock_the_pipe() {
    let producer = sh("i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done");
    let outcome = runner()
        .run_piped(&producer, &Stage::new("cat", Vec::<String>::new()), PipePolicy::default())
        .await;
    assert!(outcome.is_success());
    assert_eq!(outcome.stdout.lines().count(), 20000);
}

#[tokio::test]
async fn abort_policy_stops_after_a_failed_producer() {
    let outcome = runner()
        .run_piped(
            &sh("printf partial; exit 1"),
            &sh("echo transform ran"),
            PipePolicy::AbortOnProducerFailure,
        )
        .await;
    assert_eq!(outcome.exit, ExitKind::NonZero(Some(1)));
    assert_eq!(outcome.stdout, "partial");
}

#[tokio::test]
async fn ignore_policy_feeds_a_failed_producers_output_forward() {
    let outcome = runner()
        .run_piped(
            &sh("printf partial; exit 1"),
            &Stage::new("cat", Vec::<String>::new()),
            PipePolicy::IgnoreProducerFailure,
        )
        .await;
    assert!(outcome.is_success());
    assert_eq!(outcome.stdout, "partial");
}

#[tokio::test]
async fn slow_process_times_out() {
    let runner = TokioProcessRunner::new(&ProcessSettings {
        timeout: Some(Duration::from_millis(100)),
        ..ProcessSettings::default()
    });
    let outcome = runner.run(&Stage::new("sleep", ["5"])).await;
    assert_eq!(outcome.exit, ExitKind::TimedOut(Duration::from_millis(100)));
}

#[tokio::test]
async fn plans_with_too_many_stages_are_rejected() {
    let plan = ExecutionPlan {
        stages: vec![sh("true"), sh("true"), sh("true")],
        structured: None,
    };
    let outcome = runner().run_plan(&plan, PipePolicy::default()).await;
    assert!(matches!(outcome.exit, ExitKind::SpawnFailed(_)));
}
