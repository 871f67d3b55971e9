use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::{Duration, Instant};

use launcher_core::{CollectError, ParamValue, ParameterSnapshot};
use launcher_engine::{JobRunner, JobState, StartError};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(launcher_logging::initialize_for_tests);
}

fn params() -> Result<ParameterSnapshot, CollectError> {
    Ok(ParameterSnapshot::new().with("project_id", ParamValue::Text("12".into())))
}

fn wait_for_exit(runner: &JobRunner) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while runner.is_running() {
        assert!(Instant::now() < deadline, "worker did not exit");
        thread::sleep(Duration::from_millis(2));
    }
}

/// Script that blocks until the test releases it.
fn gated_runner(spawned: Arc<AtomicUsize>) -> (JobRunner, mpsc::Sender<()>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let runner = JobRunner::from_fn(move |_params, _ctx| {
        spawned.fetch_add(1, Ordering::SeqCst);
        let _ = release_rx.lock().unwrap().recv();
        Ok(())
    });
    (runner, release_tx)
}

#[test]
fn second_start_while_running_is_rejected_without_spawning() {
    init_logging();
    let spawned = Arc::new(AtomicUsize::new(0));
    let (mut runner, release) = gated_runner(spawned.clone());
    let provided = AtomicUsize::new(0);

    let first = runner.start(params).expect("first start");
    assert_eq!(first, 1);
    assert_eq!(runner.state(), JobState::Running);

    for _ in 0..10 {
        let err = runner
            .start(|| {
                provided.fetch_add(1, Ordering::SeqCst);
                params()
            })
            .unwrap_err();
        assert!(matches!(err, StartError::AlreadyRunning));
    }
    assert_eq!(provided.load(Ordering::SeqCst), 0);

    release.send(()).unwrap();
    wait_for_exit(&runner);

    // Terminated but not yet observed: admission still refuses.
    assert!(matches!(runner.start(params), Err(StartError::AlreadyRunning)));
    assert!(runner.on_worker_finished());
    assert_eq!(spawned.load(Ordering::SeqCst), 1);
}

#[test]
fn completion_is_idempotent_and_rearms_admission() {
    init_logging();
    let spawned = Arc::new(AtomicUsize::new(0));
    let (mut runner, release) = gated_runner(spawned.clone());

    assert!(!runner.on_worker_finished(), "nothing to finish while idle");

    runner.start(params).unwrap();
    assert!(!runner.on_worker_finished(), "worker still alive");
    assert_eq!(runner.state(), JobState::Running);

    release.send(()).unwrap();
    wait_for_exit(&runner);

    assert!(runner.on_worker_finished());
    assert!(!runner.on_worker_finished());
    assert!(!runner.on_worker_finished());
    assert_eq!(runner.state(), JobState::Completed);

    release.send(()).unwrap();
    let second = runner.start(params).expect("completed admits a new job");
    assert_eq!(second, 2);
    wait_for_exit(&runner);
    assert!(runner.on_worker_finished());
    assert_eq!(spawned.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_collection_never_spawns_a_worker() {
    init_logging();
    let spawned = Arc::new(AtomicUsize::new(0));
    let (mut runner, _release) = gated_runner(spawned.clone());

    let err = runner
        .start(|| {
            Err(CollectError::ParameterValidation {
                field: "project_id".into(),
                reason: "a value is required".into(),
            })
        })
        .unwrap_err();

    assert!(matches!(
        err,
        StartError::Collect(CollectError::ParameterValidation { .. })
    ));
    assert_eq!(runner.state(), JobState::Idle);
    assert!(!runner.is_running());
    assert_eq!(runner.job().id(), 0);
    assert_eq!(spawned.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_collection_after_a_job_leaves_it_completed() {
    init_logging();
    let mut runner = JobRunner::from_fn(|_params, _ctx| Ok(()));
    runner.start(params).unwrap();
    wait_for_exit(&runner);
    runner.on_worker_finished();

    let err = runner.start(|| {
        Err(CollectError::ConnectionValidation(
            launcher_core::ClientError::Unauthorized(401),
        ))
    });

    assert!(matches!(err, Err(StartError::Collect(_))));
    assert_eq!(runner.state(), JobState::Completed);
    assert_eq!(runner.job().id(), 1);
}

#[test]
fn script_sees_the_snapshot_and_reports_through_context() {
    init_logging();
    let mut runner = JobRunner::from_fn(|params, ctx| {
        let project = params.text("project_id").unwrap_or("?");
        ctx.emit_message(format!("job {} project {}", ctx.job_id(), project));
        ctx.set_status_message("Ready");
        ctx.update_progress(100);
        Ok(())
    });

    runner.start(params).unwrap();
    assert_eq!(runner.job().parameters().text("project_id"), Some("12"));
    wait_for_exit(&runner);

    assert_eq!(runner.messages().drain_all(), ["job 1 project 12"]);
    assert_eq!(runner.progress().percent(), 100);
    assert_eq!(runner.progress().status(), "Ready");
}

#[test]
fn worker_error_is_swallowed_like_a_normal_return() {
    init_logging();
    let mut runner = JobRunner::from_fn(|_params, ctx| {
        ctx.emit_message("about to fail");
        anyhow::bail!("remote call failed")
    });

    runner.start(params).unwrap();
    wait_for_exit(&runner);

    assert!(runner.on_worker_finished());
    assert_eq!(runner.state(), JobState::Completed);
    assert_eq!(runner.messages().drain_all(), ["about to fail"]);
}

#[test]
fn worker_panic_is_swallowed_at_the_boundary() {
    init_logging();
    let mut runner = JobRunner::from_fn(|_params, ctx| {
        ctx.emit_message("before panic");
        panic!("script bug");
    });

    runner.start(params).unwrap();
    wait_for_exit(&runner);

    assert!(runner.on_worker_finished());
    assert_eq!(runner.messages().drain_all(), ["before panic"]);
    assert!(runner.start(params).is_ok());
}

#[test]
fn start_resets_progress_and_discards_stale_lines() {
    init_logging();
    let mut runner = JobRunner::from_fn(|_params, _ctx| Ok(()));
    runner.messages().push("left over");
    runner.progress().set_percent(80);

    runner.start(params).unwrap();

    assert_eq!(runner.progress().percent(), 0);
    wait_for_exit(&runner);
    assert!(runner.messages().drain_all().is_empty());
}
