//! End-to-end scenarios against real child processes (spec §8), bypassing
//! the Launcher's `ros2` argv construction (not available in CI) by building
//! `NodeRecord`s directly the way `launcher::launch` does internally.

use dusa_collection_utils::core::types::rwarc::LockWithTimeout;
use node_supervisor::events::{EventKind, EventQueue, NodeEvent};
use node_supervisor::process::is_pid_active;
use node_supervisor::registry::{new_registry, NodeRecord, NodeState};
use node_supervisor::terminator;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;

async fn spawn_record(name: &str, argv: &[&str]) -> Arc<NodeRecord> {
    let mut command = Command::new(argv[0]);
    command.args(&argv[1..]);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.stdin(Stdio::null());
    command.kill_on_drop(true);

    #[cfg(unix)]
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn().expect("spawn test process");
    let pid = child.id().expect("pid") as i32;

    Arc::new(NodeRecord {
        name: name.to_string(),
        process: LockWithTimeout::new(child),
        pgid: pid,
        is_launch_tree: false,
        children: LockWithTimeout::new(Vec::new()),
        state: LockWithTimeout::new(NodeState::Running),
        events: EventQueue::new(64),
        capture_task: LockWithTimeout::new(None),
        start_time: Instant::now(),
    })
}

#[tokio::test]
async fn launch_list_status_terminate_round_trip() {
    let registry = new_registry();
    let record = spawn_record("sleeper", &["sleep", "30"]).await;
    let pid = record.pid().await.unwrap().unwrap() as i32;

    {
        let mut guard = registry.try_write_with_timeout(None).await.unwrap();
        guard.insert("sleeper".to_string(), record.clone());
    }

    {
        let guard = registry.try_read_with_timeout(None).await.unwrap();
        assert!(guard.contains_key("sleeper"));
    }

    assert!(is_pid_active(pid));

    terminator::terminate(&registry, "sleeper", Duration::from_secs(2)).await;

    assert!(!is_pid_active(pid));
    let guard = registry.try_read_with_timeout(None).await.unwrap();
    assert!(!guard.contains_key("sleeper"));
}

#[tokio::test]
async fn terminate_is_idempotent_for_an_already_terminating_node() {
    let registry = new_registry();
    let record = spawn_record("idempotent", &["sleep", "30"]).await;
    record.set_state(NodeState::Terminating).await.unwrap();

    {
        let mut guard = registry.try_write_with_timeout(None).await.unwrap();
        guard.insert("idempotent".to_string(), record.clone());
    }

    // A terminate call against a node already mid-terminate returns without
    // touching it (spec §4.5 step 2); the record stays in the registry.
    terminator::terminate(&registry, "idempotent", Duration::from_secs(1)).await;

    let guard = registry.try_read_with_timeout(None).await.unwrap();
    assert!(guard.contains_key("idempotent"));
}

#[tokio::test]
async fn forceful_termination_escalates_past_a_signal_ignoring_process() {
    let registry = new_registry();
    // Ignored signal dispositions survive `exec`, so this `sleep` keeps
    // ignoring SIGINT, forcing the grace timeout to expire and the
    // terminator to escalate to SIGKILL.
    let record = spawn_record("stubborn", &["sh", "-c", "trap '' INT; exec sleep 30"]).await;
    let pid = record.pid().await.unwrap().unwrap() as i32;

    {
        let mut guard = registry.try_write_with_timeout(None).await.unwrap();
        guard.insert("stubborn".to_string(), record.clone());
    }

    // Give the shell time to install its trap before exec'ing into sleep;
    // otherwise a SIGINT racing the shell startup would hit the default
    // (terminating) disposition instead of the ignored one.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    terminator::terminate(&registry, "stubborn", Duration::from_millis(500)).await;

    assert!(!is_pid_active(pid));
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn event_queue_reports_graceful_termination() {
    let registry = new_registry();
    let record = spawn_record("graceful", &["sleep", "30"]).await;

    {
        let mut guard = registry.try_write_with_timeout(None).await.unwrap();
        guard.insert("graceful".to_string(), record.clone());
    }

    terminator::terminate(&registry, "graceful", Duration::from_secs(2)).await;

    let events = record.events.drain().await.unwrap();
    assert!(events
        .iter()
        .any(|e: &NodeEvent| e.kind == EventKind::Status && e.message.contains("gracefully")));
}
