//! Launcher (spec §4.2, C2). Builds the `ros2` command line, resolves the
//! environment via the Environment Provider, spawns the process as its own
//! process-group leader, and — for launch files — polls briefly for the
//! initial child set. Grounded on the teacher's `spawn_complex_process`
//! (`process_manager.rs`), generalized from a fixed `SupervisedChild` to a
//! `NodeRecord` and from `setsid`-or-inherit to always-setsid (spec §4.2
//! step 3 requires a new process group unconditionally).

use crate::environment;
use crate::errors::SupervisorError;
use crate::events::{EventQueue, NodeEvent};
use crate::process::collect_descendants;
use crate::registry::{NodeRecord, NodeState};
use dusa_collection_utils::core::types::rwarc::LockWithTimeout;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::sleep;

pub const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 5;
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Body of `POST /nodes/launch` (spec §4.2/§6).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRequest {
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub launch_file: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub(crate) fn build_argv(req: &NodeRequest) -> Result<(Vec<String>, bool), SupervisorError> {
    match (&req.executable, &req.launch_file) {
        (Some(_), Some(_)) | (None, None) => Err(SupervisorError::InvalidRequest(
            "exactly one of `executable` and `launch_file` must be set".into(),
        )),
        (Some(exe), None) => {
            let mut argv = vec!["ros2".into(), "run".into(), req.package.clone(), exe.clone()];
            append_parameters(&mut argv, &req.parameters);
            Ok((argv, false))
        }
        (None, Some(launch)) => {
            let mut argv = vec![
                "ros2".into(),
                "launch".into(),
                req.package.clone(),
                launch.clone(),
            ];
            append_parameters(&mut argv, &req.parameters);
            Ok((argv, true))
        }
    }
}

fn append_parameters(argv: &mut Vec<String>, parameters: &HashMap<String, String>) {
    for (key, value) in parameters {
        argv.push("--ros-args".into());
        argv.push("-p".into());
        argv.push(format!("{key}:={value}"));
    }
}

/// Spawn `name` and return its `NodeRecord`. Nothing is inserted into the
/// registry here — that is the Supervisor's job under `registry_lock`.
pub async fn launch(
    req: NodeRequest,
    ros_distro: &str,
    event_queue_capacity: usize,
) -> Result<Arc<NodeRecord>, SupervisorError> {
    let (argv, is_launch_tree) = build_argv(&req)?;
    let timeout = Duration::from_secs(req.timeout_secs.unwrap_or(DEFAULT_LAUNCH_TIMEOUT_SECS));

    let env = environment::resolve(ros_distro, &environment::host_env()).await?;

    let mut command = Command::new(&argv[0]);
    command.args(&argv[1..]);
    command.env_clear();
    command.envs(&env);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.stdin(Stdio::null());
    command.kill_on_drop(true);

    // SAFETY: setsid() is async-signal-safe and runs before exec in the child.
    #[cfg(unix)]
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command
        .spawn()
        .map_err(|e| SupervisorError::LaunchFailed(format!("spawn failed: {e}")))?;

    let pid = child.id().ok_or_else(|| {
        SupervisorError::LaunchFailed("spawned process has no PID".to_string())
    })? as i32;

    let record = Arc::new(NodeRecord {
        name: req.name.clone(),
        process: LockWithTimeout::new(child),
        pgid: pid,
        is_launch_tree,
        children: LockWithTimeout::new(Vec::new()),
        state: LockWithTimeout::new(NodeState::Starting),
        events: EventQueue::new(event_queue_capacity),
        capture_task: LockWithTimeout::new(None),
        start_time: Instant::now(),
    });

    record
        .events
        .push(NodeEvent::status("Node process launched."))
        .await
        .map_err(SupervisorError::from)?;

    if is_launch_tree {
        discover_initial_children(&record, pid, timeout).await;
    }

    record.set_state(NodeState::Running).await?;

    Ok(record)
}

async fn discover_initial_children(record: &Arc<NodeRecord>, top_pid: i32, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(descendants) = collect_descendants(top_pid) {
            let others: Vec<i32> = descendants.into_iter().filter(|p| *p != top_pid).collect();
            if !others.is_empty() {
                for pid in &others {
                    let _ = record.append_child(*pid).await;
                }
                let _ = record
                    .events
                    .push(NodeEvent::status(format!(
                        "Children: {}",
                        others
                            .iter()
                            .map(i32::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    )))
                    .await;
                return;
            }
        }
        if Instant::now() >= deadline {
            let _ = record
                .events
                .push(NodeEvent::warning(
                    "no children discovered before launch timeout",
                ))
                .await;
            return;
        }
        sleep(CHILD_POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())))
            .await;
    }
}
