//! Terminator (spec §4.5, C5). Idempotent SIGINT-then-SIGKILL escalation
//! over a node's children and process group, evicting the record once the
//! tree is confirmed dead. Grounded on the teacher's `kill_pgid_recursive`
//! and `SupervisedProcess::kill` (`process_manager.rs`), adapted to SIGINT
//! first (the spec's contract) and to the registry's evict-on-completion
//! discipline instead of a bare process wrapper.

use crate::events::NodeEvent;
use crate::process::{is_pid_active, reap_zombie, send_sigint, send_sigkill};
use crate::registry::{NodeState, Registry};
use dusa_collection_utils::core::logger::LogLevel;
use dusa_collection_utils::log;
use std::time::Duration;
use tokio::time::timeout;

pub const DEFAULT_GRACE_TIMEOUT_SECS: u64 = 5;

/// Terminate node `name`. A missing node is a no-op (spec §4.5 step 1,
/// §7 `NodeNotFound` surfaces as a warning, not an error). A node already
/// `terminating` means another terminator is in flight; return immediately.
pub async fn terminate(registry: &Registry, name: &str, grace_timeout: Duration) {
    let record = {
        let guard = match registry.try_read_with_timeout(None).await {
            Ok(g) => g,
            Err(e) => {
                log!(LogLevel::Error, "Terminate: registry lookup failed: {}", e);
                return;
            }
        };
        guard.get(name).cloned()
    };

    let Some(record) = record else {
        log!(LogLevel::Warn, "Terminate: node '{}' not found", name);
        return;
    };

    if matches!(record.get_state().await, Ok(NodeState::Terminating)) {
        return;
    }
    let _ = record.set_state(NodeState::Terminating).await;

    // Step 3: SIGINT every currently-running known child.
    for pid in record.children_snapshot().await.unwrap_or_default() {
        if is_pid_active(pid) {
            send_sigint(pid);
        }
    }

    // Step 4: SIGINT the process group.
    send_sigint(-record.pgid);

    // Step 5: wait up to grace_timeout for the top-level process to exit.
    let graceful = timeout(grace_timeout, wait_for_exit(&record)).await.is_ok();

    if graceful {
        let _ = record
            .events
            .push(NodeEvent::status("Terminated gracefully."))
            .await;
    } else {
        // Step 6: escalate to SIGKILL on the process group and wait unbounded.
        send_sigkill(-record.pgid);
        wait_for_exit(&record).await;
        let _ = record
            .events
            .push(NodeEvent::status("Terminated forcefully."))
            .await;
    }

    // Step 7: sweep children once more; anything still running gets SIGKILL.
    for pid in record.children_snapshot().await.unwrap_or_default() {
        if is_pid_active(pid) {
            send_sigkill(pid);
            reap_zombie(pid);
        }
    }

    let _ = record.set_state(NodeState::Terminated).await;
    if let Ok(mut guard) = registry.try_write_with_timeout(None).await {
        guard.remove(name);
    }
}

async fn wait_for_exit(record: &std::sync::Arc<crate::registry::NodeRecord>) {
    loop {
        match record.top_level_alive().await {
            Ok(false) | Err(_) => return,
            Ok(true) => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}
