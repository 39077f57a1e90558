//! Tree Monitor (spec §4.4, C4). Single background task, periodic sweep of
//! a registry snapshot: refreshes each record's child set and reaps nodes
//! whose whole tree has died. Grounded on the teacher's periodic-loop shape
//! (`ResourceMonitorLock::update_loop` in `resource_monitor.rs`) combined
//! with its descendant-collection helper (`process_manager.rs`).

use crate::events::NodeEvent;
use crate::process::{collect_descendants, is_pid_active};
use crate::registry::{NodeState, Registry};
use dusa_collection_utils::core::logger::LogLevel;
use dusa_collection_utils::log;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_INTERVAL_SECS: u64 = 3;

/// Spawn the single, process-wide monitor task. It never exits and never
/// panics out of a single node's failure (spec §4.4: "Any exception raised
/// while sweeping a single record is caught ... the sweep continues").
pub fn spawn(registry: Registry, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            sweep(&registry).await;
        }
    })
}

async fn sweep(registry: &Registry) {
    let snapshot: Vec<_> = match registry.try_read_with_timeout(None).await {
        Ok(guard) => guard.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Err(e) => {
            log!(LogLevel::Error, "Monitor failed to snapshot registry: {}", e);
            return;
        }
    };

    for (name, record) in snapshot {
        let top_alive = match record.top_level_alive().await {
            Ok(alive) => alive,
            Err(e) => {
                log!(LogLevel::Error, "Monitor lookup failed for '{}': {}", name, e);
                continue;
            }
        };

        if top_alive {
            if let Some(pid) = record.pid().await.ok().flatten() {
                if let Ok(descendants) = collect_descendants(pid as i32) {
                    let known = record.children_snapshot().await.unwrap_or_default();
                    for descendant in descendants.into_iter().filter(|p| *p != pid as i32) {
                        if !known.contains(&descendant) {
                            let _ = record.append_child(descendant).await;
                            let _ = record
                                .events
                                .push(NodeEvent::status(format!(
                                    "Discovered new child PID={descendant}"
                                )))
                                .await;
                        }
                    }
                }
            }
            continue;
        }

        let children = record.children_snapshot().await.unwrap_or_default();
        let tree_dead = children.iter().all(|pid| !is_pid_active(*pid));

        if tree_dead {
            let _ = record
                .events
                .push(NodeEvent::status(format!(
                    "Node '{name}' stopped unexpectedly"
                )))
                .await;
            let _ = record.set_state(NodeState::Terminated).await;

            if let Ok(mut guard) = registry.try_write_with_timeout(None).await {
                guard.remove(&name);
            } else {
                log!(LogLevel::Error, "Monitor failed to evict '{}'", name);
            }
        }
    }
}
