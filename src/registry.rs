//! The Registry / NodeRecord data model (spec §3, §4.6). `NodeRecord` is the
//! unit managed by the registry; `Registry` is the `name -> NodeRecord` map
//! whose mutations are serialized by a single lock (spec §5), grounded on
//! the teacher's `LockWithTimeout`-guarded maps (e.g. `ResourceMonitorLock`).

use crate::events::EventQueue;
use dusa_collection_utils::core::errors::ErrorArrayItem;
use dusa_collection_utils::core::types::rwarc::LockWithTimeout;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Child;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Starting,
    Running,
    Terminating,
    Terminated,
}

/// The unit managed by the Registry (spec §3). Fields mutated after
/// construction go behind their own lock; `name`, `pgid`, and
/// `is_launch_tree` are set at spawn time and never change (invariant 2).
pub struct NodeRecord {
    pub name: String,
    pub process: LockWithTimeout<Child>,
    pub pgid: i32,
    pub is_launch_tree: bool,
    /// Append-only; may contain PIDs of processes that have since exited
    /// (invariant 3 — liveness is queried, not cached).
    pub children: LockWithTimeout<Vec<i32>>,
    pub state: LockWithTimeout<NodeState>,
    pub events: EventQueue,
    pub capture_task: LockWithTimeout<Option<JoinHandle<()>>>,
    pub start_time: Instant,
}

impl NodeRecord {
    pub async fn set_state(&self, state: NodeState) -> Result<(), ErrorArrayItem> {
        let mut guard = self.state.try_write_with_timeout(None).await?;
        *guard = state;
        Ok(())
    }

    pub async fn get_state(&self) -> Result<NodeState, ErrorArrayItem> {
        Ok(*self.state.try_read_with_timeout(None).await?)
    }

    pub async fn append_child(&self, pid: i32) -> Result<(), ErrorArrayItem> {
        let mut guard = self.children.try_write_with_timeout(None).await?;
        if !guard.contains(&pid) {
            guard.push(pid);
        }
        Ok(())
    }

    pub async fn children_snapshot(&self) -> Result<Vec<i32>, ErrorArrayItem> {
        Ok(self.children.try_read_with_timeout(None).await?.clone())
    }

    /// Top-level process PID, if the process handle still reports one.
    pub async fn pid(&self) -> Result<Option<u32>, ErrorArrayItem> {
        let guard = self.process.try_read_with_timeout(None).await?;
        Ok(guard.id())
    }

    /// `true` iff the top-level process has not yet been observed to exit.
    pub async fn top_level_alive(&self) -> Result<bool, ErrorArrayItem> {
        let mut guard = self.process.try_write_with_timeout(None).await?;
        Ok(guard.try_wait().map_err(ErrorArrayItem::from)?.is_none())
    }

    /// Take the stdout/stderr pipe handles for the output capture task. Only
    /// meaningful once, right after launch (invariant 4: at most one capture
    /// task per record).
    pub async fn take_pipes(
        &self,
    ) -> Result<(Option<tokio::process::ChildStdout>, Option<tokio::process::ChildStderr>), ErrorArrayItem>
    {
        let mut guard = self.process.try_write_with_timeout(None).await?;
        Ok((guard.stdout.take(), guard.stderr.take()))
    }
}

/// `name -> NodeRecord` map; the lock is held only for membership
/// check + insert/remove (spec §4.6/§5), never across spawning, signaling,
/// or I/O.
pub type Registry = LockWithTimeout<HashMap<String, Arc<NodeRecord>>>;

pub fn new_registry() -> Registry {
    LockWithTimeout::new(HashMap::new())
}
