//! Registry / Supervisor (spec §4.6, C6). The single authoritative registry
//! of active nodes; dispatches to the Launcher, Output Capture, Terminator,
//! and Tree Monitor, taking `registry_lock` only for the map mutation
//! itself (spec §5). Grounded on the teacher's lock-guarded singleton state
//! pattern (`ResourceMonitorLock`/`ChildLock` in `process_manager.rs`).

use crate::capture;
use crate::config::AppConfig;
use crate::errors::SupervisorError;
use crate::events::NodeEvent;
use crate::launcher::{self, NodeRequest};
use crate::monitor;
use crate::registry::{new_registry, NodeState, Registry};
use crate::terminator;
use dusa_collection_utils::core::logger::LogLevel;
use dusa_collection_utils::log;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Supervisor {
    registry: Registry,
    config: AppConfig,
    _monitor_handle: JoinHandle<()>,
}

impl Supervisor {
    pub fn new(config: AppConfig) -> Self {
        let registry = new_registry();
        let interval = Duration::from_secs(config.monitor_interval_secs);
        let monitor_handle = monitor::spawn(registry.clone(), interval);
        Self {
            registry,
            config,
            _monitor_handle: monitor_handle,
        }
    }

    /// `launch` (spec §4.6): reject if the name exists, else spawn, insert,
    /// and (if verbose) start output capture — all spawning/I/O happens
    /// outside `registry_lock` (spec §5); the lock is held only for the
    /// membership check + insert.
    pub async fn launch(&self, req: NodeRequest) -> Result<(), SupervisorError> {
        {
            let guard = self.registry.try_read_with_timeout(None).await?;
            if guard.contains_key(&req.name) {
                return Err(SupervisorError::NodeAlreadyExists(req.name));
            }
        }

        let name = req.name.clone();
        let record = launcher::launch(
            req,
            &self.config.ros_distro,
            self.config.event_queue_capacity,
        )
        .await?;

        {
            let mut guard = self.registry.try_write_with_timeout(None).await?;
            if guard.contains_key(&name) {
                return Err(SupervisorError::NodeAlreadyExists(name));
            }
            guard.insert(name.clone(), record.clone());
        }

        if self.config.verbose {
            if let Err(e) = capture::spawn(record).await {
                log!(LogLevel::Error, "Failed to start output capture for '{}': {}", name, e);
            }
        }

        Ok(())
    }

    /// `terminate` (spec §4.5/§4.6): `NodeNotFound` is a no-op warning, not
    /// an error — callers always get success.
    pub async fn terminate(&self, name: &str, grace: Option<u64>) {
        let grace_timeout = Duration::from_secs(
            grace.unwrap_or(self.config.default_grace_timeout_secs),
        );
        terminator::terminate(&self.registry, name, grace_timeout).await;
    }

    /// `get_events` (spec §4.6): destructive drain.
    pub async fn get_events(&self, name: &str) -> Result<Vec<NodeEvent>, SupervisorError> {
        let record = {
            let guard = self.registry.try_read_with_timeout(None).await?;
            guard.get(name).cloned()
        };
        match record {
            Some(record) => Ok(record.events.drain().await?),
            None => Err(SupervisorError::NodeNotFound(name.to_string())),
        }
    }

    /// `list` (spec §4.6): snapshot of current names.
    pub async fn list(&self) -> Result<Vec<String>, SupervisorError> {
        let guard = self.registry.try_read_with_timeout(None).await?;
        Ok(guard.keys().cloned().collect())
    }

    /// Recommended addition (spec §9): terminate every remaining node on
    /// shutdown instead of leaving the whole tree running.
    pub async fn shutdown(&self) {
        let names: Vec<String> = self.list().await.unwrap_or_default();
        for name in names {
            self.terminate(&name, Some(self.config.default_grace_timeout_secs))
                .await;
        }
    }

    /// Current state of a node, or `None` if it isn't registered.
    pub async fn node_state_public(&self, name: &str) -> Option<NodeState> {
        let guard = self.registry.try_read_with_timeout(None).await.ok()?;
        let record = guard.get(name)?.clone();
        drop(guard);
        record.get_state().await.ok()
    }
}
