//! Per-node bounded event FIFO (spec §3, §4.7). Overflow drops the oldest
//! entry and folds it into a single aggregated `warning`, mirroring the
//! drop-oldest behavior of `dusa_collection_utils::core::types::rb::RollingBuffer`.

use dusa_collection_utils::core::errors::ErrorArrayItem;
use dusa_collection_utils::core::types::rwarc::LockWithTimeout;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Status,
    Log,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeEvent {
    pub kind: EventKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamKind>,
    #[serde(skip)]
    pub timestamp: Instant,
}

impl NodeEvent {
    pub fn status<M: Into<String>>(message: M) -> Self {
        Self {
            kind: EventKind::Status,
            message: message.into(),
            stream: None,
            timestamp: Instant::now(),
        }
    }

    pub fn warning<M: Into<String>>(message: M) -> Self {
        Self {
            kind: EventKind::Warning,
            message: message.into(),
            stream: None,
            timestamp: Instant::now(),
        }
    }

    pub fn error<M: Into<String>>(message: M) -> Self {
        Self {
            kind: EventKind::Error,
            message: message.into(),
            stream: None,
            timestamp: Instant::now(),
        }
    }

    pub fn log<M: Into<String>>(message: M, stream: StreamKind) -> Self {
        Self {
            kind: EventKind::Log,
            message: message.into(),
            stream: Some(stream),
            timestamp: Instant::now(),
        }
    }
}

struct QueueState {
    items: VecDeque<NodeEvent>,
    capacity: usize,
    dropped_since_notice: u64,
}

/// Bounded FIFO shared between the capture task, the tree monitor, the
/// terminator, and the status endpoint. Push and drain are safe to call
/// concurrently from any of those.
pub struct EventQueue {
    state: LockWithTimeout<QueueState>,
}

pub const DEFAULT_CAPACITY: usize = 1024;

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: LockWithTimeout::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(4096)),
                capacity,
                dropped_since_notice: 0,
            }),
        }
    }

    /// Push an event, dropping the oldest on overflow. A single aggregated
    /// `warning` event is appended the first time an overflow happens since
    /// the last time this method emitted one.
    pub async fn push(&self, event: NodeEvent) -> Result<(), ErrorArrayItem> {
        let mut guard = self.state.try_write_with_timeout(None).await?;
        if guard.items.len() >= guard.capacity {
            guard.items.pop_front();
            guard.dropped_since_notice += 1;
        }
        guard.items.push_back(event);

        if guard.dropped_since_notice > 0 {
            let dropped = guard.dropped_since_notice;
            guard.dropped_since_notice = 0;
            if guard.items.len() >= guard.capacity {
                guard.items.pop_front();
            }
            guard.items.push_back(NodeEvent::warning(format!(
                "{dropped} log line(s) dropped due to queue overflow"
            )));
        }
        Ok(())
    }

    /// Drain and return every currently queued event (destructive read, spec §4.6/§9).
    pub async fn drain(&self) -> Result<Vec<NodeEvent>, ErrorArrayItem> {
        let mut guard = self.state.try_write_with_timeout(None).await?;
        Ok(guard.items.drain(..).collect())
    }
}
