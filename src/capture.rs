//! Output Capture (spec §4.3, C3). One task per node, multiplexing stdout
//! and stderr with a 1s readiness timeout, framing to lines, and publishing
//! `log` events. Grounded on the teacher's `read_stream_to_buffer`
//! (`process_manager.rs`), generalized from pushing into a `RollingBuffer`
//! of plain strings to publishing tagged `NodeEvent`s, and extended with
//! the UTF-8 replacement warning and dual-stream EOF handling the spec
//! requires that the teacher's single-stream helper didn't need.

use crate::events::{NodeEvent, StreamKind};
use crate::registry::NodeRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout};
use tokio::time::{sleep, timeout};

const READ_TIMEOUT: Duration = Duration::from_secs(1);
const READ_CHUNK: usize = 4096;
const EOF_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(crate) struct StreamState {
    pub(crate) partial: String,
    warned_on_replace: bool,
    eof: bool,
}

impl StreamState {
    pub(crate) fn new() -> Self {
        Self {
            partial: String::new(),
            warned_on_replace: false,
            eof: false,
        }
    }
}

/// Split newly-read bytes into complete, trimmed, non-empty lines; retains
/// the trailing partial line in `state.partial` for the next call (spec
/// §4.3: "retain the trailing partial line").
pub(crate) fn frame_chunk(state: &mut StreamState, bytes: &[u8]) -> (Vec<String>, bool) {
    let (text, had_replacement) = match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    };
    state.partial.push_str(&text);

    let mut lines = Vec::new();
    while let Some(pos) = state.partial.find('\n') {
        let line = state.partial[..pos].trim_end().to_string();
        state.partial.drain(..=pos);
        if !line.is_empty() {
            lines.push(line);
        }
    }
    (lines, had_replacement)
}

async fn publish_lines(
    record: &Arc<NodeRecord>,
    state: &mut StreamState,
    stream: StreamKind,
    lines: Vec<String>,
    had_replacement: bool,
) {
    if had_replacement && !state.warned_on_replace {
        state.warned_on_replace = true;
        let _ = record
            .events
            .push(NodeEvent::warning(format!(
                "invalid UTF-8 replaced on {stream:?} stream"
            )))
            .await;
    }
    for line in lines {
        let _ = record.events.push(NodeEvent::log(line, stream)).await;
    }
}

async fn drain_trailing(record: &Arc<NodeRecord>, state: &mut StreamState, stream: StreamKind) {
    if !state.partial.is_empty() {
        let line = std::mem::take(&mut state.partial);
        let trimmed = line.trim_end().to_string();
        if !trimmed.is_empty() {
            let _ = record.events.push(NodeEvent::log(trimmed, stream)).await;
        }
    }
}

/// Spawn the capture task and store its handle on the record (invariant 4:
/// at most one capture task per record).
pub async fn spawn(record: Arc<NodeRecord>) -> Result<(), dusa_collection_utils::core::errors::ErrorArrayItem> {
    let (stdout, stderr) = record.take_pipes().await?;
    let handle = tokio::spawn(run(record.clone(), stdout, stderr));
    let mut guard = record.capture_task.try_write_with_timeout(None).await?;
    *guard = Some(handle);
    Ok(())
}

async fn run(record: Arc<NodeRecord>, stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) {
    let mut stdout = stdout;
    let mut stderr = stderr;
    let mut out_state = StreamState::new();
    let mut err_state = StreamState::new();

    if stdout.is_none() {
        out_state.eof = true;
    }
    if stderr.is_none() {
        err_state.eof = true;
    }

    loop {
        if out_state.eof && err_state.eof {
            match record.top_level_alive().await {
                Ok(true) => {
                    sleep(EOF_POLL_INTERVAL).await;
                    continue;
                }
                _ => break,
            }
        }

        let mut out_buf = [0u8; READ_CHUNK];
        let mut err_buf = [0u8; READ_CHUNK];
        tokio::select! {
            res = read_or_pending(&mut stdout, &mut out_buf, out_state.eof) => {
                match res {
                    Some(Ok(0)) => out_state.eof = true,
                    Some(Ok(n)) => {
                        let (lines, replaced) = frame_chunk(&mut out_state, &out_buf[..n]);
                        publish_lines(&record, &mut out_state, StreamKind::Stdout, lines, replaced).await;
                    }
                    Some(Err(e)) => {
                        let _ = record.events.push(NodeEvent::error(format!("stdout read error: {e}"))).await;
                        out_state.eof = true;
                    }
                    None => {}
                }
            }
            res = read_or_pending(&mut stderr, &mut err_buf, err_state.eof) => {
                match res {
                    Some(Ok(0)) => err_state.eof = true,
                    Some(Ok(n)) => {
                        let (lines, replaced) = frame_chunk(&mut err_state, &err_buf[..n]);
                        publish_lines(&record, &mut err_state, StreamKind::Stderr, lines, replaced).await;
                    }
                    Some(Err(e)) => {
                        let _ = record.events.push(NodeEvent::error(format!("stderr read error: {e}"))).await;
                        err_state.eof = true;
                    }
                    None => {}
                }
            }
        }
    }

    drain_trailing(&record, &mut out_state, StreamKind::Stdout).await;
    drain_trailing(&record, &mut err_state, StreamKind::Stderr).await;

    let _ = record
        .events
        .push(NodeEvent::status("Output capture finished."))
        .await;
}

/// Awaits a single read with a 1s readiness timeout, or never resolves once
/// the stream has hit EOF (so `select!` simply stops polling that side).
async fn read_or_pending<R: AsyncReadExt + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
    eof: bool,
) -> Option<std::io::Result<usize>> {
    if eof {
        std::future::pending::<()>().await;
        unreachable!()
    }
    let reader = reader.as_mut()?;
    // timed out this cycle; re-poll next loop iteration
    timeout(READ_TIMEOUT, reader.read(buf)).await.ok()
}
