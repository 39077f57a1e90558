//! Low-level PID helpers shared by the monitor and the terminator. Grounded
//! on `process_manager.rs`'s `collect_descendants`/`kill_pgid_recursive`/
//! `is_pid_active` in the teacher crate, adapted to the spec's SIGINT-first
//! escalation (spec §4.5) instead of the teacher's SIGTERM-first one.

use dusa_collection_utils::core::errors::{ErrorArrayItem, Errors};
use libc::{c_int, SIGINT, SIGKILL};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use procfs::process::all_processes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;

use dusa_collection_utils::core::logger::LogLevel;
use dusa_collection_utils::log;

/// Non-destructive liveness check (signal 0), per spec §4.4/§4.5.
pub fn is_pid_active(pid: i32) -> bool {
    let ret = unsafe { libc::kill(pid as c_int, 0) };
    if ret == 0 {
        true
    } else {
        io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }
}

/// Recursively collect every descendant PID of `root_pid`, including itself,
/// by walking `/proc`'s parent/child relation (spec §4.4 "query the OS for
/// its entire descendant set").
pub fn collect_descendants(root_pid: i32) -> Result<HashSet<i32>, ErrorArrayItem> {
    let mut children_map: HashMap<i32, Vec<i32>> = HashMap::new();
    let mut result: HashSet<i32> = HashSet::new();

    for prc in all_processes()
        .map_err(|e| ErrorArrayItem::new(Errors::InputOutput, e.to_string()))?
    {
        let process = match prc {
            Ok(p) => p,
            Err(_) => continue,
        };
        if let Ok(stat) = process.stat() {
            children_map.entry(stat.ppid).or_default().push(process.pid());
        }
    }

    let mut queue: VecDeque<i32> = VecDeque::new();
    queue.push_back(root_pid);
    result.insert(root_pid);

    while let Some(pid) = queue.pop_front() {
        if let Some(children) = children_map.get(&pid) {
            for child in children {
                if result.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
    }

    Ok(result)
}

/// Send `SIGINT` to a single PID, ignoring "no such process".
pub fn send_sigint(pid: i32) {
    let res = unsafe { libc::kill(pid, SIGINT) };
    if res != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            log!(LogLevel::Warn, "Failed to send SIGINT to pid {}: {}", pid, err);
        }
    }
}

/// Send `SIGKILL` to a single PID, ignoring "no such process".
pub fn send_sigkill(pid: i32) {
    let res = unsafe { libc::kill(pid, SIGKILL) };
    if res != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            log!(LogLevel::Warn, "Failed to send SIGKILL to pid {}: {}", pid, err);
        }
    }
}

/// Reap a zombie without blocking; logs the outcome at `Trace`.
pub fn reap_zombie(pid: i32) {
    match waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::Exited(_, status)) => {
            log!(LogLevel::Trace, "Reaped pid {} with exit status {}", pid, status)
        }
        Ok(WaitStatus::Signaled(_, sig, _)) => {
            log!(LogLevel::Trace, "Reaped pid {} terminated by signal {:?}", pid, sig)
        }
        Ok(status) => log!(LogLevel::Trace, "PID {} wait status: {:?}", pid, status),
        Err(e) => log!(LogLevel::Trace, "Failed to reap pid {}: {}", pid, e),
    }
}

