//! Environment Provider (spec §4.1). Composes the host environment with a
//! "sourced" environment harvested from a distro setup script. Grounded on
//! the teacher's pattern of shelling out via `tokio::process::Command` and
//! treating spawn/exit failures as a launch error (`process_manager.rs`).

use crate::errors::SupervisorError;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_DISTRO: &str = "humble";

/// Pure function of the distro name and the current host environment:
/// runs a fresh shell that sources `/opt/ros/<distro>/setup.bash` and dumps
/// `env`, then overlays the parsed `KEY=VALUE` pairs onto `base_env`
/// (sourced values win).
pub async fn resolve(
    distro: &str,
    base_env: &HashMap<String, String>,
) -> Result<HashMap<String, String>, SupervisorError> {
    let script = format!("source /opt/ros/{distro}/setup.bash && env", distro = distro);

    let output = Command::new("bash")
        .arg("-c")
        .arg(&script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            SupervisorError::LaunchFailed(format!("failed to invoke shell for {distro}: {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SupervisorError::LaunchFailed(format!(
            "environment setup for distro '{distro}' exited with {}: {stderr}",
            output.status
        )));
    }

    let dump = String::from_utf8_lossy(&output.stdout);
    let mut env = base_env.clone();
    overlay_dump(&mut env, &dump);
    Ok(env)
}

pub(crate) fn overlay_dump(env: &mut HashMap<String, String>, dump: &str) {
    for line in dump.lines() {
        if let Some((key, value)) = line.split_once('=') {
            env.insert(key.to_string(), value.to_string());
        }
    }
}

/// Snapshot of the host process environment, as seen by the caller.
pub fn host_env() -> HashMap<String, String> {
    std::env::vars().collect()
}
