// src/config.rs

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::events;
use crate::launcher;
use crate::monitor;
use crate::terminator;

/// Application configuration (spec §2). Loaded from `Settings.toml`,
/// `Settings.<RUN_MODE>.toml`, and `SUPERVISOR__*` environment overrides,
/// in that order, matching the teacher's `AppConfig::new` layering.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AppConfig {
    /// Address the HTTP API binds to, e.g. "0.0.0.0:8080".
    pub bind_address: String,

    /// ROS distribution name used to resolve `/opt/ros/<distro>/setup.bash`.
    pub ros_distro: String,

    /// Per-node bounded event queue capacity (spec §4.7).
    pub event_queue_capacity: usize,

    /// Tree Monitor sweep interval, in seconds (spec §4.4).
    pub monitor_interval_secs: u64,

    /// Default launch readiness timeout, in seconds (spec §4.2), used when a
    /// launch request doesn't specify its own.
    pub default_launch_timeout_secs: u64,

    /// Default grace period before escalating to SIGKILL, in seconds
    /// (spec §4.5), used when a terminate request doesn't specify its own.
    pub default_grace_timeout_secs: u64,

    /// Whether to attach the Output Capture task to launched nodes
    /// (spec §4.3). Disabling this skips stdout/stderr capture entirely.
    pub verbose: bool,
}

impl AppConfig {
    /// Loads configuration the way the teacher's `AppConfig::new` does:
    /// defaults, then `Settings.toml`, then `Settings.<RUN_MODE>.toml`, then
    /// `SUPERVISOR__*` environment variables, in increasing precedence.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("ros_distro", "humble")?
            .set_default("event_queue_capacity", events::DEFAULT_CAPACITY as i64)?
            .set_default("monitor_interval_secs", monitor::DEFAULT_INTERVAL_SECS as i64)?
            .set_default(
                "default_launch_timeout_secs",
                launcher::DEFAULT_LAUNCH_TIMEOUT_SECS as i64,
            )?
            .set_default(
                "default_grace_timeout_secs",
                terminator::DEFAULT_GRACE_TIMEOUT_SECS as i64,
            )?
            .set_default("verbose", true)?;

        let builder = builder.add_source(File::with_name("Settings").required(false));
        let builder = builder.add_source(
            File::with_name(&format!("Settings.{run_mode}")).required(false),
        );
        let builder = builder.add_source(Environment::with_prefix("SUPERVISOR").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Validates configuration values that `config`/serde can't express as
    /// type constraints alone.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address must be provided".into());
        }
        if self.ros_distro.is_empty() {
            return Err("ros_distro must be provided".into());
        }
        if self.event_queue_capacity == 0 {
            return Err("event_queue_capacity must be greater than 0".into());
        }
        if self.monitor_interval_secs == 0 {
            return Err("monitor_interval_secs must be greater than 0".into());
        }
        Ok(())
    }
}
