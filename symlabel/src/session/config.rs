//! Session tuning knobs

use std::path::PathBuf;
use std::time::Duration;

/// Timing and discovery settings for the x64dbg-automate client
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for the debugger to come up and load the target
    pub startup_timeout: Duration,
    /// Delay between readiness polls during startup
    pub poll_interval: Duration,
    /// Maximum wait for a single request/reply round trip
    pub request_timeout: Duration,
    /// Directory the plugin writes its session lock files to
    pub lock_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(200),
            request_timeout: Duration::from_secs(10),
            lock_dir: std::env::temp_dir(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }
}
