// WaitConfig - process-wide default tunables
//
// Constructed once at startup (plain defaults or from the environment)
// and threaded through as explicit RetryPolicy values. The polling loop
// itself never consults the environment.

use crate::wait::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_RETRIES, DEFAULT_RETRY_INTERVAL,
    DEFAULT_WAIT_TIMEOUT, RetryPolicy,
};
use std::time::Duration;

/// Default timeouts and retry counts for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Ceiling for DOM waits.
    pub wait_timeout: Duration,
    /// Ceiling for "check, don't wait" probes.
    pub probe_timeout: Duration,
    /// Sleep between poll attempts.
    pub poll_interval: Duration,
    /// Attempt count for count-bounded assertion polling.
    pub retries: u32,
    /// Sleep between count-bounded attempts.
    pub retry_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retries: DEFAULT_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl WaitConfig {
    /// Builds a config from the environment, falling back to the defaults
    /// field by field.
    ///
    /// Recognized variables: `VIGIL_WAIT_TIMEOUT_MS`, `VIGIL_PROBE_TIMEOUT_MS`,
    /// `VIGIL_POLL_INTERVAL_MS`, `VIGIL_RETRIES`, `VIGIL_RETRY_INTERVAL_MS`.
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(timeout) = env_millis("VIGIL_WAIT_TIMEOUT_MS") {
            config.wait_timeout = timeout;
        }
        if let Some(timeout) = env_millis("VIGIL_PROBE_TIMEOUT_MS") {
            config.probe_timeout = timeout;
        }
        if let Some(interval) = env_millis("VIGIL_POLL_INTERVAL_MS") {
            config.poll_interval = interval;
        }
        if let Some(retries) = env_u32("VIGIL_RETRIES") {
            config.retries = retries;
        }
        if let Some(interval) = env_millis("VIGIL_RETRY_INTERVAL_MS") {
            config.retry_interval = interval;
        }
        config
    }

    /// Policy for ordinary DOM waits.
    pub fn wait_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.wait_timeout,
            poll_interval: self.poll_interval,
        }
    }

    /// Policy for short visibility probes.
    pub fn probe_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.probe_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(%name, %raw, "ignoring unparsable duration override");
            None
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(%name, %raw, "ignoring unparsable count override");
            None
        }
    }
}
