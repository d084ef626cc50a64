// ABOUTME: Configuration for the modem gateway session: address, heartbeat, reconnects and polling
// ABOUTME: Plain structs with defaults and chained setters, built once and handed to the session

use crate::macros::builder_setters;
use bytes::Bytes;
use std::time::Duration;

/// Keep-alive sentinel sent to the socket gateway
///
/// The gateway drops a client that has not sent the sentinel for 5 seconds,
/// so the period must stay comfortably below that.
///
/// # Example
///
/// ```rust
/// use sim_modem::session::HeartbeatConfig;
/// use std::time::Duration;
///
/// let config = HeartbeatConfig::new(Duration::from_millis(1500))
///     .with_sentinel(&b"<beat>"[..]);
/// assert_eq!(config.sentinel.as_ref(), b"<beat>");
///
/// assert!(!HeartbeatConfig::disabled().enabled);
/// ```
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Time between sentinels (default: 2 seconds)
    pub period: Duration,
    /// Bytes the gateway recognises as a heartbeat (default: `<heartbeat>`)
    pub sentinel: Bytes,
    pub enabled: bool,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(2000),
            sentinel: Bytes::from_static(b"<heartbeat>"),
            enabled: true,
        }
    }
}

impl HeartbeatConfig {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<Bytes>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Settings for a [`super::ModemSession`]
///
/// # Example
///
/// ```rust
/// use sim_modem::session::{HeartbeatConfig, SessionConfig};
/// use std::time::Duration;
///
/// let config = SessionConfig::new("10.0.0.5", 9000)
///     .with_reconnect_attempts(5)
///     .with_heartbeat(HeartbeatConfig::new(Duration::from_secs(1)));
///
/// assert_eq!(config.address(), "10.0.0.5:9000");
/// assert_eq!(config.history_capacity, 32);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub heartbeat: HeartbeatConfig,
    /// Connection attempts before a command is reported as unavailable
    pub reconnect_attempts: u32,
    /// Bound on a single connection attempt
    pub connect_timeout: Duration,
    /// Initial capacity of the response buffer
    pub read_buffer_size: usize,
    /// How long the session waits for new chains before polling for unsolicited data
    pub idle_poll_interval: Duration,
    /// Read timeout of the unsolicited data poll
    pub unsolicited_read_timeout: Duration,
    /// Executed command kinds remembered for spacing decisions
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            heartbeat: HeartbeatConfig::default(),
            reconnect_attempts: 3,
            connect_timeout: Duration::from_millis(3000),
            read_buffer_size: 1024,
            idle_poll_interval: Duration::from_millis(10),
            unsolicited_read_timeout: Duration::from_millis(1),
            history_capacity: 32,
        }
    }
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    builder_setters! {
        with_heartbeat => heartbeat: HeartbeatConfig,
        with_reconnect_attempts => reconnect_attempts: u32,
        with_connect_timeout => connect_timeout: Duration,
        with_read_buffer_size => read_buffer_size: usize,
        with_idle_poll_interval => idle_poll_interval: Duration,
        with_unsolicited_read_timeout => unsolicited_read_timeout: Duration,
        with_history_capacity => history_capacity: usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.reconnect_attempts, 3);
        assert_eq!(config.read_buffer_size, 1024);
        assert_eq!(config.idle_poll_interval, Duration::from_millis(10));
        assert_eq!(config.unsolicited_read_timeout, Duration::from_millis(1));
        assert_eq!(config.heartbeat.period, Duration::from_millis(2000));
        assert_eq!(config.heartbeat.sentinel.as_ref(), b"<heartbeat>");
        assert!(config.heartbeat.enabled);
    }

    #[test]
    fn test_setters() {
        let config = SessionConfig::new("modem.local", 7000)
            .with_reconnect_attempts(1)
            .with_history_capacity(4)
            .with_heartbeat(HeartbeatConfig::disabled());

        assert_eq!(config.host, "modem.local");
        assert_eq!(config.port, 7000);
        assert_eq!(config.reconnect_attempts, 1);
        assert_eq!(config.history_capacity, 4);
        assert!(!config.heartbeat.enabled);
    }
}
