// ABOUTME: Tracks when the next heartbeat sentinel is due and how sending them has gone
// ABOUTME: Polling model: the session asks when a beat is due and reports back after writing it

use super::config::HeartbeatConfig;
use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Snapshot of heartbeat activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatStatus {
    pub running: bool,
    pub total_beats: u32,
    /// Reset by the next beat that is written successfully
    pub consecutive_failures: u32,
}

/// Decides when the session owes the gateway a heartbeat
///
/// The session calls [`HeartbeatManager::next_due`] to know how long it may
/// block, then reports the outcome of writing the sentinel through
/// [`HeartbeatManager::on_beat_sent`] or [`HeartbeatManager::on_beat_failure`]. A failed
/// beat is not retried before the next period elapses.
///
/// ```rust
/// use sim_modem::session::{HeartbeatConfig, HeartbeatManager};
///
/// let mut manager = HeartbeatManager::new(HeartbeatConfig::default());
/// assert!(manager.should_beat());
///
/// manager.on_beat_sent();
/// assert!(!manager.should_beat());
/// assert_eq!(manager.status().total_beats, 1);
/// ```
#[derive(Debug)]
pub struct HeartbeatManager {
    config: HeartbeatConfig,
    last_beat: Option<Instant>,
    total_beats: u32,
    consecutive_failures: u32,
}

impl HeartbeatManager {
    pub fn new(config: HeartbeatConfig) -> Self {
        Self {
            config,
            last_beat: None,
            total_beats: 0,
            consecutive_failures: 0,
        }
    }

    /// When the next beat must be written, `None` while disabled
    pub fn next_due(&self) -> Option<Instant> {
        if !self.config.enabled {
            return None;
        }

        Some(match self.last_beat {
            None => Instant::now(),
            Some(last) => last + self.config.period,
        })
    }

    pub fn should_beat(&self) -> bool {
        self.next_due().is_some_and(|due| due <= Instant::now())
    }

    pub fn on_beat_sent(&mut self) {
        self.last_beat = Some(Instant::now());
        self.total_beats += 1;
        self.consecutive_failures = 0;
        debug!("Heartbeat sent (total: {})", self.total_beats);
    }

    pub fn on_beat_failure(&mut self) {
        self.last_beat = Some(Instant::now());
        self.consecutive_failures += 1;
        warn!(
            "Heartbeat failed (consecutive failures: {})",
            self.consecutive_failures
        );
    }

    pub fn sentinel(&self) -> &Bytes {
        &self.config.sentinel
    }

    pub fn status(&self) -> HeartbeatStatus {
        HeartbeatStatus {
            running: self.config.enabled,
            total_beats: self.total_beats,
            consecutive_failures: self.consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_disabled_never_due() {
        let manager = HeartbeatManager::new(HeartbeatConfig::disabled());
        assert_eq!(manager.next_due(), None);
        assert!(!manager.should_beat());
        assert!(!manager.status().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_due_after_period() {
        let mut manager = HeartbeatManager::new(HeartbeatConfig::new(Duration::from_millis(100)));
        assert!(manager.should_beat());

        manager.on_beat_sent();
        assert!(!manager.should_beat());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(!manager.should_beat());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(manager.should_beat());
    }

    #[test]
    fn test_failure_tracking() {
        let mut manager = HeartbeatManager::new(HeartbeatConfig::default());
        manager.on_beat_sent();
        manager.on_beat_failure();
        manager.on_beat_failure();
        assert_eq!(manager.status().consecutive_failures, 2);

        manager.on_beat_sent();
        assert_eq!(
            manager.status(),
            HeartbeatStatus {
                running: true,
                total_beats: 2,
                consecutive_failures: 0,
            }
        );
    }
}
