// ABOUTME: Bounded history of executed command kinds used to enforce spacing between commands
// ABOUTME: The oldest entry is overwritten once the ring is full

use crate::command::CommandType;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Remembers when recent commands of each kind were executed
#[derive(Debug, Clone)]
pub struct CommandTypeHistory {
    entries: VecDeque<(CommandType, Instant)>,
    capacity: usize,
}

impl CommandTypeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, command_type: CommandType) {
        self.record_at(command_type, Instant::now());
    }

    pub fn record_at(&mut self, command_type: CommandType, at: Instant) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((command_type, at));
    }

    /// How much longer a command of `command_type` has to wait
    pub fn remaining_required_delay(&self, command_type: CommandType) -> Duration {
        self.remaining_required_delay_at(command_type, Instant::now())
    }

    /// Largest outstanding delay over every remembered command, measured at `now`
    pub fn remaining_required_delay_at(&self, command_type: CommandType, now: Instant) -> Duration {
        self.entries
            .iter()
            .map(|&(previous, at)| {
                let required = command_type.required_delay_after(previous);
                required.saturating_sub(now.saturating_duration_since(at))
            })
            .max()
            .unwrap_or(Duration::ZERO)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_needs_no_delay() {
        let history = CommandTypeHistory::new(4);
        assert_eq!(
            history.remaining_required_delay(CommandType::SendSmsBody),
            Duration::ZERO
        );
    }

    #[test]
    fn test_body_after_body_waits() {
        let start = Instant::now();
        let mut history = CommandTypeHistory::new(4);
        history.record_at(CommandType::SendSmsBody, start);
        history.record_at(CommandType::SendSmsPrompt, start + Duration::from_millis(100));

        let now = start + Duration::from_millis(1000);
        assert_eq!(
            history.remaining_required_delay_at(CommandType::SendSmsBody, now),
            Duration::from_millis(2500)
        );
        assert_eq!(
            history.remaining_required_delay_at(CommandType::SendSmsPrompt, now),
            Duration::ZERO
        );

        let later = start + Duration::from_millis(4000);
        assert_eq!(
            history.remaining_required_delay_at(CommandType::SendSmsBody, later),
            Duration::ZERO
        );
    }

    #[test]
    fn test_ring_forgets_oldest() {
        let start = Instant::now();
        let mut history = CommandTypeHistory::new(2);
        history.record_at(CommandType::SendSmsBody, start);
        history.record_at(CommandType::SignalQuality, start);
        history.record_at(CommandType::SignalQuality, start);

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.remaining_required_delay_at(CommandType::SendSmsBody, start),
            Duration::ZERO
        );
    }
}
