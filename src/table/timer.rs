use std::time::Duration;
use tokio::time::Instant;

/// Deadline tracking for the per-decision clock.
///
/// Armed when an ActionRequest goes out, cleared when a legal action is
/// applied. Invalid frames leave the deadline running.
#[derive(Debug, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn start(&mut self, window: Duration) {
        self.deadline = Some(Instant::now() + window);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}
