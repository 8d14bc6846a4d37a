//! Countdown timer bounding a puzzle session.

use crate::config::TimerConfig;

/// What happened during one timer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    /// The timer is not running.
    Idle,
    /// Time is still left.
    Running { remaining: f32 },
    /// Time ran out on this tick. Reported once.
    Expired,
}

/// Counts down from a fixed duration in frame time.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    duration: f32,
    remaining: f32,
    running: bool,
}

impl CountdownTimer {
    /// Create a stopped timer. Non-positive durations clamp to zero.
    pub fn new(duration_secs: f32) -> Self {
        let duration = duration_secs.max(0.0);
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn from_config(config: &TimerConfig) -> Self {
        Self::new(config.duration_secs)
    }

    /// Reset to the full duration and start counting.
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    /// Freeze the countdown where it is.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        !self.running && self.remaining <= 0.0
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TimerEvent {
        if !self.running {
            return TimerEvent::Idle;
        }
        if self.remaining > 0.0 {
            self.remaining -= dt;
            return TimerEvent::Running {
                remaining: self.remaining.max(0.0),
            };
        }
        self.remaining = 0.0;
        self.running = false;
        log::info!("Time's up");
        TimerEvent::Expired
    }

    /// Remaining time as `MM:SS`, both parts floored.
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}

/// Format seconds as `MM:SS` with floored minutes and seconds.
pub fn format_clock(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u32;
    let secs = (seconds % 60.0).floor() as u32;
    format!("{:02}:{:02}", minutes, secs)
}
