// File: ./src/model/timer.rs
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Countdown timer driven by a caller-supplied monotonic clock.
#[derive(Debug, Clone)]
pub struct Countdown {
    total: Duration,
    remaining: Duration,
    state: TimerState,
    // Set while running: the instant the countdown reaches zero.
    deadline: Option<Instant>,
}

impl Countdown {
    /// Lengths beyond `u64::MAX` seconds saturate.
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        let secs = hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds);
        Self::from_duration(Duration::from_secs(secs))
    }

    pub fn from_duration(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
            state: TimerState::Idle,
            deadline: None,
        }
    }

    /// Parses `HH:MM:SS`, `MM:SS` or a plain number of seconds.
    /// Returns `None` for malformed input or a length that overflows.
    pub fn parse_hms(input: &str) -> Option<Duration> {
        let parts: Vec<u64> = input
            .trim()
            .split(':')
            .map(|p| p.parse::<u64>().ok())
            .collect::<Option<_>>()?;
        let secs = match parts.as_slice() {
            [s] => *s,
            [m, s] if *s < 60 => m.checked_mul(60)?.checked_add(*s)?,
            [h, m, s] if *m < 60 && *s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s)?,
            _ => return None,
        };
        Some(Duration::from_secs(secs))
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Starts or resumes. A zero-length countdown refuses to start.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Running => false,
            _ if self.total.is_zero() => false,
            TimerState::Finished => {
                self.remaining = self.total;
                self.run_from(now);
                true
            }
            TimerState::Idle | TimerState::Paused => {
                self.run_from(now);
                true
            }
        }
    }

    fn run_from(&mut self, now: Instant) {
        // A length too large for the clock never runs down.
        self.deadline = now.checked_add(self.remaining);
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state == TimerState::Running {
            self.remaining = self.remaining(now);
            self.deadline = None;
            self.state = TimerState::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.total;
        self.deadline = None;
        self.state = TimerState::Idle;
    }

    /// Advances the countdown. Returns true exactly once, on the tick that
    /// reaches zero.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.remaining = self.remaining(now);
        if self.remaining.is_zero() {
            self.deadline = None;
            self.state = TimerState::Finished;
            log::info!("Countdown of {} finished", format_hms(self.total));
            return true;
        }
        false
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match (self.state, self.deadline) {
            (TimerState::Running, Some(deadline)) => deadline.saturating_duration_since(now),
            (TimerState::Finished, _) => Duration::ZERO,
            _ => self.remaining,
        }
    }

    /// Remaining share of the total in whole percent; 100 before anything ran.
    pub fn progress_percent(&self, now: Instant) -> u8 {
        let total_ms = self.total.as_millis();
        if total_ms == 0 {
            return 100;
        }
        let pct = self.remaining(now).as_millis() * 100 / total_ms;
        pct.min(100) as u8
    }
}

/// `HH:MM:SS`, hours are not wrapped at 24.
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
