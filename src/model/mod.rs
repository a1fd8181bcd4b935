// File: ./src/model/mod.rs
pub mod alarm;
pub mod parser;
pub mod recurrence;
pub mod repeat;
pub mod timer;

pub use alarm::Alarm;
pub use parser::{AlarmCommand, parse_command};
pub use recurrence::RecurrenceEngine;
pub use repeat::{Language, RepeatDays};
pub use timer::{Countdown, TimerState, format_hms};

use chrono::{DateTime, TimeZone};

/// Next trigger instant for an alarm at `hour:minute` repeating on `repeat`.
/// See [`RecurrenceEngine::next_trigger`].
pub fn next_trigger<Tz: TimeZone>(
    hour: u32,
    minute: u32,
    repeat: &RepeatDays,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    RecurrenceEngine::next_trigger(hour, minute, repeat, now)
}
