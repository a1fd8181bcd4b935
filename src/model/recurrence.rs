// File: ./src/model/recurrence.rs
use crate::model::repeat::RepeatDays;
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike};

/// Longest DST gap we step over when the wall-clock target does not exist.
const MAX_GAP_MINUTES: i64 = 180;

pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Calculates the next instant an alarm set for `hour:minute` should fire.
    ///
    /// One-shot alarms (empty mask) fire today, or tomorrow once today's slot has
    /// passed. Repeating alarms fire on the first set weekday, starting today
    /// unless today's slot has passed.
    ///
    /// A slot whose hour and minute equal `now`'s counts as passed, so an alarm
    /// re-armed during its own minute moves to the next occurrence.
    ///
    /// Hours above 23 and minutes above 59 are clamped.
    pub fn next_trigger<Tz: TimeZone>(
        hour: u32,
        minute: u32,
        repeat: &RepeatDays,
        now: &DateTime<Tz>,
    ) -> DateTime<Tz> {
        let hour = hour.min(23);
        let minute = minute.min(59);
        let passed = Self::has_passed_today(hour, minute, now);

        let days_to_add = if !repeat.any() {
            usize::from(passed)
        } else {
            let today = now.weekday().num_days_from_sunday() as usize;
            let mut days = usize::from(passed);
            for _ in 0..7 {
                if repeat.is_set(today + days) {
                    break;
                }
                days += 1;
            }
            days
        };

        let date = now.date_naive() + Duration::days(days_to_add as i64);
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
        Self::resolve_local(&now.timezone(), date.and_time(time))
    }

    /// True when `hour:minute` is at or before `now`'s wall-clock minute.
    pub fn has_passed_today<Tz: TimeZone>(hour: u32, minute: u32, now: &DateTime<Tz>) -> bool {
        hour < now.hour() || (hour == now.hour() && minute <= now.minute())
    }

    /// Maps a wall-clock time into `tz`. Ambiguous times take the earlier instant;
    /// times inside a DST gap move forward to the first valid minute.
    fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                for step in 1..=MAX_GAP_MINUTES {
                    if let Some(dt) = tz
                        .from_local_datetime(&(naive + Duration::minutes(step)))
                        .earliest()
                    {
                        return dt;
                    }
                }
                log::warn!("No valid local time near {}, treating it as UTC", naive);
                tz.from_utc_datetime(&naive)
            }
        }
    }
}
