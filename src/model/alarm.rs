// File: ./src/model/alarm.rs
use crate::model::parser::AlarmCommand;
use crate::model::recurrence::RecurrenceEngine;
use crate::model::repeat::RepeatDays;
use anyhow::{Result, bail};
use chrono::{DateTime, Duration, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

fn default_uid() -> String {
    Uuid::new_v4().to_string()
}
fn default_true() -> bool {
    true
}
fn default_snooze() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(default = "default_uid")]
    pub id: String,
    pub hour: u32,
    pub minute: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub repeat_days: RepeatDays,
    #[serde(default = "default_true")]
    pub vibrate: bool,
    #[serde(default)]
    pub sound_uri: String,
    #[serde(default = "default_snooze")]
    pub snooze_minutes: u32,
}

impl Alarm {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        Self::validate_time(hour, minute)?;
        Ok(Self {
            id: default_uid(),
            hour,
            minute,
            enabled: true,
            label: String::new(),
            repeat_days: RepeatDays::none(),
            vibrate: true,
            sound_uri: String::new(),
            snooze_minutes: default_snooze(),
        })
    }

    pub fn from_command(cmd: &AlarmCommand) -> Result<Self> {
        let mut alarm = Self::new(cmd.hour, cmd.minute)?;
        alarm.repeat_days = cmd.repeat_days;
        alarm.label = cmd.label.clone();
        Ok(alarm)
    }

    pub fn validate_time(hour: u32, minute: u32) -> Result<()> {
        if hour > 23 {
            bail!("Hour out of range (0-23): {}", hour);
        }
        if minute > 59 {
            bail!("Minute out of range (0-59): {}", minute);
        }
        Ok(())
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat_days.any()
    }

    pub fn next_trigger<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        RecurrenceEngine::next_trigger(self.hour, self.minute, &self.repeat_days, now)
    }

    /// Copy of this alarm moved to `now + snooze_minutes`.
    /// Keeps the id so the snoozed copy replaces the original in storage.
    pub fn snoozed<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Self {
        let at = now.clone() + Duration::minutes(i64::from(self.snooze_minutes));
        let mut next = self.clone();
        next.hour = at.hour();
        next.minute = at.minute();
        next.enabled = true;
        next
    }

    /// Applies the post-fire rule: one-shot alarms switch themselves off.
    /// Returns true when the alarm has to be armed again.
    pub fn after_fire(&mut self) -> bool {
        if !self.is_repeating() {
            self.enabled = false;
        }
        self.enabled
    }

    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Alarm {}

impl PartialOrd for Alarm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// List order: by time of day, id breaks ties.
impl Ord for Alarm {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.hour, self.minute, &self.id).cmp(&(other.hour, other.minute, &other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_rejects_invalid_time() {
        assert!(Alarm::new(24, 0).is_err());
        assert!(Alarm::new(0, 60).is_err());
        assert!(Alarm::new(23, 59).is_ok());
    }

    #[test]
    fn test_snooze_wraps_past_midnight() {
        let mut alarm = Alarm::new(23, 58).unwrap();
        alarm.snooze_minutes = 5;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 58, 10).unwrap();
        let snoozed = alarm.snoozed(&now);
        assert_eq!((snoozed.hour, snoozed.minute), (0, 3));
        assert_eq!(snoozed.id, alarm.id);
    }

    #[test]
    fn test_after_fire_disables_one_shot() {
        let mut once = Alarm::new(7, 0).unwrap();
        assert!(!once.after_fire());
        assert!(!once.enabled);

        let mut daily = Alarm::new(7, 0).unwrap();
        daily.repeat_days = RepeatDays::every_day();
        assert!(daily.after_fire());
        assert!(daily.enabled);
    }
}
