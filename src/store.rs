// File: src/store.rs
use crate::model::Alarm;
use anyhow::{Result, bail};
use chrono::{DateTime, TimeZone};
use std::collections::HashSet;

/// An enabled alarm paired with the instant it fires next.
#[derive(Debug, Clone)]
pub struct ScheduledAlarm<Tz: TimeZone> {
    pub alarm: Alarm,
    pub trigger: DateTime<Tz>,
}

/// In-memory alarm list, kept ordered by time of day.
#[derive(Debug, Clone, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alarms(mut alarms: Vec<Alarm>) -> Self {
        let mut seen = HashSet::new();
        alarms.retain(|a| seen.insert(a.id.clone()));
        alarms.sort();
        Self { alarms }
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn into_alarms(self) -> Vec<Alarm> {
        self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Adds an alarm, replacing any existing one with the same id.
    pub fn add(&mut self, alarm: Alarm) {
        self.alarms.retain(|a| a.id != alarm.id);
        let pos = self.alarms.partition_point(|a| a < &alarm);
        self.alarms.insert(pos, alarm);
    }

    /// Replaces the alarm with the same id. Returns false if it is unknown.
    pub fn update(&mut self, alarm: Alarm) -> bool {
        if self.get(&alarm.id).is_none() {
            return false;
        }
        self.add(alarm);
        true
    }

    /// Applies the post-fire rule to the stored copy of `fired`, which wins over
    /// the scheduler's copy since it may have been edited meanwhile. Returns
    /// true when the stored alarm changed.
    pub fn record_fired(&mut self, fired: &Alarm) -> bool {
        let Some(mut alarm) = self.get(&fired.id).cloned() else {
            return false;
        };
        if alarm.after_fire() {
            return false;
        }
        self.update(alarm)
    }

    pub fn remove(&mut self, id: &str) -> Option<Alarm> {
        let idx = self.alarms.iter().position(|a| a.id == id)?;
        Some(self.alarms.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Option<Alarm> {
        let alarm = self.alarms.iter_mut().find(|a| a.id == id)?;
        alarm.enabled = enabled;
        Some(alarm.clone())
    }

    /// Resolves a unique id prefix, as typed on the command line.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Alarm> {
        if prefix.is_empty() {
            bail!("Empty alarm id");
        }
        let mut matches = self.alarms.iter().filter(|a| a.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(alarm), None) => Ok(alarm),
            (None, _) => bail!("No alarm with id starting with '{}'", prefix),
            (Some(_), Some(_)) => bail!("Alarm id prefix '{}' is ambiguous", prefix),
        }
    }

    /// Every enabled alarm with its next trigger, earliest first.
    pub fn schedule<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<ScheduledAlarm<Tz>> {
        let mut scheduled: Vec<_> = self
            .alarms
            .iter()
            .filter(|a| a.enabled)
            .map(|a| ScheduledAlarm {
                alarm: a.clone(),
                trigger: a.next_trigger(now),
            })
            .collect();
        scheduled.sort_by(|a, b| a.trigger.cmp(&b.trigger).then_with(|| a.alarm.cmp(&b.alarm)));
        scheduled
    }

    /// The enabled alarm that fires first after `now`.
    pub fn next_due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(&Alarm, DateTime<Tz>)> {
        self.alarms
            .iter()
            .filter(|a| a.enabled)
            .map(|a| (a, a.next_trigger(now)))
            .min_by(|(a1, t1), (a2, t2)| t1.cmp(t2).then_with(|| a1.cmp(a2)))
    }
}
