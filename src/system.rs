// File: ./src/system.rs
use crate::model::Alarm;
use chrono::{DateTime, Local, TimeDelta, TimeZone};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, sleep_until};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmMessage {
    /// The alarm reached its trigger instant.
    Fire(Alarm),
    /// The trigger passed longer ago than the grace window (e.g. the machine
    /// was asleep). Not rung, but reported so one-shots can be switched off.
    Missed(Alarm),
}

impl AlarmMessage {
    pub fn alarm(&self) -> &Alarm {
        match self {
            AlarmMessage::Fire(a) | AlarmMessage::Missed(a) => a,
        }
    }
}

#[derive(Debug, Clone)]
struct ArmedAlarm<Tz: TimeZone> {
    alarm: Alarm,
    trigger: DateTime<Tz>,
}

/// The set of armed alarms the scheduler waits on.
#[derive(Debug, Clone)]
pub struct AlarmQueue<Tz: TimeZone> {
    armed: Vec<ArmedAlarm<Tz>>,
    grace: TimeDelta,
}

impl<Tz: TimeZone> AlarmQueue<Tz> {
    pub fn new(grace: TimeDelta) -> Self {
        Self {
            armed: Vec::new(),
            grace,
        }
    }

    /// Replaces the armed set with the enabled alarms of `alarms`.
    ///
    /// An alarm that is already armed with the same time and repeat mask keeps
    /// its pending trigger, so reloading the list never skips a due alarm.
    pub fn arm(&mut self, alarms: Vec<Alarm>, now: &DateTime<Tz>) {
        let previous = std::mem::take(&mut self.armed);
        self.armed = alarms
            .into_iter()
            .filter(|a| a.enabled)
            .map(|alarm| {
                let trigger = previous
                    .iter()
                    .find(|p| {
                        p.alarm.id == alarm.id
                            && (p.alarm.hour, p.alarm.minute) == (alarm.hour, alarm.minute)
                            && p.alarm.repeat_days == alarm.repeat_days
                    })
                    .map(|p| p.trigger.clone())
                    .unwrap_or_else(|| alarm.next_trigger(now));
                ArmedAlarm { alarm, trigger }
            })
            .collect();
        log::debug!("Armed {} alarm(s)", self.armed.len());
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn next_wake(&self) -> Option<DateTime<Tz>> {
        self.armed.iter().map(|a| a.trigger.clone()).min()
    }

    /// Removes every alarm whose trigger is at or before `now` and reports it.
    /// Repeating alarms are re-armed for their next occurrence after `now`.
    pub fn take_due(&mut self, now: &DateTime<Tz>) -> Vec<AlarmMessage> {
        let mut messages = Vec::new();
        let mut still_armed = Vec::with_capacity(self.armed.len());

        for entry in self.armed.drain(..) {
            if entry.trigger > *now {
                still_armed.push(entry);
                continue;
            }

            let late_by = now.clone().signed_duration_since(entry.trigger.clone());
            if late_by <= self.grace {
                log::info!("Alarm {} ({}) fired", entry.alarm.id, entry.alarm.time_string());
                messages.push(AlarmMessage::Fire(entry.alarm.clone()));
            } else {
                log::warn!(
                    "Alarm {} missed by {} min, skipping",
                    entry.alarm.id,
                    late_by.num_minutes()
                );
                messages.push(AlarmMessage::Missed(entry.alarm.clone()));
            }

            if entry.alarm.is_repeating() {
                still_armed.push(ArmedAlarm {
                    trigger: entry.alarm.next_trigger(now),
                    alarm: entry.alarm,
                });
            }
        }

        self.armed = still_armed;
        messages
    }
}

/// Spawns the background alarm scheduler.
/// Returns a sender used to replace the alarm list; dropping it stops the actor.
pub fn spawn_alarm_actor(
    ui_sender: mpsc::Sender<AlarmMessage>,
    grace: TimeDelta,
) -> mpsc::Sender<Vec<Alarm>> {
    let (tx, mut rx) = mpsc::channel::<Vec<Alarm>>(10);

    tokio::spawn(async move {
        let mut queue: AlarmQueue<Local> = AlarmQueue::new(grace);

        loop {
            for msg in queue.take_due(&Local::now()) {
                if ui_sender.send(msg).await.is_err() {
                    log::debug!("Alarm receiver dropped, stopping scheduler");
                    return;
                }
            }

            if let Some(wake_at) = queue.next_wake() {
                let millis = (wake_at - Local::now()).num_milliseconds().max(0) as u64;
                let deadline = Instant::now() + Duration::from_millis(millis);

                tokio::select! {
                    _ = sleep_until(deadline) => {
                        // Loop recycles and fires whatever is due.
                    }
                    update = rx.recv() => match update {
                        Some(alarms) => queue.arm(alarms, &Local::now()),
                        None => break,
                    }
                }
            } else {
                // Nothing armed: wait for a new list.
                match rx.recv().await {
                    Some(alarms) => queue.arm(alarms, &Local::now()),
                    None => break,
                }
            }
        }
        log::debug!("Alarm scheduler stopped");
    });

    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepeatDays;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_one_shot_fires_once_then_drops() {
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![Alarm::new(9, 0).unwrap()], &at(8, 0));
        assert_eq!(queue.next_wake(), Some(at(9, 0)));

        assert!(queue.take_due(&at(8, 59)).is_empty());
        let fired = queue.take_due(&at(9, 0));
        assert!(matches!(fired.as_slice(), [AlarmMessage::Fire(_)]));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_repeating_alarm_is_rearmed() {
        let mut daily = Alarm::new(9, 0).unwrap();
        daily.repeat_days = RepeatDays::every_day();
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![daily], &at(8, 0));

        assert_eq!(queue.take_due(&at(9, 0)).len(), 1);
        assert_eq!(
            queue.next_wake(),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_stale_trigger_is_reported_as_missed() {
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![Alarm::new(9, 0).unwrap()], &at(8, 0));
        let msgs = queue.take_due(&at(11, 0));
        assert!(matches!(msgs.as_slice(), [AlarmMessage::Missed(_)]));
    }

    #[test]
    fn test_rearming_keeps_pending_trigger_of_unchanged_alarm() {
        let alarm = Alarm::new(9, 0).unwrap();
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![alarm.clone()], &at(8, 0));

        // The list is reloaded during the alarm's own minute before it fired.
        let added = Alarm::new(9, 30).unwrap();
        queue.arm(vec![alarm.clone(), added], &at(9, 0));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next_wake(), Some(at(9, 0)));
        assert!(matches!(
            queue.take_due(&at(9, 0)).as_slice(),
            [AlarmMessage::Fire(a)] if a.id == alarm.id
        ));
        assert_eq!(queue.next_wake(), Some(at(9, 30)));
    }

    #[test]
    fn test_rearming_an_edited_alarm_recomputes_trigger() {
        let mut alarm = Alarm::new(9, 0).unwrap();
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![alarm.clone()], &at(8, 0));

        alarm.minute = 15;
        queue.arm(vec![alarm], &at(8, 30));
        assert_eq!(queue.next_wake(), Some(at(9, 15)));
    }

    #[test]
    fn test_disabled_alarms_are_not_armed() {
        let mut alarm = Alarm::new(9, 0).unwrap();
        alarm.enabled = false;
        let mut queue = AlarmQueue::new(TimeDelta::minutes(10));
        queue.arm(vec![alarm], &at(8, 0));
        assert!(queue.next_wake().is_none());
    }
}
