// File: tests/logic_recurrence.rs
use chime::model::{Alarm, RecurrenceEngine, RepeatDays, next_trigger};
use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Timelike, Utc, Weekday};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn test_one_shot_already_passed_moves_to_tomorrow() {
    let now = utc(2024, 1, 1, 8, 0);
    let next = next_trigger(7, 0, &RepeatDays::none(), &now);
    assert_eq!(next, utc(2024, 1, 2, 7, 0));
}

#[test]
fn test_one_shot_later_today() {
    let now = utc(2024, 1, 1, 8, 0);
    let next = next_trigger(20, 0, &RepeatDays::none(), &now);
    assert_eq!(next, utc(2024, 1, 1, 20, 0));
}

#[test]
fn test_repeat_scan_starts_tomorrow_when_passed() {
    // 2024-01-01 is a Monday; 09:00 already passed.
    let now = utc(2024, 1, 1, 10, 0);
    assert_eq!(now.weekday(), Weekday::Mon);
    let mask = RepeatDays::from_days(&[1, 3, 5]);

    let next = next_trigger(9, 0, &mask, &now);
    assert_eq!(next, utc(2024, 1, 3, 9, 0));
    assert_eq!(next.weekday(), Weekday::Wed);
}

#[test]
fn test_repeat_today_when_not_passed() {
    let now = utc(2024, 1, 1, 8, 0);
    let mask = RepeatDays::from_days(&[1, 3, 5]);
    assert_eq!(next_trigger(9, 0, &mask, &now), utc(2024, 1, 1, 9, 0));
}

#[test]
fn test_repeat_only_today_passed_wraps_a_full_week() {
    let now = utc(2024, 1, 1, 10, 0);
    let mask = RepeatDays::from_days(&[1]);
    assert_eq!(next_trigger(9, 0, &mask, &now), utc(2024, 1, 8, 9, 0));
}

#[test]
fn test_repeat_wraps_from_saturday_to_sunday() {
    // 2024-01-06 is a Saturday.
    let now = utc(2024, 1, 6, 23, 0);
    assert_eq!(next_trigger(6, 30, &RepeatDays::weekend(), &now), utc(2024, 1, 7, 6, 30));
}

#[test]
fn test_equal_minute_counts_as_passed_for_one_shot() {
    // Inclusive-equal policy: an alarm for the current minute is not "now".
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 30).unwrap();
    assert_eq!(next_trigger(7, 0, &RepeatDays::none(), &now), utc(2024, 1, 2, 7, 0));

    let exactly = utc(2024, 1, 1, 7, 0);
    assert_eq!(next_trigger(7, 0, &RepeatDays::none(), &exactly), utc(2024, 1, 2, 7, 0));
}

#[test]
fn test_equal_minute_counts_as_passed_for_repeating() {
    let now = utc(2024, 1, 1, 7, 0);
    let next = next_trigger(7, 0, &RepeatDays::every_day(), &now);
    assert_eq!(next, utc(2024, 1, 2, 7, 0));
}

#[test]
fn test_next_minute_fires_today() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 6, 59, 59).unwrap();
    assert_eq!(next_trigger(7, 0, &RepeatDays::none(), &now), utc(2024, 1, 1, 7, 0));
}

#[test]
fn test_seconds_and_nanos_are_zeroed() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 5, 12, 43).unwrap() + Duration::milliseconds(517);
    let next = next_trigger(6, 0, &RepeatDays::none(), &now);
    assert_eq!(next.second(), 0);
    assert_eq!(next.nanosecond(), 0);
}

#[test]
fn test_month_and_year_rollover() {
    let now = utc(2024, 12, 31, 23, 30);
    assert_eq!(next_trigger(0, 15, &RepeatDays::none(), &now), utc(2025, 1, 1, 0, 15));
}

#[test]
fn test_leap_day() {
    let now = utc(2024, 2, 28, 12, 0);
    assert_eq!(next_trigger(8, 0, &RepeatDays::none(), &now), utc(2024, 2, 29, 8, 0));
}

#[test]
fn test_local_wall_clock_of_offset_zone() {
    // 23:30 at UTC+8 is still Monday locally even though UTC says 15:30.
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();
    let now = tz.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
    let mask = RepeatDays::from_days(&[2]);
    let next = next_trigger(7, 0, &mask, &now);
    assert_eq!(next, tz.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap());
}

#[test]
fn test_determinism() {
    let now = utc(2024, 3, 14, 15, 9);
    let mask = RepeatDays::from_days(&[0, 4]);
    let first = next_trigger(6, 30, &mask, &now);
    for _ in 0..10 {
        assert_eq!(next_trigger(6, 30, &mask, &now), first);
    }
}

#[test]
fn test_result_is_never_before_now() {
    let masks = [
        RepeatDays::none(),
        RepeatDays::every_day(),
        RepeatDays::weekdays(),
        RepeatDays::weekend(),
        RepeatDays::from_days(&[3]),
        RepeatDays::from_days(&[0, 2, 6]),
    ];
    let base = utc(2024, 1, 1, 0, 0);

    for mask in &masks {
        for step in 0..(7 * 24) {
            let now = base + Duration::minutes(step * 61);
            for (hour, minute) in [(0, 0), (6, 30), (12, 0), (now.hour(), now.minute()), (23, 59)] {
                let next = next_trigger(hour, minute, mask, &now);
                assert!(next > now, "{hour}:{minute} {mask:?} at {now} gave {next}");
                assert!(next - now <= Duration::days(7));
                assert_eq!((next.hour(), next.minute()), (hour, minute));
                if mask.any() {
                    let day = next.weekday().num_days_from_sunday() as usize;
                    assert!(mask.is_set(day));
                }
            }
        }
    }
}

#[test]
fn test_has_passed_today_boundary() {
    let now = utc(2024, 1, 1, 9, 30);
    assert!(RecurrenceEngine::has_passed_today(9, 30, &now));
    assert!(RecurrenceEngine::has_passed_today(8, 59, &now));
    assert!(!RecurrenceEngine::has_passed_today(9, 31, &now));
}

#[test]
fn test_alarm_delegates_to_engine() {
    let mut alarm = Alarm::new(9, 0).unwrap();
    alarm.repeat_days = RepeatDays::from_days(&[1, 3, 5]);
    let now = utc(2024, 1, 1, 10, 0);
    assert_eq!(alarm.next_trigger(&now), utc(2024, 1, 3, 9, 0));
}

#[test]
fn test_time_in_spring_forward_gap_moves_to_first_valid_minute() {
    use chrono_tz::Europe::Berlin;
    // Clocks jump from 02:00 to 03:00 on 2024-03-31.
    let now = Berlin.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap();
    let next = next_trigger(2, 30, &RepeatDays::none(), &now);
    assert_eq!(next, Berlin.with_ymd_and_hms(2024, 3, 31, 3, 0, 0).unwrap());
    assert_eq!(next.with_timezone(&Utc), utc(2024, 3, 31, 1, 0));
}

#[test]
fn test_weekly_alarm_landing_in_gap_still_fires_that_day() {
    use chrono_tz::Europe::Berlin;
    let sunday = RepeatDays::from_days(&[0]);
    let now = Berlin.with_ymd_and_hms(2024, 3, 30, 10, 0, 0).unwrap();
    let next = next_trigger(2, 15, &sunday, &now);
    assert_eq!(next, Berlin.with_ymd_and_hms(2024, 3, 31, 3, 0, 0).unwrap());
}

#[test]
fn test_ambiguous_fall_back_time_takes_earlier_instant() {
    use chrono_tz::Europe::Berlin;
    // 02:00-03:00 occurs twice on 2024-10-27 (first at +02:00, then +01:00).
    let now = Berlin.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap();
    let next = next_trigger(2, 30, &RepeatDays::none(), &now);
    assert_eq!(next.with_timezone(&Utc), utc(2024, 10, 27, 0, 30));
    assert_eq!((next.hour(), next.minute()), (2, 30));
}
