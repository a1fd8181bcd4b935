// File: ./src/model/repeat.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Display language for user-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum Language {
    English,
    #[default]
    Chinese,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Chinese => write!(f, "中文"),
        }
    }
}

const DAY_NAMES_EN: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const DAY_NAMES_ZH: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

/// Weekly repeat mask, indexed Sunday (0) through Saturday (6).
/// An empty mask means the alarm fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RepeatDays([bool; 7]);

impl RepeatDays {
    pub const SUNDAY: usize = 0;
    pub const SATURDAY: usize = 6;

    pub fn none() -> Self {
        Self([false; 7])
    }

    pub fn every_day() -> Self {
        Self([true; 7])
    }

    pub fn weekdays() -> Self {
        Self([false, true, true, true, true, true, false])
    }

    pub fn weekend() -> Self {
        Self([true, false, false, false, false, false, true])
    }

    pub fn from_days(days: &[usize]) -> Self {
        let mut mask = Self::none();
        for &d in days {
            mask.set(d, true);
        }
        mask
    }

    /// Out-of-range indices wrap modulo 7.
    pub fn is_set(&self, day: usize) -> bool {
        self.0[day % 7]
    }

    pub fn set(&mut self, day: usize, on: bool) {
        self.0[day % 7] = on;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|d| *d)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|d| **d).count()
    }

    pub fn as_array(&self) -> [bool; 7] {
        self.0
    }

    /// Indices of the set days, Sunday first.
    pub fn days(&self) -> impl Iterator<Item = usize> + '_ {
        (0..7).filter(move |&i| self.0[i])
    }

    pub fn describe(&self) -> String {
        self.describe_in(Language::English)
    }

    pub fn describe_in(&self, lang: Language) -> String {
        let (every_day, weekdays, weekend, once, names) = match lang {
            Language::English => ("every day", "weekdays", "weekend", "once", &DAY_NAMES_EN),
            Language::Chinese => ("每天", "工作日", "周末", "仅一次", &DAY_NAMES_ZH),
        };

        if *self == Self::every_day() {
            return every_day.to_string();
        }
        if *self == Self::weekdays() {
            return weekdays.to_string();
        }
        if *self == Self::weekend() {
            return weekend.to_string();
        }
        if !self.any() {
            return once.to_string();
        }

        self.days()
            .map(|i| names[i])
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Compact form used on the command line: `0101010`, Sunday first.
    pub fn to_bits(&self) -> String {
        self.0.iter().map(|d| if *d { '1' } else { '0' }).collect()
    }

    /// Accepts the `to_bits` form, or one of `daily`, `weekdays`, `weekend`, `once`,
    /// or a comma list of short English names (`mon,wed,fri`).
    pub fn parse_cli(input: &str) -> Option<Self> {
        let s = input.trim().to_lowercase();
        match s.as_str() {
            "daily" | "everyday" => return Some(Self::every_day()),
            "weekdays" => return Some(Self::weekdays()),
            "weekend" => return Some(Self::weekend()),
            "once" | "" => return Some(Self::none()),
            _ => {}
        }

        if s.len() == 7 && s.chars().all(|c| c == '0' || c == '1') {
            let mut mask = Self::none();
            for (i, c) in s.chars().enumerate() {
                mask.set(i, c == '1');
            }
            return Some(mask);
        }

        let mut mask = Self::none();
        for part in s.split(',') {
            let idx = match part.trim() {
                "su" | "sun" | "sunday" => 0,
                "mo" | "mon" | "monday" => 1,
                "tu" | "tue" | "tuesday" => 2,
                "we" | "wed" | "wednesday" => 3,
                "th" | "thu" | "thursday" => 4,
                "fr" | "fri" | "friday" => 5,
                "sa" | "sat" | "saturday" => 6,
                _ => return None,
            };
            mask.set(idx, true);
        }
        Some(mask)
    }
}

impl From<[bool; 7]> for RepeatDays {
    fn from(days: [bool; 7]) -> Self {
        Self(days)
    }
}

impl fmt::Display for RepeatDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_days_are_joined_in_index_order() {
        let mask = RepeatDays::from_days(&[5, 1, 3]);
        assert_eq!(mask.describe(), "Monday, Wednesday, Friday");
        assert_eq!(mask.describe_in(Language::Chinese), "周一, 周三, 周五");
    }

    #[test]
    fn test_weekdays_plus_saturday_is_not_weekdays() {
        let mask = RepeatDays::from_days(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            mask.describe(),
            "Monday, Tuesday, Wednesday, Thursday, Friday, Saturday"
        );
    }

    #[test]
    fn test_parse_cli_forms() {
        assert_eq!(RepeatDays::parse_cli("daily"), Some(RepeatDays::every_day()));
        assert_eq!(
            RepeatDays::parse_cli("0111110"),
            Some(RepeatDays::weekdays())
        );
        assert_eq!(
            RepeatDays::parse_cli("mon,wed,fri"),
            Some(RepeatDays::from_days(&[1, 3, 5]))
        );
        assert_eq!(RepeatDays::parse_cli("someday"), None);
    }
}
