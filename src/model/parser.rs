// File: src/model/parser.rs
//! Voice command parser.
//!
//! Turns a dictated sentence such as `每天早上7点半叫我起床` into an
//! [`AlarmCommand`]. Rules are tried in a fixed order and the first match wins,
//! so pattern order in the tables below is significant.
use crate::model::repeat::RepeatDays;
use once_cell::sync::Lazy;
use regex::Regex;

/// Words that mark a sentence as an alarm request (alarm, remind, call me, wake me, get up).
const ALARM_KEYWORDS: [&str; 5] = ["闹钟", "提醒", "叫我", "叫醒", "起床"];

/// A label containing any of these still carries time information and is rejected.
const TIME_KEYWORDS: [&str; 8] = ["点", "分", "时", "早上", "晚上", "下午", "上午", "凌晨"];

const PM_PERIODS: [&str; 4] = ["下午", "晚上", "傍晚", "晚间"];
const AM_PERIODS: [&str; 4] = ["上午", "早上", "早晨", "凌晨"];

/// Synonyms per weekday, Sunday first.
const DAY_SYNONYMS: [&[&str]; 7] = [
    &["周日", "星期日", "礼拜日", "周天", "星期天"],
    &["周一", "星期一", "礼拜一"],
    &["周二", "星期二", "礼拜二"],
    &["周三", "星期三", "礼拜三"],
    &["周四", "星期四", "礼拜四"],
    &["周五", "星期五", "礼拜五"],
    &["周六", "星期六", "礼拜六"],
];

static HOUR_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        compile(r"(上午|早上|早晨|凌晨|中午|下午|晚上|傍晚|晚间)?([0-9]+)点"),
        compile(r"(上午|早上|早晨|凌晨|中午|下午|晚上|傍晚|晚间)?([0-9]+)时"),
    ]
});

enum MinuteRule {
    Explicit(Regex),
    Half(Regex),
}

static MINUTE_RULES: Lazy<[MinuteRule; 3]> = Lazy::new(|| {
    [
        MinuteRule::Explicit(compile(r"([0-9]+)点([0-9]+)分")),
        MinuteRule::Explicit(compile(r"([0-9]+)时([0-9]+)分")),
        MinuteRule::Half(compile(r"([0-9]+)点半")),
    ]
});

static LABEL_PATTERNS: Lazy<[Regex; 3]> =
    Lazy::new(|| [compile(r"提醒我(.+)"), compile(r"闹钟(.+)"), compile(r"叫我(.+)")]);

// Patterns are literals, so a failure here is a programming error caught by the tests.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Structured result of a parsed alarm sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmCommand {
    pub hour: u32,
    pub minute: u32,
    pub repeat_days: RepeatDays,
    pub label: String,
}

impl Default for AlarmCommand {
    fn default() -> Self {
        Self {
            hour: 8,
            minute: 0,
            repeat_days: RepeatDays::none(),
            label: String::new(),
        }
    }
}

/// Parses a transcript into an alarm command.
///
/// Returns `None` only when the text carries no alarm keyword. Everything else
/// yields a command, with unmatched fields left at their defaults.
pub fn parse_command(text: &str) -> Option<AlarmCommand> {
    if !contains_alarm_keyword(text) {
        log::debug!("No alarm keyword in '{}'", text);
        return None;
    }

    let mut cmd = AlarmCommand::default();
    if let Some(hour) = parse_hour(text) {
        cmd.hour = hour;
    }
    if let Some(minute) = parse_minute(text) {
        cmd.minute = minute;
    }
    cmd.repeat_days = parse_repeat_days(text);
    if let Some(label) = parse_label(text) {
        cmd.label = label;
    }

    log::debug!(
        "Parsed '{}' -> {:02}:{:02} [{}] '{}'",
        text,
        cmd.hour,
        cmd.minute,
        cmd.repeat_days.to_bits(),
        cmd.label
    );
    Some(cmd)
}

pub fn contains_alarm_keyword(text: &str) -> bool {
    ALARM_KEYWORDS.iter().any(|k| text.contains(k))
}

pub fn contains_time_keyword(text: &str) -> bool {
    TIME_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Hour in 24h form, from the `点` pattern or else the `时` pattern.
/// A number that overflows or lands above 23 after the period shift counts as
/// no match for that pattern, and the next pattern is tried.
fn parse_hour(text: &str) -> Option<u32> {
    for re in HOUR_PATTERNS.iter() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let period = caps.get(1).map_or("", |m| m.as_str());
        let Some(raw) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };

        let hour = if PM_PERIODS.contains(&period) && raw < 12 {
            raw + 12
        } else if AM_PERIODS.contains(&period) && raw == 12 {
            0
        } else {
            raw
        };

        if hour <= 23 {
            return Some(hour);
        }
    }
    None
}

fn parse_minute(text: &str) -> Option<u32> {
    for rule in MINUTE_RULES.iter() {
        match rule {
            MinuteRule::Explicit(re) => {
                if let Some(minute) = re
                    .captures(text)
                    .and_then(|caps| caps.get(2))
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                    && minute <= 59
                {
                    return Some(minute);
                }
            }
            MinuteRule::Half(re) => {
                if re.is_match(text) {
                    return Some(30);
                }
            }
        }
    }
    None
}

fn parse_repeat_days(text: &str) -> RepeatDays {
    if text.contains("每天") {
        return RepeatDays::every_day();
    }
    if text.contains("工作日") || text.contains("周一到周五") {
        return RepeatDays::weekdays();
    }
    if text.contains("周末") {
        return RepeatDays::weekend();
    }

    let mut mask = RepeatDays::none();
    for (day, synonyms) in DAY_SYNONYMS.iter().enumerate() {
        if synonyms.iter().any(|s| text.contains(s)) {
            mask.set(day, true);
        }
    }
    mask
}

fn parse_label(text: &str) -> Option<String> {
    LABEL_PATTERNS.iter().find_map(|re| {
        let label = re.captures(text)?.get(1)?.as_str().trim();
        (!label.is_empty() && !contains_time_keyword(label)).then(|| label.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_patterns_compile() {
        Lazy::force(&HOUR_PATTERNS);
        Lazy::force(&MINUTE_RULES);
        Lazy::force(&LABEL_PATTERNS);
    }

    #[test]
    fn test_dian_pattern_wins_over_shi_pattern() {
        // "时" appears first in the text, but the "点" pattern is tried first.
        assert_eq!(parse_hour("9时或者10点"), Some(10));
    }

    #[test]
    fn test_overflowing_hour_is_ignored() {
        assert_eq!(parse_hour("99999999999点"), None);
        assert_eq!(parse_hour("25点"), None);
    }

    #[test]
    fn test_out_of_range_dian_hour_falls_through_to_shi() {
        assert_eq!(parse_hour("25点或者7时"), Some(7));
        assert_eq!(parse_hour("晚上25点 下午3时"), Some(15));
    }

    #[test]
    fn test_noon_keeps_hour() {
        assert_eq!(parse_hour("中午12点"), Some(12));
        assert_eq!(parse_hour("凌晨12点"), Some(0));
        assert_eq!(parse_hour("晚上12点"), Some(12));
    }

    #[test]
    fn test_label_skips_candidates_with_time_words() {
        // "提醒我" capture holds a time word; the "闹钟" capture is clean.
        assert_eq!(parse_label("提醒我8点 闹钟 喝水"), Some("喝水".to_string()));
    }
}
