//! Day/time conflict predicates
//!
//! Day strings are concatenations of fixed two-character tokens ("MoWeFr").
//! Times are "HH:MM" 24-hour strings; anything that cannot be read becomes
//! `None` and is treated conservatively by [`overlaps`].

use crate::core::models::{Section, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How forgiving time-of-day parsing is. Fixed when a builder is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePolicy {
    /// Only `H:MM` / `HH:MM` on a 24-hour clock
    Strict,
    /// Also `HH:MM:SS`, `h:mm am`, `h pm`, surrounding whitespace
    #[default]
    Lenient,
}

impl FromStr for TimePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" | "" => Ok(Self::Lenient),
            other => Err(format!("Unknown time policy: '{other}'")),
        }
    }
}

impl fmt::Display for TimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        })
    }
}

/// A validated time of day, stored as minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Build from a 24-hour hour and minute; `None` when out of range
    #[must_use]
    pub const fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Minutes since midnight
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        time_to_minutes(&raw, TimePolicy::Strict)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: '{raw}'")))
    }
}

/// Parse a day-token string into weekday codes
///
/// The string is consumed in two-character chunks; a trailing partial chunk
/// and unknown tokens (e.g. "TB" from "TBA") are discarded.
#[must_use]
pub fn parse_days(tokens: &str) -> BTreeSet<Weekday> {
    let chars: Vec<char> = tokens.trim().chars().collect();
    chars
        .chunks_exact(2)
        .filter_map(|pair| {
            let token: String = pair.iter().collect();
            Weekday::from_code(&token)
        })
        .collect()
}

/// Convert a time-of-day string to minutes since midnight
///
/// Never fails: blank, "TBA", "nan" and malformed input yield `None`.
#[must_use]
pub fn time_to_minutes(text: &str, policy: TimePolicy) -> Option<u32> {
    match policy {
        TimePolicy::Strict => parse_strict(text),
        TimePolicy::Lenient => parse_lenient(text),
    }
}

fn parse_strict(text: &str) -> Option<u32> {
    let (hour, minute) = text.split_once(':')?;
    let valid_hour = (1..=2).contains(&hour.len()) && hour.bytes().all(|b| b.is_ascii_digit());
    let valid_minute = minute.len() == 2 && minute.bytes().all(|b| b.is_ascii_digit());
    if !valid_hour || !valid_minute {
        return None;
    }
    ClockTime::from_hm(hour.parse().ok()?, minute.parse().ok()?).map(ClockTime::minutes)
}

fn parse_lenient(text: &str) -> Option<u32> {
    let lowered = text.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let (clock, meridiem) = if let Some(rest) = lowered.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = lowered.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else {
        (lowered.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour_part = parts.next()?;
    let minute_part = parts.next();
    let second_part = parts.next();
    if parts.next().is_some() || second_part.is_some_and(|s| s.len() != 2 || s.parse::<u32>().is_err()) {
        return None;
    }

    let is_digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(hour_part) {
        return None;
    }
    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = match minute_part {
        Some(m) if m.len() == 2 && is_digits(m) => m.parse().ok()?,
        Some(_) => return None,
        // A bare hour is only a time when it carries am/pm
        None if meridiem.is_some() => 0,
        None => return None,
    };

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };
    ClockTime::from_hm(hour, minute).map(ClockTime::minutes)
}

/// Pre-parsed day/time footprint of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    /// Meeting days
    pub days: BTreeSet<Weekday>,
    /// Start, minutes since midnight
    pub start: Option<u32>,
    /// End, minutes since midnight
    pub end: Option<u32>,
}

impl Footprint {
    /// Parse a section's day and time fields under `policy`
    #[must_use]
    pub fn of(section: &Section, policy: TimePolicy) -> Self {
        Self {
            days: parse_days(&section.days),
            start: time_to_minutes(&section.start_time, policy),
            end: time_to_minutes(&section.end_time, policy),
        }
    }

    /// Both endpoints are known
    #[must_use]
    pub const fn has_known_times(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Whether two footprints collide
///
/// Disjoint day sets never collide. On a shared day, half-open intervals
/// `[start, end)` are compared, so back-to-back meetings are fine. If any
/// endpoint is unknown the pair is assumed to collide.
#[must_use]
pub fn overlaps(a: &Footprint, b: &Footprint) -> bool {
    if a.days.is_disjoint(&b.days) {
        return false;
    }
    match (a.start, a.end, b.start, b.end) {
        (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
            a_start < b_end && b_start < a_end
        }
        _ => true,
    }
}
