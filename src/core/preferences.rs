//! Free-text preference extraction
//!
//! [`PreferenceParser`] is the seam between natural-language input and the
//! scheduler. [`KeywordParser`] is the built-in regex/keyword implementation.
//!
//! Day mentions are classified with a token window rather than character
//! offsets: the text is split into words and clause boundaries, consecutive
//! day words form a run, and the run takes the meaning of the nearest marker
//! word before it in the same clause ("avoid", "no", "only", ...) or of a
//! postfix marker right after it ("Tu/Th only", "Fridays off"). Filler words
//! such as "days", "on", "classes", "and" neither break a run nor clear a
//! marker; any other word does both.

use crate::core::conflict::ClockTime;
use crate::core::models::course::normalize_code;
use crate::core::models::preferences::{DEFAULT_MAX_CREDITS, DEFAULT_MIN_CREDITS};
use crate::core::models::{Preferences, Weekday};
use crate::debug;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static CREDIT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s*(?:-|–|to)\s*(\d{1,2})\s*credits?\b").expect("valid regex")
});
static CREDIT_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*credits?\b").expect("valid regex"));
static EARLIEST_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:before|earlier than|start(?:ing)? after)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b")
        .expect("valid regex")
});
static LATEST_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\b(?:no|nothing)(?:\s+[a-z]+){0,3}?\s+after|later than|(?:finish(?:ed)?|done|end|out)\s+by)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b",
    )
    .expect("valid regex")
});
static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3,4}\s*\d{4}\b").expect("valid regex"));
static WORD_OR_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z]+\b|[,;.!?]").expect("valid regex"));

const AVOID_MARKERS: &[&str] = &["avoid", "no", "not", "never", "without", "skip"];
const POSTFIX_AVOID: &[&str] = &["off", "free"];
const FILLERS: &[&str] = &[
    "a", "all", "an", "and", "any", "at", "both", "class", "classes", "course", "courses", "day",
    "days", "every", "having", "lecture", "lectures", "meeting", "meetings", "my", "of", "on",
    "or", "please", "the",
];
const ABBREVIATIONS: &[(&str, Weekday)] = &[
    ("mo", Weekday::Mo),
    ("mon", Weekday::Mo),
    ("tu", Weekday::Tu),
    ("tue", Weekday::Tu),
    ("tues", Weekday::Tu),
    ("we", Weekday::We),
    ("wed", Weekday::We),
    ("th", Weekday::Th),
    ("thu", Weekday::Th),
    ("thur", Weekday::Th),
    ("thurs", Weekday::Th),
    ("fr", Weekday::Fr),
    ("fri", Weekday::Fr),
    ("sa", Weekday::Sa),
    ("sat", Weekday::Sa),
    ("su", Weekday::Su),
    ("sun", Weekday::Su),
];
/// Abbreviations that are also ordinary English words
const AMBIGUOUS: &[&str] = &["we", "wed", "sat", "sun"];

/// Turns free text into [`Preferences`]
pub trait PreferenceParser: Send + Sync {
    /// Extract preferences from `text`. Never fails; unknown text yields defaults.
    fn parse(&self, text: &str) -> Preferences;
}

/// Regex and keyword based parser
#[derive(Debug, Clone, Copy)]
pub struct KeywordParser {
    default_min: u32,
    default_max: u32,
}

impl Default for KeywordParser {
    fn default() -> Self {
        Self {
            default_min: DEFAULT_MIN_CREDITS,
            default_max: DEFAULT_MAX_CREDITS,
        }
    }
}

impl KeywordParser {
    /// Parser with the standard 12-15 credit defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit bounds used when the text does not mention credits
    ///
    /// Reversed bounds are swapped.
    #[must_use]
    pub const fn with_credit_defaults(min: u32, max: u32) -> Self {
        if min <= max {
            Self {
                default_min: min,
                default_max: max,
            }
        } else {
            Self {
                default_min: max,
                default_max: min,
            }
        }
    }

    fn credits(&self, lowered: &str) -> (u32, u32) {
        if let Some(caps) = CREDIT_RANGE.captures(lowered) {
            let (a, b) = (capture_u32(&caps, 1), capture_u32(&caps, 2));
            if let (Some(a), Some(b)) = (a, b) {
                return (a.min(b), a.max(b));
            }
        }
        if let Some(n) = CREDIT_SINGLE
            .captures(lowered)
            .and_then(|caps| capture_u32(&caps, 1))
        {
            return (n, n);
        }
        (self.default_min, self.default_max)
    }
}

impl PreferenceParser for KeywordParser {
    fn parse(&self, text: &str) -> Preferences {
        let lowered = text.to_lowercase();
        let (min_credits, max_credits) = self.credits(&lowered);
        let days = classify_days(text);

        let must_include: BTreeSet<String> = COURSE_CODE
            .find_iter(&text.to_uppercase())
            .map(|m| normalize_code(m.as_str()))
            .collect();

        // "no classes starting after 5pm" is an end bound, not a start bound
        let latest = LATEST_END.captures(&lowered);
        let latest_span = latest.as_ref().and_then(|c| c.get(0)).map(|m| m.range());
        let latest_end = latest.as_ref().and_then(clock_from);
        let earliest_start = EARLIEST_START
            .captures_iter(&lowered)
            .filter(|c| {
                let (Some(m), Some(span)) = (c.get(0), latest_span.as_ref()) else {
                    return true;
                };
                m.end() <= span.start || span.end <= m.start()
            })
            .find_map(|c| clock_from(&c));

        let prefs = Preferences {
            min_credits,
            max_credits,
            avoid_days: days.avoided,
            preferred_days: days.preferred,
            earliest_start,
            latest_end,
            must_include,
            include_capstone: lowered.contains("capstone"),
        };
        debug!("Parsed preferences from {text:?}: {prefs:?}");
        prefs
    }
}

fn capture_u32(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

/// Convert (hour, minutes, am/pm) captures into a 24-hour clock time
fn clock_from(caps: &Captures<'_>) -> Option<ClockTime> {
    let hour = capture_u32(caps, 1)?;
    let minute = caps
        .get(2)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    let hour = match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, meridiem) {
                (12, "am") => 0,
                (h, "pm") if h != 12 => h + 12,
                (h, _) => h,
            }
        }
        None => hour,
    };
    ClockTime::from_hm(hour, minute)
}

#[derive(Debug, Default)]
struct DayClassification {
    avoided: BTreeSet<Weekday>,
    preferred: BTreeSet<Weekday>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Avoid,
    Only,
}

#[derive(Debug)]
enum Token<'a> {
    Word(&'a str),
    Comma,
    ClauseEnd,
    SentenceEnd,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    WORD_OR_BOUNDARY
        .find_iter(text)
        .map(|m| match m.as_str() {
            "," => Token::Comma,
            ";" => Token::ClauseEnd,
            "." | "!" | "?" => Token::SentenceEnd,
            word => Token::Word(word),
        })
        .collect()
}

/// Recognize a day word, case-insensitively
///
/// Abbreviations that double as English words ("we", "sat", ...) count when
/// capitalized mid-sentence, or in lowercase only inside a day list or right
/// after a marker (`in_day_context`).
fn day_of(raw: &str, sentence_start: bool, in_day_context: bool) -> Option<Weekday> {
    let lower = raw.to_ascii_lowercase();
    let full = Weekday::ALL.into_iter().find(|day| {
        let name = day.full_name();
        lower == name || lower.strip_suffix('s') == Some(name)
    });
    if full.is_some() {
        return full;
    }

    if AMBIGUOUS.contains(&lower.as_str()) {
        let capitalized = raw.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let accepted = if capitalized {
            !(sentence_start && lower == "we")
        } else {
            in_day_context
        };
        if !accepted {
            return None;
        }
    }
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == lower)
        .map(|(_, day)| *day)
}

#[derive(Debug, Default)]
struct DayWindow {
    run: Vec<Weekday>,
    marker: Option<Marker>,
    avoided: BTreeSet<Weekday>,
    only: BTreeSet<Weekday>,
    bare: BTreeSet<Weekday>,
}

impl DayWindow {
    fn flush_as(&mut self, marker: Option<Marker>) {
        let target = match marker {
            Some(Marker::Avoid) => &mut self.avoided,
            Some(Marker::Only) => &mut self.only,
            None => &mut self.bare,
        };
        target.extend(self.run.drain(..));
    }

    /// Close the current run under the pending marker and clear the marker
    fn close(&mut self) {
        self.flush_as(self.marker);
        self.marker = None;
    }

    fn finish(mut self) -> DayClassification {
        self.close();
        let preferred = if self.only.is_empty() {
            self.bare
        } else {
            self.only
        };
        DayClassification {
            preferred: preferred.difference(&self.avoided).copied().collect(),
            avoided: self.avoided,
        }
    }
}

fn classify_days(text: &str) -> DayClassification {
    let mut window = DayWindow::default();
    let mut sentence_start = true;
    let mut after_comma = false;

    for token in tokenize(text) {
        let word = match token {
            Token::Comma => {
                after_comma = true;
                continue;
            }
            Token::ClauseEnd => {
                window.close();
                after_comma = false;
                continue;
            }
            Token::SentenceEnd => {
                window.close();
                after_comma = false;
                sentence_start = true;
                continue;
            }
            Token::Word(word) => word,
        };

        let in_day_context =
            !after_comma && (!window.run.is_empty() || window.marker.is_some());
        let day = day_of(word, sentence_start, in_day_context);
        sentence_start = false;

        // A comma continues a day list only when another day follows it
        if after_comma && day.is_none() {
            window.close();
        }
        after_comma = false;

        if let Some(day) = day {
            window.run.push(day);
            continue;
        }

        let lower = word.to_ascii_lowercase();
        let lower = lower.as_str();
        if FILLERS.contains(&lower) {
            continue;
        }
        if !window.run.is_empty() && lower == "only" {
            window.flush_as(Some(Marker::Only));
            window.marker = None;
        } else if !window.run.is_empty() && POSTFIX_AVOID.contains(&lower) {
            window.flush_as(Some(Marker::Avoid));
            window.marker = None;
        } else if lower == "only" {
            window.close();
            window.marker = Some(Marker::Only);
        } else if AVOID_MARKERS.contains(&lower) {
            window.close();
            window.marker = Some(Marker::Avoid);
        } else {
            window.close();
        }
    }

    window.finish()
}
