//! Time label arithmetic.
//!
//! Two label conventions coexist and are parsed by separate functions:
//!   - Break labels carry an explicit meridiem: `"12:30 PM"`.
//!   - Slot labels do not: `"1:00 - 2:00"`. Hours 1–9 are read as
//!     afternoon (+12), hours 10–12 as written, because the default
//!     schedule runs from mid-morning into the evening.
//!
//! Malformed labels never raise: a break time degrades to minute 0 and a
//! slot label degrades to `None` ("no interval").

use crate::types::Minutes;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static BREAK_TIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+):(\d+)\s*(AM|PM)").ok());

static SLOT_TIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").ok());

/// Half-open interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInterval {
    pub start: Minutes,
    pub end:   Minutes,
}

impl SlotInterval {
    /// Half-open overlap test against another `[start, end)` range.
    pub fn overlaps(&self, start: Minutes, end: Minutes) -> bool {
        start < self.end && end > self.start
    }
}

/// Parse an `H:MM AM|PM` label (case-insensitive) into minutes since
/// midnight. 12 AM is midnight, 12 PM is noon. Anything that does not
/// contain such a reading, or whose minute count would overflow,
/// yields 0.
pub fn parse_time_to_minutes(label: &str) -> Minutes {
    let Some(caps) = BREAK_TIME.as_ref().and_then(|re| re.captures(label)) else {
        return 0;
    };
    let (Some(hour), Some(minute)) = (capture_number(&caps, 1), capture_number(&caps, 2)) else {
        return 0;
    };
    let pm = caps
        .get(3)
        .is_some_and(|m| m.as_str().eq_ignore_ascii_case("PM"));
    let hour = match (pm, hour) {
        (true, 12) => Some(12),
        (true, h) => h.checked_add(12),
        (false, 12) => Some(0),
        (false, h) => Some(h),
    };
    hour.and_then(|h| to_minutes(h, minute)).unwrap_or(0)
}

/// Parse a `"start - end"` slot label. Each side is read as `H:MM` with
/// the slot hour heuristic applied (see [`resolve_slot_hour`]). Returns
/// `None` unless the label splits into exactly two readable sides.
pub fn parse_slot_interval(label: &str) -> Option<SlotInterval> {
    let parts: Vec<&str> = label.split(" - ").collect();
    let [start, end] = parts.as_slice() else {
        return None;
    };
    Some(SlotInterval {
        start: read_slot_side(start)?,
        end:   read_slot_side(end)?,
    })
}

/// Slot labels omit AM/PM: 10, 11 and 12 stay as written, 1–9 are
/// shifted into the afternoon. Any other hour is left untouched.
pub fn resolve_slot_hour(hour: u32) -> u32 {
    match hour {
        1..=9 => hour + 12,
        _ => hour,
    }
}

/// Render a minute of day as an `H:MM AM|PM` break label.
pub fn format_minutes(minutes: Minutes) -> String {
    let hour24 = (minutes / 60) % 24;
    let minute = minutes % 60;
    let meridiem = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {meridiem}")
}

// ── Matching ─────────────────────────────────────────────────────────────────

fn read_slot_side(text: &str) -> Option<Minutes> {
    let caps = SLOT_TIME.as_ref()?.captures(text)?;
    let hour = resolve_slot_hour(capture_number(&caps, 1)?);
    to_minutes(hour, capture_number(&caps, 2)?)
}

fn capture_number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// `hour * 60 + minute`, or `None` past `u32::MAX`.
fn to_minutes(hour: u32, minute: u32) -> Option<Minutes> {
    hour.checked_mul(60)?.checked_add(minute)
}
