//! Shift clock. "Now" in the team's fixed local offset.
//!
//! The floor runs on Philippines time (UTC+8) regardless of where the
//! process runs, so wall-clock UTC is shifted by a fixed offset rather
//! than resolved through a time zone database.

use crate::types::Minutes;
use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

#[derive(Debug, Clone, Copy)]
pub struct ShiftClock {
    offset: FixedOffset,
}

impl ShiftClock {
    /// Build a clock for a fixed offset east of UTC, in minutes.
    /// Out-of-range offsets fall back to UTC.
    pub fn new(utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .unwrap_or_else(|| {
                log::warn!("utc offset {utc_offset_minutes}min out of range, using UTC");
                Utc.fix()
            });
        Self { offset }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Scheduling day (`YYYY-MM-DD`) in the shift's local time.
    pub fn today(&self) -> String {
        self.date_at(Utc::now())
    }

    pub fn date_at(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%Y-%m-%d").to_string()
    }

    /// Minute of day right now in the shift's local time.
    pub fn now_minutes(&self) -> Minutes {
        minutes_of_day(&self.now())
    }
}

impl Default for ShiftClock {
    fn default() -> Self {
        Self::new(8 * 60)
    }
}

pub fn minutes_of_day(at: &DateTime<FixedOffset>) -> Minutes {
    at.hour() * 60 + at.minute()
}
