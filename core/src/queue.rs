//! The closed set of service queues, their difficulty ranking and
//! quota metadata.

use crate::error::SegError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Variants are declared in display order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Queue {
    #[serde(rename = "PM PGC")]
    PmPgc,
    #[serde(rename = "SV PGC")]
    SvPgc,
    #[serde(rename = "LV PGC")]
    LvPgc,
    #[serde(rename = "PM NPGC")]
    PmNpgc,
    #[serde(rename = "SV NPGC")]
    SvNpgc,
    #[serde(rename = "LV NPGC")]
    LvNpgc,
}

/// Display (column) order.
pub const QUEUES: [Queue; 6] = [
    Queue::PmPgc,
    Queue::SvPgc,
    Queue::LvPgc,
    Queue::PmNpgc,
    Queue::SvNpgc,
    Queue::LvNpgc,
];

/// Hardest first. The slot pass fills queues strictly in this order.
pub const DIFFICULTY_ORDER: [Queue; 6] = [
    Queue::LvPgc,  // Hardest
    Queue::SvPgc,  // Hard
    Queue::PmPgc,  // Medium-Hard
    Queue::LvNpgc, // Medium
    Queue::PmNpgc, // Easy
    Queue::SvNpgc, // Easiest
];

/// Target and hourly quota for one queue. The hourly quota only ever
/// weights workload comparisons; it is never a cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueQuota {
    pub queue:        Queue,
    pub display_name: String,
    pub target_quota: u32,
    pub hourly_quota: u32,
}

impl Queue {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PmPgc  => "PM PGC",
            Self::SvPgc  => "SV PGC",
            Self::LvPgc  => "LV PGC",
            Self::PmNpgc => "PM NPGC",
            Self::SvNpgc => "SV NPGC",
            Self::LvNpgc => "LV NPGC",
        }
    }

    /// 0 = hardest, 5 = easiest.
    pub fn difficulty_rank(&self) -> usize {
        DIFFICULTY_ORDER
            .iter()
            .position(|q| q == self)
            .unwrap_or(DIFFICULTY_ORDER.len())
    }

    /// One of the three hardest queues.
    pub fn is_hard(&self) -> bool {
        self.difficulty_rank() < 3
    }

    pub fn default_quota(&self) -> QueueQuota {
        let (display_name, target_quota, hourly_quota) = match self {
            Self::SvPgc  => ("SHORT_VideoPGC", 400, 53),
            Self::SvNpgc => ("SHORT_Video_NON_PGC", 400, 53),
            Self::LvPgc  => ("LONG_Video_PGC", 300, 40),
            Self::LvNpgc => ("LONG_Video_NON_PGC", 300, 40),
            Self::PmPgc  => ("PM PGC", 600, 80),
            Self::PmNpgc => ("PM NPGC", 600, 80),
        };
        QueueQuota {
            queue: *self,
            display_name: display_name.to_string(),
            target_quota,
            hourly_quota,
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Queue {
    type Err = SegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QUEUES
            .iter()
            .copied()
            .find(|q| q.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SegError::UnknownQueue { name: s.to_string() })
    }
}
