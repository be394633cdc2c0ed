use crate::queue::{Queue, QueueQuota, QUEUES};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_SLOTS: [&str; 9] = [
    "10:00 - 11:00",
    "11:00 - 12:00",
    "12:00 - 1:00",
    "1:00 - 2:00",
    "2:00 - 3:00",
    "3:00 - 4:00",
    "4:00 - 5:00",
    "5:00 - 6:00",
    "6:00 - 7:00",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub quotas:                  Vec<QueueQuota>,
    pub default_time_slots:      Vec<String>,
    /// Fixed offset east of UTC used for "now". 480 = Philippines.
    pub utc_offset_minutes:      i32,
    /// The 50 in `hourly_quota / 50` and `50 / hourly_quota`.
    pub load_weight_base:        f64,
    /// Weighted totals closer than this compare equal. Kept below half the
    /// smallest weight step (see [`SchedulerConfig::max_tie_threshold`]) so
    /// the comparison stays transitive.
    pub weight_tie_threshold:    f64,
    pub max_headcount_per_queue: u32,
    pub ending_soon_minutes:     u32,
    /// Shift productivity target, percent.
    pub productivity_quota:      u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quotas: QUEUES.iter().map(Queue::default_quota).collect(),
            default_time_slots: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
            utc_offset_minutes: 8 * 60,
            load_weight_base: 50.0,
            weight_tie_threshold: 0.1,
            max_headcount_per_queue: 99,
            ending_soon_minutes: 5,
            productivity_quota: 100,
        }
    }
}

impl SchedulerConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use SchedulerConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SchedulerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config.normalized())
    }

    /// Pull the load weighting back into a range the ranking can use.
    pub fn normalized(mut self) -> Self {
        if !(self.load_weight_base.is_finite() && self.load_weight_base > 0.0) {
            log::warn!("load_weight_base {} unusable, using 50", self.load_weight_base);
            self.load_weight_base = 50.0;
        }
        let max = self.max_tie_threshold();
        let threshold = if self.weight_tie_threshold.is_nan() {
            0.0
        } else {
            self.weight_tie_threshold.max(0.0).min(max)
        };
        if threshold != self.weight_tie_threshold {
            log::warn!(
                "weight_tie_threshold {} clamped to {threshold}",
                self.weight_tie_threshold
            );
            self.weight_tie_threshold = threshold;
        }
        self
    }

    /// Half the smallest gap between two weighted counts of one queue.
    /// Both weightings step by either `hourly / base` or `base / hourly`.
    pub fn max_tie_threshold(&self) -> f64 {
        QUEUES
            .iter()
            .map(|q| {
                let hourly = self.hourly_quota(*q);
                (hourly / self.load_weight_base).min(self.load_weight_base / hourly)
            })
            .fold(f64::INFINITY, f64::min)
            / 2.0
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    pub fn quota(&self, queue: Queue) -> QueueQuota {
        self.quotas
            .iter()
            .find(|q| q.queue == queue)
            .cloned()
            .unwrap_or_else(|| queue.default_quota())
    }

    /// Hourly quota as a divisor, never below 1.
    pub fn hourly_quota(&self, queue: Queue) -> f64 {
        f64::from(self.quota(queue).hourly_quota.max(1))
    }
}
