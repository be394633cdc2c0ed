//! Per-slot, per-queue headcount requirements.

use crate::queue::{Queue, QUEUES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type QueueCounts = BTreeMap<Queue, u32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadcountTable {
    rows: BTreeMap<String, QueueCounts>,
}

impl HeadcountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with a zeroed row for each slot.
    pub fn for_slots<'a>(slots: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::new();
        for slot in slots {
            table.add_slot(slot);
        }
        table
    }

    /// Insert a zeroed row unless the slot already has one.
    pub fn add_slot(&mut self, slot: &str) {
        self.rows
            .entry(slot.to_string())
            .or_insert_with(|| QUEUES.iter().map(|q| (*q, 0)).collect());
    }

    pub fn remove_slot(&mut self, slot: &str) {
        self.rows.remove(slot);
    }

    /// Set one requirement, clamped to `0..=max`. Returns the stored value.
    pub fn set(&mut self, slot: &str, queue: Queue, value: u32, max: u32) -> u32 {
        let clamped = value.min(max);
        self.add_slot(slot);
        if let Some(row) = self.rows.get_mut(slot) {
            row.insert(queue, clamped);
        }
        clamped
    }

    pub fn get(&self, slot: &str, queue: Queue) -> u32 {
        self.rows
            .get(slot)
            .and_then(|row| row.get(&queue))
            .copied()
            .unwrap_or(0)
    }

    /// The slot's requirement for every queue; missing entries read as 0.
    pub fn requirements(&self, slot: &str) -> QueueCounts {
        QUEUES.iter().map(|q| (*q, self.get(slot, *q))).collect()
    }

    pub fn total(&self, slot: &str) -> u32 {
        self.rows
            .get(slot)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&String, &QueueCounts)> {
        self.rows.iter()
    }
}
