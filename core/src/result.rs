//! Per-slot segmentation results.

use crate::{
    queue::Queue,
    types::{AgentId, SlotLabel},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One agent placed in one queue. The nickname is captured at
/// assignment time for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub agent_id: AgentId,
    pub name:     String,
}

pub type QueueSeats = BTreeMap<Queue, Vec<Seat>>;

/// Either a warning (no assignments) or a queue → seats mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResult {
    pub slot:           SlotLabel,
    pub total_required: u32,
    pub assignments:    QueueSeats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning:        Option<String>,
    #[serde(default)]
    pub locked:         bool,
    #[serde(default)]
    pub edited:         bool,
}

impl SlotResult {
    pub fn assigned(slot: &str, total_required: u32, assignments: QueueSeats) -> Self {
        Self {
            slot: slot.to_string(),
            total_required,
            assignments,
            warning: None,
            locked: true,
            edited: false,
        }
    }

    pub fn warning(slot: &str, total_required: u32, message: String) -> Self {
        Self {
            slot: slot.to_string(),
            total_required,
            assignments: QueueSeats::new(),
            warning: Some(message),
            locked: true,
            edited: false,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn seats(&self, queue: Queue) -> &[Seat] {
        self.assignments.get(&queue).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display names under a queue, in assignment order.
    pub fn names(&self, queue: Queue) -> Vec<&str> {
        self.seats(queue).iter().map(|s| s.name.as_str()).collect()
    }

    /// Every queue the agent holds in this slot.
    pub fn queues_of(&self, agent_id: &str) -> Vec<Queue> {
        self.assignments
            .iter()
            .filter(|(_, seats)| seats.iter().any(|s| s.agent_id == agent_id))
            .map(|(q, _)| *q)
            .collect()
    }

    pub fn seat_count(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }
}
