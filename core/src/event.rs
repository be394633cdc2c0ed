//! Schedule events. Every state change the engine makes is recorded
//! as one of these and appended to the event log.

use crate::{
    assignment::FillPass,
    queue::Queue,
    types::{AgentId, Minutes, SessionId, SlotLabel},
};
use serde::{Deserialize, Serialize};

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleEvent {
    // ── Generation ─────────────────────────────────
    GenerationStarted {
        run:         u64,
        now_minutes: Minutes,
    },
    BreaksPurged {
        removed: usize,
    },
    LockedSlotCarried {
        slot: SlotLabel,
    },
    SlotAssigned {
        slot:           SlotLabel,
        total_required: u32,
        unassigned:     Vec<AgentId>,
    },
    SlotUnderstaffed {
        slot:      SlotLabel,
        required:  u32,
        available: usize,
        warning:   String,
    },
    AdHocBreakRecorded {
        slot:     SlotLabel,
        agent_id: AgentId,
    },
    DoubleBooked {
        slot:     SlotLabel,
        agent_id: AgentId,
        queue:    Queue,
        pass:     FillPass,
    },
    GenerationCompleted {
        run:      u64,
        assigned: usize,
        warned:   usize,
        carried:  usize,
    },

    // ── Manual edits and resets ────────────────────
    AssignmentsEdited {
        slot:    SlotLabel,
        queue:   Queue,
        added:   Vec<AgentId>,
        removed: Vec<AgentId>,
    },
    SlotReset {
        slot:      SlotLabel,
        retracted: usize,
    },
    SlotRemoved {
        slot: SlotLabel,
    },
    CountersReset {
        agents: usize,
    },

    // ── Operator commands ──────────────────────────
    OperatorCommandApplied {
        command_type: String,
    },
}

impl ScheduleEvent {
    /// Stable name used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GenerationStarted { .. }      => "generation_started",
            Self::BreaksPurged { .. }           => "breaks_purged",
            Self::LockedSlotCarried { .. }      => "locked_slot_carried",
            Self::SlotAssigned { .. }           => "slot_assigned",
            Self::SlotUnderstaffed { .. }       => "slot_understaffed",
            Self::AdHocBreakRecorded { .. }     => "ad_hoc_break_recorded",
            Self::DoubleBooked { .. }           => "double_booked",
            Self::GenerationCompleted { .. }    => "generation_completed",
            Self::AssignmentsEdited { .. }      => "assignments_edited",
            Self::SlotReset { .. }              => "slot_reset",
            Self::SlotRemoved { .. }            => "slot_removed",
            Self::CountersReset { .. }          => "counters_reset",
            Self::OperatorCommandApplied { .. } => "operator_command_applied",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub seq:        u64,
    pub event_type: String,
    pub payload:    String, // JSON-serialized ScheduleEvent
}
