use crate::{
    agent::AgentStatus,
    breaks::BreakSlot,
    queue::Queue,
    types::{AgentId, SlotLabel},
};
use serde::{Deserialize, Serialize};

/// All operator-issued commands.
/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum OperatorCommand {
    // ── Roster ────────────────────────────────────
    AddAgent {
        name:      String,
        nickname:  String,
        #[serde(default = "default_rest_days")]
        rest_days: String,
    },
    RemoveAgent {
        agent_id: AgentId,
    },
    SetStatus {
        agent_id: AgentId,
        status:   AgentStatus,
    },
    SetProductivity {
        agent_id:     AgentId,
        productivity: u32,
    },
    ReorderAgents {
        agent_ids: Vec<AgentId>,
    },

    // ── Breaks ────────────────────────────────────
    SetBreaks {
        agent_id: AgentId,
        breaks:   Vec<BreakSlot>,
    },
    AddPresetBreak {
        agent_id: AgentId,
        preset:   String,
    },

    // ── Slots and headcount ───────────────────────
    SetHeadcount {
        slot:     SlotLabel,
        queue:    Queue,
        required: u32,
    },
    AddTimeSlot {
        slot: SlotLabel,
    },
    RemoveTimeSlot {
        slot: SlotLabel,
    },
    ReorderTimeSlots {
        slots: Vec<SlotLabel>,
    },

    // ── Segmentation ──────────────────────────────
    /// Generate at the shift clock's current minute, or at `now_minutes`.
    Generate {
        #[serde(default)]
        now_minutes: Option<u32>,
    },
    UpdateAssignments {
        slot:      SlotLabel,
        queue:     Queue,
        agent_ids: Vec<AgentId>,
    },
    ResetSlot {
        slot: SlotLabel,
    },
    ResetAll,
    SetProductivityQuota {
        quota: u32,
    },
}

fn default_rest_days() -> String {
    crate::agent::REST_DAY_OPTIONS[0].to_string()
}

impl OperatorCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AddAgent { .. }             => "add_agent",
            Self::RemoveAgent { .. }          => "remove_agent",
            Self::SetStatus { .. }            => "set_status",
            Self::SetProductivity { .. }      => "set_productivity",
            Self::ReorderAgents { .. }        => "reorder_agents",
            Self::SetBreaks { .. }            => "set_breaks",
            Self::AddPresetBreak { .. }       => "add_preset_break",
            Self::SetHeadcount { .. }         => "set_headcount",
            Self::AddTimeSlot { .. }          => "add_time_slot",
            Self::RemoveTimeSlot { .. }       => "remove_time_slot",
            Self::ReorderTimeSlots { .. }     => "reorder_time_slots",
            Self::Generate { .. }             => "generate",
            Self::UpdateAssignments { .. }    => "update_assignments",
            Self::ResetSlot { .. }            => "reset_slot",
            Self::ResetAll                    => "reset_all",
            Self::SetProductivityQuota { .. } => "set_productivity_quota",
        }
    }
}
