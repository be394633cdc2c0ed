//! The session aggregate: all scheduling state for one day.
//!
//! Every generation run and every edit takes `&mut Session`; nothing
//! scheduling-related lives in globals.

use crate::{
    agent::{Agent, Roster},
    breaks::{preset_break, BreakBook, BreakSlot},
    config::SchedulerConfig,
    error::{SegError, SegResult},
    headcount::HeadcountTable,
    queue::Queue,
    result::SlotResult,
    slots::SlotRegistry,
    types::SlotLabel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub roster:             Roster,
    pub breaks:             BreakBook,
    pub headcount:          HeadcountTable,
    pub slots:              SlotRegistry,
    pub results:            BTreeMap<SlotLabel, SlotResult>,
    pub productivity_quota: u32,
}

impl Session {
    /// A fresh day: the configured default slots, zeroed headcount, no agents.
    pub fn new(config: &SchedulerConfig) -> Self {
        let slots = SlotRegistry::new(config.default_time_slots.iter().cloned());
        let headcount = HeadcountTable::for_slots(slots.labels().iter().map(String::as_str));
        Self {
            slots,
            headcount,
            productivity_quota: config.productivity_quota,
            ..Self::default()
        }
    }

    /// Results in slot display order.
    pub fn ordered_results(&self) -> Vec<&SlotResult> {
        self.slots
            .labels()
            .iter()
            .filter_map(|label| self.results.get(label))
            .collect()
    }

    pub fn result(&self, slot: &str) -> Option<&SlotResult> {
        self.results.get(slot)
    }

    /// True when every agent's total equals the sum of its queue counts.
    pub fn counters_consistent(&self) -> bool {
        self.roster.iter().all(Agent::counters_consistent)
    }

    // ── Roster ───────────────────────────────────────────────────────────────

    /// Remove an agent and their break record. Stored slot results keep
    /// the seat names they were generated with.
    pub fn remove_agent(&mut self, agent_id: &str) -> SegResult<Agent> {
        let agent = self.roster.remove(agent_id)?;
        self.breaks.remove_agent(agent_id);
        Ok(agent)
    }

    pub fn agents_below_quota(&self) -> Vec<&Agent> {
        self.roster.below_quota(self.productivity_quota)
    }

    pub fn set_productivity_quota(&mut self, quota: u32) {
        self.productivity_quota = quota.min(200);
    }

    // ── Breaks ───────────────────────────────────────────────────────────────

    pub fn set_breaks(&mut self, agent_id: &str, breaks: Vec<BreakSlot>) -> SegResult<()> {
        if self.roster.get(agent_id).is_none() {
            return Err(SegError::AgentNotFound { id: agent_id.to_string() });
        }
        self.breaks.set_breaks(agent_id, breaks);
        Ok(())
    }

    /// Give an agent one of the preset breaks. Returns the break added.
    pub fn add_preset_break(&mut self, agent_id: &str, preset: &str) -> SegResult<BreakSlot> {
        if self.roster.get(agent_id).is_none() {
            return Err(SegError::AgentNotFound { id: agent_id.to_string() });
        }
        let preset = preset_break(preset)
            .ok_or_else(|| anyhow::anyhow!("unknown preset break '{preset}'"))?;
        let slot = BreakSlot::new(
            uuid::Uuid::new_v4().to_string(),
            preset.name,
            preset.start,
            preset.end,
        );
        self.breaks.add_break(agent_id, slot.clone());
        Ok(slot)
    }

    // ── Slots and headcount ──────────────────────────────────────────────────

    /// Append a slot with a zeroed headcount row. Duplicates are ignored.
    pub fn add_time_slot(&mut self, label: &str) -> bool {
        if !self.slots.add(label) {
            return false;
        }
        self.headcount.add_slot(label);
        true
    }

    pub fn set_headcount(
        &mut self,
        slot:  &str,
        queue: Queue,
        value: u32,
        config: &SchedulerConfig,
    ) -> SegResult<u32> {
        self.slots.require(slot)?;
        Ok(self.headcount.set(slot, queue, value, config.max_headcount_per_queue))
    }
}
