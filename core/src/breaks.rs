//! Break intervals per agent: the overlap filter, the expired-break
//! reclaimer and ad hoc rest breaks for agents left unassigned.
//!
//! Break labels carry an explicit meridiem and are parsed with
//! `parse_time_to_minutes`; slot labels go through `parse_slot_interval`.

use crate::{
    time::{format_minutes, parse_slot_interval, parse_time_to_minutes, SlotInterval},
    types::{AgentId, Minutes},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const AD_HOC_BREAK_NAME: &str = "Ad hoc rest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSlot {
    pub id:    String,
    pub name:  String,
    pub start: String,
    pub end:   String,
}

impl BreakSlot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start: &str, end: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn start_minutes(&self) -> Minutes {
        parse_time_to_minutes(&self.start)
    }

    pub fn end_minutes(&self) -> Minutes {
        parse_time_to_minutes(&self.end)
    }

    pub fn is_ad_hoc(&self) -> bool {
        self.id.starts_with("adhoc-")
    }
}

/// A named break template offered to operators.
#[derive(Debug, Clone, Copy)]
pub struct PresetBreak {
    pub name:  &'static str,
    pub start: &'static str,
    pub end:   &'static str,
}

pub const PRESET_BREAKS: [PresetBreak; 3] = [
    PresetBreak { name: "Early Break", start: "11:00 AM", end: "11:15 AM" },
    PresetBreak { name: "Lunch Break", start: "12:00 PM", end: "1:00 PM" },
    PresetBreak { name: "Late Break",  start: "4:00 PM",  end: "4:15 PM" },
];

pub fn preset_break(name: &str) -> Option<PresetBreak> {
    PRESET_BREAKS
        .iter()
        .copied()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Every agent's breaks. An agent with no breaks has no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakBook {
    by_agent: BTreeMap<AgentId, Vec<BreakSlot>>,
}

impl BreakBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breaks_for(&self, agent_id: &str) -> &[BreakSlot] {
        self.by_agent.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace an agent's breaks. An empty list drops the record.
    pub fn set_breaks(&mut self, agent_id: &str, breaks: Vec<BreakSlot>) {
        if breaks.is_empty() {
            self.by_agent.remove(agent_id);
        } else {
            self.by_agent.insert(agent_id.to_string(), breaks);
        }
    }

    /// Add or replace (by break id) a single break.
    pub fn add_break(&mut self, agent_id: &str, slot: BreakSlot) {
        let breaks = self.by_agent.entry(agent_id.to_string()).or_default();
        match breaks.iter_mut().find(|b| b.id == slot.id) {
            Some(existing) => *existing = slot,
            None => breaks.push(slot),
        }
    }

    pub fn remove_agent(&mut self, agent_id: &str) {
        self.by_agent.remove(agent_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &Vec<BreakSlot>)> {
        self.by_agent.iter()
    }

    pub fn agent_count(&self) -> usize {
        self.by_agent.len()
    }

    pub fn break_count(&self) -> usize {
        self.by_agent.values().map(Vec::len).sum()
    }

    /// True when any of the agent's breaks overlaps the slot, using the
    /// half-open test `break_start < slot_end && break_end > slot_start`.
    /// A slot label that cannot be parsed never blocks anyone.
    pub fn is_on_break(&self, agent_id: &str, slot: &str) -> bool {
        let breaks = self.breaks_for(agent_id);
        if breaks.is_empty() {
            return false;
        }
        let Some(interval) = parse_slot_interval(slot) else {
            return false;
        };
        breaks
            .iter()
            .any(|b| interval.overlaps(b.start_minutes(), b.end_minutes()))
    }

    /// Drop every break whose end is at or before `now`, and every agent
    /// left with no breaks. Returns how many breaks were removed.
    pub fn purge_expired(&mut self, now: Minutes) -> usize {
        let before = self.break_count();
        self.by_agent.retain(|_, breaks| {
            breaks.retain(|b| b.end_minutes() > now);
            !breaks.is_empty()
        });
        before - self.break_count()
    }

    /// Record a rest break spanning exactly the slot's interval.
    /// Re-recording the same slot replaces the earlier entry.
    pub fn record_ad_hoc(&mut self, agent_id: &str, slot: &str, interval: SlotInterval) {
        let rest = BreakSlot::new(
            format!("adhoc-{slot}"),
            AD_HOC_BREAK_NAME,
            &format_minutes(interval.start),
            &format_minutes(interval.end),
        );
        self.add_break(agent_id, rest);
    }
}
