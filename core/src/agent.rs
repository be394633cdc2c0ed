//! Agents, their attendance status and cumulative assignment counters.
//!
//! RULE: `total` always equals the sum of the per-queue counts.
//! Counters are private; the only ways to change them are
//! `record_assignment`, `retract_assignment` and `reset_counters`,
//! each of which moves a queue count and the total together.

use crate::{
    error::{SegError, SegResult},
    queue::{Queue, DIFFICULTY_ORDER},
    types::AgentId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgentStatus {
    #[default]
    #[serde(rename = "N/A")]
    NotSet,
    #[serde(rename = "PRESENT")]
    Present,
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "ABSENT")]
    Absent,
    #[serde(rename = "PTO")]
    Pto,
    #[serde(rename = "RDOT")]
    Rdot,
    #[serde(rename = "RD SWAP")]
    RdSwap,
    #[serde(rename = "SME")]
    Sme,
}

impl AgentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotSet  => "N/A",
            Self::Present => "PRESENT",
            Self::Off     => "OFF",
            Self::Absent  => "ABSENT",
            Self::Pto     => "PTO",
            Self::Rdot    => "RDOT",
            Self::RdSwap  => "RD SWAP",
            Self::Sme     => "SME",
        }
    }

    /// Only present agents are eligible for assignment.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Present)
    }
}

pub const REST_DAY_OPTIONS: [&str; 7] = [
    "Sun-Mon", "Mon-Tue", "Tue-Wed", "Wed-Thu", "Thu-Fri", "Fri-Sat", "Sat-Sun",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id:           AgentId,
    pub name:         String,
    /// Display name used in slot results.
    pub nickname:     String,
    pub rest_days:    String,
    pub status:       AgentStatus,
    /// Percent of the productivity target reached this shift.
    pub productivity: u32,
    assignments:      BTreeMap<Queue, u32>,
    total:            u32,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            id: id.into(),
            name: nickname.clone(),
            nickname,
            rest_days: REST_DAY_OPTIONS[0].to_string(),
            status: AgentStatus::NotSet,
            productivity: 0,
            assignments: BTreeMap::new(),
            total: 0,
        }
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn present(id: impl Into<AgentId>, nickname: impl Into<String>) -> Self {
        Self::new(id, nickname).with_status(AgentStatus::Present)
    }

    pub fn count(&self, queue: Queue) -> u32 {
        self.assignments.get(&queue).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn assignments(&self) -> &BTreeMap<Queue, u32> {
        &self.assignments
    }

    /// +1 to the queue count and to the total.
    pub fn record_assignment(&mut self, queue: Queue) {
        *self.assignments.entry(queue).or_insert(0) += 1;
        self.total += 1;
    }

    /// -1 to the queue count and to the total, floored at zero.
    /// Returns false (and changes nothing) when the queue count is
    /// already zero.
    pub fn retract_assignment(&mut self, queue: Queue) -> bool {
        match self.assignments.get_mut(&queue) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.assignments.remove(&queue);
                }
                self.total = self.total.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn reset_counters(&mut self) {
        self.assignments.clear();
        self.total = 0;
    }

    /// Conservation check: total == sum of per-queue counts.
    pub fn counters_consistent(&self) -> bool {
        self.assignments.values().sum::<u32>() == self.total
    }

    /// Combined count across the three hardest queues.
    pub fn hard_load(&self) -> u32 {
        DIFFICULTY_ORDER[..3].iter().map(|q| self.count(*q)).sum()
    }

    /// Combined count across the three easiest queues.
    pub fn easy_load(&self) -> u32 {
        DIFFICULTY_ORDER[3..].iter().map(|q| self.count(*q)).sum()
    }
}

/// The agent directory for one session, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Add a new agent with a fresh id. Status starts as N/A.
    pub fn add(&mut self, name: &str, nickname: &str, rest_days: &str) -> AgentId {
        let id = uuid::Uuid::new_v4().to_string();
        let mut agent = Agent::new(id.clone(), nickname);
        agent.name = name.to_string();
        agent.rest_days = rest_days.to_string();
        self.agents.push(agent);
        id
    }

    pub fn insert(&mut self, agent: Agent) {
        match self.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
    }

    pub fn remove(&mut self, id: &str) -> SegResult<Agent> {
        let pos = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| SegError::AgentNotFound { id: id.to_string() })?;
        Ok(self.agents.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn require_mut(&mut self, id: &str) -> SegResult<&mut Agent> {
        self.get_mut(id)
            .ok_or_else(|| SegError::AgentNotFound { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn present(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.status.is_eligible())
    }

    /// Status changes never touch counters.
    pub fn set_status(&mut self, id: &str, status: AgentStatus) -> SegResult<()> {
        self.require_mut(id)?.status = status;
        Ok(())
    }

    pub fn set_productivity(&mut self, id: &str, productivity: u32) -> SegResult<()> {
        self.require_mut(id)?.productivity = productivity.min(200);
        Ok(())
    }

    /// Reorder to match `ids`. Agents not named keep their relative order
    /// after the named ones; unknown ids are rejected.
    pub fn reorder(&mut self, ids: &[AgentId]) -> SegResult<()> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(SegError::AgentNotFound { id: unknown.clone() });
        }
        self.agents.sort_by_key(|a| {
            ids.iter().position(|id| *id == a.id).unwrap_or(usize::MAX)
        });
        Ok(())
    }

    /// Present agents whose productivity is under `quota` percent.
    pub fn below_quota(&self, quota: u32) -> Vec<&Agent> {
        self.present().filter(|a| a.productivity < quota).collect()
    }

    /// Zero every agent's counters. The only path that erases history.
    pub fn reset_all_counters(&mut self) {
        self.agents.iter_mut().for_each(Agent::reset_counters);
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|a| a.nickname.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
