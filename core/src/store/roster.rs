//! Store methods for agents and their breaks.

use crate::{
    agent::{Agent, Roster},
    breaks::{BreakBook, BreakSlot},
    error::SegResult,
};
use rusqlite::{params, OptionalExtension};
use std::collections::BTreeMap;

use super::ScheduleStore;

impl ScheduleStore {
    /// Agents are stored whole as JSON; nickname, status and counters are
    /// duplicated into columns for reporting queries.
    pub(super) fn replace_agents(&self, session_id: &str, roster: &Roster) -> SegResult<()> {
        self.conn.execute("DELETE FROM agent WHERE session_id = ?1", params![session_id])?;
        for (sort_order, agent) in roster.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO agent
                   (session_id, agent_id, sort_order, nickname, status, total, assignments, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    session_id,
                    agent.id,
                    sort_order as i64,
                    agent.nickname,
                    agent.status.label(),
                    agent.total(),
                    serde_json::to_string(agent.assignments())?,
                    serde_json::to_string(agent)?,
                ],
            )?;
        }
        Ok(())
    }

    pub(super) fn load_roster(&self, session_id: &str) -> SegResult<Roster> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM agent WHERE session_id = ?1 ORDER BY sort_order ASC",
        )?;
        let payloads = stmt
            .query_map(params![session_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let agents = payloads
            .iter()
            .map(|p| serde_json::from_str::<Agent>(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Roster::new(agents))
    }

    pub(super) fn replace_breaks(&self, session_id: &str, breaks: &BreakBook) -> SegResult<()> {
        self.conn.execute("DELETE FROM break_slot WHERE session_id = ?1", params![session_id])?;
        for (agent_id, slots) in breaks.iter() {
            for (position, b) in slots.iter().enumerate() {
                self.conn.execute(
                    "INSERT INTO break_slot
                       (session_id, agent_id, break_id, position, name, start_label, end_label)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![session_id, agent_id, b.id, position as i64, b.name, b.start, b.end],
                )?;
            }
        }
        Ok(())
    }

    pub(super) fn load_breaks(&self, session_id: &str) -> SegResult<BreakBook> {
        let mut stmt = self.conn.prepare(
            "SELECT agent_id, break_id, name, start_label, end_label
             FROM break_slot WHERE session_id = ?1
             ORDER BY agent_id ASC, position ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    BreakSlot {
                        id:    row.get(1)?,
                        name:  row.get(2)?,
                        start: row.get(3)?,
                        end:   row.get(4)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: BTreeMap<String, Vec<BreakSlot>> = BTreeMap::new();
        for (agent_id, b) in rows {
            grouped.entry(agent_id).or_default().push(b);
        }
        let mut book = BreakBook::new();
        for (agent_id, slots) in grouped {
            book.set_breaks(&agent_id, slots);
        }
        Ok(book)
    }

    // ── Reporting helpers ─────────────────────────────────────────────

    /// Persisted total for one agent (for tests and the runner summary).
    pub fn agent_total(&self, session_id: &str, agent_id: &str) -> SegResult<Option<u32>> {
        let total = self
            .conn
            .query_row(
                "SELECT total FROM agent WHERE session_id = ?1 AND agent_id = ?2",
                params![session_id, agent_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(total)
    }

    pub fn agent_count(&self, session_id: &str, status: &str) -> SegResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM agent WHERE session_id = ?1 AND status = ?2",
            params![session_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
