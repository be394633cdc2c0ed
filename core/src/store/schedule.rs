//! Store methods for time slots, headcount and slot results.

use crate::{
    error::SegResult,
    headcount::HeadcountTable,
    queue::Queue,
    result::SlotResult,
    slots::SlotRegistry,
    types::SlotLabel,
};
use rusqlite::params;
use std::collections::BTreeMap;

use super::ScheduleStore;

impl ScheduleStore {
    pub(super) fn replace_slots(&self, session_id: &str, slots: &SlotRegistry) -> SegResult<()> {
        self.conn.execute("DELETE FROM time_slot WHERE session_id = ?1", params![session_id])?;
        for (position, label) in slots.labels().iter().enumerate() {
            self.conn.execute(
                "INSERT INTO time_slot (session_id, label, position, locked)
                 VALUES (?1, ?2, ?3, ?4)",
                params![session_id, label, position as i64, slots.is_locked(label)],
            )?;
        }
        Ok(())
    }

    pub(super) fn load_slots(&self, session_id: &str) -> SegResult<SlotRegistry> {
        let mut stmt = self.conn.prepare(
            "SELECT label, locked FROM time_slot WHERE session_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut registry = SlotRegistry::default();
        for (label, locked) in rows {
            registry.add(label.clone());
            if locked {
                registry.lock(&label);
            }
        }
        Ok(registry)
    }

    pub(super) fn replace_headcount(&self, session_id: &str, table: &HeadcountTable) -> SegResult<()> {
        self.conn.execute("DELETE FROM headcount WHERE session_id = ?1", params![session_id])?;
        for (slot, row) in table.rows() {
            for (queue, required) in row {
                self.conn.execute(
                    "INSERT INTO headcount (session_id, slot, queue, required)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![session_id, slot, queue.label(), required],
                )?;
            }
        }
        Ok(())
    }

    pub(super) fn load_headcount(&self, session_id: &str) -> SegResult<HeadcountTable> {
        let mut stmt = self.conn.prepare(
            "SELECT slot, queue, required FROM headcount WHERE session_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = HeadcountTable::new();
        for (slot, queue, required) in rows {
            let queue: Queue = queue.parse()?;
            table.add_slot(&slot);
            table.set(&slot, queue, required, u32::MAX);
        }
        Ok(table)
    }

    pub(super) fn replace_results(
        &self,
        session_id: &str,
        results:    &BTreeMap<SlotLabel, SlotResult>,
    ) -> SegResult<()> {
        self.conn.execute("DELETE FROM slot_result WHERE session_id = ?1", params![session_id])?;
        for (slot, result) in results {
            self.conn.execute(
                "INSERT INTO slot_result (session_id, slot, payload) VALUES (?1, ?2, ?3)",
                params![session_id, slot, serde_json::to_string(result)?],
            )?;
        }
        Ok(())
    }

    pub(super) fn load_results(&self, session_id: &str) -> SegResult<BTreeMap<SlotLabel, SlotResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT slot, payload FROM slot_result WHERE session_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(slot, payload)| -> SegResult<(SlotLabel, SlotResult)> {
                Ok((slot, serde_json::from_str(&payload)?))
            })
            .collect()
    }

    pub fn result_count(&self, session_id: &str) -> SegResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM slot_result WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
