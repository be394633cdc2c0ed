//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine calls store methods; scheduling code never executes SQL.
//! Persistence is a sink: nothing read back from here feeds a generation
//! run except through `load_session`.

use crate::{
    error::SegResult,
    event::EventLogEntry,
    session::Session,
};
mod roster;
mod schedule;
use rusqlite::{params, Connection, OptionalExtension};

pub struct ScheduleStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl ScheduleStore {
    pub fn open(path: &str) -> SegResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SegResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> SegResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SegResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    /// Replace everything stored for `session_id` with `session`,
    /// in one transaction.
    pub fn save_session(&self, session_id: &str, session: &Session) -> SegResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.upsert_app_state(session_id, session.productivity_quota)?;
        self.replace_agents(session_id, &session.roster)?;
        self.replace_breaks(session_id, &session.breaks)?;
        self.replace_slots(session_id, &session.slots)?;
        self.replace_headcount(session_id, &session.headcount)?;
        self.replace_results(session_id, &session.results)?;
        tx.commit()?;
        Ok(())
    }

    /// Rebuild a stored session. `None` when nothing was ever saved.
    pub fn load_session(&self, session_id: &str) -> SegResult<Option<Session>> {
        let quota: Option<u32> = self
            .conn
            .query_row(
                "SELECT productivity_quota FROM app_state WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(productivity_quota) = quota else {
            return Ok(None);
        };
        Ok(Some(Session {
            roster:    self.load_roster(session_id)?,
            breaks:    self.load_breaks(session_id)?,
            slots:     self.load_slots(session_id)?,
            headcount: self.load_headcount(session_id)?,
            results:   self.load_results(session_id)?,
            productivity_quota,
        }))
    }

    fn upsert_app_state(&self, session_id: &str, productivity_quota: u32) -> SegResult<()> {
        self.conn.execute(
            "INSERT INTO app_state (session_id, productivity_quota, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
                productivity_quota = excluded.productivity_quota,
                updated_at         = excluded.updated_at",
            params![session_id, productivity_quota, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn save_generation_runs(&self, session_id: &str, runs: u64) -> SegResult<()> {
        self.conn.execute(
            "UPDATE app_state SET generation_runs = ?2 WHERE session_id = ?1",
            params![session_id, runs as i64],
        )?;
        Ok(())
    }

    pub fn generation_runs(&self, session_id: &str) -> SegResult<u64> {
        let runs: Option<i64> = self
            .conn
            .query_row(
                "SELECT generation_runs FROM app_state WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(runs.unwrap_or(0) as u64)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SegResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, seq, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.seq as i64,
                entry.event_type,
                entry.payload,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> SegResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, seq, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    session_id: row.get(1)?,
                    seq:        row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Highest sequence number logged for the session, 0 if none.
    pub fn last_event_seq(&self, session_id: &str) -> SegResult<u64> {
        let seq: Option<i64> = self.conn.query_row(
            "SELECT MAX(seq) FROM event_log WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(seq.unwrap_or(0) as u64)
    }

    pub fn event_count(&self, session_id: &str, event_type: &str) -> SegResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
