//! The segmentation engine. It owns one session, its config, its RNG
//! streams and its store.
//!
//! EXECUTION ORDER (per submitted command, never reordered):
//!   1. OperatorCommandApplied is recorded.
//!   2. The command is applied to the session.
//!   3. Every event it produced is appended to the event log.
//!   4. The session is saved.
//!
//! RULES:
//!   - Scheduling state only changes through `submit` (or the generate
//!     helpers, which `submit` also uses).
//!   - All randomness flows through the RngBank: run N always draws from
//!     the same stream for a given master seed.
//!   - A failed command leaves the log and the stored session untouched.

use crate::{
    clock::ShiftClock,
    command::OperatorCommand,
    config::SchedulerConfig,
    error::SegResult,
    event::{EventLogEntry, ScheduleEvent},
    rng::RngBank,
    segmentation::GenerationReport,
    session::Session,
    store::ScheduleStore,
    types::{Minutes, SessionId},
};

pub struct SegmentationEngine {
    pub session_id:  SessionId,
    pub session:     Session,
    pub config:      SchedulerConfig,
    pub clock:       ShiftClock,
    rng_bank:        RngBank,
    generation_runs: u64,
    event_seq:       u64,
    pub store:       ScheduleStore,
}

impl SegmentationEngine {
    /// A fresh session with the configured default slots.
    pub fn new(
        session_id: SessionId,
        seed:       u64,
        config:     SchedulerConfig,
        store:      ScheduleStore,
    ) -> Self {
        Self {
            session:         Session::new(&config),
            clock:           ShiftClock::new(config.utc_offset_minutes),
            rng_bank:        RngBank::new(seed),
            generation_runs: 0,
            event_seq:       0,
            session_id,
            config,
            store,
        }
    }

    /// Pick up a stored session, or start a fresh one when the store has
    /// nothing under `session_id`.
    pub fn resume(
        session_id: SessionId,
        seed:       u64,
        config:     SchedulerConfig,
        store:      ScheduleStore,
    ) -> SegResult<Self> {
        let loaded = store.load_session(&session_id)?;
        let generation_runs = store.generation_runs(&session_id)?;
        let event_seq = store.last_event_seq(&session_id)?;
        let mut engine = Self::new(session_id, seed, config, store);
        match loaded {
            Some(session) => {
                log::info!(
                    "session={}: resumed with {} agent(s), {} slot(s), {} run(s)",
                    engine.session_id,
                    session.roster.len(),
                    session.slots.len(),
                    generation_runs
                );
                engine.session = session;
                engine.generation_runs = generation_runs;
                engine.event_seq = event_seq;
            }
            None => log::info!("session={}: nothing stored, starting fresh", engine.session_id),
        }
        Ok(engine)
    }

    /// In-memory, migrated engine with the test config.
    pub fn build_test(session_id: &str, seed: u64) -> SegResult<Self> {
        let store = ScheduleStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(
            session_id.to_string(),
            seed,
            SchedulerConfig::default_test(),
            store,
        ))
    }

    pub fn generation_runs(&self) -> u64 {
        self.generation_runs
    }

    pub fn master_seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    /// Apply one operator command and return the events it produced.
    pub fn submit(&mut self, command: OperatorCommand) -> SegResult<Vec<ScheduleEvent>> {
        let mut events = vec![ScheduleEvent::OperatorCommandApplied {
            command_type: command.type_name().to_string(),
        }];
        events.extend(self.apply(command)?);
        self.record(&events)?;
        self.persist()?;
        Ok(events)
    }

    /// Generate at the shift clock's current minute.
    pub fn generate(&mut self) -> SegResult<GenerationReport> {
        let now = self.clock.now_minutes();
        self.generate_at(now)
    }

    /// Generate as if the local time were `now`.
    pub fn generate_at(&mut self, now: Minutes) -> SegResult<GenerationReport> {
        let report = self.run_generation(now);
        self.record(&report.events)?;
        self.persist()?;
        Ok(report)
    }

    /// The first locked slot about to end, judged at the clock's current time.
    pub fn ending_soon(&self) -> Option<&str> {
        self.ending_soon_at(self.clock.now_minutes())
    }

    pub fn ending_soon_at(&self, now: Minutes) -> Option<&str> {
        self.session
            .slots
            .ending_soon(now, self.config.ending_soon_minutes)
    }

    /// Every event logged for this session, in order.
    pub fn events(&self) -> SegResult<Vec<EventLogEntry>> {
        self.store.events_for_session(&self.session_id)
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    fn apply(&mut self, command: OperatorCommand) -> SegResult<Vec<ScheduleEvent>> {
        let session = &mut self.session;
        let events = match command {
            OperatorCommand::AddAgent { name, nickname, rest_days } => {
                let id = session.roster.add(&name, &nickname, &rest_days);
                log::debug!("agent {nickname} added as {id}");
                Vec::new()
            }
            OperatorCommand::RemoveAgent { agent_id } => {
                let agent = session.remove_agent(&agent_id)?;
                log::debug!("agent {} removed", agent.nickname);
                Vec::new()
            }
            OperatorCommand::SetStatus { agent_id, status } => {
                session.roster.set_status(&agent_id, status)?;
                Vec::new()
            }
            OperatorCommand::SetProductivity { agent_id, productivity } => {
                session.roster.set_productivity(&agent_id, productivity)?;
                Vec::new()
            }
            OperatorCommand::ReorderAgents { agent_ids } => {
                session.roster.reorder(&agent_ids)?;
                Vec::new()
            }
            OperatorCommand::SetBreaks { agent_id, breaks } => {
                session.set_breaks(&agent_id, breaks)?;
                Vec::new()
            }
            OperatorCommand::AddPresetBreak { agent_id, preset } => {
                session.add_preset_break(&agent_id, &preset)?;
                Vec::new()
            }
            OperatorCommand::SetHeadcount { slot, queue, required } => {
                let stored = session.set_headcount(&slot, queue, required, &self.config)?;
                if stored != required {
                    log::debug!("slot={slot} queue={queue}: headcount {required} clamped to {stored}");
                }
                Vec::new()
            }
            OperatorCommand::AddTimeSlot { slot } => {
                if !session.add_time_slot(&slot) {
                    log::debug!("slot={slot}: already present, ignored");
                }
                Vec::new()
            }
            OperatorCommand::RemoveTimeSlot { slot } => session.remove_time_slot(&slot)?,
            OperatorCommand::ReorderTimeSlots { slots } => {
                session.slots.reorder(slots)?;
                Vec::new()
            }
            OperatorCommand::Generate { now_minutes } => {
                let now = now_minutes.unwrap_or_else(|| self.clock.now_minutes());
                self.run_generation(now).events
            }
            OperatorCommand::UpdateAssignments { slot, queue, agent_ids } => {
                vec![session.update_assignments(&slot, queue, &agent_ids)?]
            }
            OperatorCommand::ResetSlot { slot } => vec![session.reset_slot(&slot)?],
            OperatorCommand::ResetAll => vec![session.reset_all()],
            OperatorCommand::SetProductivityQuota { quota } => {
                session.set_productivity_quota(quota);
                Vec::new()
            }
        };
        Ok(events)
    }

    fn run_generation(&mut self, now: Minutes) -> GenerationReport {
        let run = self.generation_runs;
        self.generation_runs += 1;
        let mut rng = self.rng_bank.for_generation(run);
        log::debug!("run={run} now={now}: drawing from the {} stream", rng.name);

        let mut report = self.session.generate(&self.config, now, &mut rng);
        report
            .events
            .insert(0, ScheduleEvent::GenerationStarted { run, now_minutes: now });
        report.events.push(ScheduleEvent::GenerationCompleted {
            run,
            assigned: report.assigned.len(),
            warned:   report.warned.len(),
            carried:  report.carried.len(),
        });
        report
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    fn record(&mut self, events: &[ScheduleEvent]) -> SegResult<()> {
        for event in events {
            self.event_seq += 1;
            let entry = EventLogEntry {
                id:         None,
                session_id: self.session_id.clone(),
                seq:        self.event_seq,
                event_type: event.type_name().to_string(),
                payload:    serde_json::to_string(event)?,
            };
            self.store.append_event(&entry)?;
        }
        Ok(())
    }

    fn persist(&self) -> SegResult<()> {
        self.store.save_session(&self.session_id, &self.session)?;
        self.store
            .save_generation_runs(&self.session_id, self.generation_runs)?;
        Ok(())
    }
}
