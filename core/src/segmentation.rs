//! Segmentation orchestrator. Folds the slot pass over the ordered slots,
//! plus the sanctioned edit and reset paths for stored results.
//!
//! SLOT STATES (processed in stored order, rotation hint as accumulator):
//!   - locked                 → carried forward unchanged; its stored seats
//!                              become the rotation hint
//!   - unlocked, requires 0   → no result; hint passes through
//!   - unlocked, requires > 0 → slot pass runs; the result (plan or
//!                              warning) is stored and locked
//!
//! RULES:
//!   - Expired breaks are purged exactly once, before the first slot.
//!   - A locked result is only ever changed by `update_assignments`,
//!     `reset_slot`, `remove_time_slot` or `reset_all`.
//!   - Every seat added or removed moves the agent's queue count and total
//!     by exactly one.

use crate::{
    agent::Agent,
    assignment::{RotationHint, SlotAssignment, SlotOutcome, SlotPass},
    config::SchedulerConfig,
    error::{SegError, SegResult},
    event::ScheduleEvent,
    queue::Queue,
    result::{Seat, SlotResult},
    rng::TieBreakRng,
    session::Session,
    time::parse_slot_interval,
    types::{AgentId, Minutes, SlotLabel},
};

/// What one generation run did.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub assigned:      Vec<SlotLabel>,
    pub warned:        Vec<SlotLabel>,
    pub carried:       Vec<SlotLabel>,
    pub purged_breaks: usize,
    pub events:        Vec<ScheduleEvent>,
}

impl GenerationReport {
    pub fn double_bookings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ScheduleEvent::DoubleBooked { .. }))
            .count()
    }
}

impl Session {
    /// Run one generation cycle at local minute `now`.
    pub fn generate(
        &mut self,
        config: &SchedulerConfig,
        now:    Minutes,
        rng:    &mut TieBreakRng,
    ) -> GenerationReport {
        let mut report = GenerationReport {
            purged_breaks: self.breaks.purge_expired(now),
            ..GenerationReport::default()
        };
        if report.purged_breaks > 0 {
            log::debug!("purged {} expired break(s) at minute {now}", report.purged_breaks);
            report.events.push(ScheduleEvent::BreaksPurged { removed: report.purged_breaks });
        }

        let labels = self.slots.labels().to_vec();
        let mut hint = RotationHint::new();
        for slot in &labels {
            hint = self.process_slot(slot, hint, config, rng, &mut report);
        }

        log::info!(
            "generation: {} assigned, {} warned, {} carried over {} slot(s)",
            report.assigned.len(),
            report.warned.len(),
            report.carried.len(),
            labels.len()
        );
        report
    }

    fn process_slot(
        &mut self,
        slot:   &str,
        hint:   RotationHint,
        config: &SchedulerConfig,
        rng:    &mut TieBreakRng,
        report: &mut GenerationReport,
    ) -> RotationHint {
        if self.slots.is_locked(slot) {
            report.carried.push(slot.to_string());
            report.events.push(ScheduleEvent::LockedSlotCarried { slot: slot.to_string() });
            return self
                .results
                .get(slot)
                .map(RotationHint::from_result)
                .unwrap_or_default();
        }

        let requirements = self.headcount.requirements(slot);
        let required: u32 = requirements.values().sum();
        if required == 0 {
            log::debug!("slot={slot}: nothing required, skipped");
            return hint;
        }

        let mut on_break: Vec<String> = Vec::new();
        let mut pool: Vec<&mut Agent> = Vec::new();
        for agent in self.roster.iter_mut().filter(|a| a.status.is_eligible()) {
            if self.breaks.is_on_break(&agent.id, slot) {
                on_break.push(agent.nickname.clone());
            } else {
                pool.push(agent);
            }
        }

        let outcome = SlotPass::new(config, &hint, rng).run(slot, &requirements, &mut pool, &on_break);
        drop(pool);

        match outcome {
            SlotOutcome::Skipped => hint,
            SlotOutcome::Insufficient(shortfall) => {
                report.events.push(ScheduleEvent::SlotUnderstaffed {
                    slot:      slot.to_string(),
                    required:  shortfall.required,
                    available: shortfall.available,
                    warning:   shortfall.message.clone(),
                });
                self.results
                    .insert(slot.to_string(), SlotResult::warning(slot, required, shortfall.message));
                self.slots.lock(slot);
                report.warned.push(slot.to_string());
                RotationHint::new()
            }
            SlotOutcome::Assigned(assignment) => {
                self.store_assignment(slot, required, assignment, report)
            }
        }
    }

    fn store_assignment(
        &mut self,
        slot:       &str,
        required:   u32,
        assignment: SlotAssignment,
        report:     &mut GenerationReport,
    ) -> RotationHint {
        let SlotAssignment { seats, unassigned, double_booked, rotation } = assignment;

        match parse_slot_interval(slot) {
            Some(interval) => {
                for agent_id in &unassigned {
                    self.breaks.record_ad_hoc(agent_id, slot, interval);
                    report.events.push(ScheduleEvent::AdHocBreakRecorded {
                        slot:     slot.to_string(),
                        agent_id: agent_id.clone(),
                    });
                }
            }
            None if !unassigned.is_empty() => {
                log::debug!("slot={slot}: label has no interval, no rest breaks recorded");
            }
            None => {}
        }

        for booking in double_booked {
            report.events.push(ScheduleEvent::DoubleBooked {
                slot:     slot.to_string(),
                agent_id: booking.agent_id,
                queue:    booking.queue,
                pass:     booking.pass,
            });
        }

        report.events.push(ScheduleEvent::SlotAssigned {
            slot:           slot.to_string(),
            total_required: required,
            unassigned,
        });
        self.results
            .insert(slot.to_string(), SlotResult::assigned(slot, required, seats));
        self.slots.lock(slot);
        report.assigned.push(slot.to_string());
        rotation
    }

    /// Replace the seats of one queue in a stored slot result.
    ///
    /// Added agents gain +1 on the queue and total, removed agents lose 1
    /// (never below zero). The whole edit is validated before anything
    /// changes.
    pub fn update_assignments(
        &mut self,
        slot:      &str,
        queue:     Queue,
        agent_ids: &[AgentId],
    ) -> SegResult<ScheduleEvent> {
        self.slots.require(slot)?;
        let result = self
            .results
            .get_mut(slot)
            .filter(|r| !r.is_warning())
            .ok_or_else(|| SegError::SlotHasNoAssignments { slot: slot.to_string() })?;

        let mut wanted: Vec<AgentId> = Vec::with_capacity(agent_ids.len());
        for id in agent_ids {
            if self.roster.get(id).is_none() {
                return Err(SegError::AgentNotFound { id: id.clone() });
            }
            if !wanted.contains(id) {
                wanted.push(id.clone());
            }
        }

        let current: Vec<AgentId> = result.seats(queue).iter().map(|s| s.agent_id.clone()).collect();
        let removed: Vec<AgentId> = current.iter().filter(|id| !wanted.contains(id)).cloned().collect();
        let added: Vec<AgentId> = wanted.iter().filter(|id| !current.contains(id)).cloned().collect();

        for id in &removed {
            if let Some(agent) = self.roster.get_mut(id) {
                agent.retract_assignment(queue);
            }
        }
        for id in &added {
            self.roster.require_mut(id)?.record_assignment(queue);
        }

        let seats = wanted
            .iter()
            .map(|id| Seat {
                agent_id: id.clone(),
                name:     self.roster.display_name(id),
            })
            .collect();
        result.assignments.insert(queue, seats);
        result.edited = true;

        log::debug!(
            "slot={slot} queue={queue}: edit added {} removed {}",
            added.len(),
            removed.len()
        );
        Ok(ScheduleEvent::AssignmentsEdited {
            slot: slot.to_string(),
            queue,
            added,
            removed,
        })
    }

    /// Undo everything a slot contributed to the counters, discard its
    /// result and unlock it.
    pub fn reset_slot(&mut self, slot: &str) -> SegResult<ScheduleEvent> {
        self.slots.require(slot)?;
        let mut retracted = 0;
        if let Some(result) = self.results.remove(slot) {
            for (queue, seats) in &result.assignments {
                for seat in seats {
                    if let Some(agent) = self.roster.get_mut(&seat.agent_id) {
                        if agent.retract_assignment(*queue) {
                            retracted += 1;
                        }
                    }
                }
            }
        }
        self.slots.unlock(slot);
        log::debug!("slot={slot}: reset, {retracted} seat(s) retracted");
        Ok(ScheduleEvent::SlotReset {
            slot: slot.to_string(),
            retracted,
        })
    }

    /// Reset the slot, then drop it and its headcount row.
    pub fn remove_time_slot(&mut self, slot: &str) -> SegResult<Vec<ScheduleEvent>> {
        let reset = self.reset_slot(slot)?;
        self.slots.remove(slot)?;
        self.headcount.remove_slot(slot);
        Ok(vec![reset, ScheduleEvent::SlotRemoved { slot: slot.to_string() }])
    }

    /// Roster-wide reset: zero all counters, clear every lock and result.
    pub fn reset_all(&mut self) -> ScheduleEvent {
        self.roster.reset_all_counters();
        self.slots.clear_locks();
        self.results.clear();
        log::info!("counters reset for {} agent(s)", self.roster.len());
        ScheduleEvent::CountersReset {
            agents: self.roster.len(),
        }
    }
}
