//! The slot assignment pass: a priority-weighted greedy allocator for
//! one time slot.
//!
//! ALGORITHM (per slot, queues strictly hardest → easiest):
//!   1. Nothing required: skip.
//!   2. More required than available: warn, assign nobody, touch no counter.
//!   3. For each queue, rank the agents not yet placed this slot and seat
//!      the best `r`. Ranking, first difference wins:
//!        a. held this exact queue last slot → goes after
//!        b. hard queue: combined hard-queue count, then this queue's count
//!           weighted by `hourly_quota / 50`
//!           easy queue: combined easy-queue count
//!        c. `total * 50 / hourly_quota` (differences ≤ 0.1 are ties)
//!        d. raw total
//!        e. random key
//!      Short of `r`: the fallback pass seats agents already holding some
//!      other queue this slot, lightest on this queue first, then the
//!      last-resort pass seats anyone not yet in this queue. Both are double
//!      bookings and are logged as such.
//!   4. Agents never seated are reported as unassigned (they rest).
//!   5. Who held which queue becomes the next slot's rotation hint.
//!
//! Counters are cumulative for the whole session; every seat adds one to
//! the agent's queue count and total as it is taken.

use crate::{
    agent::Agent,
    config::SchedulerConfig,
    headcount::QueueCounts,
    queue::{Queue, DIFFICULTY_ORDER},
    result::{QueueSeats, Seat, SlotResult},
    rng::TieBreakRng,
    types::AgentId,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};

/// Which queue(s) each agent held in the previous processed slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationHint {
    held: BTreeMap<AgentId, Vec<Queue>>,
}

impl RotationHint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the hint from a stored result (used for locked slots).
    pub fn from_result(result: &SlotResult) -> Self {
        let mut hint = Self::new();
        for (queue, seats) in &result.assignments {
            for seat in seats {
                hint.record(&seat.agent_id, *queue);
            }
        }
        hint
    }

    pub fn record(&mut self, agent_id: &str, queue: Queue) {
        let queues = self.held.entry(agent_id.to_string()).or_default();
        if !queues.contains(&queue) {
            queues.push(queue);
        }
    }

    pub fn held(&self, agent_id: &str, queue: Queue) -> bool {
        self.held.get(agent_id).is_some_and(|qs| qs.contains(&queue))
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPass {
    Fallback,
    LastResort,
}

/// An agent seated in a second (or further) queue of the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleBooking {
    pub agent_id: AgentId,
    pub queue:    Queue,
    pub pass:     FillPass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub required:  u32,
    pub available: usize,
    pub on_break:  Vec<String>,
    pub message:   String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment {
    pub seats:         QueueSeats,
    pub unassigned:    Vec<AgentId>,
    pub double_booked: Vec<DoubleBooking>,
    pub rotation:      RotationHint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Skipped,
    Insufficient(Shortfall),
    Assigned(SlotAssignment),
}

pub struct SlotPass<'a> {
    config:   &'a SchedulerConfig,
    rotation: &'a RotationHint,
    rng:      &'a mut TieBreakRng,
}

impl<'a> SlotPass<'a> {
    pub fn new(
        config:   &'a SchedulerConfig,
        rotation: &'a RotationHint,
        rng:      &'a mut TieBreakRng,
    ) -> Self {
        Self { config, rotation, rng }
    }

    /// Run the full pass for one slot.
    ///
    /// - `pool`:     present agents not on break for this slot
    /// - `on_break`: display names of present agents who are on break,
    ///               quoted in the shortfall warning
    pub fn run(
        &mut self,
        slot:         &str,
        requirements: &QueueCounts,
        pool:         &mut [&mut Agent],
        on_break:     &[String],
    ) -> SlotOutcome {
        let required: u32 = requirements.values().sum();
        if required == 0 {
            return SlotOutcome::Skipped;
        }

        if required as usize > pool.len() {
            let mut message = format!(
                "{slot}: Insufficient agents (Required: {required}, Available: {})",
                pool.len()
            );
            if !on_break.is_empty() {
                message.push_str(&format!(" - On break: {}", on_break.join(", ")));
            }
            log::warn!("{message}");
            return SlotOutcome::Insufficient(Shortfall {
                required,
                available: pool.len(),
                on_break: on_break.to_vec(),
                message,
            });
        }

        SlotOutcome::Assigned(self.fill_queues(slot, requirements, pool))
    }

    /// Seat agents queue by queue without the supply check. `run` never
    /// reaches the fallback passes; calling this directly with a short pool
    /// does.
    pub fn fill_queues(
        &mut self,
        slot:         &str,
        requirements: &QueueCounts,
        pool:         &mut [&mut Agent],
    ) -> SlotAssignment {
        let mut placed: Vec<Vec<Queue>> = vec![Vec::new(); pool.len()];
        let mut seats = QueueSeats::new();
        let mut double_booked = Vec::new();

        for queue in DIFFICULTY_ORDER {
            let wanted = requirements.get(&queue).copied().unwrap_or(0) as usize;
            let mut chosen: Vec<usize> = Vec::with_capacity(wanted);

            if wanted > 0 {
                let strict: Vec<usize> =
                    (0..pool.len()).filter(|&i| placed[i].is_empty()).collect();
                chosen.extend(self.rank(queue, strict, pool).into_iter().take(wanted));
            }

            if chosen.len() < wanted {
                let seated_elsewhere: Vec<usize> = (0..pool.len())
                    .filter(|&i| !placed[i].is_empty() && !chosen.contains(&i))
                    .collect();
                let extra: Vec<usize> = self
                    .rank_by_queue_load(queue, seated_elsewhere, pool)
                    .into_iter()
                    .take(wanted - chosen.len())
                    .collect();
                for &i in &extra {
                    double_booked.push(self.flag_double_booking(slot, queue, &*pool[i], FillPass::Fallback));
                }
                chosen.extend(extra);
            }

            if chosen.len() < wanted {
                let anyone: Vec<usize> =
                    (0..pool.len()).filter(|i| !chosen.contains(i)).collect();
                let extra: Vec<usize> = self
                    .rank(queue, anyone, pool)
                    .into_iter()
                    .take(wanted - chosen.len())
                    .collect();
                for &i in &extra {
                    double_booked.push(self.flag_double_booking(slot, queue, &*pool[i], FillPass::LastResort));
                }
                chosen.extend(extra);
            }

            if chosen.len() < wanted {
                log::warn!(
                    "slot={slot} queue={queue}: seated {} of {wanted} after every pass",
                    chosen.len()
                );
            }

            let mut queue_seats = Vec::with_capacity(chosen.len());
            for i in chosen {
                placed[i].push(queue);
                pool[i].record_assignment(queue);
                queue_seats.push(Seat {
                    agent_id: pool[i].id.clone(),
                    name:     pool[i].nickname.clone(),
                });
            }
            seats.insert(queue, queue_seats);
        }

        let unassigned = (0..pool.len())
            .filter(|&i| placed[i].is_empty())
            .map(|i| pool[i].id.clone())
            .collect();

        let mut rotation = RotationHint::new();
        for (i, queues) in placed.iter().enumerate() {
            for queue in queues {
                rotation.record(&pool[i].id, *queue);
            }
        }

        log::debug!(
            "slot={slot}: seated {} agent(s), {} double booking(s)",
            seats.values().map(Vec::len).sum::<usize>(),
            double_booked.len()
        );

        SlotAssignment { seats, unassigned, double_booked, rotation }
    }

    // ── Ranking ──────────────────────────────────────────────────────────────

    /// Full composite ranking, best candidate first.
    fn rank(&mut self, queue: Queue, candidates: Vec<usize>, pool: &[&mut Agent]) -> Vec<usize> {
        let keys = self.rng.tie_keys(candidates.len());
        let mut keyed: Vec<(usize, u64)> = candidates.into_iter().zip(keys).collect();
        keyed.sort_by(|(a, key_a), (b, key_b)| {
            self.compare(queue, &*pool[*a], &*pool[*b])
                .then_with(|| key_a.cmp(key_b))
        });
        keyed.into_iter().map(|(i, _)| i).collect()
    }

    /// Fallback ranking: this queue's count, then total, then random.
    fn rank_by_queue_load(
        &mut self,
        queue:      Queue,
        candidates: Vec<usize>,
        pool:       &[&mut Agent],
    ) -> Vec<usize> {
        let keys = self.rng.tie_keys(candidates.len());
        let mut keyed: Vec<(usize, u64)> = candidates.into_iter().zip(keys).collect();
        keyed.sort_by(|(a, key_a), (b, key_b)| {
            let (a, b) = (&*pool[*a], &*pool[*b]);
            a.count(queue)
                .cmp(&b.count(queue))
                .then_with(|| a.total().cmp(&b.total()))
                .then_with(|| key_a.cmp(key_b))
        });
        keyed.into_iter().map(|(i, _)| i).collect()
    }

    fn compare(&self, queue: Queue, a: &Agent, b: &Agent) -> Ordering {
        let held_a = self.rotation.held(&a.id, queue);
        let held_b = self.rotation.held(&b.id, queue);
        held_a
            .cmp(&held_b)
            .then_with(|| self.compare_group_load(queue, a, b))
            .then_with(|| {
                self.compare_weighted(self.weighted_total(queue, a), self.weighted_total(queue, b))
            })
            .then_with(|| a.total().cmp(&b.total()))
    }

    fn compare_group_load(&self, queue: Queue, a: &Agent, b: &Agent) -> Ordering {
        if queue.is_hard() {
            a.hard_load().cmp(&b.hard_load()).then_with(|| {
                self.compare_weighted(
                    self.weighted_queue_load(queue, a),
                    self.weighted_queue_load(queue, b),
                )
            })
        } else {
            a.easy_load().cmp(&b.easy_load())
        }
    }

    /// This queue's count scaled by `hourly_quota / base`.
    fn weighted_queue_load(&self, queue: Queue, agent: &Agent) -> f64 {
        f64::from(agent.count(queue)) * self.config.hourly_quota(queue) / self.config.load_weight_base
    }

    /// Total scaled by `base / hourly_quota`.
    fn weighted_total(&self, queue: Queue, agent: &Agent) -> f64 {
        f64::from(agent.total()) * self.config.load_weight_base / self.config.hourly_quota(queue)
    }

    fn compare_weighted(&self, a: f64, b: f64) -> Ordering {
        if (a - b).abs() > self.config.weight_tie_threshold {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        } else {
            Ordering::Equal
        }
    }

    fn flag_double_booking(
        &self,
        slot:  &str,
        queue: Queue,
        agent: &Agent,
        pass:  FillPass,
    ) -> DoubleBooking {
        log::warn!(
            "slot={slot}: {} double-booked into {queue} by the {pass:?} pass",
            agent.nickname
        );
        DoubleBooking {
            agent_id: agent.id.clone(),
            queue,
            pass,
        }
    }
}
