//! Generation run tests: the slot fold over a whole shift.

use segmenter_core::{
    agent::{Agent, AgentStatus},
    breaks::BreakSlot,
    config::SchedulerConfig,
    event::ScheduleEvent,
    queue::{Queue, QUEUES},
    result::{Seat, SlotResult},
    rng::TieBreakRng,
    session::Session,
};

const FIRST: &str = "10:00 - 11:00";
const SECOND: &str = "11:00 - 12:00";
const LUNCH: &str = "12:00 - 1:00";
/// 8:00 AM, before any slot or break ends.
const BEFORE_SHIFT: u32 = 8 * 60;

fn session_with(agents: &[(&str, &str)]) -> Session {
    let mut session = Session::new(&SchedulerConfig::default_test());
    for (id, name) in agents {
        session.roster.insert(Agent::present(*id, *name));
    }
    session
}

fn seated_ids(result: &SlotResult, queue: Queue) -> Vec<String> {
    result.seats(queue).iter().map(|s| s.agent_id.clone()).collect()
}

/// Three present agents, two seats in the hardest queue: two are seated,
/// the third rests and gets an ad hoc break over the slot.
#[test]
fn surplus_agent_rests_for_the_slot() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben"), ("a3", "Cy")]);
    session.set_headcount(FIRST, Queue::LvPgc, 2, &config).unwrap();

    let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(7));

    let result = session.result(FIRST).unwrap();
    assert!(!result.is_warning());
    assert!(result.locked);
    let seated = seated_ids(result, Queue::LvPgc);
    assert_eq!(seated.len(), 2);

    let resting: Vec<String> = session
        .roster
        .iter()
        .map(|a| a.id.clone())
        .filter(|id| !seated.contains(id))
        .collect();
    assert_eq!(resting.len(), 1);
    let rest = &session.breaks.breaks_for(&resting[0])[0];
    assert!(rest.is_ad_hoc());
    assert_eq!((rest.start.as_str(), rest.end.as_str()), ("10:00 AM", "11:00 AM"));
    assert!(session.breaks.is_on_break(&resting[0], FIRST));

    assert_eq!(report.assigned, vec![FIRST.to_string()]);
    assert!(session.slots.is_locked(FIRST));
    // Slots with no headcount are neither stored nor locked.
    assert!(session.result(SECOND).is_none());
    assert!(!session.slots.is_locked(SECOND));
}

/// Five seats, three agents: warning only, nobody's counters move.
#[test]
fn understaffed_slot_is_a_warning() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben"), ("a3", "Cy")]);
    session.set_headcount(FIRST, Queue::LvPgc, 2, &config).unwrap();
    session.set_headcount(FIRST, Queue::SvPgc, 2, &config).unwrap();
    session.set_headcount(FIRST, Queue::PmNpgc, 1, &config).unwrap();

    let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(1));

    let result = session.result(FIRST).unwrap();
    let warning = result.warning.as_deref().unwrap();
    assert!(warning.contains("Required: 5, Available: 3"), "{warning}");
    assert!(result.assignments.is_empty());
    assert_eq!(result.total_required, 5);
    assert!(session.slots.is_locked(FIRST));
    assert_eq!(report.warned, vec![FIRST.to_string()]);
    assert!(session.roster.iter().all(|a| a.total() == 0));
    assert_eq!(session.breaks.break_count(), 0);
}

/// Agents whose break overlaps a slot never appear in it, and the
/// shortfall warning names them.
#[test]
fn agents_on_break_are_excluded() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Bea")]);
    session.add_preset_break("a2", "Lunch Break").unwrap();
    for slot in session.slots.labels().to_vec() {
        session.set_headcount(&slot, Queue::LvPgc, 1, &config).unwrap();
    }

    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(3));

    let lunch = session.result(LUNCH).unwrap();
    assert_eq!(seated_ids(lunch, Queue::LvPgc), vec!["a1".to_string()]);
    assert!(lunch.queues_of("a2").is_empty());

    let mut session = session_with(&[("a1", "Ana"), ("a2", "Bea")]);
    session.add_preset_break("a2", "Lunch Break").unwrap();
    session.set_headcount(LUNCH, Queue::LvPgc, 2, &config).unwrap();
    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(3));

    let warning = session.result(LUNCH).unwrap().warning.clone().unwrap();
    assert!(warning.contains("Required: 2, Available: 1"), "{warning}");
    assert!(warning.ends_with("On break: Bea"), "{warning}");
}

/// A full shift: totals equal the sum of queue counts, every seat is
/// counted exactly once and nobody holds two queues in one slot.
#[test]
fn full_shift_conserves_counters_without_double_booking() {
    let config = SchedulerConfig::default_test();
    let ids: Vec<(String, String)> = (0..8).map(|i| (format!("a{i}"), format!("Agent {i}"))).collect();
    let refs: Vec<(&str, &str)> = ids.iter().map(|(i, n)| (i.as_str(), n.as_str())).collect();
    let mut session = session_with(&refs);

    for (i, slot) in session.slots.labels().to_vec().iter().enumerate() {
        let i = i as u32;
        session.set_headcount(slot, Queue::LvPgc, 1, &config).unwrap();
        session.set_headcount(slot, Queue::SvPgc, i % 2, &config).unwrap();
        session.set_headcount(slot, Queue::PmPgc, 1, &config).unwrap();
        session.set_headcount(slot, Queue::LvNpgc, i % 3, &config).unwrap();
        session.set_headcount(slot, Queue::PmNpgc, 1, &config).unwrap();
        session.set_headcount(slot, Queue::SvNpgc, 1, &config).unwrap();
    }

    let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(2024));

    assert!(session.counters_consistent());
    assert_eq!(report.double_bookings(), 0);
    assert_eq!(report.assigned.len(), session.slots.len());

    let seats: usize = session.ordered_results().iter().map(|r| r.seat_count()).sum();
    let totals: u32 = session.roster.iter().map(Agent::total).sum();
    assert_eq!(seats as u32, totals);

    for result in session.ordered_results() {
        for queue in QUEUES {
            assert_eq!(
                result.seats(queue).len() as u32,
                session.headcount.get(&result.slot, queue),
                "{} {queue}",
                result.slot
            );
        }
        for agent in session.roster.iter() {
            assert!(result.queues_of(&agent.id).len() <= 1, "{} in {}", agent.id, result.slot);
        }
    }
}

/// Workload spreads: after a shift of single hard seats, nobody is more
/// than one ahead of anyone else on the hardest queue.
#[test]
fn hard_seats_spread_evenly() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben"), ("a3", "Cy")]);
    for slot in session.slots.labels().to_vec() {
        session.set_headcount(&slot, Queue::LvPgc, 1, &config).unwrap();
    }

    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(99));

    let counts: Vec<u32> = session.roster.iter().map(|a| a.count(Queue::LvPgc)).collect();
    assert_eq!(counts.iter().sum::<u32>(), 9);
    assert!(counts.iter().all(|c| *c == 3), "{counts:?}");
}

/// Regenerating without a reset leaves locked slots untouched, even when
/// the headcount has changed since.
#[test]
fn locked_slots_survive_regeneration() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben"), ("a3", "Cy")]);
    session.set_headcount(FIRST, Queue::LvPgc, 1, &config).unwrap();
    session.set_headcount(SECOND, Queue::SvNpgc, 2, &config).unwrap();
    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(5));

    let results_before = session.results.clone();
    let roster_before = session.roster.clone();
    session.set_headcount(FIRST, Queue::LvPgc, 3, &config).unwrap();

    let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(6));

    assert_eq!(session.results, results_before);
    assert_eq!(session.roster, roster_before);
    assert!(report.assigned.is_empty());
    assert!(report.carried.contains(&FIRST.to_string()));
    assert!(report.carried.contains(&SECOND.to_string()));
}

/// A carried slot still feeds the rotation rule: whoever held the hard
/// queue there goes after an equally loaded colleague in the next slot.
#[test]
fn carried_slot_seeds_rotation() {
    let config = SchedulerConfig::default_test();
    for seed in 0..20 {
        let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben")]);
        for id in ["a1", "a2"] {
            session.roster.get_mut(id).unwrap().record_assignment(Queue::LvPgc);
        }
        let mut seats = std::collections::BTreeMap::new();
        seats.insert(Queue::LvPgc, vec![Seat { agent_id: "a1".into(), name: "Ana".into() }]);
        session.results.insert(FIRST.into(), SlotResult::assigned(FIRST, 1, seats));
        session.slots.lock(FIRST);
        session.set_headcount(SECOND, Queue::LvPgc, 1, &config).unwrap();

        let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(seed));

        assert_eq!(report.carried, vec![FIRST.to_string()]);
        let second = session.result(SECOND).unwrap();
        assert_eq!(seated_ids(second, Queue::LvPgc), vec!["a2".to_string()], "seed {seed}");
    }
}

/// Only present agents are considered.
#[test]
fn absent_agents_are_never_seated() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana")]);
    session.roster.insert(Agent::new("a2", "Ben"));
    session.roster.set_status("a2", AgentStatus::Absent).unwrap();
    session.set_headcount(FIRST, Queue::LvPgc, 2, &config).unwrap();

    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(1));

    let warning = session.result(FIRST).unwrap().warning.clone().unwrap();
    assert!(warning.contains("Available: 1"), "{warning}");
    assert!(!warning.contains("On break"), "{warning}");
}

/// Breaks that have already ended are purged before the first slot.
#[test]
fn expired_breaks_are_purged_first() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana")]);
    session.add_preset_break("a1", "Early Break").unwrap();
    session.add_preset_break("a1", "Late Break").unwrap();

    let report = session.generate(&config, 13 * 60, &mut TieBreakRng::new(1));

    assert_eq!(report.purged_breaks, 1);
    assert!(report
        .events
        .contains(&ScheduleEvent::BreaksPurged { removed: 1 }));
    assert_eq!(session.breaks.breaks_for("a1").len(), 1);
    assert_eq!(session.breaks.breaks_for("a1")[0].name, "Late Break");
}

/// Slot labels without a readable interval still get plans; resting
/// agents just get no ad hoc break.
#[test]
fn unreadable_slot_label_still_assigns() {
    let config = SchedulerConfig::default_test();
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben")]);
    assert!(session.add_time_slot("Overtime"));
    session.set_headcount("Overtime", Queue::PmNpgc, 1, &config).unwrap();

    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(1));

    assert_eq!(session.result("Overtime").unwrap().seat_count(), 1);
    assert_eq!(session.breaks.break_count(), 0);
}

/// Hours too large to count in minutes degrade like any unreadable label:
/// the slot still gets a plan and the break never blocks anyone.
#[test]
fn oversized_hours_do_not_stop_generation() {
    let config = SchedulerConfig::default_test();
    let slot = "80000000:00 - 1:00";
    let mut session = session_with(&[("a1", "Ana"), ("a2", "Ben")]);
    assert!(session.add_time_slot(slot));
    session.set_headcount(slot, Queue::LvPgc, 2, &config).unwrap();
    session
        .set_breaks(
            "a2",
            vec![BreakSlot::new("b1", "Odd", "4294967295:00 PM", "71582789:00 AM")],
        )
        .unwrap();

    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(2));

    let result = session.result(slot).unwrap();
    assert!(!result.is_warning());
    assert_eq!(result.seat_count(), 2);
}
