//! Manual edits and resets of stored slot results.

use segmenter_core::{
    agent::{Agent, Roster},
    config::SchedulerConfig,
    error::SegError,
    event::ScheduleEvent,
    queue::Queue,
    rng::TieBreakRng,
    session::Session,
};

const FIRST: &str = "10:00 - 11:00";
const SECOND: &str = "11:00 - 12:00";
const BEFORE_SHIFT: u32 = 8 * 60;

/// Three agents; FIRST seats two in LV PGC, SECOND seats one in SV NPGC.
fn generated_session(seed: u64) -> Session {
    let config = SchedulerConfig::default_test();
    let mut session = Session::new(&config);
    for (id, name) in [("a1", "Ana"), ("a2", "Ben"), ("a3", "Cy")] {
        session.roster.insert(Agent::present(id, name));
    }
    session.set_headcount(FIRST, Queue::LvPgc, 2, &config).unwrap();
    session.set_headcount(SECOND, Queue::SvNpgc, 1, &config).unwrap();
    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(seed));
    session
}

fn seated(session: &Session, slot: &str, queue: Queue) -> Vec<String> {
    session
        .result(slot)
        .map(|r| r.seats(queue).iter().map(|s| s.agent_id.clone()).collect())
        .unwrap_or_default()
}

fn agent<'a>(roster: &'a Roster, id: &str) -> &'a Agent {
    roster.get(id).unwrap()
}

/// Swapping X out for Y moves exactly one count each way and nothing else.
#[test]
fn swap_moves_one_count_each_way() {
    let mut session = generated_session(17);
    let before = seated(&session, FIRST, Queue::LvPgc);
    let (x, keep) = (before[0].clone(), before[1].clone());
    let y = session
        .roster
        .iter()
        .map(|a| a.id.clone())
        .find(|id| !before.contains(id))
        .unwrap();

    let roster_before = session.roster.clone();
    let second_before = session.result(SECOND).cloned();

    let event = session
        .update_assignments(FIRST, Queue::LvPgc, &[keep.clone(), y.clone()])
        .unwrap();

    assert_eq!(
        event,
        ScheduleEvent::AssignmentsEdited {
            slot:    FIRST.into(),
            queue:   Queue::LvPgc,
            added:   vec![y.clone()],
            removed: vec![x.clone()],
        }
    );

    let (old_x, new_x) = (agent(&roster_before, &x), agent(&session.roster, &x));
    let (old_y, new_y) = (agent(&roster_before, &y), agent(&session.roster, &y));
    assert_eq!(new_x.count(Queue::LvPgc), old_x.count(Queue::LvPgc) - 1);
    assert_eq!(new_x.total(), old_x.total() - 1);
    assert_eq!(new_y.count(Queue::LvPgc), old_y.count(Queue::LvPgc) + 1);
    assert_eq!(new_y.total(), old_y.total() + 1);
    assert_eq!(agent(&session.roster, &keep), agent(&roster_before, &keep));

    let result = session.result(FIRST).unwrap();
    assert!(result.edited);
    assert_eq!(seated(&session, FIRST, Queue::LvPgc), vec![keep, y]);
    assert_eq!(session.result(SECOND).cloned(), second_before);
    assert!(session.counters_consistent());
}

#[test]
fn duplicate_ids_in_an_edit_count_once() {
    let mut session = generated_session(2);
    let current = seated(&session, FIRST, Queue::LvPgc);
    let totals_before: u32 = session.roster.iter().map(Agent::total).sum();

    session
        .update_assignments(FIRST, Queue::LvPgc, &[current[0].clone(), current[0].clone(), current[1].clone()])
        .unwrap();

    assert_eq!(seated(&session, FIRST, Queue::LvPgc), current);
    assert_eq!(session.roster.iter().map(Agent::total).sum::<u32>(), totals_before);
}

/// Edits are all-or-nothing: an unknown id rejects the whole edit.
#[test]
fn edit_with_unknown_agent_changes_nothing() {
    let mut session = generated_session(4);
    let snapshot = session.clone();

    let err = session
        .update_assignments(FIRST, Queue::LvPgc, &["a1".into(), "ghost".into()])
        .unwrap_err();

    assert!(matches!(err, SegError::AgentNotFound { ref id } if id == "ghost"));
    assert_eq!(session, snapshot);
}

#[test]
fn edit_needs_an_existing_plan() {
    let mut session = generated_session(4);

    assert!(matches!(
        session.update_assignments("9:00 - 10:00", Queue::LvPgc, &[]),
        Err(SegError::SlotNotFound { .. })
    ));
    // Known slot, never generated.
    assert!(matches!(
        session.update_assignments("3:00 - 4:00", Queue::LvPgc, &[]),
        Err(SegError::SlotHasNoAssignments { .. })
    ));
}

#[test]
fn warning_slot_cannot_be_edited() {
    let config = SchedulerConfig::default_test();
    let mut session = Session::new(&config);
    session.roster.insert(Agent::present("a1", "Ana"));
    session.set_headcount(FIRST, Queue::LvPgc, 3, &config).unwrap();
    session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(1));

    assert!(matches!(
        session.update_assignments(FIRST, Queue::LvPgc, &["a1".into()]),
        Err(SegError::SlotHasNoAssignments { .. })
    ));
    assert_eq!(session.roster.get("a1").unwrap().total(), 0);
}

/// Resetting a slot gives back everything it counted, drops its result
/// and unlocks it.
#[test]
fn reset_slot_retracts_its_seats() {
    let mut session = generated_session(8);
    let first_seats = seated(&session, FIRST, Queue::LvPgc);

    let event = session.reset_slot(FIRST).unwrap();

    assert_eq!(event, ScheduleEvent::SlotReset { slot: FIRST.into(), retracted: 2 });
    assert!(session.result(FIRST).is_none());
    assert!(!session.slots.is_locked(FIRST));
    assert!(session.slots.is_locked(SECOND));
    for id in &first_seats {
        assert_eq!(session.roster.get(id).unwrap().count(Queue::LvPgc), 0);
    }
    let totals: u32 = session.roster.iter().map(Agent::total).sum();
    assert_eq!(totals, 1, "only the SECOND seat should remain counted");
    assert!(session.counters_consistent());
}

/// A reset slot is generated again on the next run; the rest breaks it
/// handed out last time are still on the book.
#[test]
fn reset_slot_is_regenerated() {
    let config = SchedulerConfig::default_test();
    let mut session = generated_session(8);
    let rested: Vec<String> = session
        .roster
        .iter()
        .filter(|a| session.breaks.is_on_break(&a.id, FIRST))
        .map(|a| a.id.clone())
        .collect();
    assert_eq!(rested.len(), 1);

    session.reset_slot(FIRST).unwrap();
    let report = session.generate(&config, BEFORE_SHIFT, &mut TieBreakRng::new(9));

    assert_eq!(report.assigned, vec![FIRST.to_string()]);
    assert_eq!(report.carried, vec![SECOND.to_string()]);
    assert!(!seated(&session, FIRST, Queue::LvPgc).contains(&rested[0]));
}

#[test]
fn remove_time_slot_resets_then_drops() {
    let mut session = generated_session(6);
    let seat = seated(&session, SECOND, Queue::SvNpgc)[0].clone();

    let events = session.remove_time_slot(SECOND).unwrap();

    assert_eq!(
        events,
        vec![
            ScheduleEvent::SlotReset { slot: SECOND.into(), retracted: 1 },
            ScheduleEvent::SlotRemoved { slot: SECOND.into() },
        ]
    );
    assert!(!session.slots.contains(SECOND));
    assert!(session.headcount.rows().all(|(slot, _)| slot != SECOND));
    assert_eq!(session.roster.get(&seat).unwrap().count(Queue::SvNpgc), 0);
    assert!(matches!(
        session.remove_time_slot(SECOND),
        Err(SegError::SlotNotFound { .. })
    ));
}

/// The full reset is the only path that zeroes history.
#[test]
fn reset_all_clears_counters_locks_and_results() {
    let mut session = generated_session(3);
    let breaks_before = session.breaks.clone();

    let event = session.reset_all();

    assert_eq!(event, ScheduleEvent::CountersReset { agents: 3 });
    assert!(session.roster.iter().all(|a| a.total() == 0 && a.assignments().is_empty()));
    assert_eq!(session.slots.locked_count(), 0);
    assert!(session.results.is_empty());
    assert_eq!(session.breaks, breaks_before);
}

#[test]
fn reorder_slots_must_be_a_permutation() {
    let mut session = Session::new(&SchedulerConfig::default_test());
    let mut order = session.slots.labels().to_vec();
    order.reverse();
    session.slots.reorder(order.clone()).unwrap();
    assert_eq!(session.slots.labels(), order.as_slice());

    order.pop();
    assert!(matches!(
        session.slots.reorder(order.clone()),
        Err(SegError::InvalidSlotOrder { .. })
    ));
    order.push("Overtime".into());
    assert!(matches!(
        session.slots.reorder(order),
        Err(SegError::InvalidSlotOrder { .. })
    ));
}
