//! SQLite persistence: session round trips, the event log and resume.

use segmenter_core::{
    agent::AgentStatus,
    command::OperatorCommand,
    config::SchedulerConfig,
    engine::SegmentationEngine,
    error::SegError,
    queue::Queue,
    store::ScheduleStore,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three present agents, one with a lunch break, and one generated shift.
fn populated_engine(engine: &mut SegmentationEngine) {
    for (name, nick) in [("Ana Reyes", "Ana"), ("Ben Cruz", "Ben"), ("Cy Lim", "Cy")] {
        engine
            .submit(OperatorCommand::AddAgent {
                name:      name.into(),
                nickname:  nick.into(),
                rest_days: "Sat-Sun".into(),
            })
            .unwrap();
    }
    let ids: Vec<String> = engine.session.roster.iter().map(|a| a.id.clone()).collect();
    for id in &ids {
        engine
            .submit(OperatorCommand::SetStatus { agent_id: id.clone(), status: AgentStatus::Present })
            .unwrap();
    }
    engine
        .submit(OperatorCommand::AddPresetBreak { agent_id: ids[0].clone(), preset: "Lunch Break".into() })
        .unwrap();
    for slot in ["10:00 - 11:00", "12:00 - 1:00", "4:00 - 5:00"] {
        engine
            .submit(OperatorCommand::SetHeadcount { slot: slot.into(), queue: Queue::SvPgc, required: 1 })
            .unwrap();
        engine
            .submit(OperatorCommand::SetHeadcount { slot: slot.into(), queue: Queue::LvNpgc, required: 1 })
            .unwrap();
    }
    engine
        .submit(OperatorCommand::Generate { now_minutes: Some(9 * 60) })
        .unwrap();
}

#[test]
fn saved_session_loads_back_identical() {
    init_logging();
    let mut engine = SegmentationEngine::build_test("persist-test", 42).unwrap();
    populated_engine(&mut engine);

    let loaded = engine
        .store
        .load_session("persist-test")
        .unwrap()
        .expect("session was saved");

    assert_eq!(loaded, engine.session);
    assert_eq!(engine.store.result_count("persist-test").unwrap(), 3);
    assert_eq!(engine.store.agent_count("persist-test", "PRESENT").unwrap(), 3);
    for agent in engine.session.roster.iter() {
        assert_eq!(
            engine.store.agent_total("persist-test", &agent.id).unwrap(),
            Some(agent.total())
        );
    }
}

#[test]
fn unknown_session_loads_as_none() {
    let store = ScheduleStore::in_memory().unwrap();
    store.migrate().unwrap();
    assert!(store.load_session("nobody").unwrap().is_none());
    assert_eq!(store.generation_runs("nobody").unwrap(), 0);
    assert_eq!(store.last_event_seq("nobody").unwrap(), 0);
}

/// Every command opens with OperatorCommandApplied; sequence numbers are
/// gapless from 1.
#[test]
fn event_log_is_sequenced() {
    let mut engine = SegmentationEngine::build_test("log-test", 1).unwrap();
    populated_engine(&mut engine);

    let entries = engine.events().unwrap();
    let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=entries.len() as u64).collect::<Vec<_>>());
    assert_eq!(entries[0].event_type, "operator_command_applied");
    assert!(entries[0].payload.contains("\"command_type\":\"add_agent\""));

    let count = |t: &str| engine.store.event_count("log-test", t).unwrap();
    assert_eq!(count("generation_started"), 1);
    assert_eq!(count("generation_completed"), 1);
    assert_eq!(count("slot_assigned"), 3);
    assert_eq!(count("slot_understaffed"), 0);
}

/// A rejected command leaves no trace in the log or the stored session.
#[test]
fn failed_command_is_not_logged() {
    let mut engine = SegmentationEngine::build_test("fail-test", 1).unwrap();
    populated_engine(&mut engine);
    let before = engine.events().unwrap().len();

    let err = engine
        .submit(OperatorCommand::RemoveAgent { agent_id: "ghost".into() })
        .unwrap_err();

    assert!(matches!(err, SegError::AgentNotFound { .. }));
    assert_eq!(engine.events().unwrap().len(), before);
}

/// A second connection to the same database resumes where the first left
/// off: same session, same run count, log sequence continues.
#[test]
fn engine_resumes_from_store() {
    init_logging();
    let store = ScheduleStore::open("file:segmenter_resume_test?mode=memory&cache=shared").unwrap();
    store.migrate().unwrap();
    let mut first = SegmentationEngine::new("resume".into(), 5, SchedulerConfig::default_test(), store);
    populated_engine(&mut first);
    let last_seq = first.events().unwrap().last().unwrap().seq;

    let mut second = SegmentationEngine::resume(
        "resume".into(),
        5,
        SchedulerConfig::default_test(),
        first.store.reopen().unwrap(),
    )
    .unwrap();

    assert_eq!(second.session, first.session);
    assert_eq!(second.generation_runs(), 1);

    let events = second.submit(OperatorCommand::ResetAll).unwrap();
    assert_eq!(events.len(), 2);
    let entries = second.events().unwrap();
    assert_eq!(entries.last().unwrap().seq, last_seq + 2);
    assert_eq!(second.store.generation_runs("resume").unwrap(), 1);
}
